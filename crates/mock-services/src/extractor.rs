//! Scripted field extractor.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use chat_core::{CoreError, FieldExtractor};

/// An extractor that plays back queued extraction results.
///
/// Once the queue runs dry it returns empty objects, which callers treat
/// as "nothing found".
#[derive(Debug, Default)]
pub struct ScriptedExtractor {
    queue: Mutex<Vec<Value>>,
}

impl ScriptedExtractor {
    /// An extractor that never finds anything.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Play back `results` in order.
    pub fn new(results: Vec<Value>) -> Self {
        let mut queue = results;
        queue.reverse();
        Self {
            queue: Mutex::new(queue),
        }
    }
}

#[async_trait]
impl FieldExtractor for ScriptedExtractor {
    async fn extract(&self, _text: &str, _fields: &[&str]) -> Result<Value, CoreError> {
        let mut queue = self
            .queue
            .lock()
            .map_err(|_| CoreError::ProcessingFailed("extractor mutex poisoned".to_string()))?;
        Ok(queue
            .pop()
            .unwrap_or_else(|| Value::Object(serde_json::Map::new())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_plays_back_then_empties() {
        let extractor = ScriptedExtractor::new(vec![json!({"ratio": 5})]);

        let first = extractor.extract("x", &["ratio"]).await.unwrap();
        assert_eq!(first["ratio"], 5);

        let second = extractor.extract("x", &["ratio"]).await.unwrap();
        assert!(second.as_object().unwrap().is_empty());
    }
}
