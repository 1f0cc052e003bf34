//! Scripted intent classifier.

use std::sync::Mutex;

use async_trait::async_trait;

use chat_core::{CoreError, Intent, IntentClassifier, Turn};

/// A classifier that plays back a queued sequence of intents.
///
/// Once the queue runs dry it keeps returning the last intent, so tests
/// don't need to count classifier calls exactly.
#[derive(Debug)]
pub struct ScriptedClassifier {
    queue: Mutex<Vec<Intent>>,
    fallback: Intent,
}

impl ScriptedClassifier {
    /// Play back `intents` in order, then keep returning the last one.
    pub fn new(intents: Vec<Intent>) -> Self {
        let fallback = intents.last().copied().unwrap_or(Intent::Unknown);
        let mut queue = intents;
        queue.reverse();
        Self {
            queue: Mutex::new(queue),
            fallback,
        }
    }

    /// Always return the same intent.
    pub fn always(intent: Intent) -> Self {
        Self::new(vec![intent])
    }
}

#[async_trait]
impl IntentClassifier for ScriptedClassifier {
    async fn detect(&self, _text: &str, _history: &[Turn]) -> Result<Intent, CoreError> {
        let mut queue = self
            .queue
            .lock()
            .map_err(|_| CoreError::ProcessingFailed("classifier mutex poisoned".to_string()))?;
        Ok(queue.pop().unwrap_or(self.fallback))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_plays_back_in_order() {
        let classifier =
            ScriptedClassifier::new(vec![Intent::CreateCampaign, Intent::Unknown]);

        assert_eq!(
            classifier.detect("a", &[]).await.unwrap(),
            Intent::CreateCampaign
        );
        assert_eq!(classifier.detect("b", &[]).await.unwrap(), Intent::Unknown);
        // Queue exhausted: the last intent repeats
        assert_eq!(classifier.detect("c", &[]).await.unwrap(), Intent::Unknown);
    }

    #[tokio::test]
    async fn test_always() {
        let classifier = ScriptedClassifier::always(Intent::QuickPost);
        for _ in 0..3 {
            assert_eq!(
                classifier.detect("x", &[]).await.unwrap(),
                Intent::QuickPost
            );
        }
    }
}
