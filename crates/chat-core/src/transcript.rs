//! Append-only conversation transcript.
//!
//! The transcript is the ordered log of turns consumed by the presentation
//! layer and by the intent classifier as context. Turns are immutable once
//! appended, with one exception: a streaming assistant reply is replaced in
//! place token by token until it is finished or aborted.

use tokio::sync::RwLock;

use crate::message::{Role, Turn};

/// Identifies one streaming assistant turn.
///
/// Issued by [`begin_streaming`](Transcript::begin_streaming); every other
/// streaming operation requires it, so a stream that has been superseded or
/// cleared can no longer touch the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamId(u64);

/// Append-only ordered log of conversation turns.
///
/// Supports a single in-progress streaming assistant turn at a time. While
/// streaming, [`push_token`](Transcript::push_token) replaces the turn's
/// content in place; [`abort_streaming`](Transcript::abort_streaming)
/// removes the partial turn entirely so abandoned replies never persist.
/// Streaming calls carry the [`StreamId`] of the turn they belong to;
/// calls with a stale id are no-ops.
#[derive(Debug, Default)]
pub struct Transcript {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    turns: Vec<Turn>,
    /// Id and index of the in-progress streaming turn, if any.
    streaming: Option<(StreamId, usize)>,
    next_stream: u64,
}

impl Transcript {
    /// Create an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finished turn.
    pub async fn append(&self, turn: Turn) {
        let mut inner = self.inner.write().await;
        inner.turns.push(turn);
    }

    /// Get a snapshot of all turns in append order.
    pub async fn snapshot(&self) -> Vec<Turn> {
        let inner = self.inner.read().await;
        inner.turns.clone()
    }

    /// Get the most recent `max_turns` turns for classifier context.
    pub async fn recent(&self, max_turns: usize) -> Vec<Turn> {
        let inner = self.inner.read().await;
        let start = inner.turns.len().saturating_sub(max_turns);
        inner.turns[start..].to_vec()
    }

    /// Number of turns currently in the transcript.
    pub async fn len(&self) -> usize {
        let inner = self.inner.read().await;
        inner.turns.len()
    }

    /// Check if the transcript is empty.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Begin a streaming assistant turn and return its id.
    ///
    /// Appends an empty assistant turn that subsequent
    /// [`push_token`](Transcript::push_token) calls extend. Any previous
    /// unfinished streaming turn is removed: its owner holds a stale id, so
    /// its remaining tokens can never land in the new turn.
    pub async fn begin_streaming(&self) -> StreamId {
        let mut inner = self.inner.write().await;
        if let Some((_, index)) = inner.streaming.take() {
            inner.turns.remove(index);
        }

        let id = StreamId(inner.next_stream);
        inner.next_stream += 1;
        let index = inner.turns.len();
        inner.turns.push(Turn::assistant(""));
        inner.streaming = Some((id, index));
        id
    }

    /// Append a token to the streaming turn identified by `id`.
    ///
    /// No-op if that turn is no longer open (aborted by a reset racing the
    /// stream, or superseded by a newer stream).
    pub async fn push_token(&self, id: StreamId, token: &str) {
        let mut inner = self.inner.write().await;
        if let Some((open, index)) = inner.streaming {
            if open == id {
                inner.turns[index].content.push_str(token);
            }
        }
    }

    /// Close the streaming turn identified by `id`, keeping its content.
    ///
    /// Returns the final content, or `None` if that turn is no longer open.
    pub async fn finish_streaming(&self, id: StreamId) -> Option<String> {
        let mut inner = self.inner.write().await;
        match inner.streaming {
            Some((open, index)) if open == id => {
                inner.streaming = None;
                Some(inner.turns[index].content.clone())
            }
            _ => None,
        }
    }

    /// Abort the streaming turn identified by `id`, discarding its partial
    /// content. The partial turn is removed from the transcript entirely.
    pub async fn abort_streaming(&self, id: StreamId) {
        let mut inner = self.inner.write().await;
        if let Some((open, index)) = inner.streaming {
            if open == id {
                inner.streaming = None;
                inner.turns.remove(index);
            }
        }
    }

    /// Whether a streaming turn is currently open.
    pub async fn is_streaming(&self) -> bool {
        let inner = self.inner.read().await;
        inner.streaming.is_some()
    }

    /// Clear the entire transcript.
    ///
    /// Any in-progress streaming turn is discarded with everything else.
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        inner.turns.clear();
        inner.streaming = None;
    }

    /// Count of assistant turns, useful for assertions in tests.
    pub async fn assistant_turns(&self) -> usize {
        let inner = self.inner.read().await;
        inner
            .turns
            .iter()
            .filter(|t| t.role == Role::Assistant)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_append_and_snapshot() {
        let transcript = Transcript::new();
        transcript.append(Turn::user("hello")).await;
        transcript.append(Turn::assistant("hi there")).await;

        let turns = transcript.snapshot().await;
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[0].content, "hello");
        assert_eq!(turns[1].role, Role::Assistant);
    }

    #[tokio::test]
    async fn test_recent_window() {
        let transcript = Transcript::new();
        for i in 0..10 {
            transcript.append(Turn::user(format!("msg {}", i))).await;
        }

        let recent = transcript.recent(3).await;
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].content, "msg 7");
        assert_eq!(recent[2].content, "msg 9");
    }

    #[tokio::test]
    async fn test_streaming_replaces_in_place() {
        let transcript = Transcript::new();
        transcript.append(Turn::user("tell me something")).await;

        let id = transcript.begin_streaming().await;
        transcript.push_token(id, "Once ").await;
        transcript.push_token(id, "upon ").await;
        transcript.push_token(id, "a time").await;

        // Still a single assistant turn, updated in place
        assert_eq!(transcript.len().await, 2);
        let content = transcript.finish_streaming(id).await.unwrap();
        assert_eq!(content, "Once upon a time");

        let turns = transcript.snapshot().await;
        assert_eq!(turns[1].content, "Once upon a time");
    }

    #[tokio::test]
    async fn test_abort_discards_partial_content() {
        let transcript = Transcript::new();
        transcript.append(Turn::user("go on")).await;

        let id = transcript.begin_streaming().await;
        transcript.push_token(id, "half a rep").await;
        transcript.abort_streaming(id).await;

        // The partial turn is gone, not retained
        assert_eq!(transcript.len().await, 1);
        assert!(!transcript.is_streaming().await);
    }

    #[tokio::test]
    async fn test_push_token_after_abort_is_noop() {
        let transcript = Transcript::new();
        let id = transcript.begin_streaming().await;
        transcript.abort_streaming(id).await;
        transcript.push_token(id, "late token").await;

        assert!(transcript.is_empty().await);
    }

    #[tokio::test]
    async fn test_newer_stream_supersedes_older() {
        let transcript = Transcript::new();

        let first = transcript.begin_streaming().await;
        transcript.push_token(first, "first ").await;

        // A second stream replaces the first turn entirely
        let second = transcript.begin_streaming().await;
        transcript.push_token(first, "stray").await;
        transcript.push_token(second, "second").await;

        // The first stream can no longer finish, abort, or leak tokens
        assert!(transcript.finish_streaming(first).await.is_none());
        transcript.abort_streaming(first).await;
        assert_eq!(transcript.finish_streaming(second).await.as_deref(), Some("second"));

        let turns = transcript.snapshot().await;
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].content, "second");
    }

    #[tokio::test]
    async fn test_clear_drops_streaming_state() {
        let transcript = Transcript::new();
        transcript.append(Turn::user("hi")).await;
        let id = transcript.begin_streaming().await;
        transcript.push_token(id, "partial").await;

        transcript.clear().await;

        assert!(transcript.is_empty().await);
        assert!(!transcript.is_streaming().await);
        assert!(transcript.finish_streaming(id).await.is_none());
    }

    #[tokio::test]
    async fn test_assistant_turn_count() {
        let transcript = Transcript::new();
        transcript.append(Turn::user("q")).await;
        transcript.append(Turn::assistant("a")).await;
        transcript.append(Turn::assistant("b")).await;
        assert_eq!(transcript.assistant_turns().await, 2);
    }
}
