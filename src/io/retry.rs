use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{error, warn};

use crate::io::transport::{ChatTransport, TransportError};
use crate::model::config::RetryConfig;
use crate::model::event::{EventId, MessageContent, RoomId, UserId};

/// Fibonacci backoff with a fixed retry ceiling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub base_delay: Duration,
    /// Retries after the first attempt
    pub max_retries: u32,
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        RetryPolicy {
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_retries: config.max_retries,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::from(&RetryConfig::default())
    }
}

impl RetryPolicy {
    /// Delay before the `retry`th retry (1-based): base × 1, 1, 2, 3, 5, …
    pub fn delay(&self, retry: u32) -> Duration {
        let (mut a, mut b) = (1u32, 1u32);
        for _ in 1..retry {
            (a, b) = (b, a.saturating_add(b));
        }
        self.base_delay.saturating_mul(a)
    }
}

/// Wraps a transport so every call is retried with backoff. Exhausted retries
/// surface as [`TransportError::RetriesExhausted`].
pub struct ReliableTransport {
    inner: Arc<dyn ChatTransport>,
    policy: RetryPolicy,
}

impl ReliableTransport {
    pub fn new(inner: Arc<dyn ChatTransport>, policy: RetryPolicy) -> Self {
        ReliableTransport { inner, policy }
    }

    async fn with_retry<T, F, Fut>(&self, op: &'static str, mut call: F) -> Result<T, TransportError>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T, TransportError>> + Send,
        T: Send,
    {
        let mut retry = 0;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(e) if retry < self.policy.max_retries => {
                    retry += 1;
                    let delay = self.policy.delay(retry);
                    warn!(op, retry, delay_ms = delay.as_millis() as u64, error = %e, "retrying");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    error!(op, attempts = retry + 1, error = %e, "giving up");
                    return Err(TransportError::RetriesExhausted {
                        op,
                        attempts: retry + 1,
                    });
                }
            }
        }
    }
}

#[async_trait]
impl ChatTransport for ReliableTransport {
    async fn send(&self, room: &RoomId, content: &MessageContent) -> Result<EventId, TransportError> {
        self.with_retry("send", || self.inner.send(room, content)).await
    }

    async fn send_edit(
        &self,
        room: &RoomId,
        target: &EventId,
        content: &MessageContent,
    ) -> Result<EventId, TransportError> {
        self.with_retry("send_edit", || self.inner.send_edit(room, target, content))
            .await
    }

    async fn react(&self, room: &RoomId, target: &EventId, key: &str) -> Result<EventId, TransportError> {
        self.with_retry("react", || self.inner.react(room, target, key)).await
    }

    async fn redact(&self, room: &RoomId, target: &EventId) -> Result<EventId, TransportError> {
        self.with_retry("redact", || self.inner.redact(room, target)).await
    }

    async fn join(&self, room_ref: &str) -> Result<RoomId, TransportError> {
        self.with_retry("join", || self.inner.join(room_ref)).await
    }

    async fn leave(&self, room: &RoomId) -> Result<(), TransportError> {
        self.with_retry("leave", || self.inner.leave(room)).await
    }

    async fn room_members(&self, room: &RoomId) -> Result<Vec<UserId>, TransportError> {
        self.with_retry("room_members", || self.inner.room_members(room))
            .await
    }

    async fn get_room_state(
        &self,
        room: &RoomId,
        event_type: &str,
        state_key: &str,
    ) -> Result<Option<Value>, TransportError> {
        self.with_retry("get_room_state", || {
            self.inner.get_room_state(room, event_type, state_key)
        })
        .await
    }

    async fn set_room_state(
        &self,
        room: &RoomId,
        event_type: &str,
        state_key: &str,
        value: Value,
    ) -> Result<(), TransportError> {
        self.with_retry("set_room_state", || {
            self.inner
                .set_room_state(room, event_type, state_key, value.clone())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::memory_transport::MemoryTransport;

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            base_delay: Duration::from_millis(1),
            max_retries,
        }
    }

    #[test]
    fn test_fibonacci_delays() {
        let policy = RetryPolicy::default();
        let delays: Vec<u64> = (1..=6).map(|n| policy.delay(n).as_secs()).collect();
        assert_eq!(delays, vec![1, 1, 2, 3, 5, 8]);
        assert_eq!(policy.max_retries, 5);
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failures() {
        let inner = Arc::new(MemoryTransport::new());
        inner.fail_next(2).await;
        let reliable = ReliableTransport::new(inner.clone(), fast_policy(5));

        let room = RoomId::from("!r:x");
        let id = reliable
            .send(&room, &MessageContent::text("hello"))
            .await
            .unwrap();
        assert_eq!(inner.message(&id).await.unwrap().content.plain, "hello");
    }

    #[tokio::test]
    async fn test_exhausted_retries_surface() {
        let inner = Arc::new(MemoryTransport::new());
        inner.fail_next(10).await;
        let reliable = ReliableTransport::new(inner.clone(), fast_policy(3));

        let err = reliable
            .redact(&RoomId::from("!r:x"), &EventId::from("$1"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            TransportError::RetriesExhausted {
                op: "redact",
                attempts: 4
            }
        );
    }
}
