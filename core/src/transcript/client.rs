use crate::telemetry::{LogManager, MetricsRecorder};
use crate::transcript::history::{Transcript, TranscriptEntry};
use crate::transcript::transport::AssistantTransport;
use log::debug;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Owns a transcript and feeds it from an assistant transport.
///
/// Each send appends the user entry at once and runs the remote exchange as
/// its own task. Exchanges hold only a weak reference to the transcript:
/// replies that arrive after the client is gone are dropped.
pub struct TranscriptClient<T: AssistantTransport> {
    transcript: Arc<Mutex<Transcript>>,
    transport: Arc<T>,
    metrics: Arc<MetricsRecorder>,
}

impl<T: AssistantTransport> TranscriptClient<T> {
    pub fn new(transcript: Transcript, transport: T, metrics: Arc<MetricsRecorder>) -> Self {
        Self {
            transcript: Arc::new(Mutex::new(transcript)),
            transport: Arc::new(transport),
            metrics,
        }
    }

    /// Submits `text`. Blank input is ignored and yields `None`.
    ///
    /// The exchange runs on the current tokio runtime; the returned handle may
    /// be dropped and the exchange keeps running. Outside a runtime the user
    /// entry is kept, the exchange counts as failed and `None` is returned.
    pub fn send(&self, text: &str) -> Option<JoinHandle<()>> {
        if text.trim().is_empty() {
            return None;
        }
        let id = lock(&self.transcript).begin_exchange(text);
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(err) => {
                LogManager::new()
                    .degraded(&format!("assistant exchange {} not started: {}", id, err));
                self.metrics.record_exchange_failed();
                return None;
            }
        };

        let transcript = Arc::downgrade(&self.transcript);
        let transport = self.transport.clone();
        let metrics = self.metrics.clone();
        let message = text.to_string();
        Some(runtime.spawn(async move {
            let logger = LogManager::new();
            match transport.exchange(message).await {
                Ok(reply) => match transcript.upgrade() {
                    Some(transcript) => {
                        if lock(&transcript).complete_exchange(id, reply) {
                            metrics.record_exchange_completed();
                        }
                    }
                    None => {
                        debug!("transcript gone; dropping reply for exchange {}", id);
                        metrics.record_reply_discarded();
                    }
                },
                Err(err) => {
                    logger.degraded(&format!("assistant exchange {} failed: {}", id, err));
                    metrics.record_exchange_failed();
                }
            }
        }))
    }

    pub fn entries(&self) -> Vec<TranscriptEntry> {
        lock(&self.transcript).entries().to_vec()
    }

    pub fn len(&self) -> usize {
        lock(&self.transcript).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.transcript).is_empty()
    }
}

fn lock(transcript: &Mutex<Transcript>) -> MutexGuard<'_, Transcript> {
    transcript.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::ExchangeError;
    use crate::transcript::history::Role;
    use std::collections::HashMap;
    use std::future::Future;
    use std::time::Duration;
    use tokio::time::sleep;

    /// Replies "re: <message>" after a per-message delay; "fail" always fails.
    #[derive(Default)]
    struct ScriptedAssistant {
        delays_ms: HashMap<String, u64>,
    }

    impl ScriptedAssistant {
        fn with_delay(mut self, message: &str, delay_ms: u64) -> Self {
            self.delays_ms.insert(message.to_string(), delay_ms);
            self
        }
    }

    impl AssistantTransport for ScriptedAssistant {
        fn exchange(
            &self,
            message: String,
        ) -> impl Future<Output = Result<String, ExchangeError>> + Send {
            let delay = Duration::from_millis(*self.delays_ms.get(&message).unwrap_or(&10));
            async move {
                sleep(delay).await;
                if message == "fail" {
                    Err(ExchangeError::Status(500))
                } else {
                    Ok(format!("re: {}", message))
                }
            }
        }
    }

    fn position(entries: &[TranscriptEntry], role: Role, text: &str) -> usize {
        entries
            .iter()
            .position(|entry| entry.role == role && entry.text == text)
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn user_entry_is_visible_before_reply() {
        let client = TranscriptClient::new(
            Transcript::with_greeting(),
            ScriptedAssistant::default(),
            Arc::new(MetricsRecorder::new()),
        );
        let handle = client.send("How are the wolves?").unwrap();
        let entries = client.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].role, Role::User);

        handle.await.unwrap();
        let entries = client.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[2].role, Role::Assistant);
        assert_eq!(entries[2].text, "re: How are the wolves?");
        assert_eq!(entries[2].exchange, entries[1].exchange);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_exchanges_keep_their_own_order() {
        let metrics = Arc::new(MetricsRecorder::new());
        let assistant = ScriptedAssistant::default()
            .with_delay("A", 200)
            .with_delay("B", 20);
        let client = TranscriptClient::new(Transcript::new(), assistant, metrics.clone());

        let a = client.send("A").unwrap();
        let b = client.send("B").unwrap();
        a.await.unwrap();
        b.await.unwrap();

        let entries = client.entries();
        assert_eq!(entries.len(), 4);
        assert!(position(&entries, Role::User, "A") < position(&entries, Role::Assistant, "re: A"));
        assert!(position(&entries, Role::User, "B") < position(&entries, Role::Assistant, "re: B"));
        assert_eq!(metrics.snapshot().exchanges_completed, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_exchange_appends_nothing() {
        let metrics = Arc::new(MetricsRecorder::new());
        let client =
            TranscriptClient::new(Transcript::new(), ScriptedAssistant::default(), metrics.clone());
        client.send("fail").unwrap().await.unwrap();

        let entries = client.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].role, Role::User);
        assert_eq!(metrics.snapshot().exchanges_failed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn blank_input_is_ignored() {
        let client = TranscriptClient::new(
            Transcript::new(),
            ScriptedAssistant::default(),
            Arc::new(MetricsRecorder::new()),
        );
        assert!(client.send("   ").is_none());
        assert!(client.send("").is_none());
        assert!(client.is_empty());
    }

    #[test]
    fn send_without_runtime_fails_softly() {
        let metrics = Arc::new(MetricsRecorder::new());
        let client =
            TranscriptClient::new(Transcript::new(), ScriptedAssistant::default(), metrics.clone());
        assert!(client.send("anyone?").is_none());

        let entries = client.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].role, Role::User);
        assert_eq!(metrics.snapshot().exchanges_failed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn late_reply_after_teardown_is_discarded() {
        let metrics = Arc::new(MetricsRecorder::new());
        let client =
            TranscriptClient::new(Transcript::new(), ScriptedAssistant::default(), metrics.clone());
        let handle = client.send("still there?").unwrap();
        drop(client);

        handle.await.unwrap();
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.replies_discarded, 1);
        assert_eq!(snapshot.exchanges_completed, 0);
    }
}
