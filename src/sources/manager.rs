//! Runs at most one stream session at a time.

use std::future::Future;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{ChunkSource, LineDecoder, StreamEvent};
use crate::error::StreamError;

/// Where the current (or last) session is in its lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamPhase {
    Idle,
    Connecting,
    Streaming,
    Ended,
    Canceled,
    Failed,
}

/// One running stream: its event receiver and the task feeding it
struct StreamSession {
    id: u64,
    rx: mpsc::Receiver<StreamEvent>,
    handle: JoinHandle<()>,
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        // Abort the task so the underlying connection is closed
        self.handle.abort();
    }
}

/// Owns the active stream session and hands its events to the caller
pub struct StreamManager {
    session: Option<StreamSession>,
    next_id: u64,
    phase: StreamPhase,
    buffer_size: usize,
}

impl StreamManager {
    pub fn new(buffer_size: usize) -> Self {
        Self {
            session: None,
            next_id: 1,
            phase: StreamPhase::Idle,
            buffer_size,
        }
    }

    /// Start a new session, canceling any session already running.
    ///
    /// `connect` resolves to the chunk source once the response is available.
    /// Returns the new session's id.
    pub fn start<F, S>(&mut self, connect: F) -> u64
    where
        F: Future<Output = Result<S, StreamError>> + Send + 'static,
        S: ChunkSource + 'static,
    {
        self.cancel();

        let (tx, rx) = mpsc::channel(self.buffer_size);
        let id = self.next_id;
        self.next_id += 1;

        let handle = tokio::spawn(async move {
            let event = match pump(connect, &tx).await {
                Ok(()) => StreamEvent::Ended,
                Err(err) if err.is_cancellation() => {
                    tracing::debug!("Stream session {} canceled", id);
                    return;
                }
                Err(err) => StreamEvent::Failed(err),
            };
            let _ = tx.send(event).await;
        });

        tracing::info!("Started stream session {}", id);
        self.session = Some(StreamSession { id, rx, handle });
        self.phase = StreamPhase::Connecting;
        id
    }

    /// Drop the active session; nothing it produced afterwards is delivered
    pub fn cancel(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::info!("Canceling stream session {}", session.id);
            self.phase = StreamPhase::Canceled;
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    #[cfg(test)]
    pub fn session_id(&self) -> Option<u64> {
        self.session.as_ref().map(|s| s.id)
    }

    pub fn phase(&self) -> StreamPhase {
        self.phase
    }

    /// Wait for the next event of the active session.
    ///
    /// Pends forever while no session is active, so it can sit in a
    /// `tokio::select!` next to other event sources.
    pub async fn recv(&mut self) -> Option<StreamEvent> {
        let Some(session) = self.session.as_mut() else {
            return std::future::pending().await;
        };

        match session.rx.recv().await {
            Some(event) => {
                self.phase = match &event {
                    StreamEvent::Connected | StreamEvent::Lines(_) => StreamPhase::Streaming,
                    StreamEvent::Ended => StreamPhase::Ended,
                    StreamEvent::Failed(_) => StreamPhase::Failed,
                };
                if matches!(event, StreamEvent::Ended | StreamEvent::Failed(_)) {
                    self.session = None;
                }
                Some(event)
            }
            None => {
                // Task went away without a final event
                self.session = None;
                std::future::pending().await
            }
        }
    }
}

impl Drop for StreamManager {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Connect, then forward decoded lines until the source is exhausted
async fn pump<F, S>(connect: F, tx: &mpsc::Sender<StreamEvent>) -> Result<(), StreamError>
where
    F: Future<Output = Result<S, StreamError>>,
    S: ChunkSource,
{
    let mut source = connect.await?;
    forward(tx, StreamEvent::Connected).await?;

    let mut decoder = LineDecoder::new();
    while let Some(chunk) = source.next_chunk().await? {
        let lines = decoder.push(&chunk);
        if !lines.is_empty() {
            forward(tx, StreamEvent::Lines(lines)).await?;
        }
    }

    if let Some(line) = decoder.finish() {
        forward(tx, StreamEvent::Lines(vec![line])).await?;
    }
    Ok(())
}

async fn forward(tx: &mpsc::Sender<StreamEvent>, event: StreamEvent) -> Result<(), StreamError> {
    // A closed channel means the session was dropped
    tx.send(event).await.map_err(|_| StreamError::Canceled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_CHANNEL_BUFFER;
    use crate::sources::testing::ScriptedSource;
    use std::time::Duration;

    /// Collect events until the session finishes
    async fn drain(manager: &mut StreamManager) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        loop {
            let event = tokio::time::timeout(Duration::from_secs(5), manager.recv())
                .await
                .expect("stream did not finish");
            let done = matches!(event, Some(StreamEvent::Ended | StreamEvent::Failed(_)));
            events.extend(event);
            if done {
                return events;
            }
        }
    }

    fn lines_of(events: &[StreamEvent]) -> Vec<String> {
        events
            .iter()
            .filter_map(|e| match e {
                StreamEvent::Lines(lines) => Some(lines.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    #[tokio::test]
    async fn delivers_lines_then_ends() {
        let mut manager = StreamManager::new(DEFAULT_CHANNEL_BUFFER);
        assert_eq!(manager.phase(), StreamPhase::Idle);

        manager.start(async { Ok(ScriptedSource::new(&["INFO a\nERR", "OR b\n", "DEBUG tail"])) });
        assert_eq!(manager.phase(), StreamPhase::Connecting);
        assert!(manager.is_active());

        let events = drain(&mut manager).await;
        assert_eq!(events.first(), Some(&StreamEvent::Connected));
        assert_eq!(events.last(), Some(&StreamEvent::Ended));
        assert_eq!(lines_of(&events), vec!["INFO a", "ERROR b", "DEBUG tail"]);
        assert_eq!(manager.phase(), StreamPhase::Ended);
        assert!(!manager.is_active());
    }

    #[tokio::test]
    async fn one_chunk_is_one_batch() {
        let mut manager = StreamManager::new(DEFAULT_CHANNEL_BUFFER);
        manager.start(async { Ok(ScriptedSource::new(&["INFO a\nERROR b\n"])) });

        let events = drain(&mut manager).await;
        assert_eq!(
            events,
            vec![
                StreamEvent::Connected,
                StreamEvent::Lines(vec!["INFO a".into(), "ERROR b".into()]),
                StreamEvent::Ended,
            ]
        );
    }

    #[tokio::test]
    async fn connect_failure_is_reported() {
        let mut manager = StreamManager::new(DEFAULT_CHANNEL_BUFFER);
        manager.start(async {
            Err::<ScriptedSource, _>(StreamError::StreamUnavailable("no body".into()))
        });

        let events = drain(&mut manager).await;
        assert_eq!(
            events,
            vec![StreamEvent::Failed(StreamError::StreamUnavailable("no body".into()))]
        );
        assert_eq!(manager.phase(), StreamPhase::Failed);
    }

    #[tokio::test]
    async fn read_failure_after_lines() {
        let mut manager = StreamManager::new(DEFAULT_CHANNEL_BUFFER);
        manager.start(async {
            Ok(ScriptedSource::new(&["INFO a\n"])
                .then_fail(StreamError::TransportFailure("connection reset".into())))
        });

        let events = drain(&mut manager).await;
        assert_eq!(lines_of(&events), vec!["INFO a"]);
        assert_eq!(
            events.last(),
            Some(&StreamEvent::Failed(StreamError::TransportFailure(
                "connection reset".into()
            )))
        );
    }

    #[tokio::test]
    async fn new_session_replaces_old_one() {
        let mut manager = StreamManager::new(DEFAULT_CHANNEL_BUFFER);

        let chunks: Vec<String> = (0..100).map(|i| format!("INFO first {i}\n")).collect();
        let chunks: Vec<Vec<u8>> = chunks.into_iter().map(String::into_bytes).collect();
        let first = manager.start(async move {
            Ok(ScriptedSource::from_bytes(chunks).with_delay(Duration::from_millis(5)))
        });

        // Let the first session get going
        let event = tokio::time::timeout(Duration::from_secs(5), manager.recv()).await.unwrap();
        assert_eq!(event, Some(StreamEvent::Connected));

        let second = manager.start(async { Ok(ScriptedSource::new(&["WARN second\n"])) });
        assert_ne!(first, second);
        assert_eq!(manager.session_id(), Some(second));
        assert!(manager.is_active());

        let events = drain(&mut manager).await;
        assert_eq!(lines_of(&events), vec!["WARN second"]);
        assert!(!events.iter().any(|e| matches!(e, StreamEvent::Failed(_))));
        assert_eq!(manager.phase(), StreamPhase::Ended);
    }

    #[tokio::test]
    async fn explicit_cancel_is_silent() {
        let mut manager = StreamManager::new(DEFAULT_CHANNEL_BUFFER);
        manager.start(async {
            Ok(ScriptedSource::new(&["INFO a\n", "INFO b\n"]).with_delay(Duration::from_millis(50)))
        });

        manager.cancel();
        assert!(!manager.is_active());
        assert_eq!(manager.phase(), StreamPhase::Canceled);

        // Nothing is delivered once canceled
        let event = tokio::time::timeout(Duration::from_millis(200), manager.recv()).await;
        assert!(event.is_err());
    }
}
