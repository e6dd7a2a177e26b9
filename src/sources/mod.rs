//! Log stream consumption.
//!
//! A `ChunkSource` yields raw byte chunks; `LineDecoder` turns them into
//! complete lines; `StreamManager` runs one source at a time on a background
//! task and hands its events to the UI loop.

pub mod decoder;
pub mod http;
pub mod manager;

use crate::error::StreamError;

pub use decoder::LineDecoder;
pub use manager::{StreamManager, StreamPhase};

/// Events emitted by a stream session
#[derive(Debug, PartialEq, Eq)]
pub enum StreamEvent {
    /// The source is connected and its body is being read
    Connected,
    /// Complete lines decoded from one chunk, in order
    Lines(Vec<String>),
    /// The source reported end of stream
    Ended,
    /// The session failed and will produce nothing further
    Failed(StreamError),
}

/// Trait for byte-chunk producers
#[async_trait::async_trait]
pub trait ChunkSource: Send {
    /// Next chunk of bytes, or `None` once the stream is finished
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, StreamError>;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::time::Duration;

    /// Replays a fixed list of chunks, then ends or fails
    pub struct ScriptedSource {
        chunks: VecDeque<Result<Vec<u8>, StreamError>>,
        delay: Option<Duration>,
    }

    impl ScriptedSource {
        pub fn new(chunks: &[&str]) -> Self {
            Self::from_bytes(chunks.iter().map(|c| c.as_bytes().to_vec()).collect())
        }

        pub fn from_bytes(chunks: Vec<Vec<u8>>) -> Self {
            Self {
                chunks: chunks.into_iter().map(Ok).collect(),
                delay: None,
            }
        }

        pub fn then_fail(mut self, err: StreamError) -> Self {
            self.chunks.push_back(Err(err));
            self
        }

        /// Wait before every chunk, so the session stays open for a while
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }
    }

    #[async_trait::async_trait]
    impl ChunkSource for ScriptedSource {
        async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, StreamError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.chunks.pop_front().transpose()
        }
    }
}
