use reqwest::{Client, Response, StatusCode};

use super::ChunkSource;
use crate::error::StreamError;

/// A log source that reads the body of a long-lived HTTP GET
pub struct HttpSource {
    response: Response,
}

impl HttpSource {
    /// Issue the request and wait for the response headers
    pub async fn connect(client: Client, url: String) -> Result<Self, StreamError> {
        tracing::info!("Connecting to {}", url);
        let response = client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StreamError::StreamUnavailable(format!(
                "{} returned {}",
                url, status
            )));
        }

        tracing::info!("Connected to {} ({})", url, status);
        Ok(Self { response })
    }
}

#[async_trait::async_trait]
impl ChunkSource for HttpSource {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, StreamError> {
        let chunk = self.response.chunk().await?;
        Ok(chunk.map(|bytes| bytes.to_vec()))
    }
}

/// Fire a one-off GET and report only its status; the body is discarded
pub async fn send_request(client: Client, url: String) -> Result<StatusCode, StreamError> {
    let response = client.get(&url).send().await?;
    Ok(response.status())
}
