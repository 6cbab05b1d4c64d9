//! Retrieval of images by filename from an HTTP CDN.
use crate::error::FetchError;
use anyhow::{anyhow, Result};
use bytes::Bytes;
use futures_util::stream::{self, BoxStream};
use futures_util::{StreamExt, TryStreamExt};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

pub type Body = BoxStream<'static, Result<Bytes, FetchError>>;

pub enum Retrieval {
    Found(Body),
    Missing(StatusCode),
}

pub trait ImageSource {
    async fn open(self: &Self, filename: &str) -> Result<Retrieval, FetchError>;
}

pub struct CdnSource {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl CdnSource {
    /// `base_url` is prepended verbatim to every filename, so it should normally end in `/`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Url::parse(base_url).map_err(|e| anyhow!("Invalid base address '{}': {}", base_url, e))?;
        let client = Client::builder().connect_timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
            timeout,
        })
    }

    pub fn url_for(self: &Self, filename: &str) -> String {
        format!("{}{}", self.base_url, filename)
    }
}

impl ImageSource for CdnSource {
    async fn open(self: &Self, filename: &str) -> Result<Retrieval, FetchError> {
        let url = self.url_for(filename);
        tracing::debug!("GET {url}");

        let response = tokio::time::timeout(self.timeout, self.client.get(&url).send())
            .await
            .map_err(|_| FetchError::Timeout(self.timeout))??;

        let status = response.status();
        if status != StatusCode::OK {
            return Ok(Retrieval::Missing(status));
        }
        let body = response.bytes_stream().map_err(FetchError::from).boxed();
        Ok(Retrieval::Found(bounded(body, self.timeout)))
    }
}

/// Fail with `FetchError::Timeout` when the next chunk takes longer than `timeout` to arrive.
pub fn bounded(body: Body, timeout: Duration) -> Body {
    stream::try_unfold(body, move |mut body| async move {
        let next = tokio::time::timeout(timeout, body.try_next()).await;
        match next {
            Ok(Ok(Some(chunk))) => Ok(Some((chunk, body))),
            Ok(Ok(None)) => Ok(None),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(FetchError::Timeout(timeout)),
        }
    })
    .boxed()
}
