//! The HTTP seam used by [`crate::LocationResolver`].

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Url};
use std::{error::Error as StdError, fmt};

/// An outbound request could not be sent, or its response could not be read.
///
/// Wraps whatever the underlying HTTP stack reported so callers can still
/// downcast to it.
#[derive(Debug)]
pub struct TransportError(Box<dyn StdError + Send + Sync + 'static>);

impl TransportError {
    pub fn new<E>(err: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync + 'static>>,
    {
        Self(err.into())
    }

    pub fn inner(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.0.as_ref()
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl StdError for TransportError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self::new(err)
    }
}

/// Performs a single GET and hands back the complete response body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: Url) -> Result<Bytes, TransportError>;
}

#[async_trait]
impl Transport for Client {
    async fn get(&self, url: Url) -> Result<Bytes, TransportError> {
        let res = Client::get(self, url).send().await?.error_for_status()?;

        // Reading the body to the end consumes and releases the response.
        Ok(res.bytes().await?)
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for &T {
    async fn get(&self, url: Url) -> Result<Bytes, TransportError> {
        (**self).get(url).await
    }
}
