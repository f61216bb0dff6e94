use futures::future::BoxFuture;
use isahc::AsyncReadResponseExt;
use thiserror::Error;

use std::error::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to execute get")]
    Get(#[source] Box<dyn Error + Send + Sync>),
    #[error("failed to read response body")]
    Read(#[source] std::io::Error),
}

/// What the client needs back from a GET: the status code and the body as
/// text. Header handling stays inside the transport.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Minimal seam over the HTTP stack. The client only ever issues GETs, so
/// implementations (including test doubles) only provide that. A transport
/// must tolerate concurrently outstanding calls; the client never mutates it.
pub trait HttpTransport {
    fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<HttpResponse, TransportError>>;
}

/// Production transport backed by isahc's shared client.
#[derive(Debug, Default, Clone, Copy)]
pub struct IsahcTransport;

impl HttpTransport for IsahcTransport {
    fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<HttpResponse, TransportError>> {
        Box::pin(async move {
            let mut response = isahc::get_async(url)
                .await
                .map_err(|e| TransportError::Get(Box::new(e)))?;

            let status = response.status().as_u16();
            let body = response.text().await.map_err(TransportError::Read)?;

            Ok(HttpResponse { status, body })
        })
    }
}
