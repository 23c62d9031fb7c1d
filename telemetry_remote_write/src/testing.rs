//! A scripted http transport for exercising `WriteClient` without a network.

use async_trait::async_trait;
use futures::io::{AsyncBufRead, AsyncRead, Cursor};
use http_client::{Error, HttpClient, Request, Response};
use parking_lot::Mutex;
use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use surf::http::auth::BasicAuth;
use surf::http::{Body, StatusCode};

/// A request as the stub transport received it
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub basic_auth: Option<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    /// All values of the header `name` (case insensitive)
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
            .collect()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.header_values(name).into_iter().next()
    }
}

#[derive(Clone, Debug)]
enum Reply {
    Respond { status: StatusCode, body: Vec<u8> },
    Hang,
}

#[derive(Debug)]
struct Inner {
    reply: Reply,
    requests: Mutex<Vec<RecordedRequest>>,
    consumed: Arc<AtomicUsize>,
}

/// Answers every request with the same reply and records what it was sent.
///
/// Cloning shares the recorded requests.
#[derive(Clone, Debug)]
pub struct StubTransport {
    inner: Arc<Inner>,
}

impl StubTransport {
    pub fn respond(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self::with_reply(Reply::Respond {
            status,
            body: body.into(),
        })
    }

    /// A transport that accepts requests but never answers
    pub fn hang() -> Self {
        Self::with_reply(Reply::Hang)
    }

    fn with_reply(reply: Reply) -> Self {
        StubTransport {
            inner: Arc::new(Inner {
                reply,
                requests: Mutex::new(Vec::new()),
                consumed: Arc::new(AtomicUsize::new(0)),
            }),
        }
    }

    /// A surf client which sends through this transport
    pub fn client(&self) -> surf::Client {
        surf::Client::with_http_client(self.clone())
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.inner.requests.lock().clone()
    }

    pub fn calls(&self) -> usize {
        self.inner.requests.lock().len()
    }

    /// How many response body bytes the caller has read so far
    pub fn body_bytes_consumed(&self) -> usize {
        self.inner.consumed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpClient for StubTransport {
    async fn send(&self, mut req: Request) -> Result<Response, Error> {
        let headers = req
            .iter()
            .flat_map(|(name, values)| {
                values
                    .iter()
                    .map(move |value| (name.as_str().to_owned(), value.as_str().to_owned()))
            })
            .collect();
        let basic_auth = BasicAuth::from_headers(&req)?
            .map(|auth| (auth.username().to_owned(), auth.password().to_owned()));
        let body = req.body_bytes().await?;
        self.inner.requests.lock().push(RecordedRequest {
            method: req.method().to_string(),
            url: req.url().to_string(),
            headers,
            basic_auth,
            body,
        });

        match &self.inner.reply {
            Reply::Respond { status, body } => {
                let reader = CountingReader {
                    inner: Cursor::new(body.clone()),
                    consumed: Arc::clone(&self.inner.consumed),
                };
                let mut res = Response::new(*status);
                res.set_body(Body::from_reader(reader, Some(body.len())));
                Ok(res)
            }
            Reply::Hang => futures::future::pending().await,
        }
    }
}

/// Tracks how much of a response body was read
struct CountingReader {
    inner: Cursor<Vec<u8>>,
    consumed: Arc<AtomicUsize>,
}

impl AsyncRead for CountingReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut [u8],
    ) -> Poll<io::Result<usize>> {
        let poll = Pin::new(&mut self.inner).poll_read(cx, buf);
        if let Poll::Ready(Ok(n)) = &poll {
            self.consumed.fetch_add(*n, Ordering::SeqCst);
        }
        poll
    }
}

impl AsyncBufRead for CountingReader {
    fn poll_fill_buf(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<&[u8]>> {
        Pin::new(&mut self.get_mut().inner).poll_fill_buf(cx)
    }

    fn consume(mut self: Pin<&mut Self>, amt: usize) {
        self.consumed.fetch_add(amt, Ordering::SeqCst);
        Pin::new(&mut self.inner).consume(amt)
    }
}
