//! Single-attempt HTTP transport.
//!
//! [`CurlTransport`] performs exactly one request on a fresh libcurl easy
//! handle with the configured timeouts. It never retries; that is the job of
//! the retry loop in [`crate::retry`].

use curl::easy::{Easy, InfoType, List};
use std::cell::Cell;
use std::os::raw::c_uint;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// One outbound request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    /// JSON body for POST.
    pub body: Option<Vec<u8>>,
}

/// Status and raw body of a completed exchange, whatever the status.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs one HTTP exchange. Implementations must be safe to share
/// between threads; the client calls them from whatever thread runs the
/// logical call.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, curl::Error>;
}

/// Connect, write and read timeouts for a single attempt.
///
/// `connect_timeout` bounds TCP (and TLS) setup. After that the request is
/// written and the response read; a gap longer than `write_timeout` between
/// outbound bytes, or longer than `read_timeout` between the end of the
/// request and the next inbound bytes, fails the attempt as a timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportConfig {
    pub connect_timeout: Duration,
    pub write_timeout: Duration,
    pub read_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_millis(500),
            write_timeout: Duration::from_millis(500),
            read_timeout: Duration::from_millis(500),
        }
    }
}

// libcurl error codes reported for failures detected on our side.
const CURLE_WEIRD_SERVER_REPLY: c_uint = 8;
const CURLE_OPERATION_TIMEDOUT: c_uint = 28;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Writing,
    Reading,
}

/// Watches byte movement of one attempt and remembers the first gap that
/// exceeded the timeout of the phase it happened in.
///
/// Fed from libcurl's debug callback (bytes on the wire) and polled from the
/// progress callback (silence). Nothing is checked until the request head
/// goes out; before that the connect timeout applies.
#[derive(Debug)]
struct StallWatch {
    write_timeout: Duration,
    read_timeout: Duration,
    body_len: usize,
    body_written: Cell<usize>,
    phase: Cell<Option<Phase>>,
    last_activity: Cell<Option<Instant>>,
    stalled: Cell<Option<Phase>>,
}

impl StallWatch {
    fn new(config: &TransportConfig, body_len: usize) -> Self {
        Self {
            write_timeout: config.write_timeout,
            read_timeout: config.read_timeout,
            body_len,
            body_written: Cell::new(0),
            phase: Cell::new(None),
            last_activity: Cell::new(None),
            stalled: Cell::new(None),
        }
    }

    fn limit(&self, phase: Phase) -> Duration {
        match phase {
            Phase::Writing => self.write_timeout,
            Phase::Reading => self.read_timeout,
        }
    }

    /// Returns false once a stall has been seen (the transfer should abort).
    fn check(&self, now: Instant) -> bool {
        if self.stalled.get().is_some() {
            return false;
        }
        if let (Some(phase), Some(last)) = (self.phase.get(), self.last_activity.get()) {
            if now.saturating_duration_since(last) > self.limit(phase) {
                self.stalled.set(Some(phase));
                return false;
            }
        }
        true
    }

    fn record(&self, now: Instant, next: Phase) {
        // Bytes that arrive late still mean the silence before them was too long.
        self.check(now);
        self.last_activity.set(Some(now));
        self.phase.set(Some(next));
    }

    fn after_write(&self) -> Phase {
        if self.body_written.get() >= self.body_len {
            Phase::Reading
        } else {
            Phase::Writing
        }
    }

    fn head_sent(&self, now: Instant) {
        self.record(now, self.after_write());
    }

    fn body_sent(&self, bytes: usize, now: Instant) {
        self.body_written.set(self.body_written.get() + bytes);
        self.record(now, self.after_write());
    }

    fn received(&self, now: Instant) {
        self.record(now, Phase::Reading);
    }

    fn stalled(&self) -> Option<Phase> {
        self.stalled.get()
    }
}

/// Blocking libcurl transport.
#[derive(Debug, Clone, Default)]
pub struct CurlTransport {
    config: TransportConfig,
}

impl CurlTransport {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }
}

impl Transport for CurlTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, curl::Error> {
        let mut easy = Easy::new();
        easy.url(&request.url)?;
        easy.connect_timeout(self.config.connect_timeout)?;
        // No signals: timeouts must work from any thread.
        easy.signal(false)?;
        // Debug and progress callbacks drive the write/read timeouts.
        easy.verbose(true)?;
        easy.progress(true)?;

        let mut headers = List::new();
        headers.append("Accept: application/json")?;
        match request.method {
            Method::Get => easy.get(true)?,
            Method::Post => {
                headers.append("Content-Type: application/json; charset=UTF-8")?;
                easy.post(true)?;
                easy.post_fields_copy(request.body.as_deref().unwrap_or_default())?;
            }
        }
        easy.http_headers(headers)?;

        let watch = StallWatch::new(&self.config, request.body.as_ref().map_or(0, Vec::len));
        let mut body = Vec::new();
        let performed = {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.debug_function(|kind, data| {
                let now = Instant::now();
                match kind {
                    InfoType::HeaderOut => watch.head_sent(now),
                    InfoType::DataOut => watch.body_sent(data.len(), now),
                    InfoType::HeaderIn | InfoType::DataIn => watch.received(now),
                    _ => {}
                }
            })?;
            transfer.progress_function(|_, _, _, _| watch.check(Instant::now()))?;
            transfer.perform()
        };

        if let Some(phase) = watch.stalled() {
            tracing::debug!(url = %request.url, ?phase, "upstream stalled");
            return Err(curl::Error::new(CURLE_OPERATION_TIMEDOUT));
        }
        performed?;

        let status = match u16::try_from(easy.response_code()?) {
            Ok(status) if status >= 100 => status,
            _ => return Err(curl::Error::new(CURLE_WEIRD_SERVER_REPLY)),
        };
        Ok(HttpResponse { status, body })
    }
}
