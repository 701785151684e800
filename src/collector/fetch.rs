//! HTTP access to the name server's statistics channel.

use std::time::Duration;

use crate::collector::traits::StatsSource;

/// Error type for statistics fetches.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    /// The HTTP client could not be constructed.
    Client(String),
    /// Connection refused, DNS failure, reset, and similar.
    Request(String),
    /// No complete response within the configured timeout.
    Timeout(Duration),
    /// The server answered with a non-success status.
    Status(u16),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Client(msg) => write!(f, "HTTP client error: {}", msg),
            FetchError::Request(msg) => write!(f, "request failed: {}", msg),
            FetchError::Timeout(t) => write!(f, "timed out after {:?}", t),
            FetchError::Status(code) => write!(f, "unexpected HTTP status {}", code),
        }
    }
}

impl std::error::Error for FetchError {}

/// Builds the statistics channel URL for `host` and `port`.
pub fn statistics_url(host: &str, port: u16) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("http://[{}]:{}", host, port)
    } else {
        format!("http://{}:{}", host, port)
    }
}

/// Fetches the statistics document with a single blocking GET.
///
/// There is no retry: the next poll cycle is the retry.
#[derive(Debug, Clone)]
pub struct HttpSource {
    url: String,
    timeout: Duration,
    client: reqwest::blocking::Client,
}

impl HttpSource {
    /// Creates a source for `http://{host}:{port}`.
    ///
    /// # Arguments
    /// * `host` - Statistics channel address
    /// * `port` - Statistics channel port
    /// * `timeout` - Upper bound for connect plus full body read
    pub fn new(host: &str, port: u16, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("namedstat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            url: statistics_url(host, port),
            timeout,
            client,
        })
    }

    fn classify(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else if let Some(status) = e.status() {
            FetchError::Status(status.as_u16())
        } else {
            FetchError::Request(e.to_string())
        }
    }
}

impl StatsSource for HttpSource {
    fn fetch(&self) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| self.classify(e))?;

        let body = response.bytes().map_err(|e| self.classify(e))?;
        Ok(body.to_vec())
    }

    fn describe(&self) -> &str {
        &self.url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serves exactly one canned HTTP response on a random local port.
    fn serve_once(response: &'static str) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf);
                let _ = stream.write_all(response.as_bytes());
            }
        });
        port
    }

    #[test]
    fn test_statistics_url() {
        assert_eq!(statistics_url("127.0.0.1", 5353), "http://127.0.0.1:5353");
        assert_eq!(statistics_url("::1", 8053), "http://[::1]:8053");
        assert_eq!(statistics_url("[::1]", 8053), "http://[::1]:8053");
    }

    #[test]
    fn test_fetch_body() {
        let port = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 7\r\nConnection: close\r\n\r\n<isc/>\n",
        );
        let source = HttpSource::new("127.0.0.1", port, Duration::from_secs(5)).unwrap();
        assert_eq!(source.fetch().unwrap(), b"<isc/>\n");
    }

    #[test]
    fn test_fetch_http_error_status() {
        let port = serve_once(
            "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        let source = HttpSource::new("127.0.0.1", port, Duration::from_secs(5)).unwrap();
        assert_eq!(source.fetch(), Err(FetchError::Status(404)));
    }

    #[test]
    fn test_fetch_connection_refused() {
        // Bind then drop to get a port nobody listens on.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let source = HttpSource::new("127.0.0.1", port, Duration::from_secs(2)).unwrap();
        assert!(matches!(source.fetch(), Err(FetchError::Request(_))));
    }

    #[test]
    fn test_fetch_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        // Accept and hold the connection without answering.
        let handle = thread::spawn(move || {
            let conn = listener.accept();
            thread::sleep(Duration::from_millis(800));
            drop(conn);
        });

        let source = HttpSource::new("127.0.0.1", port, Duration::from_millis(200)).unwrap();
        assert_eq!(
            source.fetch(),
            Err(FetchError::Timeout(Duration::from_millis(200)))
        );
        let _ = handle.join();
    }
}
