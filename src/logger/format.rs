//! Access log format module
//!
//! Supports:
//! - `common` (Common Log Format - CLF)
//! - `combined` (CLF plus referer and user agent)
//! - `json` (one JSON object per line)
//!
//! Unknown format names fall back to `common`.

use chrono::{DateTime, Local};
use hyper::{Request, Response};
use std::net::SocketAddr;
use std::time::Duration;

/// Access log entry for one request/response cycle
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    pub remote_addr: String,
    pub time: DateTime<Local>,
    pub method: String,
    /// Path and query as requested
    pub url: String,
    /// e.g. `HTTP/1.1`
    pub http_version: String,
    pub status: u16,
    /// Declared body size; unknown for compressed streams
    pub body_bytes: Option<u64>,
    pub content_encoding: Option<String>,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    pub request_time_us: u64,
}

impl AccessLogEntry {
    /// Create a new access log entry with current timestamp
    pub fn new(remote_addr: SocketAddr, method: &str, url: String) -> Self {
        Self {
            remote_addr: remote_addr.ip().to_string(),
            time: Local::now(),
            method: method.to_string(),
            url,
            http_version: "HTTP/1.1".to_string(),
            status: 200,
            body_bytes: None,
            content_encoding: None,
            referer: None,
            user_agent: None,
            request_time_us: 0,
        }
    }

    /// Fill in the fields known once the response has been built
    pub fn complete<B, R>(&mut self, req: &Request<B>, resp: &Response<R>, elapsed: Duration) {
        let request_header = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string)
        };
        let response_header = |name: &str| {
            resp.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string)
        };

        self.http_version = format!("{:?}", req.version());
        self.status = resp.status().as_u16();
        self.body_bytes = response_header("content-length").and_then(|v| v.parse().ok());
        self.content_encoding = response_header("content-encoding");
        self.referer = request_header("referer");
        self.user_agent = request_header("user-agent");
        self.request_time_us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
    }

    /// Format the log entry according to the specified format
    pub fn format(&self, format: &str) -> String {
        match format {
            "combined" => self.format_combined(),
            "json" => self.format_json(),
            _ => self.format_common(),
        }
    }

    /// `$remote_addr - - [$time_local] "$request" $status $body_bytes_sent`
    fn format_common(&self) -> String {
        format!(
            "{} - - [{}] \"{} {} {}\" {} {}",
            self.remote_addr,
            self.time.format("%d/%b/%Y:%H:%M:%S %z"),
            self.method,
            self.url,
            self.http_version,
            self.status,
            self.body_bytes
                .map_or_else(|| "-".to_string(), |n| n.to_string()),
        )
    }

    /// Common format followed by `"$http_referer" "$http_user_agent"`
    fn format_combined(&self) -> String {
        format!(
            "{} \"{}\" \"{}\"",
            self.format_common(),
            self.referer.as_deref().unwrap_or("-"),
            self.user_agent.as_deref().unwrap_or("-"),
        )
    }

    fn format_json(&self) -> String {
        serde_json::json!({
            "remote_addr": self.remote_addr,
            "time": self.time.to_rfc3339(),
            "method": self.method,
            "url": self.url,
            "http_version": self.http_version,
            "status": self.status,
            "body_bytes": self.body_bytes,
            "content_encoding": self.content_encoding,
            "referer": self.referer,
            "user_agent": self.user_agent,
            "request_time_us": self.request_time_us,
        })
        .to_string()
    }
}
