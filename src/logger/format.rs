//! Access log format module
//!
//! Supported formats:
//! - `common` (Common Log Format)
//! - `combined` (CLF plus referer and user agent)
//! - `json` (one JSON object per line)
//! - any other string is treated as a `$variable` pattern

use chrono::{DateTime, Local};
use serde_json::json;

const CLF_TIME: &str = "%d/%b/%Y:%H:%M:%S %z";

/// One served request
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    pub remote_addr: String,
    pub time: DateTime<Local>,
    pub method: String,
    /// Raw request target, query included
    pub uri: String,
    pub http_version: String,
    pub status: u16,
    pub body_bytes: usize,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    pub request_time_us: u64,
}

impl AccessLogEntry {
    /// Create an entry stamped with the current local time
    pub fn new(remote_addr: String, method: String, uri: String) -> Self {
        Self {
            remote_addr,
            time: Local::now(),
            method,
            uri,
            http_version: "1.1".to_string(),
            status: 200,
            body_bytes: 0,
            referer: None,
            user_agent: None,
            request_time_us: 0,
        }
    }

    pub fn format(&self, format: &str) -> String {
        match format {
            "common" => self.format_common(),
            "combined" => format!(
                "{} \"{}\" \"{}\"",
                self.format_common(),
                self.referer.as_deref().unwrap_or("-"),
                self.user_agent.as_deref().unwrap_or("-"),
            ),
            "json" => self.format_json(),
            pattern => self.format_pattern(pattern),
        }
    }

    fn request_line(&self) -> String {
        format!("{} {} HTTP/{}", self.method, self.uri, self.http_version)
    }

    fn format_common(&self) -> String {
        format!(
            "{} - - [{}] \"{}\" {} {}",
            self.remote_addr,
            self.time.format(CLF_TIME),
            self.request_line(),
            self.status,
            self.body_bytes,
        )
    }

    fn format_json(&self) -> String {
        json!({
            "remote_addr": self.remote_addr,
            "time": self.time.to_rfc3339(),
            "method": self.method,
            "uri": self.uri,
            "http_version": self.http_version,
            "status": self.status,
            "body_bytes": self.body_bytes,
            "referer": self.referer,
            "user_agent": self.user_agent,
            "request_time_us": self.request_time_us,
        })
        .to_string()
    }

    /// Substitute `$variables` in a custom pattern
    ///
    /// Variables: `$remote_addr`, `$time_local`, `$time_iso8601`, `$request`,
    /// `$request_method`, `$request_uri`, `$request_time` (seconds), `$status`,
    /// `$body_bytes_sent`, `$http_referer`, `$http_user_agent`.
    fn format_pattern(&self, pattern: &str) -> String {
        #[allow(clippy::cast_precision_loss)]
        let request_time = format!("{:.3}", self.request_time_us as f64 / 1_000_000.0);

        // Longest names first: `$request` is a prefix of three others
        let vars: [(&str, String); 11] = [
            ("$request_method", self.method.clone()),
            ("$request_time", request_time),
            ("$request_uri", self.uri.clone()),
            ("$request", self.request_line()),
            ("$remote_addr", self.remote_addr.clone()),
            ("$time_iso8601", self.time.to_rfc3339()),
            ("$time_local", self.time.format(CLF_TIME).to_string()),
            ("$status", self.status.to_string()),
            ("$body_bytes_sent", self.body_bytes.to_string()),
            ("$http_referer", self.referer.clone().unwrap_or_else(|| "-".into())),
            (
                "$http_user_agent",
                self.user_agent.clone().unwrap_or_else(|| "-".into()),
            ),
        ];

        vars.iter()
            .fold(pattern.to_string(), |acc, (name, value)| acc.replace(name, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> AccessLogEntry {
        let mut entry = AccessLogEntry::new(
            "10.0.0.7".to_string(),
            "GET".to_string(),
            "/app/dashboard?tab=2".to_string(),
        );
        entry.status = 200;
        entry.body_bytes = 512;
        entry.referer = Some("https://example.org/".to_string());
        entry.user_agent = Some("curl/8.0".to_string());
        entry.request_time_us = 2600;
        entry
    }

    #[test]
    fn test_common() {
        let line = entry().format("common");
        assert!(line.starts_with("10.0.0.7 - - ["));
        assert!(line.ends_with("\"GET /app/dashboard?tab=2 HTTP/1.1\" 200 512"));
        assert!(!line.contains("curl"));
    }

    #[test]
    fn test_combined() {
        let line = entry().format("combined");
        assert!(line.ends_with("200 512 \"https://example.org/\" \"curl/8.0\""));
    }

    #[test]
    fn test_json_is_parseable() {
        let line = entry().format("json");
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["status"], 200);
        assert_eq!(value["uri"], "/app/dashboard?tab=2");
        assert_eq!(value["user_agent"], "curl/8.0");
    }

    #[test]
    fn test_json_missing_headers_are_null() {
        let mut e = entry();
        e.referer = None;
        let value: serde_json::Value = serde_json::from_str(&e.format("json")).unwrap();
        assert!(value["referer"].is_null());
    }

    #[test]
    fn test_pattern() {
        let line = entry().format("$request_method $request_uri -> $status in $request_time");
        assert_eq!(line, "GET /app/dashboard?tab=2 -> 200 in 0.003");

        let line = entry().format("[$request]");
        assert_eq!(line, "[GET /app/dashboard?tab=2 HTTP/1.1]");
    }
}
