//! Logging trait for backend traffic.
//!
//! This module provides the [`ClientLogger`] trait that allows callers to
//! capture every exchange passing through the [`Backend`](crate::Backend).

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

use serde_json::{Value, json};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::Result;
use crate::{AnalysisBundle, ChatReply, Error};

/// A trait for logging backend operations.
///
/// # Example
///
/// ```rust,ignore
/// use thinkchat::{AnalysisBundle, ChatReply, ClientLogger, Error};
/// use std::io::Write;
/// use std::sync::Mutex;
///
/// struct FileLogger {
///     file: Mutex<std::fs::File>,
/// }
///
/// impl ClientLogger for FileLogger {
///     fn log_request(&self, endpoint: &str, body: Option<&str>) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "-> {endpoint} {}", body.unwrap_or("")).unwrap();
///     }
///
///     fn log_reply(&self, reply: &ChatReply) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "<- {}", serde_json::to_string(reply).unwrap()).unwrap();
///     }
///
///     fn log_content(&self, bundle: &AnalysisBundle) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "<- {}", serde_json::to_string(bundle).unwrap()).unwrap();
///     }
///
///     fn log_error(&self, endpoint: &str, error: &Error) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "!! {endpoint}: {error}").unwrap();
///     }
/// }
/// ```
pub trait ClientLogger: Send + Sync {
    /// Log an outgoing request.  `body` is the JSON body, if the request has one.
    fn log_request(&self, endpoint: &str, body: Option<&str>);

    /// Log a successful chat reply.
    fn log_reply(&self, reply: &ChatReply);

    /// Log fetched analysis content.
    fn log_content(&self, bundle: &AnalysisBundle);

    /// Log a failed request.
    fn log_error(&self, endpoint: &str, error: &Error);
}

/// A [`ClientLogger`] that appends one JSON object per event to a file.
pub struct JsonLinesLogger {
    file: Mutex<BufWriter<File>>,
}

impl JsonLinesLogger {
    /// Opens `path` for appending, creating it if needed.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())
            .map_err(|err| Error::io("failed to open log file", err))?;
        Ok(Self {
            file: Mutex::new(BufWriter::new(file)),
        })
    }

    fn write(&self, kind: &str, fields: Value) {
        let at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default();
        let mut entry = json!({ "at": at, "kind": kind });
        if let (Value::Object(entry), Value::Object(fields)) = (&mut entry, fields) {
            entry.extend(fields);
        }
        // A poisoned lock or a failed write only loses a log line.
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{entry}");
            let _ = file.flush();
        }
    }
}

impl ClientLogger for JsonLinesLogger {
    fn log_request(&self, endpoint: &str, body: Option<&str>) {
        self.write("request", json!({ "endpoint": endpoint, "body": body }));
    }

    fn log_reply(&self, reply: &ChatReply) {
        self.write("reply", json!({ "reply": reply }));
    }

    fn log_content(&self, bundle: &AnalysisBundle) {
        self.write("content", json!({ "content": bundle }));
    }

    fn log_error(&self, endpoint: &str, error: &Error) {
        self.write(
            "error",
            json!({ "endpoint": endpoint, "error": error.to_string() }),
        );
    }
}
