//! Purpose: Define the closed error taxonomy raised by fetch operations.
//! Exports: `Error`, `ErrorKind`, `to_exit_code`.
//! Role: Single error type shared by the fetcher, transports, and CLI.
//! Invariants: Parsing model payloads never produces an `Error`.
//! Invariants: `ErrorKind` is closed; new failure modes map onto existing kinds.
use std::error::Error as StdError;
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// The model had no usable `url` when the fetch started.
    InvalidUrl,
    /// The response body was not a JSON object.
    Parsing,
    /// The transport reported a failure.
    Http,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidUrl => "InvalidUrl",
            ErrorKind::Parsing => "Parsing",
            ErrorKind::Http => "Http",
        }
    }
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    url: Option<String>,
    status: Option<u16>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            url: None,
            status: None,
            source: None,
        }
    }

    /// Transport failure carrying the collaborator's description verbatim.
    pub fn http(description: impl Into<String>) -> Self {
        Self::new(ErrorKind::Http).with_message(description)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind.as_str())?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(status) = self.status {
            write!(f, " (status: {status})")?;
        }
        if let Some(url) = &self.url {
            write!(f, " (url: {url})")?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

pub fn to_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::InvalidUrl => 2,
        ErrorKind::Parsing => 3,
        ErrorKind::Http => 4,
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, ErrorKind, to_exit_code};
    use std::error::Error as StdError;

    #[test]
    fn exit_code_mapping_is_stable() {
        let cases = [
            (ErrorKind::InvalidUrl, 2),
            (ErrorKind::Parsing, 3),
            (ErrorKind::Http, 4),
        ];

        for (kind, code) in cases {
            assert_eq!(to_exit_code(kind), code);
        }
    }

    #[test]
    fn http_error_passes_description_through() {
        let err = Error::http("connection refused").with_status(503);
        assert_eq!(err.kind(), ErrorKind::Http);
        assert_eq!(err.message(), Some("connection refused"));
        assert_eq!(err.to_string(), "Http: connection refused (status: 503)");
    }

    #[test]
    fn display_includes_url_and_exposes_source() {
        let cause = std::io::Error::other("boom");
        let err = Error::new(ErrorKind::Parsing)
            .with_url("http://localhost/x")
            .with_source(cause);
        assert_eq!(err.to_string(), "Parsing (url: http://localhost/x)");
        assert!(err.source().is_some());
    }
}
