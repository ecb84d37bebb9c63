use std::net::SocketAddr;
use thiserror::Error;

/// Reason recorded when an attempt hits its own deadline.
pub const TIMED_OUT: &str = "i/o timeout";
/// Reason recorded when the invocation is cancelled mid-attempt.
pub const CANCELED: &str = "operation was canceled";

/// Failure of a single resolve+connect attempt.
///
/// Deadline expiry during the connect phase is reported as a `Connect` error
/// with reason `"i/o timeout"`, same kind as a refused or reset handshake.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProbeError {
    #[error("lookup {host}: {reason}")]
    Resolution { host: String, reason: String },

    #[error("dial tcp {addr}: {reason}")]
    Connect { addr: SocketAddr, reason: String },
}

impl ProbeError {
    pub fn resolution<S: Into<String>>(host: &str, reason: S) -> Self {
        ProbeError::Resolution { host: host.to_string(), reason: reason.into() }
    }

    pub fn connect<S: Into<String>>(addr: SocketAddr, reason: S) -> Self {
        ProbeError::Connect { addr, reason: reason.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_keeps_underlying_detail() {
        let err = ProbeError::resolution("a.example.", "no such host");
        assert_eq!(err.to_string(), "lookup a.example.: no such host");
        assert!(matches!(err, ProbeError::Resolution { .. }));

        let addr: SocketAddr = "10.0.0.1:4000".parse().unwrap();
        let err = ProbeError::connect(addr, "i/o timeout");
        assert_eq!(err.to_string(), "dial tcp 10.0.0.1:4000: i/o timeout");
        assert!(matches!(err, ProbeError::Connect { .. }));
    }
}
