use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("peer disconnected")]
    Disconnected,

    #[error("protocol violation: {reason}")]
    Protocol { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl GatewayError {
    pub fn protocol<S: ToString>(str: S) -> Self {
        Self::Protocol { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}
