use std::io;

use thiserror::Error as ThisError;

use crate::forwarder::ForwardError;
use crate::frame;

/// Errors reported by the clients shipped with this crate, handed to completion callbacks and
/// passed through the forwarder untouched.
#[derive(Debug, ThisError)]
pub enum Error {
    /// An error reply sent by the server, e.g. `WRONGTYPE ...` or `ERR ...`.
    #[error("{0}")]
    Reply(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Frame(#[from] frame::Error),
    #[error("connection closed")]
    ConnectionClosed,
    #[error("timed out connecting to {0}")]
    Timeout(String),
    /// `EXEC` answered with a null reply because a watched key changed.
    #[error("transaction aborted; a watched key was modified")]
    TransactionAborted,
    #[error("invalid connection url {0:?}")]
    InvalidUrl(String),
    #[error(transparent)]
    Forward(#[from] ForwardError),
}

impl Error {
    pub fn reply(msg: impl Into<String>) -> Error {
        Error::Reply(msg.into())
    }

    /// The server's error message, when this error is an error reply.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Error::Reply(msg) => Some(msg),
            _ => None,
        }
    }
}
