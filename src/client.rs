use bytes::Bytes;

use crate::batch::{BatchMode, QueuedCommand};
use crate::forwarder::ForwardError;
use crate::frame::Frame;

/// Completion handler passed to a [`Client`]. It is invoked at most once, with the reply or
/// with the error that prevented one.
pub type Callback<T, E> = Box<dyn FnOnce(Result<T, E>) + Send + 'static>;

/// Aggregate result of a batch: one entry per queued command, in queue order.
pub type BatchReplies<E> = Vec<Result<Frame, E>>;

/// A callback-style store client, the collaborator the [`Forwarder`](crate::Forwarder)
/// wraps.
///
/// Every operation takes its completion callback by value and returns immediately. Returning
/// `Err` means the client refused the call synchronously; the callback must then be dropped
/// without being invoked.
pub trait Client: Send + Sync + 'static {
    type Error: std::error::Error + From<ForwardError> + Send + 'static;

    /// Sends command `name` with `args` and reports its reply through `callback`.
    fn send_command(
        &self,
        name: &str,
        args: Vec<Bytes>,
        callback: Callback<Frame, Self::Error>,
    ) -> Result<(), Self::Error>;

    /// Submits `commands` together and reports the per-command results through a single
    /// callback.
    fn exec_batch(
        &self,
        commands: Vec<QueuedCommand>,
        mode: BatchMode,
        callback: Callback<BatchReplies<Self::Error>, Self::Error>,
    ) -> Result<(), Self::Error>;

    /// Closes the connection gracefully, after every request sent before it was answered.
    fn quit(&self, callback: Callback<Frame, Self::Error>) -> Result<(), Self::Error>;

    /// Closes the connection immediately. In-flight requests fail.
    fn end(&self);
}
