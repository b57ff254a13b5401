use bytes::Bytes;

use crate::args::ToArgs;
use crate::commands::Commands;

/// How a [`Batch`] is submitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchMode {
    /// Commands are written back to back and run independently.
    Pipeline,
    /// Commands are wrapped in `MULTI` / `EXEC` and run atomically.
    Transaction,
}

#[derive(Clone, Debug, PartialEq)]
pub struct QueuedCommand {
    pub name: String,
    pub args: Vec<Bytes>,
}

/// Queue of commands submitted together through [`Forwarder::exec`](crate::Forwarder::exec).
///
/// Every [`Commands`] method called on a `&mut Batch` queues the command and hands the batch
/// back, so calls chain:
///
/// ```
/// use rustdis_async::{Batch, Commands};
///
/// let mut batch = Batch::pipeline();
/// batch.set("counter", 1, ()).incr("counter").get("counter");
///
/// assert_eq!(batch.len(), 3);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Batch {
    mode: BatchMode,
    queued: Vec<QueuedCommand>,
}

impl Batch {
    pub fn new(mode: BatchMode) -> Batch {
        Batch {
            mode,
            queued: Vec::new(),
        }
    }

    pub fn pipeline() -> Batch {
        Batch::new(BatchMode::Pipeline)
    }

    pub fn transaction() -> Batch {
        Batch::new(BatchMode::Transaction)
    }

    pub fn mode(&self) -> BatchMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.queued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queued.is_empty()
    }

    pub fn commands(&self) -> &[QueuedCommand] {
        &self.queued
    }

    /// Queues a command by name, e.g. one missing from the generated command table.
    pub fn call(&mut self, name: &str, args: impl ToArgs) -> &mut Batch {
        self.dispatch(name, args.to_args())
    }

    pub fn into_parts(self) -> (BatchMode, Vec<QueuedCommand>) {
        (self.mode, self.queued)
    }
}

impl<'a> Commands for &'a mut Batch {
    type Output = &'a mut Batch;

    fn dispatch(self, name: &str, args: Vec<Bytes>) -> Self::Output {
        self.queued.push(QueuedCommand {
            name: name.to_string(),
            args,
        });
        self
    }
}
