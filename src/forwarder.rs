use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use bytes::Bytes;
use futures::future::{self, BoxFuture, FutureExt};
use itertools::Itertools;
use thiserror::Error as ThisError;
use tokio::sync::oneshot;
use tracing::{debug, trace};

use crate::args::ToArgs;
use crate::batch::{Batch, BatchMode};
use crate::client::{BatchReplies, Callback, Client};
use crate::commands::{self, Commands, COMMANDS};
use crate::descriptor::CommandDescriptor;
use crate::frame::Frame;

/// Future returned for every forwarded call. It settles exactly once.
pub type Pending<T, E> = BoxFuture<'static, Result<T, E>>;

/// Conditions detected by the forwarder itself rather than by the wrapped client. They reach
/// callers converted into the client's error type.
#[derive(Debug, ThisError, Clone, PartialEq, Eq)]
pub enum ForwardError {
    #[error("completion callback dropped before it was invoked")]
    Canceled,
    #[error("unknown command {0}")]
    UnknownCommand(String),
}

/// Adapts a callback-style submission into a future.
///
/// `submit` runs immediately, before the returned future is polled. If it fails synchronously
/// the future resolves with that error; if the callback is dropped without being invoked it
/// resolves with [`ForwardError::Canceled`].
pub fn promisify<T, E, F>(submit: F) -> Pending<T, E>
where
    T: Send + 'static,
    E: From<ForwardError> + Send + 'static,
    F: FnOnce(Callback<T, E>) -> Result<(), E>,
{
    let (tx, rx) = oneshot::channel();
    let callback: Callback<T, E> = Box::new(move |result| {
        // The receiver is gone when the caller dropped the future.
        let _ = tx.send(result);
    });

    match submit(callback) {
        Ok(()) => async move {
            match rx.await {
                Ok(result) => result,
                Err(_) => Err(ForwardError::Canceled.into()),
            }
        }
        .boxed(),
        Err(err) => future::ready(Err(err)).boxed(),
    }
}

type Handler<C> = Arc<
    dyn Fn(
            &C,
            Vec<Bytes>,
            Callback<Frame, <C as Client>::Error>,
        ) -> Result<(), <C as Client>::Error>
        + Send
        + Sync,
>;

/// Exposes a callback-style [`Client`] as future-returning command methods.
///
/// Typed methods come from [`Commands`] and forward straight to the client. Commands missing
/// from the generated table can be added at runtime with [`register`](Forwarder::register)
/// and invoked through [`call`](Forwarder::call).
///
/// Cloning is cheap: clones share the client and the dispatch table.
pub struct Forwarder<C: Client> {
    inner: Arc<Inner<C>>,
}

struct Inner<C: Client> {
    client: C,
    // Lower-cased command name to its forwarding function.
    table: RwLock<HashMap<String, Handler<C>>>,
}

impl<C: Client> Clone for Forwarder<C> {
    fn clone(&self) -> Self {
        Forwarder {
            inner: self.inner.clone(),
        }
    }
}

impl<C: Client> Forwarder<C> {
    pub fn new(client: C) -> Forwarder<C> {
        let table = COMMANDS
            .iter()
            .map(|descriptor| {
                (
                    descriptor.name.to_lowercase(),
                    forwarding_handler::<C>(descriptor.name.to_string()),
                )
            })
            .collect();

        Forwarder {
            inner: Arc::new(Inner {
                client,
                table: RwLock::new(table),
            }),
        }
    }

    /// The wrapped client.
    pub fn client(&self) -> &C {
        &self.inner.client
    }

    /// Forwards command `name` with already encoded arguments.
    pub fn forward(&self, name: &str, args: Vec<Bytes>) -> Pending<Frame, C::Error> {
        trace!(command = name, args = %display_args(&args), "forwarding");
        promisify(|callback| self.inner.client.send_command(name, args, callback))
    }

    /// Adds `name` to the dispatch table so [`call`](Forwarder::call) forwards it. Returns
    /// `false` when the name was already present.
    pub fn register(&self, name: &str) -> bool {
        let key = name.to_lowercase();
        let mut table = self.inner.table.write().unwrap();

        if table.contains_key(&key) {
            return false;
        }

        debug!(command = name, "registering command");
        table.insert(key, forwarding_handler::<C>(name.to_string()));
        true
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.inner
            .table
            .read()
            .unwrap()
            .contains_key(&name.to_lowercase())
    }

    /// Names in the dispatch table, lower-cased and sorted.
    pub fn commands(&self) -> Vec<String> {
        self.inner
            .table
            .read()
            .unwrap()
            .keys()
            .cloned()
            .sorted()
            .collect()
    }

    /// Descriptor of a command from the generated table.
    pub fn descriptor(&self, name: &str) -> Option<&'static CommandDescriptor> {
        commands::lookup(name)
    }

    /// Invokes a command through the dispatch table. Names that were neither generated nor
    /// registered resolve with [`ForwardError::UnknownCommand`].
    pub fn call(&self, name: &str, args: impl ToArgs) -> Pending<Frame, C::Error> {
        let handler = self
            .inner
            .table
            .read()
            .unwrap()
            .get(&name.to_lowercase())
            .cloned();

        let Some(handler) = handler else {
            debug!(command = name, "unknown command");
            let err = ForwardError::UnknownCommand(name.to_string());
            return future::ready(Err(err.into())).boxed();
        };

        let args = args.to_args();
        trace!(command = name, args = %display_args(&args), "forwarding registered command");
        promisify(|callback| handler(&self.inner.client, args, callback))
    }

    /// A pipeline queue; submit it with [`exec`](Forwarder::exec).
    pub fn batch(&self) -> Batch {
        Batch::new(BatchMode::Pipeline)
    }

    /// A transaction queue; submit it with [`exec`](Forwarder::exec).
    pub fn multi(&self) -> Batch {
        Batch::new(BatchMode::Transaction)
    }

    /// Submits every queued command with a single callback. Resolves with one result per
    /// queued command, in queue order, using the client's convention for failures inside the
    /// batch.
    pub fn exec(&self, batch: Batch) -> Pending<BatchReplies<C::Error>, C::Error> {
        let (mode, commands) = batch.into_parts();
        debug!(?mode, commands = commands.len(), "executing batch");
        promisify(|callback| self.inner.client.exec_batch(commands, mode, callback))
    }

    /// Closes the client gracefully once earlier requests are answered.
    pub fn quit(&self) -> Pending<Frame, C::Error> {
        promisify(|callback| self.inner.client.quit(callback))
    }

    /// Closes the client immediately.
    pub fn end(&self) {
        self.inner.client.end()
    }
}

impl<'a, C: Client> Commands for &'a Forwarder<C> {
    type Output = Pending<Frame, C::Error>;

    fn dispatch(self, name: &str, args: Vec<Bytes>) -> Self::Output {
        self.forward(name, args)
    }
}

fn forwarding_handler<C: Client>(name: String) -> Handler<C> {
    Arc::new(move |client: &C, args, callback| client.send_command(&name, args, callback))
}

fn display_args(args: &[Bytes]) -> String {
    args.iter()
        .map(|arg| String::from_utf8_lossy(arg))
        .join(" ")
}
