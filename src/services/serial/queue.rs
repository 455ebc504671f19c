use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::Duration,
};

use tokio::sync::oneshot;

use super::TransportError;

/// Reply grammar a port's channel is parsed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseGrammar {
    /// Line-oriented verbose result codes (`OK`, `ERROR`, `+CME ERROR: n`, ...)
    #[default]
    V1,
}

/// Line settings applied when a port is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortSettings {
    /// Honor the carrier-detect line (no `CLOCAL`). Serial devices refuse to open with it set.
    pub carrier_detect: bool,
    /// Line speed of serial devices
    pub baud_rate: u32,
    /// Grammar used to find the end of each reply
    pub grammar: ResponseGrammar,
}

impl Default for PortSettings {
    fn default() -> Self {
        Self {
            carrier_detect: false,
            baud_rate: 115_200,
            grammar: ResponseGrammar::V1,
        }
    }
}

/// Command execution against a modem's ports.
///
/// Commands on one port run strictly one at a time in enqueue order; ports
/// are independent of each other. Enqueuing never blocks: the returned
/// handle resolves exactly once with the raw reply or a transport error.
pub trait CommandQueue: Send + Sync + 'static {
    /// Open a port so commands can be queued on it.
    ///
    /// Opening an already open port succeeds without side effects.
    ///
    /// # Errors
    /// Returns `TransportError::OpenFailed` if the channel cannot be opened
    fn open(&self, port: &str, settings: &PortSettings) -> Result<(), TransportError>;

    /// Close a port. Queued and in-flight commands resolve with `TransportError::Closed`.
    fn close(&self, port: &str);

    /// Whether the port is currently open.
    fn is_open(&self, port: &str) -> bool;

    /// Queue `command` (without the `AT` prefix) on `port`.
    fn queue(&self, port: &str, command: &str, timeout: Duration) -> Reply;

    /// Queue `command`, answering from the port's reply cache when possible.
    ///
    /// Successful replies are remembered until the port is closed.
    fn queue_cached(&self, port: &str, command: &str, timeout: Duration) -> Reply;

    /// Toggle the port's line state for `duration` after all queued commands ran.
    fn flash(&self, port: &str, duration: Duration) -> FlashDone;
}

/// Raw reply to a queued command.
pub type Reply = Queued<String>;

/// Completion of a queued flash.
pub type FlashDone = Queued<()>;

/// Handle to a queued transport job.
///
/// Resolves with `TransportError::Closed` if the job is dropped unanswered.
#[derive(Debug)]
pub struct Queued<T> {
    port: String,
    rx: oneshot::Receiver<Result<T, TransportError>>,
}

/// Answering side of a [`Queued`] handle.
#[derive(Debug)]
pub struct Responder<T> {
    tx: oneshot::Sender<Result<T, TransportError>>,
}

/// Create a connected responder/handle pair for a job on `port`.
pub fn queued<T>(port: &str) -> (Responder<T>, Queued<T>) {
    let (tx, rx) = oneshot::channel();
    (
        Responder { tx },
        Queued {
            port: port.to_owned(),
            rx,
        },
    )
}

impl<T> Queued<T> {
    /// A handle that is already answered.
    pub fn ready(port: &str, result: Result<T, TransportError>) -> Self {
        let (responder, handle) = queued(port);
        responder.respond(result);
        handle
    }
}

impl<T> Responder<T> {
    /// Answer the job. A dropped handle is not an error.
    pub fn respond(self, result: Result<T, TransportError>) {
        let _ = self.tx.send(result);
    }
}

impl<T> Future for Queued<T> {
    type Output = Result<T, TransportError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => Poll::Ready(Err(TransportError::Closed(self.port.clone()))),
            Poll::Pending => Poll::Pending,
        }
    }
}
