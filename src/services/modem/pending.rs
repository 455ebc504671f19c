use std::{
    fmt,
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use tokio::sync::oneshot;
use tracing::{Instrument, debug, debug_span};

use super::ModemError;

/// One externally visible modem operation in flight.
///
/// The operation runs on its own task and the result is delivered through a
/// one-shot channel, so a `Pending` never resolves inline from the call that
/// created it and resolves exactly once. Dropping it does not cancel the
/// operation.
pub struct Pending<T> {
    rx: oneshot::Receiver<Result<T, ModemError>>,
}

impl<T: Send + 'static> Pending<T> {
    /// Run `operation` on a new task.
    pub(crate) fn spawn<F>(name: &'static str, operation: F) -> Self
    where
        F: Future<Output = Result<T, ModemError>> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let span = debug_span!("modem_operation", operation = name);

        tokio::spawn(
            async move {
                let result = operation.await;
                match &result {
                    Ok(_) => debug!("Operation completed"),
                    Err(err) => debug!(error = %err, "Operation failed"),
                }
                let _ = tx.send(result);
            }
            .instrument(span),
        );

        Self { rx }
    }
}

impl<T> Future for Pending<T> {
    type Output = Result<T, ModemError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(ModemError::Abandoned)))
    }
}

impl<T> fmt::Debug for Pending<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pending").finish_non_exhaustive()
    }
}
