use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;

/// Emits only the latest pushed value once no new value has arrived for
/// `delay`. Every push restarts the timer.
///
/// Dropping the debouncer aborts its timer task; a pending value is discarded.
pub struct Debouncer<T> {
    input: mpsc::UnboundedSender<T>,
    task: JoinHandle<()>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Must be called inside a tokio runtime.
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (input, mut rx) = mpsc::unbounded_channel::<T>();
        let (out, output) = mpsc::unbounded_channel::<T>();

        let task = tokio::spawn(async move {
            while let Some(mut latest) = rx.recv().await {
                loop {
                    tokio::select! {
                        next = rx.recv() => match next {
                            Some(value) => {
                                trace!("Debounce timer reset");
                                latest = value;
                            }
                            None => return,
                        },
                        () = tokio::time::sleep(delay) => break,
                    }
                }
                if out.send(latest).is_err() {
                    return;
                }
            }
        });

        (Self { input, task }, output)
    }

    pub fn push(&self, value: T) {
        // Only fails once the task is gone, i.e. after teardown
        let _ = self.input.send(value);
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}
