//! Periodic "Connected" status reporting.

use std::{
    sync::{
        mpsc::{self, RecvTimeoutError, Sender},
        Arc,
    },
    thread::{Builder, JoinHandle},
    time::Duration,
};

use xmas_touchpad_core::{Status, TouchpadError, TouchpadResult};

use crate::StatusSink;

/// A running status reporter of the active session.
///
/// It must be cancelled explicitly with [`StatusReporter::cancel`] when the session ends.
pub(crate) struct StatusReporter {
    cancel: Sender<()>,
    task: JoinHandle<()>,
}

impl StatusReporter {
    /// Starts reporting the connection duration, the first report is sent immediately.
    pub fn start<S: StatusSink>(
        host: &str,
        sink: Arc<S>,
        period: Duration,
    ) -> TouchpadResult<Self> {
        Self::start_on(Builder::new(), host, sink, period)
    }

    fn start_on<S: StatusSink>(
        builder: Builder,
        host: &str,
        sink: Arc<S>,
        period: Duration,
    ) -> TouchpadResult<Self> {
        let (cancel, cancelled) = mpsc::channel::<()>();

        let host = host.to_owned();
        let task = builder
            .name("lights-status".to_owned())
            .spawn(move || {
                let mut seconds = 0;
                loop {
                    sink.update_status(&Status::Connected {
                        host: host.clone(),
                        seconds,
                    });
                    seconds += 1;

                    match cancelled.recv_timeout(period) {
                        Err(RecvTimeoutError::Timeout) => {}
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            })
            .map_err(TouchpadError::Spawn)?;

        Ok(Self { cancel, task })
    }

    /// Stops reporting and waits until the reporting thread is finished.
    ///
    /// No status update is sent by this reporter after this method returns.
    pub fn cancel(self) {
        drop(self.cancel);
        if self.task.join().is_err() {
            log::error!("Status reporting thread panicked");
        }
    }
}
