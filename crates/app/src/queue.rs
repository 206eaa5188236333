//! Unbounded command queue between the touch producers and the lights worker.

use std::{
    sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError},
    time::Duration,
};

use xmas_touchpad_core::Command;

/// Creates a new unbounded multi-producer single-consumer command queue.
pub fn command_queue() -> (CommandSender, CommandReceiver) {
    let (tx, rx) = mpsc::channel();
    (CommandSender { tx }, CommandReceiver { rx })
}

/// Producer side of the command queue.
#[derive(Debug, Clone)]
pub struct CommandSender {
    tx: Sender<Command>,
}

impl CommandSender {
    /// Puts the command at the end of the queue.
    ///
    /// Never blocks. If the consumer has gone the command is dropped.
    pub fn enqueue(&self, command: Command) {
        if let Err(err) = self.tx.send(command) {
            log::warn!("Lights worker is not running, dropped {:?}", err.0);
        }
    }
}

/// Consumer side of the command queue.
///
/// Once every [`CommandSender`] has been dropped the queue yields [`Command::Quit`].
#[derive(Debug)]
pub struct CommandReceiver {
    rx: Receiver<Command>,
}

impl CommandReceiver {
    /// Blocks until the next command is available.
    pub fn dequeue(&self) -> Command {
        self.rx.recv().unwrap_or(Command::Quit)
    }

    /// Waits up to `timeout` for the next command.
    ///
    /// Returns `None` if nothing has been enqueued in time.
    pub fn dequeue_timeout(&self, timeout: Duration) -> Option<Command> {
        match self.rx.recv_timeout(timeout) {
            Ok(command) => Some(command),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Command::Quit),
        }
    }

    /// Returns the next command if one is already queued.
    pub fn try_dequeue(&self) -> Option<Command> {
        match self.rx.try_recv() {
            Ok(command) => Some(command),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Command::Quit),
        }
    }

    /// Discards every queued command and returns how many of them were dropped.
    pub fn clear(&self) -> usize {
        self.rx.try_iter().count()
    }
}

#[cfg(test)]
mod tests {
    use xmas_touchpad_core::Argb;

    use super::*;

    #[test]
    fn test_fifo_order() {
        let (tx, rx) = command_queue();
        tx.enqueue(Command::Connect {
            host: "localhost".to_owned(),
        });
        tx.enqueue(Command::SetColor {
            bulb: 1,
            color: Argb::RED,
        });
        tx.enqueue(Command::Fade { bulb: 1 });

        assert!(matches!(rx.dequeue(), Command::Connect { .. }));
        assert!(matches!(rx.try_dequeue(), Some(Command::SetColor { bulb: 1, .. })));
        assert_eq!(
            rx.dequeue_timeout(Duration::from_millis(10)),
            Some(Command::Fade { bulb: 1 })
        );
        assert_eq!(rx.try_dequeue(), None);
    }

    #[test]
    fn test_dequeue_timeout_returns_none() {
        let (_tx, rx) = command_queue();
        assert_eq!(rx.dequeue_timeout(Duration::from_millis(5)), None);
    }

    #[test]
    fn test_clear_discards_everything() {
        let (tx, rx) = command_queue();
        for bulb in 0..10 {
            tx.enqueue(Command::Fade { bulb });
        }

        assert_eq!(rx.clear(), 10);
        assert_eq!(rx.try_dequeue(), None);
        assert_eq!(rx.clear(), 0);
    }

    #[test]
    fn test_closed_queue_yields_quit() {
        let (tx, rx) = command_queue();
        tx.enqueue(Command::Fade { bulb: 3 });
        drop(tx);

        assert_eq!(rx.dequeue(), Command::Fade { bulb: 3 });
        assert_eq!(rx.dequeue(), Command::Quit);
        assert_eq!(rx.dequeue_timeout(Duration::from_millis(5)), Some(Command::Quit));
        assert_eq!(rx.clear(), 0);
    }

    #[test]
    fn test_enqueue_without_consumer_does_not_panic() {
        let (tx, rx) = command_queue();
        drop(rx);
        tx.enqueue(Command::Quit);
    }
}
