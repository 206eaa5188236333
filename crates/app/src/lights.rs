//! Lights worker: the single consumer of the command queue.
//!
//! The worker is a simple state machine. While there is no session it blocks on the queue
//! waiting for a [`Command::Connect`]. Once a session is open it renders one frame per tick
//! and applies commands between frames. A session ends on [`Command::Quit`], on a new
//! [`Command::Connect`] or on a transmission error; every way out cancels the status
//! reporter, clears the queue and reports [`Status::Disconnected`].

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::JoinHandle,
};

use xmas_touchpad_core::{
    Animations, Argb, Command, LightsConfig, Remote, RemoteSession, Status, TouchpadError,
    TouchpadResult,
};

use crate::{
    queue::{command_queue, CommandReceiver, CommandSender},
    status::StatusReporter,
};

/// Receiver of the human readable connection status.
pub trait StatusSink: Send + Sync + 'static {
    fn update_status(&self, status: &Status);
}

impl<F> StatusSink for F
where
    F: Fn(&Status) + Send + Sync + 'static,
{
    fn update_status(&self, status: &Status) {
        self(status);
    }
}

/// Producer handle of the lights worker.
///
/// Every method just puts a command into the queue, so none of them ever blocks.
#[derive(Debug, Clone)]
pub struct Lights {
    queue: CommandSender,
    connected: Arc<AtomicBool>,
}

impl Lights {
    /// Asks the worker to open a session with the bulb controller on the given host.
    ///
    /// An already active session is closed first.
    pub fn connect(&self, host: impl Into<String>) {
        self.queue.enqueue(Command::Connect { host: host.into() });
    }

    /// Lights the bulb with a solid color.
    pub fn set_color(&self, bulb: u16, color: Argb) {
        self.queue.enqueue(Command::SetColor { bulb, color });
    }

    /// Fades the bulb out.
    pub fn fade(&self, bulb: u16) {
        self.queue.enqueue(Command::Fade { bulb });
    }

    /// Stops the worker.
    pub fn quit(&self) {
        self.queue.enqueue(Command::Quit);
    }

    /// Returns true while the worker has an active session.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Returns a raw command sender, touch mappers use it to submit their commands.
    pub fn sender(&self) -> CommandSender {
        self.queue.clone()
    }
}

/// Handle of the running lights worker thread.
#[derive(Debug)]
pub struct WorkerHandle {
    task: JoinHandle<()>,
}

impl WorkerHandle {
    /// Waits until the worker is finished.
    pub fn join(self) -> std::thread::Result<()> {
        self.task.join()
    }
}

/// Starts the lights worker thread.
///
/// The worker stops after [`Lights::quit`] or when every [`Lights`] handle and command sender
/// has been dropped.
pub fn spawn<R, S>(
    remote: R,
    status: S,
    config: LightsConfig,
) -> TouchpadResult<(Lights, WorkerHandle)>
where
    R: Remote,
    S: StatusSink,
{
    let (queue, commands) = command_queue();
    let connected = Arc::new(AtomicBool::new(false));

    let worker = Worker {
        bulbs: BulbState::new(config.bulb_count),
        remote,
        status: Arc::new(status),
        config,
        commands,
        connected: connected.clone(),
    };
    let task = std::thread::Builder::new()
        .name("lights".to_owned())
        .spawn(move || worker.run())
        .map_err(TouchpadError::Spawn)?;

    Ok((Lights { queue, connected }, WorkerHandle { task }))
}

/// Last committed color of every bulb.
#[derive(Debug)]
struct BulbState {
    colors: Vec<Argb>,
}

impl BulbState {
    fn new(bulb_count: u16) -> Self {
        Self {
            colors: vec![Argb::default(); usize::from(bulb_count)],
        }
    }

    fn reset(&mut self) {
        self.colors.fill(Argb::default());
    }

    fn get(&self, bulb: u16) -> Option<Argb> {
        self.colors.get(usize::from(bulb)).copied()
    }

    fn commit(&mut self, bulb: u16, color: Argb) -> bool {
        if let Some(slot) = self.colors.get_mut(usize::from(bulb)) {
            *slot = color;
            true
        } else {
            false
        }
    }
}

/// The reason a session has ended.
#[derive(Debug)]
enum SessionEnd {
    Quit,
    Reconnect(String),
    Failed(TouchpadError),
}

struct Worker<R, S> {
    remote: R,
    status: Arc<S>,
    config: LightsConfig,
    commands: CommandReceiver,
    connected: Arc<AtomicBool>,
    bulbs: BulbState,
}

impl<R, S> Worker<R, S>
where
    R: Remote,
    S: StatusSink,
{
    fn run(mut self) {
        log::info!("Lights worker started");

        let mut pending_host = None;
        loop {
            let host = match pending_host.take() {
                Some(host) => host,
                None => match self.commands.dequeue() {
                    Command::Connect { host } => host,
                    Command::Quit => break,
                    other => {
                        log::debug!("No active session, discarding {other:?}");
                        continue;
                    }
                },
            };

            self.report(&Status::Connecting { host: host.clone() });
            let session = match self.remote.open(&self.config.service_name, &host) {
                Ok(session) => session,
                Err(err) => {
                    log::warn!("Unable to connect to {host}: {err}");
                    self.report(&Status::Disconnected);
                    continue;
                }
            };

            match self.run_session(session, &host) {
                SessionEnd::Quit => break,
                SessionEnd::Reconnect(host) => pending_host = Some(host),
                SessionEnd::Failed(err) => log::warn!("Session with {host} failed: {err}"),
            }
        }

        log::info!("Lights worker stopped");
    }

    fn run_session(&mut self, mut session: R::Session, host: &str) -> SessionEnd {
        log::info!("Connected to {host}");

        let reporter =
            match StatusReporter::start(host, self.status.clone(), self.config.status_period) {
                Ok(reporter) => reporter,
                Err(err) => {
                    self.finish_session(host);
                    return SessionEnd::Failed(err);
                }
            };

        self.bulbs.reset();
        let mut animations = Animations::new();
        self.connected.store(true, Ordering::Release);

        let end = self.render_loop(&mut session, &mut animations);

        reporter.cancel();
        self.finish_session(host);
        end
    }

    fn finish_session(&mut self, host: &str) {
        let discarded = self.commands.clear();
        if discarded > 0 {
            log::debug!("Discarded {discarded} commands of the finished session");
        }
        self.connected.store(false, Ordering::Release);
        self.report(&Status::Disconnected);

        log::info!("Disconnected from {host}");
    }

    fn render_loop(&mut self, session: &mut R::Session, animations: &mut Animations) -> SessionEnd {
        loop {
            let frame = animations.render();
            log::trace!("Rendering frame with {} bulbs", frame.len());
            if let Err(err) = session.send_frame(&frame) {
                return SessionEnd::Failed(err);
            }

            // Apply everything that is already queued, so that a frame never shows a color
            // which has been overwritten before it.
            let mut next = self.commands.dequeue_timeout(self.config.poll_timeout);
            while let Some(command) = next {
                if let Some(end) = self.apply(command, animations) {
                    return end;
                }
                next = self.commands.try_dequeue();
            }
        }
    }

    fn apply(&mut self, command: Command, animations: &mut Animations) -> Option<SessionEnd> {
        match command {
            Command::Connect { host } => return Some(SessionEnd::Reconnect(host)),
            Command::Quit => return Some(SessionEnd::Quit),

            Command::SetColor { bulb, color } => {
                if self.bulbs.commit(bulb, color) {
                    log::debug!("Set bulb {bulb} color to {color:?}");
                    animations.solid(bulb, color.into());
                } else {
                    log::warn!("Bulb index {bulb} is out of range");
                }
            }

            Command::Fade { bulb } => {
                if let Some(color) = self.bulbs.get(bulb) {
                    log::debug!("Fade bulb {bulb} from {color:?}");
                    animations.fade(bulb, color.into(), self.config.fade_steps);
                } else {
                    log::warn!("Bulb index {bulb} is out of range");
                }
            }
        }
        None
    }

    fn report(&self, status: &Status) {
        log::trace!("Status: {status}");
        self.status.update_status(status);
    }
}
