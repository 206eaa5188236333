use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use xmas_touchpad_app::{
    core::{LightsConfig, Status, BULB_COUNT, DEFAULT_FADE_STEPS},
    spawn, TouchAction, TouchEvent, TouchPad, ViewSize,
};
use xmas_touchpad_network::{Listener, Packet, TcpRemote, CONNECT_TIMEOUT, DEFAULT_PORT};

/// Size of the virtual touch surface.
const VIEW: ViewSize = ViewSize::new(600.0, 1000.0);
/// Interval between the touch events of a gesture.
const TOUCH_INTERVAL: Duration = Duration::from_millis(16);

/// Xmas lights touchpad utility
///
/// A command line application for painting the Christmas tree bulbs from a virtual touch surface
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = false)]
struct Cli {
    /// Bulb controller host, with an optional port
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    /// Number of bulbs in the controller's bulb array
    #[arg(long, default_value_t = BULB_COUNT)]
    bulbs: u16,
    /// Number of frames a released bulb needs to fade out
    #[arg(long = "fade-steps", default_value_t = DEFAULT_FADE_STEPS)]
    fade_steps: u32,
    /// Maximum time the renderer waits for a command between frames
    #[arg(long = "poll-ms", default_value_t = 10, value_name = "MS")]
    poll_ms: u64,
    /// Actual command
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Swipe a single finger from the top to the bottom of the touchpad
    Swipe {
        /// Gesture duration
        #[arg(short, long, default_value_t = 2.0, value_name = "SECONDS")]
        duration: f32,
    },
    /// Run a virtual bulb controller which logs everything it receives
    Listen {
        /// Port to listen on
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },
    /// Generate shell completions
    Completions {
        /// The shell to generate the completions for
        #[arg(value_enum)]
        shell: clap_complete_command::Shell,
    },
}

impl Cli {
    fn lights_config(&self) -> LightsConfig {
        LightsConfig::default()
            .with_bulb_count(self.bulbs)
            .with_fade_steps(self.fade_steps)
            .with_poll_timeout(Duration::from_millis(self.poll_ms))
    }
}

fn swipe(cli: &Cli, duration: Duration) -> anyhow::Result<()> {
    let config = cli.lights_config();
    let fade_time = config.poll_timeout * (config.fade_steps + 1);

    let disconnected = Arc::new(AtomicBool::new(false));
    let sink = {
        let disconnected = disconnected.clone();
        move |status: &Status| {
            log::info!("{status}");
            if *status == Status::Disconnected {
                disconnected.store(true, Ordering::Release);
            }
        }
    };
    let (lights, worker) = spawn(TcpRemote::new(), sink, config)?;

    lights.connect(cli.host.as_str());
    let started = Instant::now();
    while !lights.is_connected() {
        anyhow::ensure!(
            !disconnected.load(Ordering::Acquire) && started.elapsed() < CONNECT_TIMEOUT,
            "Unable to connect to {}",
            cli.host
        );
        std::thread::sleep(TOUCH_INTERVAL);
    }

    let steps = (duration.as_secs_f32() / TOUCH_INTERVAL.as_secs_f32()).ceil().max(1.0);
    log::debug!("Swiping across {} bulbs in {steps} steps", cli.bulbs);

    let mut touchpad = TouchPad::new(lights.sender(), VIEW, cli.bulbs);
    touchpad.handle_event(TouchEvent::new(0, TouchAction::Down, 0.0, 0.0));
    let mut step = 1.0;
    while step <= steps {
        std::thread::sleep(TOUCH_INTERVAL);

        let progress = step / steps;
        let (x, y) = (VIEW.width * progress, VIEW.height * progress);
        touchpad.handle_event(TouchEvent::new(0, TouchAction::Move, x, y));
        step += 1.0;
    }
    touchpad.handle_event(TouchEvent::new(0, TouchAction::Up, VIEW.width, VIEW.height));

    log::debug!("Waiting {fade_time:?} for the bulbs to fade out");
    std::thread::sleep(fade_time);

    lights.quit();
    worker
        .join()
        .map_err(|_| anyhow::anyhow!("Lights worker panicked"))?;
    Ok(())
}

fn listen(port: u16) -> anyhow::Result<()> {
    let listener =
        Listener::bind(("0.0.0.0", port)).with_context(|| format!("Unable to bind port {port}"))?;
    log::info!("Listening on {}", listener.local_addr()?);

    loop {
        let (address, connection) = listener.accept()?;
        let mut frames = 0_usize;
        for packet in connection {
            match packet {
                Ok(Packet::Hello(service_name)) => {
                    log::info!("{address} introduced itself as {service_name}");
                }
                Ok(Packet::Frame(frame)) => {
                    frames += 1;
                    log::info!("Frame {frames} from {address}: {} bulbs lit", frame.len());
                    for bulb in frame.iter() {
                        log::debug!("  bulb {} -> {:?}", bulb.index, bulb.color);
                    }
                }
                Err(err) => {
                    log::warn!("Connection with {address} failed: {err}");
                    break;
                }
            }
        }
        log::info!("{address} disconnected after {frames} frames");
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match &cli.command {
        Command::Swipe { duration } => {
            let duration = Duration::try_from_secs_f32(*duration)
                .context("Gesture duration must be a non-negative number of seconds")?;
            log::info!("Swiping the touchpad of {} for {duration:?}", cli.host);
            swipe(&cli, duration)?;
        }
        Command::Listen { port } => listen(*port)?,

        Command::Completions { shell } => {
            shell.generate(&mut Cli::command(), &mut std::io::stdout());
        }
    }

    Ok(())
}
