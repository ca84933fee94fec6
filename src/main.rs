//! miniclef — live coding pattern sequencer.
//!
//! Reads commands from stdin, one per line, and sends note triggers to a
//! SuperCollider-style synth server over OSC.

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use miniclef::command::{self, HELP};
use miniclef::config::{Config, SetFile};
use miniclef::event::Tempo;
use miniclef::osc::{LogTransport, Transport, UdpTransport};
use miniclef::scheduler::{Scheduler, Session};

const POLL: Duration = Duration::from_millis(100);

#[derive(Parser)]
#[command(name = "miniclef", version)]
#[command(about = "Live coding pattern sequencer for an OSC synth server", long_about = None)]
struct Cli {
    /// Set file to load at startup
    set: Option<PathBuf>,

    /// Config file (default: ~/.miniclef/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Synth server host
    #[arg(long)]
    host: Option<String>,

    /// Synth server port
    #[arg(short, long)]
    port: Option<u16>,

    /// Starting tempo in BPM
    #[arg(short, long)]
    tempo: Option<f64>,

    /// Seed for random choices
    #[arg(long)]
    seed: Option<u64>,

    /// Log messages instead of sending them
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    fn load_config(&self) -> Result<Config, miniclef::config::ConfigError> {
        let mut config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };
        if let Some(host) = &self.host {
            config.osc.host = host.clone();
        }
        if let Some(port) = self.port {
            config.osc.port = port;
        }
        if let Some(tempo) = self.tempo {
            config.tempo = tempo;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        Ok(config)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("miniclef=info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.load_config()?;

    let session = Session::new(Tempo::new(config.tempo)?, config.seed);
    if let Some(path) = &cli.set {
        SetFile::load(path)?.apply(&session);
    }

    let transport: Box<dyn Transport> = if cli.dry_run {
        Box::new(LogTransport)
    } else {
        let udp = UdpTransport::connect(&config.osc.host, config.osc.port)?;
        info!(target = %udp.target(), "sending to synth server");
        Box::new(udp)
    };

    let mut scheduler =
        Scheduler::new(session.clone(), transport).with_max_sleep(config.max_sleep());
    if let Some(dir) = &config.synthdef_dir {
        scheduler.load_synthdefs(dir);
    }
    scheduler.spawn()?;

    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    ctrlc::set_handler(move || flag.store(false, Ordering::Relaxed))?;

    let lines = stdin_lines()?;
    println!(
        "miniclef v{} at {} BPM, 'help' for commands",
        env!("CARGO_PKG_VERSION"),
        session.tempo()
    );

    while running.load(Ordering::Relaxed) {
        match lines.recv_timeout(POLL) {
            Ok(line) => match command::parse_line(&line) {
                Ok(Some(cmd)) => match cmd.execute(&session) {
                    Ok(out) => println!("{out}"),
                    Err(e) => eprintln!("error: {e}"),
                },
                Ok(None) => {}
                Err(e) => eprintln!("error: {e}\n{HELP}"),
            },
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            // Input closed; keep playing until interrupted.
            Err(mpsc::RecvTimeoutError::Disconnected) => thread::sleep(POLL),
        }
    }

    session.hush();
    info!("stopped");
    Ok(())
}

/// Read stdin on its own thread so the main loop can watch for Ctrl-C.
fn stdin_lines() -> io::Result<mpsc::Receiver<String>> {
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("miniclef-stdin".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "stdin read failed");
                        break;
                    }
                }
            }
        })?;
    Ok(rx)
}
