//! Gesture engine: turns landmark frames into gesture events for a consumer.

use anyhow::{Context, Result};
use clap::Parser;
use gesture_engine::{
    app::GestureApp,
    config::Config,
    engine::GestureEngine,
    frame_source::JsonLinesSource,
    ipc::{Channel, GestureListener, IpcClient, WriterChannel},
    protocol::Message,
};
use log::{info, warn};
use std::io;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Consumer port to send gestures to (events go to stdout when unset)
    #[arg(short, long)]
    port: Option<u16>,

    /// Consumer host
    #[arg(long)]
    host: Option<String>,

    /// Path to configuration file (YAML, or JSON with a .json extension)
    #[arg(short = 'C', long)]
    config: Option<String>,

    /// Landmark frames as JSON lines, `-` for stdin
    #[arg(short, long, default_value = "-")]
    frames: String,

    /// Act as the consumer: listen on --port and print received gestures
    #[arg(long)]
    listen: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn load_config(path: Option<&str>) -> Config {
    let Some(path) = path else {
        return Config::default();
    };

    info!("Loading configuration from: {}", path);
    match Config::from_file(path) {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to load config file: {}. Using defaults.", e);
            Config::default()
        }
    }
}

fn listen(host: &str, port: u16) -> Result<()> {
    let listener = GestureListener::bind(host, port)?;
    let mut connection = listener.accept()?;

    loop {
        let messages = connection.recv()?;
        if messages.is_empty() {
            info!("Engine disconnected");
            return Ok(());
        }
        for message in messages {
            match message {
                Message::Gesture { gesture, action_type } => println!("{gesture} ({action_type:?})"),
                other => info!("{other:?}"),
            }
        }
    }
}

fn run<C: Channel>(config: &Config, frames: &str, channel: C) -> Result<()> {
    let engine = GestureEngine::new(&config.detection)?;
    let source = JsonLinesSource::open(frames).with_context(|| format!("Failed to open frames from {frames}"))?;

    let mut app = GestureApp::new(engine, source, channel, config.ipc.send_status);
    app.run()?;
    Ok(())
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    let mut config = load_config(args.config.as_deref());
    if let Some(host) = args.host {
        config.ipc.host = host;
    }
    if args.port.is_some() {
        config.ipc.port = args.port;
    }
    config.validate()?;

    if args.listen {
        let port = config.ipc.port.context("--listen requires --port")?;
        return listen(&config.ipc.host, port);
    }

    info!("Gesture engine starting");
    match config.ipc.port {
        Some(port) => run(&config, &args.frames, IpcClient::new(config.ipc.host.clone(), port)),
        None => run(&config, &args.frames, WriterChannel::new(io::stdout().lock())),
    }
}
