use std::path::PathBuf;

use clap::Parser;
use debugger::Session;
use eyre::WrapErr;
use replay::Format;
use state::StateManager;
use tracing_subscriber::EnvFilter;
use transport::ReplayTransport;

/// Replay a recorded GDB/MI session
///
/// The recording holds one batch of records per line. Each command given on
/// the command line, and each poll, consumes the next batch.
#[derive(Debug, Parser)]
struct Args {
    recording: PathBuf,

    /// Resolve relative source paths against this directory
    #[clap(short, long)]
    source_root: Option<PathBuf>,

    /// Command to issue before replaying (may be repeated)
    #[clap(short, long = "command")]
    commands: Vec<String>,

    /// Executable to load before replaying
    #[clap(short, long)]
    binary: Option<String>,

    /// Config file to use instead of the default one
    #[clap(long)]
    config: Option<PathBuf>,

    /// Print events as JSON lines
    #[clap(long)]
    json: bool,
}

fn main() -> eyre::Result<()> {
    color_eyre::install().context("installing color_eyre")?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    tracing::debug!(?args, "parsed command line arguments");

    let config = match &args.config {
        Some(path) => config::load_from(path),
        None => config::load(),
    }
    .context("loading config")?;

    let state_path = config.state_path().context("locating state file")?;
    let mut state = StateManager::new(state_path).context("loading persisted state")?;
    let limit = config.history.limit;
    if let Some(binary) = &args.binary {
        state.current_mut().record_binary(binary.as_str(), limit);
    }
    for command in &args.commands {
        if !command.trim().is_empty() {
            state.current_mut().record_command(command.as_str(), limit);
        }
    }
    let _state = state.save().context("saving persisted state")?;

    let mut transport =
        ReplayTransport::from_path(&args.recording).context("loading recording")?;
    let source_root = args
        .source_root
        .clone()
        .or_else(|| args.recording.parent().map(PathBuf::from));
    if let Some(root) = source_root {
        transport = transport.with_source_root(root);
    }

    let mut session = Session::new(transport, &config);
    if let Some(binary) = &args.binary {
        session.set_target_binary(binary);
    }
    for command in args.commands {
        session.run_commands(command);
    }

    let format = if args.json { Format::Json } else { Format::Text };
    let stdout = std::io::stdout();
    let summary =
        replay::replay(&mut session, stdout.lock(), format).context("replaying session")?;
    tracing::info!(
        batches = summary.batches,
        events = summary.events,
        "replay complete"
    );

    Ok(())
}
