//! Tailview - live, filterable viewer for growing log files.

use std::collections::HashSet;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tailview::config::{ConfigLoader, ViewerConfig};
use tailview::display;
use tailview::session::{ChangeReason, Intent, SessionId, SessionRegistry, ViewChange};

#[derive(Parser)]
#[command(
    name = "tailview",
    about = "Follow log files with keyword classification and live filtering",
    version
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Config file to use instead of the default search paths.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only show lines containing this text (case-insensitive).
    #[arg(short, long)]
    query: Option<String>,

    /// Do not keep the view pinned to the newest line.
    #[arg(long)]
    no_follow: bool,

    /// Print the current contents and exit instead of following.
    #[arg(long)]
    once: bool,

    /// Emit one JSON object per line.
    #[arg(long)]
    json: bool,

    /// Disable colored output.
    #[arg(long)]
    no_color: bool,

    /// Do not prefix lines with a timestamp.
    #[arg(long)]
    no_timestamps: bool,

    /// Log files to open.
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(cli: &Cli) -> Result<ViewerConfig, tailview::config::ConfigError> {
    let loader = cli
        .config
        .clone()
        .map_or_else(ConfigLoader::new, ConfigLoader::with_path);
    let mut config = loader.load()?;
    if cli.no_color {
        config.display.color = false;
    }
    if cli.no_timestamps {
        config.display.timestamps = false;
    }
    if cli.no_follow {
        config.session.follow_tail = false;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            display::print_error(&e.to_string(), !cli.no_color);
            return ExitCode::from(2);
        }
    };

    match run(&cli, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            tracing::debug!("Output closed");
            ExitCode::SUCCESS
        }
        Err(e) => {
            display::print_error(&format!("Failed to write output: {e}"), config.display.color);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli, config: &ViewerConfig) -> io::Result<()> {
    let mut registry = SessionRegistry::from_config(config);
    registry.dispatch(Intent::Open(cli.files.clone()));

    let ids: Vec<SessionId> = registry.sessions().iter().map(|s| s.id()).collect();
    if let Some(query) = &cli.query {
        for &id in &ids {
            registry.dispatch(Intent::SetSearchQuery {
                session: id,
                query: query.clone(),
            });
        }
    }

    for session in registry.sessions() {
        if !session.is_tailing() && session.lines().is_empty() {
            tracing::warn!(path = %session.path().display(), "File could not be read");
        }
        display::write_session(&mut io::stdout().lock(), session, &config.display, cli.json)?;
    }
    if !cli.json && registry.len() > 1 {
        let totals =
            display::format_totals(registry.len(), registry.totals(), config.display.color);
        let mut out = io::stdout().lock();
        writeln!(out, "{totals}")?;
        out.flush()?;
    }

    if cli.once {
        return Ok(());
    }

    follow(&mut registry, config, cli.json).await
}

/// Stream appended lines until Ctrl-C or until no file is being tailed.
async fn follow(
    registry: &mut SessionRegistry,
    config: &ViewerConfig,
    json: bool,
) -> io::Result<()> {
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut last_printed: Option<SessionId> = None;
    let mut stopped: HashSet<SessionId> = HashSet::new();

    while any_tailing(registry, &stopped) {
        tokio::select! {
            _ = &mut ctrl_c => {
                tracing::info!("Interrupted");
                break;
            }
            change = registry.next_change() => {
                if change.reason == ChangeReason::Stopped {
                    stopped.insert(change.session);
                }
                render_change(registry, change, config, json, &mut last_printed)?;
            }
        }
    }
    Ok(())
}

fn any_tailing(registry: &SessionRegistry, stopped: &HashSet<SessionId>) -> bool {
    let tailing = registry
        .sessions()
        .iter()
        .any(|s| s.is_tailing() && !stopped.contains(&s.id()));
    if !tailing {
        tracing::info!("No files left to follow");
    }
    tailing
}

fn render_change(
    registry: &SessionRegistry,
    change: ViewChange,
    config: &ViewerConfig,
    json: bool,
    last_printed: &mut Option<SessionId>,
) -> io::Result<()> {
    let Some(session) = registry.get(change.session) else {
        return Ok(());
    };
    let mut out = io::stdout().lock();

    match change.reason {
        ChangeReason::LinesAppended {
            first_sequence,
            visible,
            ..
        } if visible > 0 => {
            if !json && registry.len() > 1 && *last_printed != Some(session.id()) {
                writeln!(out, "{}", display::format_header(session, &config.display))?;
            }
            *last_printed = Some(session.id());
            for line in session.visible_since(first_sequence) {
                display::write_line(&mut out, line, session.path(), &config.display, json)?;
            }
            Ok(())
        }
        ChangeReason::Truncated if !json => display::write_notice(
            &mut out,
            session,
            "file truncated, reading from start",
            &config.display,
        ),
        ChangeReason::Stopped if !json => display::write_notice(
            &mut out,
            session,
            "file removed or unreadable",
            &config.display,
        ),
        _ => Ok(()),
    }
}
