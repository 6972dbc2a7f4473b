use clap::Parser;
use std::path::PathBuf;
use todo_cli::session::{INTERRUPTED_FAREWELL, Session};
use todo_cli::config::{ColorChoice, Config};
use todo_cli::ui::Palette;

/// Interactive todo list that lives for one session.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// TOML configuration file. Defaults to ./todo.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// When to colour completed tasks.
    #[arg(long, value_enum)]
    color: Option<ColorChoice>,
    /// Log level written to stderr (error, warn, info, debug, trace).
    #[arg(long)]
    log_level: Option<String>,
}

/// Says goodbye and exits cleanly when the user presses Ctrl+C.
///
/// The session blocks on stdin, so the signal is awaited on its own thread.
fn exit_on_interrupt() -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    std::thread::spawn(move || {
        runtime.block_on(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("interrupted, session finished");
                    println!("{INTERRUPTED_FAREWELL}");
                    std::process::exit(0);
                }
                Err(err) => tracing::warn!(error = %err, "cannot listen for Ctrl+C"),
            }
        });
    });
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    exit_on_interrupt()?;

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(color) = args.color {
        config.color = color;
    }
    if let Some(log_level) = args.log_level {
        config.log_level = log_level;
    }

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(config.level()?)
        .init();
    tracing::debug!(?config, "configuration loaded");

    let stdin = std::io::stdin().lock();
    // Not locked for the whole session: the interrupt thread also writes to stdout.
    let mut session = Session::new(
        stdin,
        std::io::stdout(),
        Palette::new(config.color.enabled()),
    );
    session.run()
}
