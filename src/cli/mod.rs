use clap::Parser;
use ergo_app::{AppLoadOptions, load_session};
use tracing_subscriber::EnvFilter;

pub(crate) mod args;
pub(crate) mod commands;
pub(crate) mod diagnostics;

use self::args::{Cli, Commands};
pub(crate) use self::diagnostics::print_diagnostics;

pub(crate) fn entry() -> i32 {
    let cli = Cli::parse();
    init_tracing(cli.debug);
    let code = match run(cli) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{}", err);
            1
        }
    };
    code
}

/// Logs go to stderr; stdout carries the protocol when serving on stdio.
fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(
            ["easyergo", "ergo_lang", "ergo_app", "ergo_lsp"]
                .map(|target| format!("{target}={default_level}"))
                .join(","),
        )
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: Cli) -> Result<(), String> {
    let session = load_session(&AppLoadOptions {
        config: cli.config.clone(),
        robot_paths: cli.robot_paths.clone(),
        knowledge: cli.knowledge.clone(),
    })?;

    match cli.command {
        None => commands::serve::execute(session, None, "localhost", false)?,
        Some(Commands::Serve {
            port,
            address,
            persistent,
        }) => commands::serve::execute(session, port, &address, persistent)?,
        Some(Commands::Check { files, format }) => {
            commands::check::execute(&session, &files, format)?;
        }
    }

    Ok(())
}
