//! m64prs-stage CLI - build and stage the m64prs bundle

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::Session;
use m64prs_stage::util::diagnostic::emit;
use m64prs_stage::util::shell::Shell;
use m64prs_stage::util::StageError;

const EXIT_FAILURE: i32 = 1;
const EXIT_INTERRUPTED: i32 = 130;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { EXIT_FAILURE } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    let shell = Arc::new(Shell::from_flags(cli.quiet, cli.verbose, cli.color));
    if let Err(e) = run(cli, Arc::clone(&shell)) {
        std::process::exit(report(&e, &shell));
    }
}

fn run(cli: Cli, shell: Arc<Shell>) -> Result<()> {
    // Set up logging
    let default_filter = if cli.verbose {
        "m64prs_stage=debug"
    } else {
        "m64prs_stage=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)) {
        tracing::warn!("could not install interrupt handler: {}", e);
    }

    let session = Session {
        root: cli.root,
        shell,
        interrupted,
    };

    // Execute command
    match cli.command {
        Commands::Build(args) => commands::build::execute(args, &session),
        Commands::Run(args) => commands::run::execute(args, &session),
        Commands::Clean(args) => commands::clean::execute(args, &session),
        Commands::GitSetup => commands::git_setup::execute(),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// Print the error and pick the exit code.
fn report(err: &anyhow::Error, shell: &Shell) -> i32 {
    match err.downcast_ref::<StageError>() {
        Some(StageError::Interrupted) => {
            eprintln!("interrupted; the install tree may be partially staged");
            EXIT_INTERRUPTED
        }
        Some(stage) => {
            let mut diag = stage.to_diagnostic();
            let outer = err.to_string();
            if outer != stage.to_string() {
                diag = diag.with_context(outer);
            }
            emit(&diag, shell.use_color());
            EXIT_FAILURE
        }
        None => {
            eprintln!("error: {:#}", err);
            EXIT_FAILURE
        }
    }
}
