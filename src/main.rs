use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use repowiki::cli::commands;

#[derive(Parser)]
#[command(name = "repowiki")]
#[command(
    version,
    about = "Keeps a repository wiki in sync with every commit"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Enable repowiki and install the post-commit hook
    Enable {
        #[arg(long, short, help = "Overwrite existing configuration with defaults")]
        force: bool,
    },

    /// Remove the post-commit hook and disable repowiki (wiki files are kept)
    Disable,

    /// Show repowiki status for this repository
    Status {
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
    },

    /// Regenerate the whole wiki for HEAD
    Generate,

    /// Update the wiki for changes since the last run
    Update {
        #[arg(long, help = "Commit to process (default: HEAD)")]
        commit: Option<String>,
        #[arg(long, hide = true, help = "Hook-triggered run")]
        from_hook: bool,
    },

    /// Git hook entry points
    #[command(hide = true)]
    Hooks {
        #[command(subcommand)]
        hook: HookCommand,
    },
}

#[derive(Subcommand)]
enum HookCommand {
    /// Invoked by .git/hooks/post-commit
    PostCommit,
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mrepowiki encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Backtrace when RUST_BACKTRACE=1
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(cli: &Cli) {
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into());

    let from_hook = matches!(
        cli.command,
        Commands::Update { from_hook: true, .. } | Commands::Hooks { .. }
    );

    if from_hook {
        // stderr is the append-only hook log
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().without_time().with_target(false))
            .init();
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    match cli.command {
        Commands::Enable { force } => commands::enable::run(force)?,
        Commands::Disable => commands::disable::run()?,
        Commands::Status { format } => commands::status::run(&format)?,
        Commands::Generate => commands::generate::run()?,
        Commands::Update { commit, from_hook } => commands::update::run(commit, from_hook)?,
        Commands::Hooks {
            hook: HookCommand::PostCommit,
        } => commands::hook::post_commit(),
    }

    Ok(())
}
