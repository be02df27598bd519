use clap::{Parser, Subcommand, ValueEnum};
use std::env;
use std::io::IsTerminal;
use vgl::commands::*;
use vgl::core::{
    classify::ComparisonMode,
    dirs::get_state_file,
    error::{Result, VglError},
    print_error,
    resolver::ResolveContext,
};

#[derive(Parser)]
#[command(name = "vgl")]
#[command(about = "Explicit track / untrack / undecided workspaces on top of git")]
#[command(version = "0.1.0")]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Never prompt or create files implicitly
    #[arg(long, global = true)]
    non_interactive: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify every file of the workspace
    Status {
        /// What the working tree is compared against
        #[arg(long, value_enum, default_value_t = Against::Index)]
        against: Against,
    },
    /// Show how the current directory resolves to a repository
    Resolve {
        /// Store the resolved repository as the current one
        #[arg(long)]
        remember: bool,
        /// Clear the stored current repository first
        #[arg(long)]
        forget: bool,
    },
    /// Preview merging a ref into HEAD without touching anything
    Preview {
        /// Branch or revision to merge
        source: String,
        /// Ref the merge would land on
        #[arg(long, default_value = "HEAD")]
        head: String,
        /// List affected files
        #[arg(short, long)]
        verbose: bool,
    },
    /// Record files as tracked and stage them
    Track {
        /// Paths relative to the current directory
        paths: Vec<String>,
    },
    /// Record files as untracked and drop them from the index
    Untrack {
        /// Paths relative to the current directory
        paths: Vec<String>,
    },
    /// Make a directory a vgl workspace, running git init if needed
    Create {
        /// Directory to set up (defaults to the current one)
        path: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Against {
    Index,
    Head,
    Remote,
}

impl From<Against> for ComparisonMode {
    fn from(against: Against) -> Self {
        match against {
            Against::Index => ComparisonMode::WorkingVsIndex,
            Against::Head => ComparisonMode::WorkingVsHead,
            Against::Remote => ComparisonMode::LocalVsRemote,
        }
    }
}

fn build_context(non_interactive: bool) -> Result<ResolveContext> {
    let current_dir = env::current_dir()?;
    let interactive =
        !non_interactive && std::io::stdin().is_terminal() && std::io::stdout().is_terminal();

    let state_file = match get_state_file() {
        Ok(path) => Some(path),
        Err(e) => {
            log::debug!("User state disabled: {e}");
            None
        }
    };

    Ok(ResolveContext::new(current_dir)
        .interactive(interactive)
        .auto_create_config(true)
        .state_file(state_file))
}

fn run(cli: Cli) -> Result<()> {
    let ctx = build_context(cli.non_interactive)?;

    match cli.command {
        Commands::Status { against } => execute_status(&ctx, against.into()),
        Commands::Resolve { remember, forget } => execute_resolve(&ctx, remember, forget),
        Commands::Preview {
            source,
            head,
            verbose,
        } => execute_preview(&ctx, &source, &head, verbose),
        Commands::Track { paths } => execute_track(&ctx, paths),
        Commands::Untrack { paths } => execute_untrack(&ctx, paths),
        Commands::Create { path } => execute_create(&ctx, path),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Configure logging based on --debug flag
    if cli.debug {
        env::set_var("RUST_LOG", "debug");
    } else {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    if let Err(e) = run(cli) {
        match e {
            // Usage was already printed
            VglError::NoPathsProvided { .. } => {}
            other => print_error(&other.to_string()),
        }
        std::process::exit(1);
    }

    Ok(())
}
