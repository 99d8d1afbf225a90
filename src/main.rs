//! odstack - open data stack launcher
//!
//! This is the main CLI entry point for odstack.

use clap::{Parser, Subcommand};
use odstack::compose::{ApplyRunner, ComposeCommand, ManifestRenderer};
use odstack::config::Settings;
use odstack::deploy::Deployment;
use odstack::error::Result;
use odstack::report::{OutputFormat, Outputs};
use odstack::stack::open_data_stack;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// odstack - render and launch an open data stack
#[derive(Parser)]
#[command(name = "odstack")]
#[command(author = "Evoker Industries")]
#[command(version)]
#[command(about = "Render and launch an open data stack with docker compose", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Manifest path, relative to the project directory
    #[arg(
        short,
        long,
        global = true,
        env = "ODSTACK_MANIFEST",
        default_value = "docker-compose.yaml"
    )]
    file: PathBuf,

    /// Compose command ("docker-compose" or "docker compose")
    #[arg(long, global = true, env = "ODSTACK_COMPOSE", default_value = "docker-compose")]
    compose: ComposeCommand,

    /// Directory compose runs in
    #[arg(long, global = true, env = "ODSTACK_PROJECT_DIR", default_value = ".")]
    project_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the manifest, start the stack and print its endpoints
    Up {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: OutputFormat,
        /// Print secret values instead of masking them
        #[arg(long)]
        show_secrets: bool,
    },

    /// Render the manifest without starting anything
    Render {
        /// Print the manifest instead of writing it
        #[arg(long)]
        stdout: bool,
    },

    /// Stop and remove the stack
    Down {
        /// Remove named volumes
        #[arg(short, long)]
        volumes: bool,
    },

    /// Print the stack's endpoints
    Outputs {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: OutputFormat,
        /// Print secret values instead of masking them
        #[arg(long)]
        show_secrets: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.debug {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        tracing::error!("{}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = Settings::new(cli.project_dir)
        .manifest(cli.file)
        .compose(cli.compose);
    let project_dir = settings.project_dir()?;
    let manifest = settings.manifest_path()?;
    let stack = open_data_stack();

    match cli.command {
        Commands::Up {
            format,
            show_secrets,
        } => {
            let runner = ApplyRunner::new(settings.compose, project_dir.clone());
            let mut deployment = Deployment::new(&stack, &runner, &manifest);
            let outputs = deployment.run().await?;
            print!("{}", outputs.render(format, show_secrets)?);
        }

        Commands::Render { stdout } => {
            if stdout {
                print!("{}", ManifestRenderer::render(&stack)?);
            } else {
                let path = ManifestRenderer::write(&stack, &manifest)?;
                println!("Wrote {}", path.display());
            }
        }

        Commands::Down { volumes } => {
            let runner = ApplyRunner::new(settings.compose, project_dir.clone());
            runner.down(&manifest, volumes).await?;
            println!("Stopped stack from {}", manifest.display());
        }

        Commands::Outputs {
            format,
            show_secrets,
        } => {
            print!("{}", Outputs::for_stack().render(format, show_secrets)?);
        }
    }

    Ok(())
}
