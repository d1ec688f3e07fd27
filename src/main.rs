// ABOUTME: Entry point for the burrow CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;

use burrow::config::Config;
use burrow::distro::{RpmDriver, recipe_path};
use burrow::engine::traits::ImageOps;
use burrow::engine::{BollardEngine, EngineKind, connect_engine};
use burrow::error::Result;
use burrow::handler::{CommandOptions, Handler, SUCCESS};
use burrow::types::RepoRef;
use clap::Parser;
use cli::{Cli, Commands};
use std::env;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::discover()?;

    let kind = if cli.podman {
        EngineKind::Podman
    } else {
        config.engine.unwrap_or_default()
    };

    let cwd = env::current_dir()?;
    let engine = Arc::new(connect_engine(kind, config.socket.as_deref(), &cwd).await?);

    match cli.command {
        Commands::Init { from, repository } => {
            let mut handler = Handler::pull(RepoRef::parse(&from), Arc::clone(&engine)).await?;
            handler.tag(&repository).await?;
            println!("Initialized repository {}", handler.repo());
            Ok(())
        }
        Commands::Install {
            repository,
            package,
            recipe,
            dependency,
        } => {
            let recipe = match (&package, recipe) {
                (None, None) => recipe_path(&cwd),
                (_, recipe) => recipe,
            };
            let mut driver = driver(&repository, &config, &engine).await?;
            let code = driver
                .install(&dependency, package.as_deref(), recipe.as_deref())
                .await?;
            exit_with(code)
        }
        Commands::Update {
            repository,
            packages,
        } => {
            let mut driver = driver(&repository, &config, &engine).await?;
            let code = driver.update(&packages).await?;
            exit_with(code)
        }
        Commands::Run {
            repository,
            no_commit,
            command,
        } => {
            let mut handler =
                Handler::repository(RepoRef::parse(&repository), Arc::clone(&engine)).await?;
            let options = if no_commit {
                CommandOptions::default().no_commit()
            } else {
                CommandOptions::default()
            };
            let result = handler.run_command(&command, options).await?;
            exit_with(result.exit_code)
        }
        Commands::Repos { project } => {
            let images = engine.list_images().await.map_err(burrow::engine::EngineError::from)?;
            for image in images {
                for tag in image.tags.iter().filter(|t| t.contains(&project)) {
                    println!("{tag}");
                }
            }
            Ok(())
        }
        Commands::Rm { repository } => {
            let driver = driver(&repository, &config, &engine).await?;
            driver.remove().await?;
            println!("Removed repository {repository}");
            Ok(())
        }
        Commands::Start { repository, name } => {
            let driver = driver(&repository, &config, &engine).await?;
            let container = driver.start_detached(name.as_deref()).await?;
            println!("Started container {container}");
            Ok(())
        }
        Commands::Stop { repository, name } => {
            let driver = driver(&repository, &config, &engine).await?;
            driver.stop(&name).await?;
            println!("Stopped container {name}");
            Ok(())
        }
    }
}

async fn driver(
    repository: &str,
    config: &Config,
    engine: &Arc<BollardEngine>,
) -> Result<RpmDriver<BollardEngine>> {
    Ok(RpmDriver::new(repository, config.project.as_deref(), Arc::clone(engine)).await?)
}

/// Mirror the in-container command's exit code to the caller.
fn exit_with(code: i64) -> Result<()> {
    if code == SUCCESS {
        return Ok(());
    }
    std::process::exit(code as i32);
}
