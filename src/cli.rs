// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "burrow")]
#[command(about = "Container-backed package repository management for Docker and Podman")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Talk to Podman instead of Docker
    #[arg(long, global = true)]
    pub podman: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pull a base image and tag it as a repository
    Init {
        /// Base image to pull (e.g. fedora:40)
        #[arg(long)]
        from: String,

        /// Repository reference to create (repo or repo:tag)
        repository: String,
    },

    /// Resolve and install dependencies into a repository image
    Install {
        /// Repository reference (repo or repo:tag)
        repository: String,

        /// Package whose dependency closure should be installed
        #[arg(short, long)]
        package: Option<String>,

        /// Recipe file to resolve build dependencies from
        #[arg(short, long)]
        recipe: Option<PathBuf>,

        /// Extra packages to install alongside the resolved set
        #[arg(short, long)]
        dependency: Vec<String>,
    },

    /// Upgrade packages inside a repository image
    Update {
        /// Repository reference (repo or repo:tag)
        repository: String,

        /// Packages to upgrade; all when omitted
        packages: Vec<String>,
    },

    /// Run a command in the repository image and commit the result
    Run {
        /// Repository reference (repo or repo:tag)
        repository: String,

        /// Discard the container instead of committing it
        #[arg(long)]
        no_commit: bool,

        /// Command and arguments to run
        #[arg(trailing_var_arg = true, required = true)]
        command: Vec<String>,
    },

    /// List repository images for a project
    Repos {
        /// Project name scoping the listing
        project: String,
    },

    /// Remove a repository image
    Rm {
        /// Repository reference (repo or repo:tag)
        repository: String,
    },

    /// Start a detached container from a repository image
    Start {
        /// Repository reference (repo or repo:tag)
        repository: String,

        /// Name for the started container
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Stop a named container belonging to a repository
    Stop {
        /// Repository reference (repo or repo:tag)
        repository: String,

        /// Container name
        name: String,
    },
}
