// ABOUTME: RPM distro driver: dnf dependency resolution and installation.
// ABOUTME: Resolves build deps from a spec recipe or a named package.

use super::{DistroError, ResolutionError};
use crate::engine::Engine;
use crate::engine::traits::{ContainerConfig, ContainerState, ImageSummary};
use crate::handler::{CommandOptions, CommandResult, Handler, HandlerError, SUCCESS};
use crate::output::Progress;
use crate::types::{ContainerId, RepoRef};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

const DNF: &str = "dnf";
const INSTALLING_MARKER: &str = "Installing:";
const SUMMARY_MARKER: &str = "Transaction Summary";
const RECIPE_GLOB_DEPTH: usize = 4;

/// Package-manager driver for RPM-based repository images.
///
/// Built by composition: the driver owns a handler over the tracked
/// repository image and a project name used to scope image inventory.
pub struct RpmDriver<E: Engine> {
    handler: Handler<E>,
    project: String,
}

impl<E: Engine> RpmDriver<E> {
    /// Driver over an existing tagged repository image.
    pub async fn new(
        repository: &str,
        project: Option<&str>,
        engine: Arc<E>,
    ) -> Result<Self, DistroError> {
        let repo = RepoRef::parse(repository);
        let project = project.unwrap_or(repo.name()).to_string();
        let handler = Handler::repository(repo, engine).await?;
        Ok(Self { handler, project })
    }

    pub fn handler(&self) -> &Handler<E> {
        &self.handler
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    /// Install a package's (or recipe's) dependency closure into the image.
    ///
    /// Resolution runs without committing; only the final install mutates the
    /// tracked image. Returns the install exit code.
    pub async fn install(
        &mut self,
        dependencies: &[String],
        package: Option<&str>,
        recipe: Option<&Path>,
    ) -> Result<i64, DistroError> {
        if package.is_none() && recipe.is_none() {
            return Err(DistroError::MissingInstallTarget);
        }

        let mut progress = Progress::new(format!("installing repo {}", self.handler.repo()));
        let resolved = self.resolve_dependencies(package, recipe, &mut progress).await?;

        let mut packages: Vec<String> = dependencies.to_vec();
        packages.extend(resolved);

        progress.step("installing dependencies");
        tracing::info!(count = packages.len(), "installing resolved dependencies");

        let mut command = vec![DNF.to_string(), "install".to_string()];
        command.extend(packages);
        command.push("-y".to_string());

        let result = self
            .handler
            .run_command(&command, CommandOptions::default())
            .await?;
        progress.finish();
        Ok(result.exit_code)
    }

    /// Upgrade the given packages, or the whole system when none are named.
    pub async fn update(&mut self, packages: &[String]) -> Result<i64, DistroError> {
        let mut command = vec![DNF.to_string(), "upgrade".to_string()];
        command.extend(packages.iter().cloned());
        command.push("-y".to_string());

        let result = self
            .handler
            .run_command(&command, CommandOptions::default())
            .await?;
        Ok(result.exit_code)
    }

    /// One-off command through the handler, committed like any other.
    pub async fn run(&mut self, command: &[String]) -> Result<CommandResult, DistroError> {
        Ok(self
            .handler
            .run_command(command, CommandOptions::default())
            .await?)
    }

    async fn resolve_dependencies(
        &mut self,
        package: Option<&str>,
        recipe: Option<&Path>,
        progress: &mut Progress,
    ) -> Result<Vec<String>, DistroError> {
        match (package, recipe) {
            (Some(package), _) => self.deps_from_package(package, progress).await,
            (None, Some(recipe)) => self.deps_from_recipe(recipe, progress).await,
            (None, None) => Err(DistroError::MissingInstallTarget),
        }
    }

    /// Recursive reverse-dependency query for a named package.
    async fn deps_from_package(
        &mut self,
        package: &str,
        progress: &mut Progress,
    ) -> Result<Vec<String>, DistroError> {
        progress.set_total(3);
        progress.step(&format!("resolving dependencies of package {package}"));

        let command = string_vec(&[
            DNF,
            "repoquery",
            "--requires",
            "--resolve",
            "--recursive",
            package,
        ]);
        let result = self
            .handler
            .run_command(&command, CommandOptions::default().no_commit().tolerate_failure())
            .await?;
        if result.exit_code != SUCCESS {
            return Err(DistroError::DependencyResolution(ResolutionError::Failed(
                result.exit_code,
            )));
        }

        Ok(parse_repoquery_output(&result.output))
    }

    /// Dry-run build-dependency resolution against a recipe (spec) file.
    async fn deps_from_recipe(
        &mut self,
        recipe: &Path,
        progress: &mut Progress,
    ) -> Result<Vec<String>, DistroError> {
        progress.set_total(4);
        progress.step(&format!(
            "resolving dependencies from recipe {}",
            recipe.display()
        ));

        // The builddep subcommand is a plugin; make sure it is present first.
        let command = string_vec(&[DNF, "install", "dnf-command(builddep)", "-y"]);
        let result = self
            .handler
            .run_command(&command, CommandOptions::default().no_commit().tolerate_failure())
            .await?;
        if result.exit_code != SUCCESS {
            return Err(DistroError::DependencyResolution(ResolutionError::Failed(
                result.exit_code,
            )));
        }

        progress.step("querying build dependencies");

        // --assumeno answers no to the transaction, so nothing is mutated
        // even though the resolver prints the full install plan.
        let command = string_vec(&[
            DNF,
            "builddep",
            &recipe.display().to_string(),
            "--assumeno",
        ]);
        let result = self
            .handler
            .run_command(&command, CommandOptions::default().no_commit().tolerate_failure())
            .await?;
        if result.exit_code != SUCCESS {
            return Err(DistroError::DependencyResolution(ResolutionError::Failed(
                result.exit_code,
            )));
        }

        parse_builddep_output(&result.output)
    }

    /// All local images whose tags mention this project.
    pub async fn images(&self) -> Result<Vec<ImageSummary>, DistroError> {
        let images = self
            .handler
            .engine()
            .list_images()
            .await
            .map_err(HandlerError::from)?;
        Ok(images
            .into_iter()
            .filter(|img| img.tags.iter().any(|tag| tag.contains(&self.project)))
            .collect())
    }

    /// All `repo:tag` references under this project.
    pub async fn repositories(&self) -> Result<Vec<String>, DistroError> {
        let mut refs: Vec<String> = self
            .images()
            .await?
            .into_iter()
            .flat_map(|img| img.tags)
            .filter(|tag| tag.contains(&self.project))
            .collect();
        refs.sort();
        Ok(refs)
    }

    /// Pick the single repository image this driver operates on.
    ///
    /// One candidate wins outright; with several, the handler's explicit
    /// `repo:tag` disambiguates; otherwise the choice is ambiguous.
    pub async fn resolve_repository(&self) -> Result<ImageSummary, DistroError> {
        let mut candidates = self.images().await?;
        if candidates.is_empty() {
            return Err(DistroError::NoRepository(self.project.clone()));
        }
        if candidates.len() == 1 {
            return Ok(candidates.remove(0));
        }

        let wanted = self.handler.repo().to_string();
        for candidate in &candidates {
            if candidate.tags.iter().any(|tag| *tag == wanted) {
                return Ok(candidate.clone());
            }
        }

        Err(DistroError::AmbiguousRepository(self.project.clone()))
    }

    /// Remove this project's repository image.
    pub async fn remove(&self) -> Result<(), DistroError> {
        let image = self.resolve_repository().await?;
        self.handler
            .engine()
            .remove_image(&image.id, false)
            .await
            .map_err(HandlerError::from)?;
        Ok(())
    }

    /// Start a long-lived detached container from the repository image.
    pub async fn start_detached(&self, name: Option<&str>) -> Result<ContainerId, DistroError> {
        let image = self.resolve_repository().await?;
        let config = ContainerConfig {
            name: name.map(|n| n.to_string()),
            image: image.id.into_inner(),
            command: None,
        };
        let engine = self.handler.engine();
        let container = engine
            .create_container(&config)
            .await
            .map_err(HandlerError::from)?;
        engine
            .start_container(&container)
            .await
            .map_err(HandlerError::from)?;
        Ok(container)
    }

    /// Stop a named container if it is running.
    pub async fn stop(&self, name: &str) -> Result<(), DistroError> {
        let engine = self.handler.engine();
        let container = engine.find_container(name).await.map_err(HandlerError::from)?;
        let state = engine
            .container_state(&container)
            .await
            .map_err(HandlerError::from)?;
        if state != ContainerState::Running {
            return Ok(());
        }
        engine
            .stop_container(&container, Duration::from_secs(10))
            .await
            .map_err(HandlerError::from)?;
        Ok(())
    }
}

fn string_vec(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|p| p.to_string()).collect()
}

/// Parse `dnf repoquery` output: one package name per line.
pub fn parse_repoquery_output(output: &str) -> Vec<String> {
    output
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .map(|line| line.to_string())
        .collect()
}

/// Parse the package names out of `dnf builddep --assumeno` output.
///
/// The names live in the block between a line containing `Installing:` and
/// one containing `Transaction Summary`; the first whitespace-delimited token
/// of each line is the package name. A missing marker pair is a resolution
/// error, never a crash.
pub fn parse_builddep_output(output: &str) -> Result<Vec<String>, DistroError> {
    let mut in_block = false;
    let mut deps = Vec::new();

    for line in output.lines() {
        if !in_block {
            if line.contains(INSTALLING_MARKER) {
                in_block = true;
            }
            continue;
        }
        if line.contains(SUMMARY_MARKER) {
            return Ok(deps);
        }
        if let Some(token) = line.split_whitespace().next() {
            deps.push(token.to_string());
        }
    }

    Err(DistroError::DependencyResolution(
        ResolutionError::MissingMarkers,
    ))
}

/// Find the first `*.spec` recipe file under `dir`, breadth-first,
/// descending at most `RECIPE_GLOB_DEPTH` directory levels.
pub fn recipe_path(dir: &Path) -> Option<PathBuf> {
    let mut queue: VecDeque<(PathBuf, usize)> = VecDeque::new();
    queue.push_back((dir.to_path_buf(), 0));

    while let Some((current, depth)) = queue.pop_front() {
        let Ok(entries) = std::fs::read_dir(&current) else {
            continue;
        };

        let mut subdirs = Vec::new();
        let mut entries: Vec<_> = entries.flatten().collect();
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            let path = entry.path();
            if path.is_dir() {
                subdirs.push(path);
            } else if path.extension().is_some_and(|ext| ext == "spec") {
                return Some(path);
            }
        }

        if depth < RECIPE_GLOB_DEPTH {
            for subdir in subdirs {
                queue.push_back((subdir, depth + 1));
            }
        }
    }

    None
}
