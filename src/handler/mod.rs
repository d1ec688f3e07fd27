// ABOUTME: State-driven handler tying a repository reference to engine images.
// ABOUTME: Each command runs in a fresh container and commits back to the image.

mod error;

pub use error::HandlerError;

use crate::engine::Engine;
use crate::engine::traits::{ContainerConfig, ContainerState, ImageError, LogOptions};
use crate::types::{ContainerId, ImageId, RepoRef};
use futures::StreamExt;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub const SUCCESS: i64 = 0;

const STOP_TIMEOUT: Duration = Duration::from_secs(10);

/// The handler's view of what its repository reference points at.
///
/// `PureImage` converts to `Repository` exactly once, when the pulled image
/// is tagged into a local namespace; no other transition exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerState {
    /// An already-tagged local `repo:tag` image.
    Repository,
    /// A named, long-lived container without repository semantics.
    RawContainer,
    /// A freshly pulled upstream image, not yet tracked locally.
    PureImage,
}

impl fmt::Display for HandlerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerState::Repository => write!(f, "repository"),
            HandlerState::RawContainer => write!(f, "raw-container"),
            HandlerState::PureImage => write!(f, "pure-image"),
        }
    }
}

/// Result of a single container command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: i64,
    /// Combined output lines, newline-joined, in engine emission order.
    pub output: String,
}

/// Options for `run_command`.
#[derive(Debug, Clone, Copy)]
pub struct CommandOptions {
    /// Commit the container's filesystem delta back onto `repo:tag`.
    pub commit: bool,
    /// Echo each log line to the terminal as it arrives.
    pub stream_logs: bool,
    /// Turn a nonzero exit code into `CommandFailed`.
    pub fail_on_nonzero: bool,
}

impl Default for CommandOptions {
    fn default() -> Self {
        Self {
            commit: true,
            stream_logs: true,
            fail_on_nonzero: true,
        }
    }
}

impl CommandOptions {
    pub fn no_commit(mut self) -> Self {
        self.commit = false;
        self
    }

    pub fn quiet(mut self) -> Self {
        self.stream_logs = false;
        self
    }

    pub fn tolerate_failure(mut self) -> Self {
        self.fail_on_nonzero = false;
        self
    }
}

/// Manages images, containers and repositories for Docker or Podman.
///
/// Each command runs in a fresh container created from the backing image and,
/// unless commits are disabled, is committed back onto the same `repo:tag`
/// image before the container is removed. Sequential commands therefore
/// mutate the tracked image linearly; the commit is the durability boundary.
///
/// There is no timeout: a command blocks until the engine closes the log
/// stream and reports an exit code.
pub struct Handler<E: Engine> {
    repo: RepoRef,
    engine: Arc<E>,
    state: HandlerState,
    image: Option<ImageId>,
}

// Manual impl: the engine itself carries no useful debug state and would
// otherwise force a Debug bound on every backend.
impl<E: Engine> fmt::Debug for Handler<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("repo", &self.repo)
            .field("state", &self.state)
            .field("image", &self.image)
            .finish_non_exhaustive()
    }
}

impl<E: Engine> Handler<E> {
    /// Handler over an existing tagged repository image.
    pub async fn repository(repo: RepoRef, engine: Arc<E>) -> Result<Self, HandlerError> {
        let image = resolve_repository_image(&engine, &repo).await?;
        Ok(Self {
            repo,
            engine,
            state: HandlerState::Repository,
            image: Some(image),
        })
    }

    /// Handler over a freshly pulled upstream image (PureImage state).
    pub async fn pull(repo: RepoRef, engine: Arc<E>) -> Result<Self, HandlerError> {
        let image = engine.pull_image(&repo).await?;
        Ok(Self {
            repo,
            engine,
            state: HandlerState::PureImage,
            image: Some(image),
        })
    }

    /// Handler over a named, already-existing container (RawContainer state).
    ///
    /// Raw containers carry no backing image; image-scoped operations are
    /// rejected with `UnsupportedOperation`.
    pub fn raw_container(name: &str, engine: Arc<E>) -> Self {
        Self {
            repo: RepoRef::parse(name),
            engine,
            state: HandlerState::RawContainer,
            image: None,
        }
    }

    pub fn repo(&self) -> &RepoRef {
        &self.repo
    }

    pub fn state(&self) -> HandlerState {
        self.state
    }

    pub fn image_id(&self) -> Option<&ImageId> {
        self.image.as_ref()
    }

    pub fn engine(&self) -> &Arc<E> {
        &self.engine
    }

    /// Resolve an image per the current state's rule.
    ///
    /// Repository state looks the image up locally and fails with
    /// `ImageNotFound` when absent; PureImage state pulls from the upstream
    /// registry instead; raw containers have no image identity to resolve.
    pub async fn resolve_image(&self, name: &str, tag: &str) -> Result<ImageId, HandlerError> {
        let reference = RepoRef::new(name, tag);
        match self.state {
            HandlerState::Repository => resolve_repository_image(&self.engine, &reference).await,
            HandlerState::PureImage => Ok(self.engine.pull_image(&reference).await?),
            HandlerState::RawContainer => Err(HandlerError::UnsupportedOperation {
                state: self.state,
                reason: "raw containers carry no image identity",
            }),
        }
    }

    /// Alias the backing image under `repository`, which may carry an
    /// explicit tag; a bare name defaults to `latest`.
    ///
    /// In PureImage state this additionally rebinds the handler to the new
    /// repository and converts it to Repository state - the sole state
    /// transition in the system.
    pub async fn tag(&mut self, repository: &str) -> Result<(), HandlerError> {
        let image = self.image.as_ref().ok_or(HandlerError::UnsupportedOperation {
            state: self.state,
            reason: "raw containers have no backing image to tag",
        })?;

        let target = RepoRef::parse(repository);
        self.engine.tag_image(image, &target).await?;

        if self.state == HandlerState::PureImage {
            // The pulled image stays as it came from the outside world;
            // the handler switches to the tagged alias from here on.
            tracing::info!(repo = %target, "tracking pulled image as repository");
            self.repo = target;
            self.state = HandlerState::Repository;
        }

        Ok(())
    }

    /// Run a command per the current state's rule.
    ///
    /// Repository/PureImage: create a fresh detached container from the
    /// backing image, start it, drain its logs in order, then read the exit
    /// code once the stream closes. PureImage rejects `commit` outright.
    /// RawContainer: exec inside the named container, which stays running.
    ///
    /// A nonzero exit only surfaces as `CommandFailed` after log draining
    /// completes, so partial output is never lost.
    pub async fn run_command(
        &mut self,
        command: &[String],
        opts: CommandOptions,
    ) -> Result<CommandResult, HandlerError> {
        match self.state {
            HandlerState::Repository => self.run_in_fresh_container(command, opts).await,
            HandlerState::PureImage => {
                if opts.commit {
                    // A pulled, untracked image must never be mutated in
                    // place; callers tag first to obtain repository state.
                    return Err(HandlerError::CommitRejected);
                }
                self.run_in_fresh_container(command, opts).await
            }
            HandlerState::RawContainer => self.run_in_named_container(command, opts).await,
        }
    }

    /// Construct a sibling handler over another repository, sharing the
    /// engine. A PureImage handler's siblings start in Repository state:
    /// branching off a named reference operates on tracked state.
    pub async fn handler_for(&self, name: &str, tag: &str) -> Result<Self, HandlerError> {
        let reference = RepoRef::new(name, tag);
        match self.state {
            HandlerState::RawContainer => {
                Ok(Self::raw_container(&reference.to_string(), Arc::clone(&self.engine)))
            }
            HandlerState::Repository | HandlerState::PureImage => {
                Self::repository(reference, Arc::clone(&self.engine)).await
            }
        }
    }

    async fn run_in_fresh_container(
        &mut self,
        command: &[String],
        opts: CommandOptions,
    ) -> Result<CommandResult, HandlerError> {
        let image = self
            .image
            .as_ref()
            .ok_or(HandlerError::UnsupportedOperation {
                state: self.state,
                reason: "no backing image resolved",
            })?
            .clone();

        tracing::debug!(repo = %self.repo, image = %image, ?command, "running command");

        let config = ContainerConfig {
            name: None,
            image: image.into_inner(),
            command: Some(command.to_vec()),
        };
        let container = self.engine.create_container(&config).await?;
        self.engine.start_container(&container).await?;

        let drained = self.drain_and_wait(&container, opts.stream_logs).await;
        let (exit_code, output) = match drained {
            Ok(v) => v,
            Err(e) => {
                self.best_effort_teardown(&container).await;
                return Err(e);
            }
        };

        let failed = opts.fail_on_nonzero && exit_code != SUCCESS;
        if opts.commit && !failed {
            match self.engine.commit_container(&container, &self.repo).await {
                Ok(new_image) => {
                    tracing::debug!(repo = %self.repo, image = %new_image, "committed");
                    self.image = Some(new_image);
                }
                Err(e) => {
                    self.best_effort_teardown(&container).await;
                    return Err(e.into());
                }
            }
        }

        self.teardown(&container).await?;

        if failed {
            return Err(HandlerError::CommandFailed {
                command: command.join(" "),
                exit_code,
            });
        }

        Ok(CommandResult { exit_code, output })
    }

    async fn run_in_named_container(
        &mut self,
        command: &[String],
        opts: CommandOptions,
    ) -> Result<CommandResult, HandlerError> {
        let container = self.engine.find_container(self.repo.name()).await?;
        let result = self.engine.exec(&container, command).await?;

        if opts.stream_logs {
            for line in &result.output {
                println!("{line}");
            }
        }

        let failed = opts.fail_on_nonzero && result.exit_code != SUCCESS;
        if opts.commit && !failed {
            let new_image = self
                .engine
                .commit_container(&container, &RepoRef::with_latest(self.repo.name()))
                .await?;
            self.image = Some(new_image);
        }

        // The named container is long-lived; it is never removed here.
        if failed {
            return Err(HandlerError::CommandFailed {
                command: command.join(" "),
                exit_code: result.exit_code,
            });
        }

        Ok(CommandResult {
            exit_code: result.exit_code,
            output: result.output.join("\n"),
        })
    }

    /// Drain the log stream fully, then read the exit code. The ordering is
    /// load-bearing: logs are only complete once the follow stream closes,
    /// and the exit code must never be read before that.
    async fn drain_and_wait(
        &self,
        container: &ContainerId,
        echo: bool,
    ) -> Result<(i64, String), HandlerError> {
        let mut stream = self
            .engine
            .container_logs(container, &LogOptions::follow_all())
            .await?;

        let mut lines = Vec::new();
        while let Some(item) = stream.next().await {
            let line = item?;
            let text = line.content.trim_end().to_string();
            if echo {
                println!("{text}");
            }
            lines.push(text);
        }

        let exit_code = self.engine.wait_container(container).await?;
        Ok((exit_code, lines.join("\n")))
    }

    async fn teardown(&self, container: &ContainerId) -> Result<(), HandlerError> {
        if self.engine.container_state(container).await? == ContainerState::Running {
            self.engine.stop_container(container, STOP_TIMEOUT).await?;
        }
        self.engine.remove_container(container, false).await?;
        Ok(())
    }

    async fn best_effort_teardown(&self, container: &ContainerId) {
        if let Err(e) = self.teardown(container).await {
            tracing::warn!(container = %container, error = %e, "container cleanup failed");
        }
    }
}

async fn resolve_repository_image<E: Engine>(
    engine: &Arc<E>,
    reference: &RepoRef,
) -> Result<ImageId, HandlerError> {
    match engine.inspect_image(&reference.to_string()).await {
        Ok(image) => Ok(image),
        Err(ImageError::NotFound(_)) => {
            Err(HandlerError::ImageNotFound(reference.name().to_string()))
        }
        Err(e) => Err(e.into()),
    }
}
