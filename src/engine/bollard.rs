// ABOUTME: Bollard-based container engine implementation.
// ABOUTME: Supports both Docker and Podman via Docker-compatible API.

use crate::engine::traits::sealed::Sealed;
use crate::engine::traits::{
    ContainerConfig, ContainerError, ContainerOps, ContainerState, EngineInfo, EngineInfoError,
    ExecError, ExecOps, ExecResult, ImageError, ImageOps, ImageSummary, LogError, LogLine, LogOps,
    LogOptions, LogStream,
};
use crate::engine::types::EngineKind;
use crate::types::{ContainerId, ExecId, ImageId, RepoRef};
use async_trait::async_trait;
use bollard::Docker;
use bollard::exec::StartExecOptions;
use bollard::models::ContainerCreateBody;
use bollard::query_parameters::{
    CommitContainerOptions, CreateContainerOptions, CreateImageOptions, InspectContainerOptions,
    ListImagesOptions, LogsOptions, RemoveContainerOptions, RemoveImageOptions,
    StopContainerOptions, TagImageOptions, WaitContainerOptions,
};
use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::time::Duration;

// =============================================================================
// Error Mapping Helpers
// =============================================================================

fn map_image_pull_error(e: bollard::errors::Error, image_name: &str) -> ImageError {
    ImageError::PullFailed(format!("{}: {}", image_name, e))
}

fn map_image_not_found_error(e: bollard::errors::Error, image_name: &str) -> ImageError {
    match &e {
        bollard::errors::Error::DockerResponseServerError { status_code, .. }
            if *status_code == 404 =>
        {
            ImageError::NotFound(image_name.to_string())
        }
        _ => ImageError::Engine(e.to_string()),
    }
}

fn map_image_remove_error(e: bollard::errors::Error, image_name: &str) -> ImageError {
    match &e {
        bollard::errors::Error::DockerResponseServerError { status_code, .. }
            if *status_code == 404 =>
        {
            ImageError::NotFound(image_name.to_string())
        }
        bollard::errors::Error::DockerResponseServerError { status_code, .. }
            if *status_code == 409 =>
        {
            ImageError::InUse(image_name.to_string())
        }
        _ => ImageError::Engine(format!("failed to remove {}: {}", image_name, e)),
    }
}

fn map_container_create_error(e: bollard::errors::Error) -> ContainerError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ContainerError::ImageNotFound(message.clone()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 409 => ContainerError::AlreadyExists(message.clone()),
        _ => ContainerError::Engine(e.to_string()),
    }
}

fn map_container_start_error(e: bollard::errors::Error) -> ContainerError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ContainerError::NotFound(message.clone()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 304 => ContainerError::AlreadyRunning(message.clone()),
        _ => ContainerError::Engine(e.to_string()),
    }
}

fn map_container_stop_error(e: bollard::errors::Error) -> ContainerError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ContainerError::NotFound(message.clone()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 304 => ContainerError::NotRunning(message.clone()),
        _ => ContainerError::Engine(e.to_string()),
    }
}

fn map_container_not_found_error(e: bollard::errors::Error) -> ContainerError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ContainerError::NotFound(message.clone()),
        _ => ContainerError::Engine(e.to_string()),
    }
}

fn map_exec_create_error(e: bollard::errors::Error) -> ExecError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ExecError::ContainerNotFound(message.clone()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 409 => ExecError::ContainerNotRunning(message.clone()),
        _ => ExecError::Engine(e.to_string()),
    }
}

// =============================================================================
// BollardEngine
// =============================================================================

/// Container engine implementation using bollard.
///
/// Supports both Docker and Podman via the Docker-compatible API; the only
/// backend difference lives in endpoint resolution at connect time.
pub struct BollardEngine {
    client: Docker,
    kind: EngineKind,
}

impl BollardEngine {
    /// Create a new BollardEngine from a Docker client.
    pub fn new(client: Docker, kind: EngineKind) -> Self {
        Self { client, kind }
    }

    /// The engine backend this client talks to.
    pub fn kind(&self) -> EngineKind {
        self.kind
    }
}

// Implement Sealed to allow capability trait implementations.
impl Sealed for BollardEngine {}

#[async_trait]
impl EngineInfo for BollardEngine {
    async fn ping(&self) -> Result<(), EngineInfoError> {
        self.client
            .ping()
            .await
            .map_err(|e| EngineInfoError::ConnectionFailed(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl ImageOps for BollardEngine {
    async fn inspect_image(&self, reference: &str) -> Result<ImageId, ImageError> {
        let inspect = self
            .client
            .inspect_image(reference)
            .await
            .map_err(|e| map_image_not_found_error(e, reference))?;

        let id = inspect
            .id
            .ok_or_else(|| ImageError::Engine(format!("no id reported for {}", reference)))?;
        Ok(ImageId::new(id))
    }

    async fn pull_image(&self, reference: &RepoRef) -> Result<ImageId, ImageError> {
        let image_name = reference.to_string();
        tracing::info!(image = %image_name, "pulling image");

        let opts = CreateImageOptions {
            from_image: Some(image_name.clone()),
            ..Default::default()
        };

        // Pull returns a stream of progress updates - consume it.
        let mut stream = self.client.create_image(Some(opts), None, None);
        while let Some(result) = stream.next().await {
            result.map_err(|e| map_image_pull_error(e, &image_name))?;
        }

        // Resolve the id of what just landed.
        self.inspect_image(&image_name).await
    }

    async fn tag_image(&self, image: &ImageId, reference: &RepoRef) -> Result<(), ImageError> {
        let opts = TagImageOptions {
            repo: Some(reference.name().to_string()),
            tag: Some(reference.tag().to_string()),
        };

        self.client
            .tag_image(image.as_str(), Some(opts))
            .await
            .map_err(|e| map_image_not_found_error(e, image.as_str()))
    }

    async fn remove_image(&self, image: &ImageId, force: bool) -> Result<(), ImageError> {
        let opts = RemoveImageOptions {
            force,
            ..Default::default()
        };

        self.client
            .remove_image(image.as_str(), Some(opts), None)
            .await
            .map_err(|e| map_image_remove_error(e, image.as_str()))?;

        Ok(())
    }

    async fn list_images(&self) -> Result<Vec<ImageSummary>, ImageError> {
        let opts = ListImagesOptions {
            all: true,
            ..Default::default()
        };

        let images = self
            .client
            .list_images(Some(opts))
            .await
            .map_err(|e| ImageError::Engine(e.to_string()))?;

        Ok(images
            .into_iter()
            .map(|img| ImageSummary {
                id: ImageId::new(img.id),
                tags: img.repo_tags,
            })
            .collect())
    }
}

#[async_trait]
impl ContainerOps for BollardEngine {
    async fn create_container(
        &self,
        config: &ContainerConfig,
    ) -> Result<ContainerId, ContainerError> {
        let body = ContainerCreateBody {
            image: Some(config.image.clone()),
            cmd: config.command.clone(),
            ..Default::default()
        };

        let opts = CreateContainerOptions {
            name: config.name.clone(),
            ..Default::default()
        };

        let response = self
            .client
            .create_container(Some(opts), body)
            .await
            .map_err(map_container_create_error)?;

        Ok(ContainerId::new(response.id))
    }

    async fn start_container(&self, id: &ContainerId) -> Result<(), ContainerError> {
        self.client
            .start_container(
                id.as_str(),
                None::<bollard::query_parameters::StartContainerOptions>,
            )
            .await
            .map_err(map_container_start_error)
    }

    async fn stop_container(
        &self,
        id: &ContainerId,
        timeout: Duration,
    ) -> Result<(), ContainerError> {
        let opts = StopContainerOptions {
            t: Some(timeout.as_secs() as i32),
            signal: None,
        };

        self.client
            .stop_container(id.as_str(), Some(opts))
            .await
            .map_err(map_container_stop_error)
    }

    async fn remove_container(&self, id: &ContainerId, force: bool) -> Result<(), ContainerError> {
        let opts = RemoveContainerOptions {
            force,
            ..Default::default()
        };

        self.client
            .remove_container(id.as_str(), Some(opts))
            .await
            .map_err(map_container_not_found_error)?;

        Ok(())
    }

    async fn container_state(&self, id: &ContainerId) -> Result<ContainerState, ContainerError> {
        let details = self
            .client
            .inspect_container(id.as_str(), None::<InspectContainerOptions>)
            .await
            .map_err(map_container_not_found_error)?;

        let state = details
            .state
            .as_ref()
            .and_then(|s| s.status)
            .map(|s| match s {
                bollard::models::ContainerStateStatusEnum::CREATED => ContainerState::Created,
                bollard::models::ContainerStateStatusEnum::RUNNING => ContainerState::Running,
                bollard::models::ContainerStateStatusEnum::PAUSED => ContainerState::Paused,
                bollard::models::ContainerStateStatusEnum::RESTARTING => ContainerState::Restarting,
                bollard::models::ContainerStateStatusEnum::REMOVING => ContainerState::Removing,
                bollard::models::ContainerStateStatusEnum::EXITED => ContainerState::Exited,
                bollard::models::ContainerStateStatusEnum::DEAD => ContainerState::Dead,
                _ => ContainerState::Exited,
            })
            .unwrap_or(ContainerState::Exited);

        Ok(state)
    }

    async fn find_container(&self, name: &str) -> Result<ContainerId, ContainerError> {
        // The inspect endpoint accepts names as well as ids.
        let details = self
            .client
            .inspect_container(name, None::<InspectContainerOptions>)
            .await
            .map_err(map_container_not_found_error)?;

        let id = details
            .id
            .ok_or_else(|| ContainerError::Engine(format!("no id reported for {}", name)))?;
        Ok(ContainerId::new(id))
    }

    async fn wait_container(&self, id: &ContainerId) -> Result<i64, ContainerError> {
        let mut stream = self
            .client
            .wait_container(id.as_str(), None::<WaitContainerOptions>);

        let mut exit_code = 0;
        while let Some(response) = stream.next().await {
            match response {
                Ok(wait) => exit_code = wait.status_code,
                // The wait endpoint reports nonzero exits as errors carrying
                // the status code; keep the code, that is the answer.
                Err(bollard::errors::Error::DockerContainerWaitError { code, .. }) => {
                    exit_code = code;
                }
                Err(e) => return Err(map_container_not_found_error(e)),
            }
        }

        Ok(exit_code)
    }

    async fn commit_container(
        &self,
        id: &ContainerId,
        reference: &RepoRef,
    ) -> Result<ImageId, ContainerError> {
        let opts = CommitContainerOptions {
            container: Some(id.to_string()),
            repo: Some(reference.name().to_string()),
            tag: Some(reference.tag().to_string()),
            ..Default::default()
        };

        let response = self
            .client
            .commit_container(opts, bollard::models::ContainerConfig::default())
            .await
            .map_err(|e| ContainerError::CommitFailed(e.to_string()))?;

        Ok(ImageId::new(response.id))
    }
}

#[async_trait]
impl ExecOps for BollardEngine {
    async fn exec(
        &self,
        container: &ContainerId,
        cmd: &[String],
    ) -> Result<ExecResult, ExecError> {
        let config = bollard::models::ExecConfig {
            cmd: Some(cmd.to_vec()),
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            ..Default::default()
        };

        let created = self
            .client
            .create_exec(container.as_str(), config)
            .await
            .map_err(map_exec_create_error)?;
        let exec_id = ExecId::new(created.id);

        let opts = StartExecOptions {
            detach: false,
            ..Default::default()
        };

        let result = self
            .client
            .start_exec(exec_id.as_str(), Some(opts))
            .await
            .map_err(|e| ExecError::Failed(e.to_string()))?;

        let mut collected = Vec::new();
        if let bollard::exec::StartExecResults::Attached { mut output, .. } = result {
            while let Some(item) = output.next().await {
                match item {
                    Ok(log) => {
                        let bytes = match log {
                            bollard::container::LogOutput::StdOut { message } => message,
                            bollard::container::LogOutput::StdErr { message } => message,
                            bollard::container::LogOutput::StdIn { message } => message,
                            bollard::container::LogOutput::Console { message } => message,
                        };
                        for line in String::from_utf8_lossy(&bytes).lines() {
                            collected.push(line.to_string());
                        }
                    }
                    Err(e) => return Err(ExecError::Failed(e.to_string())),
                }
            }
        }

        // Exit code is only available once the stream is fully drained.
        let details = self
            .client
            .inspect_exec(exec_id.as_str())
            .await
            .map_err(|e| ExecError::Engine(e.to_string()))?;

        Ok(ExecResult {
            exit_code: details.exit_code.unwrap_or(0),
            output: collected,
        })
    }
}

#[async_trait]
impl LogOps for BollardEngine {
    async fn container_logs(
        &self,
        id: &ContainerId,
        opts: &LogOptions,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<LogLine, LogError>> + Send>>, LogError> {
        let log_opts = LogsOptions {
            stdout: opts.stdout,
            stderr: opts.stderr,
            follow: opts.follow,
            tail: "all".to_string(),
            ..Default::default()
        };

        let stream = self.client.logs(id.as_str(), Some(log_opts));

        let mapped_stream = stream.map(|result| {
            result
                .map(|output| {
                    let (stream_type, data) = match output {
                        bollard::container::LogOutput::StdOut { message } => {
                            (LogStream::Stdout, message)
                        }
                        bollard::container::LogOutput::StdErr { message } => {
                            (LogStream::Stderr, message)
                        }
                        bollard::container::LogOutput::StdIn { message } => {
                            (LogStream::Stdout, message)
                        }
                        bollard::container::LogOutput::Console { message } => {
                            (LogStream::Stdout, message)
                        }
                    };

                    LogLine {
                        content: String::from_utf8_lossy(&data).to_string(),
                        stream: stream_type,
                    }
                })
                .map_err(|e| LogError::StreamError(e.to_string()))
        });

        Ok(Box::pin(mapped_stream))
    }
}
