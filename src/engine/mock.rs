// ABOUTME: Scripted in-memory engine for unit tests.
// ABOUTME: Records every call and replays configured images/logs/exit codes.

use crate::engine::traits::sealed::Sealed;
use crate::engine::traits::{
    ContainerConfig, ContainerError, ContainerOps, ContainerState, EngineInfo, EngineInfoError,
    ExecError, ExecOps, ExecResult, ImageError, ImageOps, ImageSummary, LogError, LogLine, LogOps,
    LogOptions, LogStream,
};
use crate::types::{ContainerId, ImageId, RepoRef};
use async_trait::async_trait;
use futures::Stream;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::pin::Pin;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockContainer {
    pub image: String,
    pub command: Option<Vec<String>>,
    pub state: ContainerState,
}

/// In-memory engine with scripted behavior.
///
/// `calls` records every capability invocation by name so tests can assert
/// on interaction counts (or their absence).
#[derive(Default)]
pub struct MockEngine {
    pub images: Mutex<HashMap<String, ImageId>>,
    pub image_tags: Mutex<HashMap<String, Vec<String>>>,
    pub containers: Mutex<HashMap<String, MockContainer>>,
    pub containers_by_name: Mutex<HashMap<String, ContainerId>>,
    pub log_lines: Mutex<Vec<String>>,
    pub wait_code: Mutex<i64>,
    pub exec_result: Mutex<Option<(i64, Vec<String>)>>,
    /// When set, containers report Running even after wait completes,
    /// forcing the stop-before-remove path.
    pub running_after_wait: Mutex<bool>,
    pub calls: Mutex<Vec<String>>,
    /// Every container configuration passed to `create_container`.
    pub created: Mutex<Vec<ContainerConfig>>,
    next_id: Mutex<u64>,
    commits: Mutex<u64>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine pre-seeded with a single tagged image.
    pub fn with_image(reference: &str, id: &str) -> Self {
        let engine = Self::new();
        engine
            .images
            .lock()
            .insert(reference.to_string(), ImageId::new(id.to_string()));
        engine
    }

    pub fn set_logs(&self, lines: &[&str]) {
        *self.log_lines.lock() = lines.iter().map(|l| l.to_string()).collect();
    }

    pub fn set_wait_code(&self, code: i64) {
        *self.wait_code.lock() = code;
    }

    pub fn set_exec_result(&self, code: i64, lines: &[&str]) {
        *self.exec_result.lock() = Some((code, lines.iter().map(|l| l.to_string()).collect()));
    }

    pub fn register_container(&self, name: &str, state: ContainerState) -> ContainerId {
        let id = self.fresh_id("container");
        let container_id = ContainerId::new(id.clone());
        self.containers.lock().insert(
            id,
            MockContainer {
                image: String::new(),
                command: None,
                state,
            },
        );
        self.containers_by_name
            .lock()
            .insert(name.to_string(), container_id.clone());
        container_id
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.calls.lock().iter().filter(|c| *c == name).count()
    }

    pub fn image_id(&self, reference: &str) -> Option<ImageId> {
        self.images.lock().get(reference).cloned()
    }

    pub fn container_exists(&self, id: &ContainerId) -> bool {
        self.containers.lock().contains_key(id.as_str())
    }

    fn record(&self, name: &str) {
        self.calls.lock().push(name.to_string());
    }

    fn fresh_id(&self, prefix: &str) -> String {
        let mut next = self.next_id.lock();
        *next += 1;
        format!("{}-{}", prefix, *next)
    }
}

impl Sealed for MockEngine {}

#[async_trait]
impl EngineInfo for MockEngine {
    async fn ping(&self) -> Result<(), EngineInfoError> {
        self.record("ping");
        Ok(())
    }
}

#[async_trait]
impl ImageOps for MockEngine {
    async fn inspect_image(&self, reference: &str) -> Result<ImageId, ImageError> {
        self.record("inspect_image");
        self.images
            .lock()
            .get(reference)
            .cloned()
            .ok_or_else(|| ImageError::NotFound(reference.to_string()))
    }

    async fn pull_image(&self, reference: &RepoRef) -> Result<ImageId, ImageError> {
        self.record("pull_image");
        let id = ImageId::new(format!("sha256:pulled-{}", reference.name()));
        self.images.lock().insert(reference.to_string(), id.clone());
        Ok(id)
    }

    async fn tag_image(&self, image: &ImageId, reference: &RepoRef) -> Result<(), ImageError> {
        self.record("tag_image");
        self.images
            .lock()
            .insert(reference.to_string(), image.clone());
        self.image_tags
            .lock()
            .entry(image.to_string())
            .or_default()
            .push(reference.to_string());
        Ok(())
    }

    async fn remove_image(&self, image: &ImageId, _force: bool) -> Result<(), ImageError> {
        self.record("remove_image");
        let mut images = self.images.lock();
        let before = images.len();
        images.retain(|_, id| id != image);
        if images.len() == before {
            return Err(ImageError::NotFound(image.to_string()));
        }
        Ok(())
    }

    async fn list_images(&self) -> Result<Vec<ImageSummary>, ImageError> {
        self.record("list_images");
        let mut by_id: HashMap<String, Vec<String>> = HashMap::new();
        for (reference, id) in self.images.lock().iter() {
            by_id.entry(id.to_string()).or_default().push(reference.clone());
        }
        Ok(by_id
            .into_iter()
            .map(|(id, mut tags)| {
                tags.sort();
                ImageSummary {
                    id: ImageId::new(id),
                    tags,
                }
            })
            .collect())
    }
}

#[async_trait]
impl ContainerOps for MockEngine {
    async fn create_container(
        &self,
        config: &ContainerConfig,
    ) -> Result<ContainerId, ContainerError> {
        self.record("create_container");
        self.created.lock().push(config.clone());
        let id = self.fresh_id("container");
        self.containers.lock().insert(
            id.clone(),
            MockContainer {
                image: config.image.clone(),
                command: config.command.clone(),
                state: ContainerState::Created,
            },
        );
        if let Some(name) = &config.name {
            self.containers_by_name
                .lock()
                .insert(name.clone(), ContainerId::new(id.clone()));
        }
        Ok(ContainerId::new(id))
    }

    async fn start_container(&self, id: &ContainerId) -> Result<(), ContainerError> {
        self.record("start_container");
        let mut containers = self.containers.lock();
        let container = containers
            .get_mut(id.as_str())
            .ok_or_else(|| ContainerError::NotFound(id.to_string()))?;
        container.state = ContainerState::Running;
        Ok(())
    }

    async fn stop_container(
        &self,
        id: &ContainerId,
        _timeout: Duration,
    ) -> Result<(), ContainerError> {
        self.record("stop_container");
        let mut containers = self.containers.lock();
        let container = containers
            .get_mut(id.as_str())
            .ok_or_else(|| ContainerError::NotFound(id.to_string()))?;
        container.state = ContainerState::Exited;
        Ok(())
    }

    async fn remove_container(&self, id: &ContainerId, _force: bool) -> Result<(), ContainerError> {
        self.record("remove_container");
        self.containers
            .lock()
            .remove(id.as_str())
            .ok_or_else(|| ContainerError::NotFound(id.to_string()))?;
        Ok(())
    }

    async fn container_state(&self, id: &ContainerId) -> Result<ContainerState, ContainerError> {
        self.record("container_state");
        let containers = self.containers.lock();
        let container = containers
            .get(id.as_str())
            .ok_or_else(|| ContainerError::NotFound(id.to_string()))?;
        if container.state == ContainerState::Running && !*self.running_after_wait.lock() {
            return Ok(ContainerState::Exited);
        }
        Ok(container.state)
    }

    async fn find_container(&self, name: &str) -> Result<ContainerId, ContainerError> {
        self.record("find_container");
        self.containers_by_name
            .lock()
            .get(name)
            .cloned()
            .ok_or_else(|| ContainerError::NotFound(name.to_string()))
    }

    async fn wait_container(&self, id: &ContainerId) -> Result<i64, ContainerError> {
        self.record("wait_container");
        if !self.containers.lock().contains_key(id.as_str()) {
            return Err(ContainerError::NotFound(id.to_string()));
        }
        Ok(*self.wait_code.lock())
    }

    async fn commit_container(
        &self,
        id: &ContainerId,
        reference: &RepoRef,
    ) -> Result<ImageId, ContainerError> {
        self.record("commit_container");
        if !self.containers.lock().contains_key(id.as_str()) {
            return Err(ContainerError::NotFound(id.to_string()));
        }
        let mut commits = self.commits.lock();
        *commits += 1;
        let new_id = ImageId::new(format!("sha256:commit-{}", *commits));
        self.images
            .lock()
            .insert(reference.to_string(), new_id.clone());
        Ok(new_id)
    }
}

#[async_trait]
impl ExecOps for MockEngine {
    async fn exec(
        &self,
        container: &ContainerId,
        _cmd: &[String],
    ) -> Result<ExecResult, ExecError> {
        self.record("exec");
        if !self.containers.lock().contains_key(container.as_str()) {
            return Err(ExecError::ContainerNotFound(container.to_string()));
        }
        let (exit_code, output) = self.exec_result.lock().clone().unwrap_or((0, Vec::new()));
        Ok(ExecResult { exit_code, output })
    }
}

#[async_trait]
impl LogOps for MockEngine {
    async fn container_logs(
        &self,
        id: &ContainerId,
        _opts: &LogOptions,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<LogLine, LogError>> + Send>>, LogError> {
        self.record("container_logs");
        if !self.containers.lock().contains_key(id.as_str()) {
            return Err(LogError::ContainerNotFound(id.to_string()));
        }
        let lines: Vec<Result<LogLine, LogError>> = self
            .log_lines
            .lock()
            .iter()
            .map(|l| {
                Ok(LogLine {
                    content: format!("{l}\n"),
                    stream: LogStream::Stdout,
                })
            })
            .collect();
        Ok(Box::pin(futures::stream::iter(lines)))
    }
}
