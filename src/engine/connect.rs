// ABOUTME: Container client factory: endpoint resolution and connection.
// ABOUTME: Docker uses the fixed local socket; Podman a user-scoped one.

use super::bollard::BollardEngine;
use super::traits::EngineInfo;
use super::types::{EngineEndpoint, EngineKind};
use crate::process::{ProcessError, ProcessRunner};
use bollard::Docker;
use std::path::Path;

pub const DOCKER_SOCKET: &str = "/var/run/docker.sock";

/// Error while resolving or connecting to an engine endpoint.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("container engine unreachable at {endpoint}: {reason}")]
    EngineUnreachable { endpoint: String, reason: String },

    #[error("could not resolve the invoking user id: {0}")]
    UidResolution(String),

    #[error(transparent)]
    Process(#[from] ProcessError),
}

/// Resolve the connection endpoint for the requested engine.
///
/// Docker connects to the fixed local daemon socket. Podman runs rootless,
/// so the socket lives under the invoking user's runtime directory; the
/// numeric uid is resolved by shelling out to `id -u` in `cwd`.
pub async fn resolve_endpoint(
    kind: EngineKind,
    socket_override: Option<&str>,
    cwd: &Path,
) -> Result<EngineEndpoint, ConnectError> {
    if let Some(socket) = socket_override {
        return Ok(EngineEndpoint {
            kind,
            socket_path: socket.to_string(),
        });
    }

    let socket_path = match kind {
        EngineKind::Docker => DOCKER_SOCKET.to_string(),
        EngineKind::Podman => {
            let runner = ProcessRunner::new(cwd);
            let output = runner.run_quiet(&["id", "-u"]).await?;
            if !output.success() {
                return Err(ConnectError::UidResolution(format!(
                    "`id -u` exited with code {}",
                    output.exit_code
                )));
            }
            let uid = output.combined().trim().to_string();
            if uid.is_empty() {
                return Err(ConnectError::UidResolution(
                    "`id -u` produced no output".to_string(),
                ));
            }
            format!("/run/user/{uid}/podman/podman.sock")
        }
    };

    Ok(EngineEndpoint { kind, socket_path })
}

/// Connect to the engine at the given endpoint and verify it is reachable.
///
/// The bollard client connects lazily, so a ping is issued before handing
/// the engine out; any failure surfaces as `EngineUnreachable` rather than
/// a degraded client.
pub async fn connect(endpoint: &EngineEndpoint) -> Result<BollardEngine, ConnectError> {
    let client = Docker::connect_with_unix(&endpoint.socket_path, 120, bollard::API_DEFAULT_VERSION)
        .map_err(|e| ConnectError::EngineUnreachable {
            endpoint: endpoint.socket_path.clone(),
            reason: e.to_string(),
        })?;

    let engine = BollardEngine::new(client, endpoint.kind);
    engine
        .ping()
        .await
        .map_err(|e| ConnectError::EngineUnreachable {
            endpoint: endpoint.socket_path.clone(),
            reason: e.to_string(),
        })?;

    tracing::debug!(kind = %endpoint.kind, socket = %endpoint.socket_path, "engine connected");
    Ok(engine)
}

/// Resolve and connect in one step.
pub async fn connect_engine(
    kind: EngineKind,
    socket_override: Option<&str>,
    cwd: &Path,
) -> Result<BollardEngine, ConnectError> {
    let endpoint = resolve_endpoint(kind, socket_override, cwd).await?;
    connect(&endpoint).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn docker_endpoint_is_fixed_socket() {
        let endpoint = resolve_endpoint(EngineKind::Docker, None, Path::new("/tmp"))
            .await
            .unwrap();
        assert_eq!(endpoint.socket_path, DOCKER_SOCKET);
    }

    #[tokio::test]
    async fn override_wins_over_resolution() {
        let endpoint = resolve_endpoint(
            EngineKind::Podman,
            Some("/tmp/custom.sock"),
            Path::new("/tmp"),
        )
        .await
        .unwrap();
        assert_eq!(endpoint.socket_path, "/tmp/custom.sock");
    }

    #[tokio::test]
    async fn podman_endpoint_embeds_uid() {
        let endpoint = resolve_endpoint(EngineKind::Podman, None, Path::new("/tmp"))
            .await
            .unwrap();
        assert!(endpoint.socket_path.starts_with("/run/user/"));
        assert!(endpoint.socket_path.ends_with("/podman/podman.sock"));
        // The uid segment must be numeric.
        let uid = endpoint
            .socket_path
            .trim_start_matches("/run/user/")
            .trim_end_matches("/podman/podman.sock");
        assert!(uid.chars().all(|c| c.is_ascii_digit()), "uid: {uid}");
    }
}
