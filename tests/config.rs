// ABOUTME: Integration tests for configuration parsing and discovery.
// ABOUTME: Tests YAML parsing, defaults, and file loading from disk.

use burrow::config::{CONFIG_FILENAME, Config};
use burrow::engine::EngineKind;
use std::fs;

mod parsing {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let config = Config::from_yaml("engine: docker\n").unwrap();
        assert_eq!(config.engine, Some(EngineKind::Docker));
        assert!(config.socket.is_none());
        assert!(config.project.is_none());
    }

    #[test]
    fn parse_full_config() {
        let yaml = r#"
engine: podman
socket: /run/user/1000/podman/podman.sock
project: buildenv
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.engine, Some(EngineKind::Podman));
        assert_eq!(
            config.socket.as_deref(),
            Some("/run/user/1000/podman/podman.sock")
        );
        assert_eq!(config.project.as_deref(), Some("buildenv"));
    }

    #[test]
    fn invalid_engine_is_rejected() {
        assert!(Config::from_yaml("engine: lxc\n").is_err());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::from_yaml("engine: docker\nextra: 1\n").is_err());
    }
}

mod loading {
    use super::*;

    #[test]
    fn load_reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        fs::write(&path, "project: myproj\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.project.as_deref(), Some("myproj"));
        assert!(config.engine.is_none());
    }

    #[test]
    fn load_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(&dir.path().join(CONFIG_FILENAME)).is_err());
    }

    #[test]
    fn load_malformed_yaml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        fs::write(&path, "engine: [unclosed\n").unwrap();
        assert!(Config::load(&path).is_err());
    }
}
