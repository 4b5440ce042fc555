//! Demo configuration: defaults, command line, optional JSON override

use std::path::PathBuf;

use attune_core::Size2D;
use attune_runtime::{BlobConfig, SessionConfig, TreeConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharacterKind {
    Tree,
    Blob,
}

/// Everything the demo can be told
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub character: CharacterKind,
    /// Simulated display size
    pub viewport: Size2D,
    pub tree: TreeConfig,
    pub blob: BlobConfig,
    /// Overrides the character's preset session config
    pub session: Option<SessionConfig>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            character: CharacterKind::Tree,
            viewport: Size2D::new(1280.0, 720.0),
            tree: TreeConfig::default(),
            blob: BlobConfig::default(),
            session: None,
        }
    }
}

impl DemoConfig {
    pub fn session_config(&self) -> SessionConfig {
        match (&self.session, self.character) {
            (Some(session), _) => session.clone(),
            (None, CharacterKind::Tree) => SessionConfig::tree(),
            (None, CharacterKind::Blob) => SessionConfig::blob(),
        }
    }

    /// `--config <file.json>`, then `--tree`/`--blob` and `--quick`
    pub fn from_args(args: impl IntoIterator<Item = String>) -> Result<Self, Box<dyn std::error::Error>> {
        let mut config_path: Option<PathBuf> = None;
        let mut character = None;
        let mut quick = false;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    let path = args.next().ok_or("--config needs a file path")?;
                    config_path = Some(PathBuf::from(path));
                }
                "--tree" => character = Some(CharacterKind::Tree),
                "--blob" => character = Some(CharacterKind::Blob),
                "--quick" => quick = true,
                other => return Err(format!("unknown argument: {other}").into()),
            }
        }

        let mut config = match config_path {
            Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
            None => DemoConfig::default(),
        };
        if let Some(character) = character {
            config.character = character;
        }
        if quick {
            config.tree = TreeConfig {
                seed: config.tree.seed,
                ..TreeConfig::quick()
            };
        }

        config.tree.validate()?;
        config.blob.validate()?;
        config.session_config().validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_defaults() {
        let config = DemoConfig::from_args(Vec::new()).unwrap();
        assert_eq!(config.character, CharacterKind::Tree);
        assert!(config.session_config().hold_until_ready);
    }

    #[test]
    fn test_flags() {
        let config = DemoConfig::from_args(args(&["--blob", "--quick"])).unwrap();
        assert_eq!(config.character, CharacterKind::Blob);
        assert_eq!(config.tree.cycle, attune_state::GrowthCycleConfig::quick());
        assert!(config.session_config().face_lost_timeout.is_some());
        assert!(DemoConfig::from_args(args(&["--bogus"])).is_err());
        assert!(DemoConfig::from_args(args(&["--config"])).is_err());
    }

    #[test]
    fn test_partial_json() {
        let config: DemoConfig =
            serde_json::from_str(r#"{ "character": "blob", "viewport": { "width": 640.0, "height": 480.0 } }"#)
                .unwrap();
        assert_eq!(config.character, CharacterKind::Blob);
        assert_eq!(config.viewport, Size2D::new(640.0, 480.0));
        assert_eq!(config.tree, TreeConfig::default());
    }

    #[test]
    fn test_example_file_parses() {
        let config: DemoConfig = serde_json::from_str(include_str!("../config.example.json")).unwrap();
        assert!(config.tree.cycle.bloom_gates_advance);
        assert!(config.tree.validate().is_ok());
        assert!(config.session_config().validate().is_ok());
    }
}
