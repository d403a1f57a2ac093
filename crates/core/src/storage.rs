//! Storage mode selection.

use crate::error::CoreError;

/// Where annotation records are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    /// Primary JSONL files only.
    #[default]
    Local,
    /// Primary JSONL files plus a best-effort mirror.
    LocalWithMirror,
}

/// Valid `storage_mode` values.
const VALID_MODES: &[&str] = &["local", "local+mirror"];

impl StorageMode {
    /// Parse a configuration value.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name.trim() {
            "local" => Ok(Self::Local),
            "local+mirror" => Ok(Self::LocalWithMirror),
            other => Err(CoreError::Validation(format!(
                "Unknown storage mode '{other}'. Must be one of: {}",
                VALID_MODES.join(", ")
            ))),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::LocalWithMirror => "local+mirror",
        }
    }

    pub fn mirrors(self) -> bool {
        matches!(self, Self::LocalWithMirror)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_modes() {
        assert_eq!(StorageMode::from_name("local").unwrap(), StorageMode::Local);
        assert_eq!(
            StorageMode::from_name(" local+mirror ").unwrap(),
            StorageMode::LocalWithMirror
        );
    }

    #[test]
    fn rejects_unknown_mode() {
        assert!(StorageMode::from_name("cloud").is_err());
        assert!(StorageMode::from_name("").is_err());
    }

    #[test]
    fn name_round_trips() {
        for mode in [StorageMode::Local, StorageMode::LocalWithMirror] {
            assert_eq!(StorageMode::from_name(mode.name()).unwrap(), mode);
        }
    }
}
