//! Error taxonomy
//!
//! Simulation errors never escape `tick()`: they are produced where a problem is
//! detected, logged, and absorbed. Storage errors are returned to the host.

use std::fmt;

/// Problems the simulation absorbs locally
#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    /// A generated coordinate or size is non-finite or negative
    InvalidGeometry {
        entity: &'static str,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
    },
    /// The renderer could not report a usable surface size
    MissingSurfaceMetric { reported: Option<f32> },
    /// No stat table entry exists for an enemy species
    UnknownStatTable { species: String },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidGeometry { entity, x, y, w, h } => write!(
                f,
                "invalid geometry for {entity}: pos=({x}, {y}) size=({w}, {h})"
            ),
            Self::MissingSurfaceMetric { reported } => match reported {
                Some(value) => write!(f, "unusable surface height reported: {value}"),
                None => write!(f, "surface height not reported"),
            },
            Self::UnknownStatTable { species } => {
                write!(f, "no stat table for species '{species}'")
            }
        }
    }
}

impl std::error::Error for SimError {}

/// Failures reading or writing tuning files and leaderboards
#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "storage i/o error: {err}"),
            Self::Json(err) => write!(f, "storage format error: {err}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = SimError::UnknownStatTable {
            species: "slime".into(),
        };
        assert_eq!(err.to_string(), "no stat table for species 'slime'");

        let err = SimError::MissingSurfaceMetric { reported: None };
        assert_eq!(err.to_string(), "surface height not reported");
    }

    #[test]
    fn test_storage_error_from_json() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: StorageError = json_err.into();
        assert!(matches!(err, StorageError::Json(_)));
    }
}
