use std::fmt::{Display, Formatter};

use thiserror::Error;

/// 1-based, global across all the elevations of a project.
pub type DropNumber = u32;
/// 1-based, local to the elevation containing the drop.
pub type LevelNumber = u32;

pub type ElevationName = String;

pub const MAX_ELEVATIONS: usize = 20;

/// A named facade segment, e.g. 'North', spanning `drops` columns and `levels` rows.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct Elevation {
    pub name: ElevationName,

    /// A value of 0 is invalid
    pub drops: u32,

    /// A value of 0 is invalid
    pub levels: u32,
}

impl Elevation {
    pub fn new(name: impl Into<ElevationName>, drops: u32, levels: u32) -> Self {
        Self {
            name: name.into(),
            drops,
            levels,
        }
    }
}

impl Display for Elevation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (drops: {}, levels: {})", self.name, self.drops, self.levels)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ElevationError {
    #[error("A project requires at least one elevation")]
    NoElevations,

    #[error("Too many elevations. count: {count}, max: {max}")]
    TooManyElevations { count: usize, max: usize },

    #[error("Invalid elevation name. name: '{0}'")]
    InvalidName(String),

    #[error("Duplicate elevation name. name: '{0}'")]
    DuplicateName(ElevationName),

    #[error("Elevation drop count must be at least 1. name: '{0}'")]
    NoDrops(ElevationName),

    #[error("Elevation level count must be at least 1. name: '{0}'")]
    NoLevels(ElevationName),
}

/// Validates a project's list of elevations.
pub fn validate_elevations(elevations: &[Elevation]) -> Result<(), ElevationError> {
    if elevations.is_empty() {
        return Err(ElevationError::NoElevations);
    }
    if elevations.len() > MAX_ELEVATIONS {
        return Err(ElevationError::TooManyElevations {
            count: elevations.len(),
            max: MAX_ELEVATIONS,
        });
    }

    for (index, elevation) in elevations.iter().enumerate() {
        if elevation.name.trim().is_empty() || elevation.name.trim() != elevation.name {
            return Err(ElevationError::InvalidName(elevation.name.clone()));
        }
        if elevations[..index]
            .iter()
            .any(|candidate| candidate.name.eq(&elevation.name))
        {
            return Err(ElevationError::DuplicateName(elevation.name.clone()));
        }
        if elevation.drops == 0 {
            return Err(ElevationError::NoDrops(elevation.name.clone()));
        }
        if elevation.levels == 0 {
            return Err(ElevationError::NoLevels(elevation.name.clone()));
        }
    }

    Ok(())
}
