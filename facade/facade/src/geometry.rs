//! Maps a project's elevations to the global drop/level address space.
//!
//! Elevations are laid out left to right, in order; the first drop of each elevation follows on from the last drop of
//! the previous one.  Levels are local to each elevation, so the same level number can be valid on one elevation and
//! invalid on the next.

use std::ops::RangeInclusive;

use thiserror::Error;

use crate::elevation::{validate_elevations, DropNumber, Elevation, ElevationError, LevelNumber};

/// How an unresolvable drop is displayed.
pub const NO_DATA: &str = "no-data";

/// Returns the elevation containing the drop, or `None` for drops outside all elevations.
pub fn resolve_elevation(drop: DropNumber, elevations: &[Elevation]) -> Option<&Elevation> {
    if drop == 0 {
        return None;
    }

    let mut running: u64 = 0;
    for elevation in elevations {
        let start = running + 1;
        let end = running + elevation.drops as u64;
        if (start..=end).contains(&(drop as u64)) {
            return Some(elevation);
        }
        running = end;
    }

    None
}

pub fn total_drops(elevations: &[Elevation]) -> u64 {
    elevations
        .iter()
        .map(|elevation| elevation.drops as u64)
        .sum()
}

pub fn max_level(drop: DropNumber, elevations: &[Elevation]) -> Option<LevelNumber> {
    resolve_elevation(drop, elevations).map(|elevation| elevation.levels)
}

pub fn is_cell_valid(drop: DropNumber, level: LevelNumber, elevations: &[Elevation]) -> bool {
    match max_level(drop, elevations) {
        Some(max_level) => level >= 1 && level <= max_level,
        None => false,
    }
}

/// The global, inclusive, drop range of the named elevation.
pub fn drop_range(name: &str, elevations: &[Elevation]) -> Option<RangeInclusive<DropNumber>> {
    let mut running: DropNumber = 0;
    for elevation in elevations {
        let start = running.checked_add(1)?;
        let end = running.checked_add(elevation.drops)?;
        if elevation.name.eq(name) {
            return Some(start..=end);
        }
        running = end;
    }

    None
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum GeometryError {
    #[error("Drop is outside all elevations. drop: {drop}, total_drops: {total_drops}")]
    DropOutOfRange { drop: DropNumber, total_drops: u64 },

    #[error("Level is out of range [1..{max_level}] (inclusive). drop: {drop}, level: {level}, elevation: '{elevation}'")]
    LevelOutOfRange {
        drop: DropNumber,
        level: LevelNumber,
        elevation: String,
        max_level: LevelNumber,
    },
}

/// A validated, ordered, list of elevations.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
#[serde(try_from = "Vec<Elevation>", into = "Vec<Elevation>")]
pub struct Geometry {
    elevations: Vec<Elevation>,
}

impl Geometry {
    pub fn new(elevations: Vec<Elevation>) -> Result<Self, ElevationError> {
        validate_elevations(&elevations)?;

        Ok(Self {
            elevations,
        })
    }

    pub fn elevations(&self) -> &[Elevation] {
        &self.elevations
    }

    pub fn find(&self, name: &str) -> Option<&Elevation> {
        self.elevations
            .iter()
            .find(|elevation| elevation.name.eq(name))
    }

    pub fn resolve(&self, drop: DropNumber) -> Option<&Elevation> {
        resolve_elevation(drop, &self.elevations)
    }

    pub fn total_drops(&self) -> u64 {
        total_drops(&self.elevations)
    }

    pub fn max_level(&self, drop: DropNumber) -> Option<LevelNumber> {
        max_level(drop, &self.elevations)
    }

    pub fn is_cell_valid(&self, drop: DropNumber, level: LevelNumber) -> bool {
        is_cell_valid(drop, level, &self.elevations)
    }

    pub fn drop_range(&self, name: &str) -> Option<RangeInclusive<DropNumber>> {
        drop_range(name, &self.elevations)
    }

    /// Returns the elevation for a valid drop/level pair.
    pub fn locate(&self, drop: DropNumber, level: LevelNumber) -> Result<&Elevation, GeometryError> {
        let elevation = self
            .resolve(drop)
            .ok_or(GeometryError::DropOutOfRange {
                drop,
                total_drops: self.total_drops(),
            })?;

        if level == 0 || level > elevation.levels {
            return Err(GeometryError::LevelOutOfRange {
                drop,
                level,
                elevation: elevation.name.clone(),
                max_level: elevation.levels,
            });
        }

        Ok(elevation)
    }
}

impl TryFrom<Vec<Elevation>> for Geometry {
    type Error = ElevationError;

    fn try_from(value: Vec<Elevation>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Geometry> for Vec<Elevation> {
    fn from(value: Geometry) -> Self {
        value.elevations
    }
}


#[cfg(test)]
mod geometry_tests {
    use crate::test::north_and_south_geometry;

    use super::*;

    #[test]
    fn locate() {
        // given
        let geometry = north_and_south_geometry();

        // expect
        assert_eq!(geometry.locate(6, 6).unwrap().name, "South");
        assert_eq!(geometry.locate(9, 1), Err(GeometryError::DropOutOfRange {
            drop: 9,
            total_drops: 8
        }));
        assert_eq!(geometry.locate(6, 7), Err(GeometryError::LevelOutOfRange {
            drop: 6,
            level: 7,
            elevation: "South".to_string(),
            max_level: 6,
        }));
    }

    #[test]
    fn invalid_elevations_are_rejected() {
        assert_eq!(Geometry::new(vec![]), Err(ElevationError::NoElevations));
    }

    #[test]
    fn deserializing_validates_the_elevations() {
        // given
        let content = r#"[{"name": "North", "drops": 0, "levels": 10}]"#;

        // when
        let result = serde_json::from_str::<Geometry>(content);

        // then
        assert!(result.is_err());
    }
}
