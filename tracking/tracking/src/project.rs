use std::fmt::{Display, Formatter};

use facade::elevation::{Elevation, ElevationError};
use facade::geometry::Geometry;
use facade::reference::RepairTypeCode;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

pub type ProjectId = String;

pub const MIN_PHASES: u8 = 3;
pub const MAX_PHASES: u8 = 10;

/// The total number of documentation phases for a repair type, including the survey and the finish.
///
/// Always in the range [`MIN_PHASES`]..=[`MAX_PHASES`].
#[derive(
    Debug,
    serde::Serialize,
    serde::Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash
)]
#[serde(try_from = "u8", into = "u8")]
pub struct PhaseCount(u8);

impl PhaseCount {
    pub fn get(&self) -> u8 {
        self.0
    }

    /// The number of progress phases between the survey and the finish.
    pub fn progress_needed(&self) -> usize {
        self.0.saturating_sub(2) as usize
    }
}

impl TryFrom<u8> for PhaseCount {
    type Error = ProjectError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (MIN_PHASES..=MAX_PHASES).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ProjectError::InvalidPhaseCount(value))
        }
    }
}

impl From<PhaseCount> for u8 {
    fn from(value: PhaseCount) -> Self {
        value.0
    }
}

impl Display for PhaseCount {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The project-specific configuration of a repair type.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct RepairTypeConfig {
    pub repair_type_id: Uuid,
    pub code: RepairTypeCode,
    pub phases: PhaseCount,

    /// e.g. `m3`, `m2`, `m`, `each`
    pub unit_to_charge: String,

    /// Price per `unit_to_charge`
    pub unit_price: Decimal,

    #[serde(default)]
    pub minimum_charge: Decimal,
}

impl RepairTypeConfig {
    pub fn new(code: RepairTypeCode, phases: PhaseCount, unit_to_charge: String, unit_price: Decimal) -> Self {
        Self {
            repair_type_id: Uuid::new_v4(),
            code,
            phases,
            unit_to_charge,
            unit_price,
            minimum_charge: Decimal::ZERO,
        }
    }

    /// Returns `None` on overflow.
    pub fn charge(&self, quantity: Decimal) -> Option<Decimal> {
        quantity
            .checked_mul(self.unit_price)
            .map(|charge| charge.max(self.minimum_charge))
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct Project {
    pub name: ProjectId,

    pub elevations: Geometry,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde(default)]
    pub repair_types: Vec<RepairTypeConfig>,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ProjectError {
    #[error("Phase count must be in the range [{min}..{max}] (inclusive). value: {0}", min = MIN_PHASES, max = MAX_PHASES)]
    InvalidPhaseCount(u8),

    #[error("Invalid elevations. cause: {0}")]
    InvalidElevations(#[from] ElevationError),

    #[error("Repair type is not configured for this project. code: '{0}'")]
    UnknownRepairType(RepairTypeCode),

    #[error("Repair type is already configured for this project. code: '{0}'")]
    DuplicateRepairType(RepairTypeCode),
}

impl Project {
    pub fn new(name: ProjectId, elevations: Vec<Elevation>) -> Result<Self, ProjectError> {
        let elevations = Geometry::new(elevations)?;

        info!(
            "Created project. name: '{}', elevations: [{}], total_drops: {}",
            name,
            elevations
                .elevations()
                .iter()
                .map(|elevation| elevation.to_string())
                .collect::<Vec<_>>()
                .join(", "),
            elevations.total_drops()
        );

        Ok(Self {
            name,
            elevations,
            repair_types: vec![],
        })
    }

    pub fn geometry(&self) -> &Geometry {
        &self.elevations
    }

    pub fn add_repair_type(&mut self, config: RepairTypeConfig) -> Result<(), ProjectError> {
        if self
            .repair_types
            .iter()
            .any(|candidate| candidate.code.eq(&config.code))
        {
            return Err(ProjectError::DuplicateRepairType(config.code));
        }

        info!(
            "Added repair type. code: '{}', phases: {}, unit_to_charge: '{}', unit_price: {}",
            config.code, config.phases, config.unit_to_charge, config.unit_price
        );
        self.repair_types.push(config);

        Ok(())
    }

    pub fn find_repair_type(&self, code: &RepairTypeCode) -> Result<&RepairTypeConfig, ProjectError> {
        self.repair_types
            .iter()
            .find(|candidate| candidate.code.eq(code))
            .ok_or_else(|| ProjectError::UnknownRepairType(code.clone()))
    }
}
