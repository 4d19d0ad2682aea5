use std::fmt::{Display, Formatter};

use facade::elevation::{DropNumber, ElevationName, LevelNumber};
use facade::reference::RepairTypeCode;
use facade::unit_measure::Measurements;
use thiserror::Error;
use time::serde::rfc3339;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::code::RepairAddress;
use crate::phase::{current_phase, CurrentPhase, Phase};
use crate::project::{PhaseCount, ProjectId};

/// 1-based, unique within (project, drop, level, repair type).
pub type RepairIndex = u32;

pub type PhotoUrl = String;

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
pub struct RepairId(pub Uuid);

impl RepairId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RepairId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RepairId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct SurveyPhase {
    pub author: String,
    #[serde(with = "rfc3339")]
    pub created_at: OffsetDateTime,
    pub repair_type: RepairTypeCode,
    pub measurements: Measurements,
    /// 1..=3
    pub photos: Vec<PhotoUrl>,
    #[serde(default)]
    pub comments: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct ProgressPhase {
    pub author: String,
    #[serde(with = "rfc3339")]
    pub created_at: OffsetDateTime,
    pub repair_type: RepairTypeCode,
    pub measurements: Measurements,
    pub photo: PhotoUrl,
    #[serde(default)]
    pub comments: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct FinishPhase {
    pub author: String,
    #[serde(with = "rfc3339")]
    pub created_at: OffsetDateTime,
    /// 1..=3
    pub photos: Vec<PhotoUrl>,
    #[serde(default)]
    pub comments: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct RepairPhases {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub survey: Option<SurveyPhase>,

    // the order of progress phases must be preserved.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde(default)]
    pub progress: Vec<ProgressPhase>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub finish: Option<FinishPhase>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum RepairStatus {
    InProgress,
    Complete,
}

impl Default for RepairStatus {
    fn default() -> Self {
        Self::InProgress
    }
}

impl Display for RepairStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RepairStatus::InProgress => f.write_str("InProgress"),
            RepairStatus::Complete => f.write_str("Complete"),
        }
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct RepairRecord {
    pub id: RepairId,
    pub project_id: ProjectId,
    /// Derived from the drop, when the record was created.
    pub elevation_name: ElevationName,
    pub drop: DropNumber,
    pub level: LevelNumber,
    pub repair_type: RepairTypeCode,
    pub repair_index: RepairIndex,
    #[serde(default)]
    pub status: RepairStatus,
    #[serde(default)]
    pub phases: RepairPhases,
}

/// An append-only change to a repair record.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum RepairPatch {
    AppendProgress(ProgressPhase),
    Finish(FinishPhase),
}

impl RepairPatch {
    pub fn phase(&self, record: &RepairRecord) -> Phase {
        match self {
            RepairPatch::AppendProgress(_) => Phase::progress(record.phases.progress.len() + 1),
            RepairPatch::Finish(_) => Phase::Finish,
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RepairError {
    #[error("Phase is out of sequence. repair: '{repair}', expected: {expected}, requested: {requested}")]
    PhaseOutOfSequence {
        repair: RepairAddress,
        expected: CurrentPhase,
        requested: Phase,
    },
}

impl RepairRecord {
    pub fn address(&self) -> RepairAddress {
        RepairAddress {
            drop: self.drop,
            level: self.level,
            repair_type: self.repair_type.clone(),
            repair_index: self.repair_index,
        }
    }

    pub fn current_phase(&self, total_phases: PhaseCount) -> CurrentPhase {
        current_phase(self, total_phases)
    }

    /// The measurements of the most recent phase that has them.
    pub fn latest_measurements(&self) -> Option<&Measurements> {
        self.phases
            .progress
            .last()
            .map(|progress| &progress.measurements)
            .or_else(|| {
                self.phases
                    .survey
                    .as_ref()
                    .map(|survey| &survey.measurements)
            })
    }

    /// Applies the patch, only if it is for the current phase of the repair.
    pub fn apply(&mut self, patch: RepairPatch, total_phases: PhaseCount) -> Result<(), RepairError> {
        let expected = self.current_phase(total_phases);
        let requested = patch.phase(self);

        if expected.phase() != Some(requested) {
            return Err(RepairError::PhaseOutOfSequence {
                repair: self.address(),
                expected,
                requested,
            });
        }

        match patch {
            RepairPatch::AppendProgress(progress) => self.phases.progress.push(progress),
            RepairPatch::Finish(finish) => self.phases.finish = Some(finish),
        }

        self.refresh_status(total_phases);

        info!("Applied repair phase. repair: '{}', phase: {}, status: {}", self.address(), requested, self.status);

        Ok(())
    }

    pub fn refresh_status(&mut self, total_phases: PhaseCount) {
        self.status = match self.current_phase(total_phases) {
            CurrentPhase::Complete => RepairStatus::Complete,
            _ => RepairStatus::InProgress,
        };
    }
}

/// The index for a new repair: one more than the highest existing index for the same location and repair type.
///
/// Indices are never reclaimed, unless the highest indexed repair is removed from the store.
pub fn next_repair_index(
    records: &[RepairRecord],
    project_id: &str,
    drop: DropNumber,
    level: LevelNumber,
    repair_type: &RepairTypeCode,
) -> RepairIndex {
    records
        .iter()
        .filter(|record| {
            record.project_id == project_id
                && record.drop == drop
                && record.level == level
                && record.repair_type.eq(repair_type)
        })
        .map(|record| record.repair_index)
        .max()
        .map_or(1, |index| index.saturating_add(1))
}
