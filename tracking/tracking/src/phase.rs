use std::fmt::{Display, Formatter};
use std::num::NonZeroU8;
use std::str::FromStr;

use thiserror::Error;

use crate::project::PhaseCount;
use crate::repair::RepairRecord;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    Survey,
    Progress,
    Finish,
}

impl Display for PhaseKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PhaseKind::Survey => f.write_str("Survey"),
            PhaseKind::Progress => f.write_str("Progress"),
            PhaseKind::Finish => f.write_str("Finish"),
        }
    }
}

/// A single documentation step of a repair.
///
/// Progress ordinals are 1-based.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Survey,
    Progress(NonZeroU8),
    Finish,
}

impl Phase {
    /// The ordinal is clamped to the range `1..=255`.
    pub fn progress(ordinal: usize) -> Self {
        Phase::Progress(progress_ordinal(ordinal))
    }

    pub fn kind(&self) -> PhaseKind {
        match self {
            Phase::Survey => PhaseKind::Survey,
            Phase::Progress(_) => PhaseKind::Progress,
            Phase::Finish => PhaseKind::Finish,
        }
    }
}

fn progress_ordinal(ordinal: usize) -> NonZeroU8 {
    let offset = u8::try_from(ordinal.saturating_sub(1)).unwrap_or(u8::MAX);
    NonZeroU8::MIN.saturating_add(offset)
}

/// `S`, `P<n>` or `F`
impl Display for Phase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Survey => f.write_str("S"),
            Phase::Progress(ordinal) => write!(f, "P{}", ordinal),
            Phase::Finish => f.write_str("F"),
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PhaseError {
    #[error("Invalid phase code. value: '{0}', expected: 'S', 'P<n>' or 'F'")]
    InvalidPhaseCode(String),
}

impl FromStr for Phase {
    type Err = PhaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "S" => Ok(Phase::Survey),
            "F" => Ok(Phase::Finish),
            _ => s
                .strip_prefix('P')
                .filter(|digits| !digits.starts_with('+'))
                .and_then(|digits| NonZeroU8::from_str(digits).ok())
                .map(Phase::Progress)
                .ok_or_else(|| PhaseError::InvalidPhaseCode(s.to_string())),
        }
    }
}

pub fn phase_code(phase: &Phase) -> String {
    phase.to_string()
}

/// Where a repair is in its documentation lifecycle.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CurrentPhase {
    Survey,
    Progress(NonZeroU8),
    Finish,
    Complete,
}

impl CurrentPhase {
    /// The phase awaiting submission, `None` when complete.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            CurrentPhase::Survey => Some(Phase::Survey),
            CurrentPhase::Progress(ordinal) => Some(Phase::Progress(*ordinal)),
            CurrentPhase::Finish => Some(Phase::Finish),
            CurrentPhase::Complete => None,
        }
    }
}

impl Display for CurrentPhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.phase() {
            Some(phase) => write!(f, "{}", phase),
            None => f.write_str("Complete"),
        }
    }
}

/// Survey, then each progress checkpoint in turn, then finish.
///
/// Progress entries beyond the number the repair type needs count as satisfied checkpoints.
pub fn current_phase(record: &RepairRecord, total_phases: PhaseCount) -> CurrentPhase {
    let phases = &record.phases;

    if phases.survey.is_none() {
        return CurrentPhase::Survey;
    }

    let needed = total_phases.progress_needed();
    let recorded = phases.progress.len();
    if recorded < needed {
        return CurrentPhase::Progress(progress_ordinal(recorded + 1));
    }

    match phases.finish {
        None => CurrentPhase::Finish,
        Some(_) => CurrentPhase::Complete,
    }
}

#[derive(Debug, serde::Serialize, Clone, Copy, PartialEq, Eq)]
pub struct PhaseStatus {
    pub survey: bool,
    pub progress_count: usize,
    pub progress_needed: usize,
    pub finish: bool,
    pub is_complete: bool,
}

pub fn phase_status(record: &RepairRecord, total_phases: PhaseCount) -> PhaseStatus {
    let survey = record.phases.survey.is_some();
    let progress_count = record.phases.progress.len();
    let progress_needed = total_phases.progress_needed();
    let finish = record.phases.finish.is_some();

    PhaseStatus {
        survey,
        progress_count,
        progress_needed,
        finish,
        is_complete: survey && progress_count >= progress_needed && finish,
    }
}
