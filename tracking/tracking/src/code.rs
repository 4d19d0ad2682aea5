//! The canonical repair code.
//!
//! Short form: `D<drop>.L<level>.<repair_type>.<repair_index>`, e.g. `D5.L3.CR.1`
//! Full form: `D<drop>.L<level>.<repair_type>.<repair_index>.<measurement_string>.<phase_code>`, e.g.
//! `D5.L3.CR.1.100x100x40.S`

use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::LazyLock;

use facade::elevation::{DropNumber, LevelNumber};
use facade::reference::RepairTypeCode;
use regex::Regex;
use thiserror::Error;

use crate::phase::Phase;
use crate::repair::RepairIndex;

static REPAIR_CODE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    // Safety: the pattern is a constant
    Regex::new(r"^D(\d+)\.L(\d+)\.([A-Za-z0-9_-]+)\.(\d+)(?:\.([0-9.x]+)\.(S|P\d+|F))?$").unwrap()
});

/// Falls back to the short form when either of the measurement string or the phase code is empty.
pub fn full_repair_code(
    drop: DropNumber,
    level: LevelNumber,
    repair_type: &RepairTypeCode,
    repair_index: RepairIndex,
    measurement_string: &str,
    phase_code: &str,
) -> String {
    let address = format!("D{}.L{}.{}.{}", drop, level, repair_type, repair_index);

    if measurement_string.is_empty() || phase_code.is_empty() {
        return address;
    }

    format!("{}.{}.{}", address, measurement_string, phase_code)
}

/// Identifies a single repair within a project.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct RepairAddress {
    pub drop: DropNumber,
    pub level: LevelNumber,
    pub repair_type: RepairTypeCode,
    pub repair_index: RepairIndex,
}

impl RepairAddress {
    pub fn code(&self, measurement_string: &str, phase: Option<&Phase>) -> String {
        let phase_code = phase
            .map(|phase| phase.to_string())
            .unwrap_or_default();

        full_repair_code(
            self.drop,
            self.level,
            &self.repair_type,
            self.repair_index,
            measurement_string,
            &phase_code,
        )
    }
}

impl Display for RepairAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.code("", None))
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RepairCodeError {
    #[error("Invalid repair code. code: '{0}', expected: 'D<drop>.L<level>.<repair_type>.<repair_index>[.<measurements>.<phase>]'")]
    InvalidFormat(String),

    #[error("Invalid repair code number. code: '{code}', part: '{part}'")]
    InvalidNumber { code: String, part: String },

    #[error("Repair code must not contain a measurement string and phase. code: '{0}'")]
    UnexpectedPhase(String),
}

/// A parsed repair code, in either form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairCode {
    pub address: RepairAddress,
    /// Empty for the short form.
    pub measurement_string: String,
    pub phase: Option<Phase>,
}

impl Display for RepairCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(
            &self
                .address
                .code(&self.measurement_string, self.phase.as_ref()),
        )
    }
}

impl FromStr for RepairCode {
    type Err = RepairCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let captures = REPAIR_CODE_PATTERN
            .captures(s)
            .ok_or_else(|| RepairCodeError::InvalidFormat(s.to_string()))?;

        fn number(code: &str, part: &str) -> Result<u32, RepairCodeError> {
            u32::from_str(part).map_err(|_| RepairCodeError::InvalidNumber {
                code: code.to_string(),
                part: part.to_string(),
            })
        }

        let address = RepairAddress {
            drop: number(s, &captures[1])?,
            level: number(s, &captures[2])?,
            repair_type: RepairTypeCode::from_raw_str(&captures[3]),
            repair_index: number(s, &captures[4])?,
        };

        let measurement_string = captures
            .get(5)
            .map(|capture| capture.as_str().to_string())
            .unwrap_or_default();

        let phase = captures
            .get(6)
            .map(|capture| Phase::from_str(capture.as_str()))
            .transpose()
            .map_err(|_| RepairCodeError::InvalidFormat(s.to_string()))?;

        Ok(Self {
            address,
            measurement_string,
            phase,
        })
    }
}

impl FromStr for RepairAddress {
    type Err = RepairCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = RepairCode::from_str(s)?;
        match code.phase {
            Some(_) => Err(RepairCodeError::UnexpectedPhase(s.to_string())),
            None => Ok(code.address),
        }
    }
}
