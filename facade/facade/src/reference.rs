use std::fmt::{Display, Formatter};
use std::str::FromStr;

use thiserror::Error;

/// A repair type code, e.g. `CR`.
///
/// Codes are embedded in repair codes, which use `.` as a separator, so a code may only contain ascii letters, digits,
/// `-` and `_`.
#[derive(
    Debug,
    serde::Serialize,
    serde::Deserialize,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash
)]
#[serde(try_from = "String", into = "String")]
pub struct RepairTypeCode(String);

impl RepairTypeCode {
    fn is_valid(value: &str) -> bool {
        if value.is_empty() {
            return false;
        }

        value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }

    pub fn from_raw_str(value: &str) -> Self {
        assert!(Self::is_valid(value), "invalid repair type code: {:?}", value);

        Self(value.to_string())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl FromStr for RepairTypeCode {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_string())
    }
}

impl Display for RepairTypeCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl TryFrom<String> for RepairTypeCode {
    type Error = ReferenceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if Self::is_valid(&value) {
            Ok(Self(value))
        } else {
            Err(ReferenceError::InvalidRepairTypeCode(value))
        }
    }
}

impl From<RepairTypeCode> for String {
    fn from(value: RepairTypeCode) -> Self {
        value.0
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("Invalid repair type code: '{0}'")]
    InvalidRepairTypeCode(String),
}
