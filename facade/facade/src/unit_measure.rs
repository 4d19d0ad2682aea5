//! The unit-measure registry.
//!
//! Each unit-measure type has a fixed, ordered, list of dimension fields.  Validation, rendering and parsing of
//! measurements are all driven by the field descriptors, adding a new kind of measurement only requires a new entry
//! in the registry.

use std::collections::BTreeMap;
use std::str::FromStr;

use itertools::Itertools;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::warn;

/// Dimension name to value, e.g. `width` = `100`
pub type Measurements = BTreeMap<String, Decimal>;

pub const MEASUREMENT_SEPARATOR: char = 'x';

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
    Hash,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::EnumIter,
    strum_macros::AsRefStr
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UnitMeasureType {
    Volume,
    Area,
    AreaThickness,
    Length,
    LengthThickness,
    Each,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    /// Optional fields fall back to the repair type's default value.
    pub required: bool,
}

const fn required(name: &'static str) -> FieldDescriptor {
    FieldDescriptor {
        name,
        required: true,
    }
}

const fn optional(name: &'static str) -> FieldDescriptor {
    FieldDescriptor {
        name,
        required: false,
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct UnitMeasureDescriptor {
    pub kind: UnitMeasureType,
    pub fields: &'static [FieldDescriptor],
}

// the order of entries must match the declaration order of `UnitMeasureType`.
static REGISTRY: [UnitMeasureDescriptor; 6] = [
    UnitMeasureDescriptor {
        kind: UnitMeasureType::Volume,
        fields: &[required("width"), required("height"), optional("depth")],
    },
    UnitMeasureDescriptor {
        kind: UnitMeasureType::Area,
        fields: &[required("width"), required("height")],
    },
    UnitMeasureDescriptor {
        kind: UnitMeasureType::AreaThickness,
        fields: &[required("width"), required("height"), optional("thickness")],
    },
    UnitMeasureDescriptor {
        kind: UnitMeasureType::Length,
        fields: &[required("length")],
    },
    UnitMeasureDescriptor {
        kind: UnitMeasureType::LengthThickness,
        fields: &[required("length"), optional("thickness")],
    },
    UnitMeasureDescriptor {
        kind: UnitMeasureType::Each,
        fields: &[required("each")],
    },
];

impl UnitMeasureType {
    pub fn descriptor(&self) -> &'static UnitMeasureDescriptor {
        &REGISTRY[*self as usize]
    }
}

/// Finds the descriptor for a type tag, e.g. `area_thickness`.
pub fn lookup(tag: &str) -> Option<&'static UnitMeasureDescriptor> {
    UnitMeasureType::from_str(tag)
        .ok()
        .map(|kind| kind.descriptor())
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing measurement. field: '{field}'")]
    Missing { field: String },

    #[error("Measurement must be greater than zero. field: '{field}', value: {value}")]
    NotPositive { field: String, value: Decimal },

    #[error("Unknown unit measure type. type: '{0}'")]
    UnknownUnitMeasure(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeasurementParseError {
    #[error("Expected {expected} measurement values for '{kind}', found {found}. text: '{text}'")]
    FieldCount {
        kind: UnitMeasureType,
        expected: usize,
        found: usize,
        text: String,
    },

    #[error("Invalid measurement value. field: '{field}', value: '{value}'")]
    InvalidValue { field: String, value: String },
}

impl UnitMeasureDescriptor {
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|field| field.name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields
            .iter()
            .find(|field| field.name.eq(name))
    }

    /// The value to use for a field, optional fields use the default when no value was supplied.
    pub fn value_of(&self, field: &FieldDescriptor, values: &Measurements, defaults: &Measurements) -> Option<Decimal> {
        match (values.get(field.name), field.required) {
            (Some(value), _) => Some(*value),
            (None, false) => defaults.get(field.name).copied(),
            (None, true) => None,
        }
    }

    pub fn issues(&self, values: &Measurements, defaults: &Measurements) -> Vec<ValidationError> {
        self.fields
            .iter()
            .filter_map(|field| match self.value_of(field, values, defaults) {
                None => Some(ValidationError::Missing {
                    field: field.name.to_string(),
                }),
                Some(value) if value <= Decimal::ZERO => Some(ValidationError::NotPositive {
                    field: field.name.to_string(),
                    value,
                }),
                Some(_) => None,
            })
            .collect()
    }

    pub fn validate(&self, values: &Measurements, defaults: &Measurements) -> bool {
        self.issues(values, defaults).is_empty()
    }

    /// Joins the values with `x`, in field order; missing values render as `0`.
    pub fn render(&self, values: &Measurements, defaults: &Measurements) -> String {
        self.fields
            .iter()
            .map(|field| {
                self.value_of(field, values, defaults)
                    .unwrap_or(Decimal::ZERO)
                    .normalize()
            })
            .join(&MEASUREMENT_SEPARATOR.to_string())
    }

    /// The inverse of [`Self::render`], values are assigned to fields in field order.
    pub fn parse(&self, text: &str) -> Result<Measurements, MeasurementParseError> {
        let chunks = text
            .split(MEASUREMENT_SEPARATOR)
            .collect::<Vec<_>>();
        if chunks.len() != self.fields.len() {
            return Err(MeasurementParseError::FieldCount {
                kind: self.kind,
                expected: self.fields.len(),
                found: chunks.len(),
                text: text.to_string(),
            });
        }

        self.fields
            .iter()
            .zip(chunks)
            .map(|(field, chunk)| {
                Decimal::from_str(chunk)
                    .map(|value| (field.name.to_string(), value))
                    .map_err(|_| MeasurementParseError::InvalidValue {
                        field: field.name.to_string(),
                        value: chunk.to_string(),
                    })
            })
            .collect()
    }
}

/// Unknown type tags are never valid.
pub fn validate_measurements(tag: &str, values: &Measurements, defaults: &Measurements) -> bool {
    match lookup(tag) {
        Some(descriptor) => descriptor.validate(values, defaults),
        None => {
            warn!("{}", ValidationError::UnknownUnitMeasure(tag.to_string()));
            false
        }
    }
}

/// Returns an empty string for unknown type tags.
pub fn measurement_string(tag: &str, values: &Measurements, defaults: &Measurements) -> String {
    match lookup(tag) {
        Some(descriptor) => descriptor.render(values, defaults),
        None => {
            warn!("{}", ValidationError::UnknownUnitMeasure(tag.to_string()));
            String::new()
        }
    }
}
