use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{trace, warn};

use crate::reference::RepairTypeCode;
use crate::unit_measure::{
    MeasurementParseError, Measurements, UnitMeasureDescriptor, UnitMeasureType, ValidationError,
};

/// Read-only reference data for a kind of repair.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct RepairTypeSchema {
    pub code: RepairTypeCode,

    /// e.g. 'Concrete repair'
    pub name: String,

    pub unit_measure: UnitMeasureType,

    /// Used for optional dimensions that were not measured.
    #[serde(skip_serializing_if = "Measurements::is_empty")]
    #[serde(default)]
    pub default_values: Measurements,

    pub conversion: Conversion,
}

/// How measurements are converted to the billable quantity.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Conversion {
    /// The product of the fields, multiplied by `scale`.  An empty list of fields uses all the unit measure's fields.
    ///
    /// e.g. for volume in mm, to m³, use a scale of `0.000000001`
    Product {
        #[serde(skip_serializing_if = "Vec::is_empty")]
        #[serde(default)]
        fields: Vec<String>,
        scale: Decimal,
    },
    /// A fixed quantity, regardless of the measurements.
    Fixed { quantity: Decimal },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("Missing value for conversion. field: '{field}'")]
    MissingField { field: String },

    #[error("Conversion refers to a field that is not part of the unit measure. field: '{field}', unit_measure: '{unit_measure}'")]
    UnknownField {
        field: String,
        unit_measure: UnitMeasureType,
    },

    #[error("Conversion overflowed. repair_type: '{0}'")]
    Overflow(RepairTypeCode),
}

impl RepairTypeSchema {
    pub fn descriptor(&self) -> &'static UnitMeasureDescriptor {
        self.unit_measure.descriptor()
    }

    pub fn validate(&self, values: &Measurements) -> bool {
        self.descriptor()
            .validate(values, &self.default_values)
    }

    pub fn issues(&self, values: &Measurements) -> Vec<ValidationError> {
        self.descriptor()
            .issues(values, &self.default_values)
    }

    pub fn measurement_string(&self, values: &Measurements) -> String {
        self.descriptor()
            .render(values, &self.default_values)
    }

    pub fn parse_measurement_string(&self, text: &str) -> Result<Measurements, MeasurementParseError> {
        self.descriptor().parse(text)
    }

    pub fn convert(&self, values: &Measurements) -> Result<Decimal, ConversionError> {
        match &self.conversion {
            Conversion::Fixed {
                quantity,
            } => Ok(*quantity),
            Conversion::Product {
                fields,
                scale,
            } => {
                let descriptor = self.descriptor();

                let field_names = match fields.is_empty() {
                    true => descriptor
                        .field_names()
                        .map(str::to_string)
                        .collect::<Vec<_>>(),
                    false => fields.clone(),
                };

                let product = field_names
                    .iter()
                    .try_fold(*scale, |product, name| {
                        let field = descriptor
                            .field(name)
                            .ok_or_else(|| ConversionError::UnknownField {
                                field: name.clone(),
                                unit_measure: self.unit_measure,
                            })?;
                        let value = descriptor
                            .value_of(field, values, &self.default_values)
                            .ok_or_else(|| ConversionError::MissingField {
                                field: name.clone(),
                            })?;
                        product
                            .checked_mul(value)
                            .ok_or_else(|| ConversionError::Overflow(self.code.clone()))
                    })?;

                Ok(product.normalize())
            }
        }
    }
}

/// Failures are logged and reported as `None`, they are never fatal.
pub fn converted_quantity(schema: &RepairTypeSchema, values: &Measurements) -> Option<Decimal> {
    match schema.convert(values) {
        Ok(quantity) => {
            trace!("Converted quantity. repair_type: '{}', quantity: {}", schema.code, quantity);
            Some(quantity)
        }
        Err(error) => {
            warn!("Unable to compute converted quantity. repair_type: '{}', cause: {}", schema.code, error);
            None
        }
    }
}
