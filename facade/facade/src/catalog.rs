use indexmap::IndexMap;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::reference::RepairTypeCode;
use crate::repair_type::{Conversion, RepairTypeSchema};
use crate::unit_measure::{Measurements, UnitMeasureType};

/// The repair types known to the system, keyed by code.  Read-only once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepairTypeCatalog {
    schemas: IndexMap<RepairTypeCode, RepairTypeSchema>,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Duplicate repair type. code: '{0}'")]
    DuplicateRepairType(RepairTypeCode),

    #[error("Unknown repair type. code: '{0}'")]
    UnknownRepairType(RepairTypeCode),
}

impl RepairTypeCatalog {
    pub fn new(schemas: Vec<RepairTypeSchema>) -> Result<Self, CatalogError> {
        let mut map = IndexMap::with_capacity(schemas.len());
        for schema in schemas {
            if map.contains_key(&schema.code) {
                return Err(CatalogError::DuplicateRepairType(schema.code));
            }
            map.insert(schema.code.clone(), schema);
        }

        Ok(Self {
            schemas: map,
        })
    }

    pub fn get(&self, code: &RepairTypeCode) -> Option<&RepairTypeSchema> {
        self.schemas.get(code)
    }

    pub fn require(&self, code: &RepairTypeCode) -> Result<&RepairTypeSchema, CatalogError> {
        self.get(code)
            .ok_or_else(|| CatalogError::UnknownRepairType(code.clone()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &RepairTypeSchema> {
        self.schemas.values()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// The standard repair types, dimensions are measured in mm.
    pub fn builtin() -> Self {
        fn defaults(values: &[(&str, i64)]) -> Measurements {
            values
                .iter()
                .map(|(name, value)| (name.to_string(), Decimal::from(*value)))
                .collect()
        }

        fn product(fields: &[&str], scale_exponent: u32) -> Conversion {
            Conversion::Product {
                fields: fields
                    .iter()
                    .map(|field| field.to_string())
                    .collect(),
                scale: Decimal::new(1, scale_exponent),
            }
        }

        let schemas = vec![
            RepairTypeSchema {
                code: RepairTypeCode::from_raw_str("CR"),
                name: "Concrete repair".to_string(),
                unit_measure: UnitMeasureType::Volume,
                default_values: defaults(&[("depth", 40)]),
                conversion: product(&[], 9),
            },
            RepairTypeSchema {
                code: RepairTypeCode::from_raw_str("CT"),
                name: "Protective coating".to_string(),
                unit_measure: UnitMeasureType::Area,
                default_values: Measurements::new(),
                conversion: product(&[], 6),
            },
            RepairTypeSchema {
                code: RepairTypeCode::from_raw_str("PR"),
                name: "Patch render".to_string(),
                unit_measure: UnitMeasureType::AreaThickness,
                default_values: defaults(&[("thickness", 10)]),
                conversion: product(&["width", "height"], 6),
            },
            RepairTypeSchema {
                code: RepairTypeCode::from_raw_str("CS"),
                name: "Crack stitching".to_string(),
                unit_measure: UnitMeasureType::Length,
                default_values: Measurements::new(),
                conversion: product(&[], 3),
            },
            RepairTypeSchema {
                code: RepairTypeCode::from_raw_str("SJ"),
                name: "Sealant joint".to_string(),
                unit_measure: UnitMeasureType::LengthThickness,
                default_values: defaults(&[("thickness", 10)]),
                conversion: product(&["length"], 3),
            },
            RepairTypeSchema {
                code: RepairTypeCode::from_raw_str("AN"),
                name: "Anchor replacement".to_string(),
                unit_measure: UnitMeasureType::Each,
                default_values: Measurements::new(),
                conversion: product(&[], 0),
            },
        ];

        // Safety: the codes above are unique
        Self::new(schemas).unwrap()
    }
}
