use std::path::Path;
use std::str::FromStr;

use anyhow::{anyhow, Context, Error};
use facade::catalog::RepairTypeCatalog;
use facade::reference::RepairTypeCode;
use facade::repair_type::{Conversion, RepairTypeSchema};
use facade::unit_measure::{Measurements, UnitMeasureType};
use rust_decimal::Decimal;
use tracing::Level;
use tracing::{info, trace};

const LIST_SEPARATOR: char = ';';

/// e.g.
/// ```text
/// "Code","Name","UnitMeasure","Defaults","ConversionFields","Scale","FixedQuantity"
/// "CR","Concrete repair","volume","depth=40","","0.000000001",""
/// ```
#[derive(Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RepairTypeRecord {
    pub code: String,
    pub name: String,
    pub unit_measure: String,
    /// `field=value` pairs, separated by `;`
    #[serde(default)]
    pub defaults: String,
    /// Field names, separated by `;`, empty for all the unit measure's fields.
    #[serde(default)]
    pub conversion_fields: String,
    pub scale: Option<Decimal>,
    /// When present, the conversion ignores the measurements.
    pub fixed_quantity: Option<Decimal>,
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value
        .split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|item| !item.is_empty())
}

impl RepairTypeRecord {
    pub fn build_schema(&self) -> Result<RepairTypeSchema, Error> {
        let code = RepairTypeCode::from_str(&self.code)?;
        let unit_measure = UnitMeasureType::from_str(&self.unit_measure)
            .map_err(|_| anyhow!("Unknown unit measure type. type: '{}'", self.unit_measure))?;

        let default_values = split_list(&self.defaults)
            .map(|pair| {
                let (name, value) = pair
                    .split_once('=')
                    .ok_or_else(|| anyhow!("Invalid default value, expected 'field=value'. value: '{}'", pair))?;
                let value = Decimal::from_str(value.trim())
                    .with_context(|| format!("Invalid default value. field: '{}'", name))?;
                Ok((name.trim().to_string(), value))
            })
            .collect::<Result<Measurements, Error>>()?;

        let conversion = match (self.fixed_quantity, self.scale) {
            (Some(quantity), None) => Conversion::Fixed {
                quantity,
            },
            (None, Some(scale)) => Conversion::Product {
                fields: split_list(&self.conversion_fields)
                    .map(str::to_string)
                    .collect(),
                scale,
            },
            (Some(_), Some(_)) => return Err(anyhow!("Only one of 'Scale' or 'FixedQuantity' may be specified")),
            (None, None) => return Err(anyhow!("One of 'Scale' or 'FixedQuantity' is required")),
        };

        let schema = RepairTypeSchema {
            code,
            name: self.name.clone(),
            unit_measure,
            default_values,
            conversion,
        };

        if let Conversion::Product {
            fields, ..
        } = &schema.conversion
        {
            let descriptor = schema.descriptor();
            if let Some(unknown) = fields
                .iter()
                .find(|field| descriptor.field(field).is_none())
            {
                return Err(anyhow!(
                    "Conversion field is not part of the unit measure. field: '{}', unit_measure: '{}'",
                    unknown,
                    unit_measure
                ));
            }
        }

        Ok(schema)
    }
}

#[tracing::instrument(level = Level::DEBUG)]
pub fn load_repair_types(path: &Path) -> Result<RepairTypeCatalog, Error> {
    info!("Loading repair types. file: {}", path.display());

    let mut csv_reader = csv::ReaderBuilder::new()
        .from_path(path)
        .with_context(|| format!("Error reading repair types. file: {}", path.display()))?;

    let mut schemas: Vec<RepairTypeSchema> = vec![];

    for result in csv_reader.deserialize() {
        let record: RepairTypeRecord = result.with_context(|| "Deserializing repair type record".to_string())?;

        trace!("{:?}", record);

        let schema = record
            .build_schema()
            .with_context(|| format!("Building repair type from record. record: {:?}", record))?;

        schemas.push(schema);
    }

    let catalog = RepairTypeCatalog::new(schemas)?;
    info!("Loaded repair types. count: {}", catalog.len());

    Ok(catalog)
}
