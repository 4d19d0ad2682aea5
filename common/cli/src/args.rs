use clap::ValueEnum;
use facade::unit_measure::UnitMeasureType;

/// Args decouple of CLI arg handling requirements from the internal data structures

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[value(rename_all = "lower")]
pub enum OutputFormatArg {
    #[default]
    Text,
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
#[value(rename_all = "snake_case")]
pub enum UnitMeasureArg {
    Volume,
    Area,
    AreaThickness,
    Length,
    LengthThickness,
    Each,
}

impl From<UnitMeasureArg> for UnitMeasureType {
    fn from(value: UnitMeasureArg) -> Self {
        match value {
            UnitMeasureArg::Volume => Self::Volume,
            UnitMeasureArg::Area => Self::Area,
            UnitMeasureArg::AreaThickness => Self::AreaThickness,
            UnitMeasureArg::Length => Self::Length,
            UnitMeasureArg::LengthThickness => Self::LengthThickness,
            UnitMeasureArg::Each => Self::Each,
        }
    }
}
