pub mod catalog;
pub mod elevation;
pub mod geometry;
pub mod reference;
pub mod repair_type;
pub mod unit_measure;
