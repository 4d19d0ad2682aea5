use facade::catalog::RepairTypeCatalog;
use facade::repair_type::{converted_quantity, RepairTypeSchema};
use itertools::Itertools;
use rust_decimal::Decimal;
use tracking::grid::{ColumnHeader, RepairGrid};
use tracking::phase::{phase_status, CurrentPhase, PhaseStatus};
use tracking::project::Project;
use tracking::repair::{RepairRecord, RepairStatus};

const INVALID_CELL: char = '-';
const EMPTY_CELL: char = '.';
const CROWDED_CELL: char = '+';

#[derive(Debug, serde::Serialize, Clone, PartialEq)]
pub struct RepairStatusView {
    pub repair: String,
    pub elevation: String,
    pub status: RepairStatus,
    pub current_phase: CurrentPhase,
    pub phases: PhaseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Decimal>,
    pub unit_to_charge: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charge: Option<Decimal>,
}

/// `None` when the repair type is not configured for the project.
pub fn build_status_view(
    record: &RepairRecord,
    project: &Project,
    catalog: &RepairTypeCatalog,
) -> Option<RepairStatusView> {
    let config = project
        .find_repair_type(&record.repair_type)
        .ok()?;

    let quantity = catalog
        .get(&record.repair_type)
        .zip(record.latest_measurements())
        .and_then(|(schema, measurements)| converted_quantity(schema, measurements));

    Some(RepairStatusView {
        repair: record.address().to_string(),
        elevation: record.elevation_name.clone(),
        status: record.status,
        current_phase: record.current_phase(config.phases),
        phases: phase_status(record, config.phases),
        quantity,
        unit_to_charge: config.unit_to_charge.clone(),
        charge: quantity.and_then(|quantity| config.charge(quantity)),
    })
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

pub fn status_line(view: &RepairStatusView) -> String {
    let quantity = match (view.quantity, view.charge) {
        (Some(quantity), Some(charge)) => format!("quantity: {} {}, charge: {}", quantity, view.unit_to_charge, charge),
        (Some(quantity), None) => format!("quantity: {} {}", quantity, view.unit_to_charge),
        _ => "quantity: -".to_string(),
    };

    format!(
        "{} {} {} {} (survey: {}, progress: {}/{}, finish: {}) {}",
        view.repair,
        view.elevation,
        view.status,
        view.current_phase,
        yes_no(view.phases.survey),
        view.phases.progress_count,
        view.phases.progress_needed,
        yes_no(view.phases.finish),
        quantity
    )
}

#[derive(Debug, serde::Serialize)]
pub struct GridView<'a> {
    pub headers: &'a [ColumnHeader],
    pub max_level: u32,
    /// Top level first, `None` for cells that do not exist on the facade.
    pub rows: Vec<Vec<Option<Vec<String>>>>,
}

pub fn build_grid_view<'a>(grid: &'a RepairGrid<'_>) -> GridView<'a> {
    let rows = (0..grid.rows())
        .map(|row| {
            (0..grid.columns())
                .map(|column| {
                    if !grid.is_cell_valid(row, column) {
                        return None;
                    }
                    let repairs = grid
                        .cell(row, column)
                        .unwrap_or_default();
                    Some(
                        repairs
                            .iter()
                            .map(|record| record.address().to_string())
                            .collect(),
                    )
                })
                .collect()
        })
        .collect();

    GridView {
        headers: grid.headers(),
        max_level: grid.max_level(),
        rows,
    }
}

fn cell_char(cell: &Option<Vec<String>>) -> char {
    match cell {
        None => INVALID_CELL,
        Some(repairs) if repairs.is_empty() => EMPTY_CELL,
        Some(repairs) => char::from_digit(repairs.len() as u32, 10)
            .filter(|_| repairs.len() < 10)
            .unwrap_or(CROWDED_CELL),
    }
}

/// One character per cell, elevations separated by a space, e.g.
/// ```text
///      North South
///  L10 ..... ---
///   L6 ..... ...
/// ```
pub fn grid_text(view: &GridView) -> String {
    let header_line = view
        .headers
        .iter()
        .map(|header| {
            let width = header.span as usize;
            format!("{:<width$.width$}", header.name, width = width)
        })
        .join(" ");

    let mut lines = vec![format!("     {}", header_line.trim_end())];

    for (row_index, row) in view.rows.iter().enumerate() {
        let level = view.max_level as usize - row_index;
        let mut cells = row.iter();
        let elevations = view
            .headers
            .iter()
            .map(|header| {
                cells
                    .by_ref()
                    .take(header.span as usize)
                    .map(cell_char)
                    .collect::<String>()
            })
            .join(" ");

        lines.push(format!("{:>4} {}", format!("L{}", level), elevations));
    }

    lines.join("\n")
}

pub fn repair_type_line(schema: &RepairTypeSchema) -> String {
    let fields = schema
        .descriptor()
        .field_names()
        .join(", ");

    format!("{} {} ({}: {})", schema.code, schema.name, schema.unit_measure, fields)
}

#[cfg(test)]
mod grid_text_tests {
    use facade::elevation::Elevation;
    use tracking::grid::{build_grid, ElevationSelection, GridFilter};

    use super::*;

    #[test]
    fn invalid_cells() {
        // given
        let project = Project::new("tower".to_string(), vec![
            Elevation::new("North", 3, 3),
            Elevation::new("East", 2, 2),
        ])
        .unwrap();
        let grid = build_grid(project.geometry(), &ElevationSelection::All, &[], &GridFilter::default()).unwrap();

        // when
        let text = grid_text(&build_grid_view(&grid));

        // then
        assert_eq!(text, ["     Nor Ea", "  L3 ... --", "  L2 ... ..", "  L1 ... .."].join("\n"));
    }

    #[test]
    fn cell_chars() {
        assert_eq!(cell_char(&None), '-');
        assert_eq!(cell_char(&Some(vec![])), '.');
        assert_eq!(cell_char(&Some(vec!["D1.L1.CR.1".to_string(); 3])), '3');
        assert_eq!(cell_char(&Some(vec!["D1.L1.CR.1".to_string(); 12])), '+');
    }
}
