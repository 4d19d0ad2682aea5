//! Buckets repairs into a level x drop matrix.
//!
//! Row 0 is the highest level of the selection, column 0 is the first drop of the selection.

use std::fmt::{Display, Formatter};
use std::ops::RangeInclusive;

use facade::elevation::{DropNumber, Elevation, ElevationName, LevelNumber};
use facade::geometry::Geometry;
use facade::reference::RepairTypeCode;
use thiserror::Error;
use tracing::{debug, trace};

use crate::repair::RepairRecord;

pub const MAX_GRID_CELLS: usize = 1 << 20;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ElevationSelection {
    #[default]
    All,
    Named(ElevationName),
}

impl Display for ElevationSelection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ElevationSelection::All => f.write_str("all"),
            ElevationSelection::Named(name) => write!(f, "'{}'", name),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridFilter {
    pub drops: Option<RangeInclusive<DropNumber>>,
    pub levels: Option<RangeInclusive<LevelNumber>>,
    /// Empty for all repair types.
    pub repair_types: Vec<RepairTypeCode>,
}

impl GridFilter {
    pub fn matches(&self, record: &RepairRecord) -> bool {
        let drop_matched = self
            .drops
            .as_ref()
            .map_or(true, |drops| drops.contains(&record.drop));
        let level_matched = self
            .levels
            .as_ref()
            .map_or(true, |levels| levels.contains(&record.level));
        let repair_type_matched = self.repair_types.is_empty() || self.repair_types.contains(&record.repair_type);

        drop_matched && level_matched && repair_type_matched
    }
}

#[derive(Debug, serde::Serialize, Clone, PartialEq, Eq)]
pub struct ColumnHeader {
    pub name: ElevationName,
    pub span: u32,
    pub first_drop: DropNumber,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum GridError {
    #[error("Unknown elevation. name: '{0}'")]
    UnknownElevation(ElevationName),

    #[error("Grid is too large. rows: {rows}, columns: {columns}, max_cells: {max_cells}", max_cells = MAX_GRID_CELLS)]
    TooLarge { rows: u64, columns: u64 },
}

pub struct RepairGrid<'a> {
    geometry: &'a Geometry,
    repairs: &'a [RepairRecord],
    headers: Vec<ColumnHeader>,
    first_drop: DropNumber,
    max_level: LevelNumber,
    rows: usize,
    columns: usize,
    /// `rows * columns` cells, row-major, each holding indices into `repairs`.
    cells: Vec<Vec<usize>>,
}

impl<'a> RepairGrid<'a> {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn headers(&self) -> &[ColumnHeader] {
        &self.headers
    }

    pub fn max_level(&self) -> LevelNumber {
        self.max_level
    }

    fn offset(&self, row: usize, column: usize) -> Option<usize> {
        if row >= self.rows || column >= self.columns {
            return None;
        }

        Some(row * self.columns + column)
    }

    /// The repairs in a cell, `None` if the cell is outside the grid.
    pub fn cell(&self, row: usize, column: usize) -> Option<Vec<&'a RepairRecord>> {
        let repairs = self.repairs;

        self.offset(row, column).map(|offset| {
            self.cells[offset]
                .iter()
                .map(|index| &repairs[*index])
                .collect()
        })
    }

    pub fn cell_at(&self, drop: DropNumber, level: LevelNumber) -> Option<Vec<&'a RepairRecord>> {
        self.cell_location(drop, level)
            .and_then(|(row, column)| self.cell(row, column))
    }

    /// The (row, column) of a drop and level, `None` when outside the grid.
    pub fn cell_location(&self, drop: DropNumber, level: LevelNumber) -> Option<(usize, usize)> {
        if level == 0 || level > self.max_level || drop < self.first_drop {
            return None;
        }

        let row = (self.max_level - level) as usize;
        let column = (drop - self.first_drop) as usize;

        self.offset(row, column)
            .map(|_| (row, column))
    }

    /// The (drop, level) of a cell, `None` when outside the grid.
    pub fn cell_address(&self, row: usize, column: usize) -> Option<(DropNumber, LevelNumber)> {
        self.offset(row, column)?;

        let drop = self
            .first_drop
            .checked_add(u32::try_from(column).ok()?)?;
        let level = self
            .max_level
            .checked_sub(u32::try_from(row).ok()?)?;

        Some((drop, level))
    }

    /// Cells are invalid when their level does not exist on the elevation containing their drop.
    pub fn is_cell_valid(&self, row: usize, column: usize) -> bool {
        self.cell_address(row, column)
            .map_or(false, |(drop, level)| self.geometry.is_cell_valid(drop, level))
    }

    /// Narrows an existing filter to the repairs of a clicked cell.
    pub fn drill_down(&self, row: usize, column: usize, filter: &GridFilter) -> Option<GridFilter> {
        let (drop, level) = self.cell_address(row, column)?;

        Some(GridFilter {
            drops: Some(drop..=drop),
            levels: Some(level..=level),
            repair_types: filter.repair_types.clone(),
        })
    }

    pub fn placed(&self) -> usize {
        self.cells.iter().map(Vec::len).sum()
    }
}

fn selected_elevations<'g>(
    geometry: &'g Geometry,
    selection: &ElevationSelection,
) -> Result<(DropNumber, &'g [Elevation]), GridError> {
    match selection {
        ElevationSelection::All => Ok((1, geometry.elevations())),
        ElevationSelection::Named(name) => {
            let index = geometry
                .elevations()
                .iter()
                .position(|elevation| elevation.name.eq(name))
                .ok_or_else(|| GridError::UnknownElevation(name.clone()))?;
            let first_drop = geometry
                .drop_range(name)
                .map(|range| *range.start())
                .ok_or_else(|| GridError::UnknownElevation(name.clone()))?;

            Ok((first_drop, &geometry.elevations()[index..=index]))
        }
    }
}

pub fn build_grid<'a>(
    geometry: &'a Geometry,
    selection: &ElevationSelection,
    repairs: &'a [RepairRecord],
    filter: &GridFilter,
) -> Result<RepairGrid<'a>, GridError> {
    let (first_drop, elevations) = selected_elevations(geometry, selection)?;

    let max_drops: u64 = facade::geometry::total_drops(elevations);
    let max_level = elevations
        .iter()
        .map(|elevation| elevation.levels)
        .max()
        .unwrap_or_default();

    let too_large = || GridError::TooLarge {
        rows: max_level as u64,
        columns: max_drops,
    };
    let rows = max_level as usize;
    let columns = usize::try_from(max_drops).map_err(|_| too_large())?;
    let cell_count = rows
        .checked_mul(columns)
        .filter(|count| *count <= MAX_GRID_CELLS)
        .ok_or_else(too_large)?;

    let mut grid = RepairGrid {
        geometry,
        repairs,
        headers: elevations
            .iter()
            .scan(first_drop, |next_drop, elevation| {
                let header = ColumnHeader {
                    name: elevation.name.clone(),
                    span: elevation.drops,
                    first_drop: *next_drop,
                };
                *next_drop = next_drop.saturating_add(elevation.drops);
                Some(header)
            })
            .collect(),
        first_drop,
        max_level,
        rows,
        columns,
        cells: vec![Vec::new(); cell_count],
    };

    let mut excluded = 0_usize;
    for (index, record) in repairs.iter().enumerate() {
        let elevation_matched = match selection {
            ElevationSelection::All => true,
            ElevationSelection::Named(name) => geometry
                .resolve(record.drop)
                .map_or(false, |elevation| elevation.name.eq(name)),
        };

        if !elevation_matched || !filter.matches(record) {
            continue;
        }

        if !geometry.is_cell_valid(record.drop, record.level) {
            trace!("Excluding repair at invalid cell. repair: '{}'", record.address());
            excluded += 1;
            continue;
        }

        // valid cells of a selected elevation are always inside the grid
        let (row, column) = grid
            .cell_location(record.drop, record.level)
            .ok_or_else(too_large)?;
        let offset = row * columns + column;
        grid.cells[offset].push(index);
    }

    debug!(
        "Built repair grid. selection: {}, rows: {}, columns: {}, placed: {}, excluded: {}",
        selection,
        rows,
        columns,
        grid.placed(),
        excluded
    );

    Ok(grid)
}
