#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Reference battle-map collaborator for the Rampart deployment flow.
//!
//! [`GridMap`] implements the `BattleMap` contract over a rectangular grid of
//! square cells: terrain category and height per cell, unit occupancy, the
//! world/cell conversions derived from a single tile length, and the live
//! pointer tracker the host feeds between input events.

use std::collections::{BTreeMap, BTreeSet};
use std::{error::Error, fmt};

use glam::{Vec2, Vec3};
use rampart_core::{CellCoord, PlacementKind, UnitId};
use rampart_scene::{BattleMap, CellInfo};

/// Height assigned to elevated cells, expressed as a multiple of the tile
/// length.
const ELEVATED_HEIGHT_IN_TILES: f32 = 1.0;

/// Terrain state stored for a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq)]
struct CellState {
    placement: PlacementKind,
    height: f32,
}

/// Rectangular battle map with per-cell terrain and unit occupancy.
#[derive(Debug)]
pub struct GridMap {
    columns: u32,
    rows: u32,
    tile_length: f32,
    cells: Vec<CellState>,
    occupants: BTreeMap<UnitId, CellCoord>,
    tracked_pointer: Option<Vec2>,
    tracked_cell: Option<CellCoord>,
}

impl GridMap {
    /// Creates a map of ground-level cells with the provided dimensions.
    ///
    /// Returns an error when either dimension is zero or the tile length is
    /// not a positive finite number.
    pub fn new(columns: u32, rows: u32, tile_length: f32) -> Result<Self, GridError> {
        if columns == 0 || rows == 0 {
            return Err(GridError::ZeroDimension { columns, rows });
        }
        if !tile_length.is_finite() || tile_length <= 0.0 {
            return Err(GridError::InvalidTileLength { tile_length });
        }

        let cell_count = (columns as usize)
            .checked_mul(rows as usize)
            .ok_or(GridError::ZeroDimension { columns, rows })?;

        Ok(Self {
            columns,
            rows,
            tile_length,
            cells: vec![
                CellState {
                    placement: PlacementKind::Ground,
                    height: 0.0,
                };
                cell_count
            ],
            occupants: BTreeMap::new(),
            tracked_pointer: None,
            tracked_cell: None,
        })
    }

    /// Number of columns contained in the map.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the map.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Side length of a single square cell in world units.
    #[must_use]
    pub const fn tile_length(&self) -> f32 {
        self.tile_length
    }

    /// Marks a cell as elevated terrain, raising its top face one tile above
    /// the floor. Out-of-bounds cells are ignored.
    pub fn raise_cell(&mut self, cell: CellCoord) {
        let height = self.tile_length * ELEVATED_HEIGHT_IN_TILES;
        if let Some(index) = self.cell_index(cell) {
            self.cells[index] = CellState {
                placement: PlacementKind::Elevated,
                height,
            };
        }
    }

    /// Updates the tracked pointer from a host-provided world-space floor
    /// position. `None` marks the pointer as having left the map surface.
    pub fn track_pointer(&mut self, position: Option<Vec2>) {
        self.tracked_pointer = position;
        self.tracked_cell = position.and_then(|position| self.cell_at_position(position));
    }

    /// Cell occupied by the provided unit, if it is on the map.
    #[must_use]
    pub fn unit_cell(&self, unit: UnitId) -> Option<CellCoord> {
        self.occupants.get(&unit).copied()
    }

    /// Number of units currently occupying map cells.
    #[must_use]
    pub fn occupant_count(&self) -> usize {
        self.occupants.len()
    }

    fn cell_index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() >= self.columns || cell.row() >= self.rows {
            return None;
        }
        Some((cell.row() as usize) * (self.columns as usize) + cell.column() as usize)
    }

    fn cell_at_position(&self, position: Vec2) -> Option<CellCoord> {
        if position.x < 0.0 || position.y < 0.0 {
            return None;
        }

        let column = (position.x / self.tile_length).floor();
        let row = (position.y / self.tile_length).floor();
        if column >= self.columns as f32 || row >= self.rows as f32 {
            return None;
        }

        Some(CellCoord::new(column as u32, row as u32))
    }

    fn is_occupied(&self, cell: CellCoord) -> bool {
        self.occupants.values().any(|occupied| *occupied == cell)
    }
}

impl BattleMap for GridMap {
    fn cell_at(&self, position: Vec2) -> Option<CellCoord> {
        self.cell_at_position(position)
    }

    fn cell_info(&self, cell: CellCoord) -> Option<CellInfo> {
        let index = self.cell_index(cell)?;
        let state = self.cells[index];
        Some(CellInfo::new(state.placement, state.height))
    }

    fn cell_center(&self, cell: CellCoord) -> Option<Vec3> {
        let _ = self.cell_index(cell)?;
        Some(Vec3::new(
            (cell.column() as f32 + 0.5) * self.tile_length,
            0.0,
            (cell.row() as f32 + 0.5) * self.tile_length,
        ))
    }

    fn eligible_cells(&self, placement: PlacementKind) -> BTreeSet<CellCoord> {
        let mut eligible = BTreeSet::new();
        for row in 0..self.rows {
            for column in 0..self.columns {
                let cell = CellCoord::new(column, row);
                let index = (row as usize) * (self.columns as usize) + column as usize;
                if self.cells[index].placement == placement && !self.is_occupied(cell) {
                    let _ = eligible.insert(cell);
                }
            }
        }
        eligible
    }

    fn add_unit(&mut self, cell: CellCoord, unit: UnitId) {
        let _ = self.occupants.insert(unit, cell);
    }

    fn remove_unit(&mut self, unit: UnitId) -> Option<CellCoord> {
        self.occupants.remove(&unit)
    }

    fn tracked_cell(&self) -> Option<CellCoord> {
        self.tracked_cell
    }

    fn tracked_pointer(&self) -> Option<Vec2> {
        self.tracked_pointer
    }
}

/// Errors that can occur when constructing a grid map.
#[derive(Debug, PartialEq)]
pub enum GridError {
    /// Both dimensions must be positive to produce a non-empty map.
    ZeroDimension {
        /// Provided column count.
        columns: u32,
        /// Provided row count.
        rows: u32,
    },
    /// The tile length must be a positive finite world length.
    InvalidTileLength {
        /// Provided tile length that failed validation.
        tile_length: f32,
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroDimension { columns, rows } => {
                write!(
                    f,
                    "grid dimensions must be positive (received {columns}x{rows})"
                )
            }
            Self::InvalidTileLength { tile_length } => {
                write!(
                    f,
                    "tile_length must be positive and finite (received {tile_length})"
                )
            }
        }
    }
}

impl Error for GridError {}
