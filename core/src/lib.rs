#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core vocabulary shared across the Rampart deployment UI.
//!
//! This crate defines the values that cross crate seams: grid cells and
//! attack-area offsets, the facing-resolution geometry behind the direction
//! selector, the unit catalog that placement flows read, and the [`UiEvent`]
//! stream the deployment controller emits for adapters to observe. Nothing
//! here holds mutable session state; controllers and collaborators exchange
//! these values and react deterministically.

use std::collections::BTreeMap;
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the deployment console boots.
pub const WELCOME_BANNER: &str = "Rampart deployment console.";

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Translates the cell by an attack-area offset.
    ///
    /// Returns `None` when the offset would move the cell past the grid's
    /// zero edge, so callers can drop footprint cells that fall outside the
    /// map instead of wrapping around.
    #[must_use]
    pub fn offset_by(self, offset: AreaOffset) -> Option<CellCoord> {
        let column = self.column.checked_add_signed(offset.dx())?;
        let row = self.row.checked_add_signed(offset.dy())?;
        Some(Self { column, row })
    }
}

/// Signed cell offset relative to a unit's placement cell.
///
/// Offsets are authored for a unit facing [`Facing::Right`]; the direction
/// selector rotates them into the chosen orientation. Serialized as a
/// `[dx, dy]` pair so catalog files and transfer payloads stay compact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct AreaOffset {
    dx: i32,
    dy: i32,
}

impl AreaOffset {
    /// Creates a new offset from column and row deltas.
    #[must_use]
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// Column delta of the offset.
    #[must_use]
    pub const fn dx(&self) -> i32 {
        self.dx
    }

    /// Row delta of the offset.
    #[must_use]
    pub const fn dy(&self) -> i32 {
        self.dy
    }

    /// Rotates the offset from the canonical right-facing orientation into
    /// the provided facing.
    #[must_use]
    pub const fn rotated(self, facing: Facing) -> Self {
        match facing {
            Facing::Right => self,
            Facing::Down => Self::new(-self.dy, self.dx),
            Facing::Left => Self::new(-self.dx, -self.dy),
            Facing::Up => Self::new(self.dy, -self.dx),
        }
    }
}

impl From<(i32, i32)> for AreaOffset {
    fn from((dx, dy): (i32, i32)) -> Self {
        Self::new(dx, dy)
    }
}

impl From<AreaOffset> for (i32, i32) {
    fn from(offset: AreaOffset) -> Self {
        (offset.dx, offset.dy)
    }
}

/// Ordered set of cell offsets a unit threatens from its placement cell.
///
/// The sequence is authored in the canonical right-facing orientation and
/// preserved verbatim; rotation produces a new area rather than mutating in
/// place so a session can keep the base shape while previewing candidates.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttackArea {
    offsets: Vec<AreaOffset>,
}

impl AttackArea {
    /// Creates an attack area from the provided offsets.
    #[must_use]
    pub fn new(offsets: Vec<AreaOffset>) -> Self {
        Self { offsets }
    }

    /// Offsets composing the area, in authored order.
    #[must_use]
    pub fn offsets(&self) -> &[AreaOffset] {
        &self.offsets
    }

    /// Number of offsets in the area.
    #[must_use]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Reports whether the area threatens no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Returns the area rotated into the provided facing.
    #[must_use]
    pub fn rotated(&self, facing: Facing) -> Self {
        Self {
            offsets: self
                .offsets
                .iter()
                .map(|offset| offset.rotated(facing))
                .collect(),
        }
    }
}

/// Screen-relative facing a placed unit can assume.
///
/// Facings are relative to what the player currently sees: with the camera
/// in its home azimuth, a unit facing [`Facing::Right`] points toward the
/// right edge of the screen. [`Facing::from_quadrants`] folds the camera
/// orientation in so the same pointer gesture always reads the same way on
/// screen regardless of how the scene is rotated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    /// Canonical orientation; attack offsets apply unrotated.
    Right,
    /// Quarter turn clockwise on screen.
    Down,
    /// Half turn; offsets mirror through the placement cell.
    Left,
    /// Quarter turn counter-clockwise on screen.
    Up,
}

/// Facing selected for each combination of camera and pointer quadrant.
///
/// Rows are indexed by the camera quadrant, columns by the pointer quadrant.
/// Each row is the previous one rotated by a step, which is what keeps the
/// gesture aligned with the screen as the camera swings around the scene.
const FACING_BY_QUADRANT: [[Facing; 4]; 4] = [
    [Facing::Right, Facing::Down, Facing::Left, Facing::Up],
    [Facing::Up, Facing::Right, Facing::Down, Facing::Left],
    [Facing::Left, Facing::Up, Facing::Right, Facing::Down],
    [Facing::Down, Facing::Left, Facing::Up, Facing::Right],
];

impl Facing {
    /// Resolves the facing for a camera azimuth bucket and a pointer angle
    /// bucket.
    ///
    /// The table collapses to `(pointer - camera) mod 4` steps away from
    /// [`Facing::Right`], but the explicit form keeps all sixteen outcomes
    /// reviewable at a glance.
    #[must_use]
    pub const fn from_quadrants(camera: Quadrant, pointer: Quadrant) -> Self {
        FACING_BY_QUADRANT[camera.index()][pointer.index()]
    }

    /// Yaw applied to the unit's visual so the model matches the facing.
    #[must_use]
    pub const fn yaw_radians(self) -> f32 {
        match self {
            Self::Right => 0.0,
            Self::Down => -FRAC_PI_2,
            Self::Left => PI,
            Self::Up => FRAC_PI_2,
        }
    }
}

/// Quarter-plane bucket of an angle shifted back by 45 degrees.
///
/// The shift aligns bucket boundaries with diagonal screen directions, so
/// each bucket spans one cardinal direction: an angle within 45 degrees of
/// "screen right" always lands in [`Quadrant::Fourth`], within 45 degrees of
/// "screen down" in [`Quadrant::First`], and so on around the circle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Quadrant {
    /// Shifted angle in `[0, PI/2)`.
    First,
    /// Shifted angle in `[PI/2, PI)`.
    Second,
    /// Shifted angle in `[PI, 3*PI/2)`.
    Third,
    /// Shifted angle in `[3*PI/2, TAU)`.
    Fourth,
}

impl Quadrant {
    /// Classifies an angle in radians into its quadrant bucket.
    ///
    /// Total for every finite input; angles outside `[0, TAU)` wrap, and
    /// non-finite inputs classify as an angle of zero so a corrupted pointer
    /// sample degrades to the neutral reading instead of poisoning state.
    #[must_use]
    pub fn classify(angle: f32) -> Self {
        let angle = if angle.is_finite() { angle } else { 0.0 };
        let shifted = (angle - FRAC_PI_4).rem_euclid(TAU);
        // rem_euclid can round up to exactly TAU, which still belongs to the
        // final bucket.
        match (shifted / FRAC_PI_2) as u32 {
            0 => Self::First,
            1 => Self::Second,
            2 => Self::Third,
            _ => Self::Fourth,
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
            Self::Third => 2,
            Self::Fourth => 3,
        }
    }
}

/// Terrain category a unit type may be placed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacementKind {
    /// Walkable ground tiles at floor height.
    Ground,
    /// Raised tiles reserved for ranged units.
    Elevated,
}

/// Rarity tier assigned to a unit type, used for card trim colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Rarity(u8);

impl Rarity {
    /// Creates a rarity tier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Retrieves the numeric tier.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

/// Unique identifier assigned to a deployed unit instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Catalog key naming a placeable unit type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitKey(String);

impl UnitKey {
    /// Creates a unit key from the provided name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Borrows the key's textual name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Position of a unit card within the roster strip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardIndex(usize);

impl CardIndex {
    /// Creates a new card index with the provided position.
    #[must_use]
    pub const fn new(value: usize) -> Self {
        Self(value)
    }

    /// Retrieves the zero-based roster position.
    #[must_use]
    pub const fn get(&self) -> usize {
        self.0
    }
}

/// Immutable catalog entry describing a placeable unit type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitDescriptor {
    /// Deployment cost charged when the unit is created.
    pub cost: u32,
    /// Rarity tier shown on the unit's card.
    pub rarity: Rarity,
    /// Terrain category the unit may be placed on.
    pub placement: PlacementKind,
    /// Threatened offsets in the canonical right-facing orientation.
    pub attack_area: AttackArea,
    /// Asset path of the portrait shown on the card and the cursor badge.
    pub portrait: String,
}

/// Read-only collection of unit descriptors keyed by unit name.
#[derive(Clone, Debug, Default)]
pub struct UnitCatalog {
    entries: BTreeMap<UnitKey, UnitDescriptor>,
}

impl UnitCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Inserts a descriptor, returning the entry it replaced, if any.
    pub fn insert(&mut self, key: UnitKey, descriptor: UnitDescriptor) -> Option<UnitDescriptor> {
        self.entries.insert(key, descriptor)
    }

    /// Looks up the descriptor registered under the provided key.
    #[must_use]
    pub fn descriptor(&self, key: &UnitKey) -> Option<&UnitDescriptor> {
        self.entries.get(key)
    }

    /// Iterates over catalog entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&UnitKey, &UnitDescriptor)> {
        self.entries.iter()
    }

    /// Number of unit types registered in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether the catalog holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Events broadcast by the deployment controller as sessions progress.
///
/// Adapters subscribe for presentation and logging; nothing in the control
/// flow reads them back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UiEvent {
    /// A card press opened a placement session.
    PlacementStarted {
        /// Roster position of the pressed card.
        card: CardIndex,
        /// Unit type the session will place.
        unit: UnitKey,
    },
    /// A placement session ended without adding a unit.
    PlacementCancelled {
        /// Unit type the session would have placed.
        unit: UnitKey,
    },
    /// The simulation declined to create the requested unit.
    PlacementRefused {
        /// Unit type that was requested.
        unit: UnitKey,
        /// Cell the placement targeted.
        cell: CellCoord,
    },
    /// A unit was added to the map and awaits its facing choice.
    UnitPlaced {
        /// Identifier the simulation assigned to the instance.
        unit_id: UnitId,
        /// Unit type that was placed.
        unit: UnitKey,
        /// Cell the unit occupies.
        cell: CellCoord,
    },
    /// The direction selector previewed a new candidate facing.
    FacingPreviewed {
        /// Unit whose facing is being chosen.
        unit_id: UnitId,
        /// Candidate facing under the pointer.
        facing: Facing,
    },
    /// A facing was committed and the unit registered as active.
    FacingCommitted {
        /// Unit whose facing was locked in.
        unit_id: UnitId,
        /// Facing the unit will keep.
        facing: Facing,
    },
    /// A center click abandoned the deployment and removed the unit.
    DeploymentAborted {
        /// Unit that was removed from the map.
        unit_id: UnitId,
        /// Cell the unit briefly occupied.
        cell: CellCoord,
    },
    /// A map click landed on a cell occupied by an active unit.
    UnitInspected {
        /// Unit under the clicked cell.
        unit_id: UnitId,
        /// Cell that was clicked.
        cell: CellCoord,
    },
}
