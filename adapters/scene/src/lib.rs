#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared scene contracts for Rampart adapters.
//!
//! The deployment controller never touches a renderer, a 3D scene or the
//! simulation directly; it drives the traits declared here and exchanges the
//! plain presentation descriptors alongside them. Concrete collaborators live
//! elsewhere: the reference map in `rampart-grid`, the headless camera and
//! simulation in the CLI adapter, and the in-memory [`OverlayState`] below,
//! which records what a renderer would draw so tests and the demo can read it
//! back.

use glam::{Vec2, Vec3};
use rampart_core::{
    AreaOffset, AttackArea, CellCoord, Facing, PlacementKind, Rarity, UnitDescriptor, UnitId,
    UnitKey,
};
use std::collections::BTreeSet;

/// RGBA color used when presenting overlay layers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns the color with its alpha channel replaced.
    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self {
            red: self.red,
            green: self.green,
            blue: self.blue,
            alpha,
        }
    }
}

/// Trim color painted on a unit card for the provided rarity tier.
///
/// Tiers above the highest named band share the gold trim.
#[must_use]
pub const fn rarity_color(rarity: Rarity) -> Color {
    match rarity.get() {
        0 | 1 => Color::from_rgb_u8(158, 158, 158),
        2 => Color::from_rgb_u8(96, 169, 87),
        3 => Color::from_rgb_u8(84, 134, 214),
        4 => Color::from_rgb_u8(163, 96, 214),
        _ => Color::from_rgb_u8(224, 180, 66),
    }
}

/// Terrain and elevation facts reported for a single map cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellInfo {
    /// Terrain category governing which unit types the cell accepts.
    pub placement: PlacementKind,
    /// Height of the cell's top face above the floor plane, in world units.
    pub height: f32,
}

impl CellInfo {
    /// Creates a new cell description.
    #[must_use]
    pub const fn new(placement: PlacementKind, height: f32) -> Self {
        Self { placement, height }
    }
}

/// Overlay layer addressed by show/hide requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OverlayKind {
    /// Wash over the cells eligible for the pending placement.
    Placement,
    /// Highlight over the cells a unit's attack area would threaten.
    Attack,
    /// Full-canvas direction-selector backdrop with its punch-through ring.
    Selector,
}

/// Geometry of the direction-selector backdrop.
///
/// The backdrop fills the canvas except for a circular cutout of
/// [`radius`](Self::radius) centered on the anchor, so the placed unit stays
/// visible through the ring while the rest of the scene dims.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelectorPaint {
    /// Canvas-pixel point the ring is centered on.
    pub anchor: Vec2,
    /// Radius of the punch-through cutout in canvas pixels.
    pub radius: f32,
    /// Fill color of the dimmed backdrop surrounding the cutout.
    pub backdrop: Color,
}

impl SelectorPaint {
    /// Backdrop fill used when the caller has no styling of its own.
    pub const DEFAULT_BACKDROP: Color = Color::new(0.0, 0.0, 0.0, 0.55);

    /// Creates a new selector backdrop descriptor.
    #[must_use]
    pub const fn new(anchor: Vec2, radius: f32, backdrop: Color) -> Self {
        Self {
            anchor,
            radius,
            backdrop,
        }
    }

    /// Radius of the inner dead-zone where a confirming click cancels.
    #[must_use]
    pub const fn dead_zone_radius(&self) -> f32 {
        self.radius / 4.0
    }

    /// Radius of the neutral ring shown while the pointer sits in the
    /// dead-zone.
    #[must_use]
    pub const fn neutral_ring_radius(&self) -> f32 {
        self.radius / 2.0
    }
}

/// Directional feedback drawn inside the selector overlay.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SelectorIndicator {
    /// Neutral ring shown while the pointer sits inside the dead-zone.
    NeutralRing {
        /// Radius of the ring in canvas pixels.
        radius: f32,
    },
    /// Golden arc centered on the pointer's angle from the anchor.
    AimArc {
        /// Angle the arc is centered on, in radians.
        center_angle: f32,
        /// Angular width of the arc, in radians.
        width: f32,
    },
}

/// Floating portrait that follows the pointer during placement.
#[derive(Clone, Debug, PartialEq)]
pub struct CursorBadge {
    /// Asset path of the portrait to display.
    pub portrait: String,
    /// Position the badge is anchored to.
    pub position: Vec2,
}

impl CursorBadge {
    /// Creates a new cursor badge descriptor.
    #[must_use]
    pub fn new(portrait: impl Into<String>, position: Vec2) -> Self {
        Self {
            portrait: portrait.into(),
            position,
        }
    }
}

/// Converts normalized device coordinates into canvas pixel coordinates.
///
/// NDC span `[-1, 1]` on both axes with y pointing up; canvas pixels grow
/// rightward and downward from the top-left corner.
#[must_use]
pub fn anchor_on_canvas(ndc: Vec2, canvas: Vec2) -> Vec2 {
    Vec2::new(
        (ndc.x * 0.5 + 0.5) * canvas.x,
        (ndc.y * -0.5 + 0.5) * canvas.y,
    )
}

/// Tiled battle map the deployment controller places units onto.
pub trait BattleMap {
    /// Cell under the provided world-space floor position, if any.
    fn cell_at(&self, position: Vec2) -> Option<CellCoord>;

    /// Terrain and height facts for a cell inside the map bounds.
    fn cell_info(&self, cell: CellCoord) -> Option<CellInfo>;

    /// World-space center of a cell's floor face.
    fn cell_center(&self, cell: CellCoord) -> Option<Vec3>;

    /// Unoccupied cells that accept the provided placement category.
    fn eligible_cells(&self, placement: PlacementKind) -> BTreeSet<CellCoord>;

    /// Records a unit as occupying the provided cell.
    fn add_unit(&mut self, cell: CellCoord, unit: UnitId);

    /// Removes a unit from the map, returning the cell it occupied.
    fn remove_unit(&mut self, unit: UnitId) -> Option<CellCoord>;

    /// Cell currently under the tracked pointer, if the pointer is over the
    /// map.
    fn tracked_cell(&self) -> Option<CellCoord>;

    /// Raw world-space position of the tracked pointer, if any.
    fn tracked_pointer(&self) -> Option<Vec2>;
}

/// Overlay layers the controller paints placement and direction feedback on.
pub trait OverlaySurface {
    /// Makes the provided overlay layer visible.
    fn show_overlay(&mut self, kind: OverlayKind);

    /// Hides the provided overlay layer.
    fn hide_overlay(&mut self, kind: OverlayKind);

    /// Replaces the set of cells washed by the placement layer.
    fn set_placement_wash(&mut self, cells: &BTreeSet<CellCoord>);

    /// Highlights the cells reached from `origin` by the provided offsets on
    /// the attack layer.
    fn highlight_attack(&mut self, origin: CellCoord, offsets: &[AreaOffset]);

    /// Opens the direction selector with the provided backdrop geometry.
    fn open_selector(&mut self, paint: SelectorPaint);

    /// Replaces the indicator drawn inside the open selector.
    fn paint_selector(&mut self, indicator: SelectorIndicator);

    /// Closes the direction selector and discards its indicator.
    fn close_selector(&mut self);

    /// Attaches the cursor-follow badge.
    fn attach_badge(&mut self, badge: CursorBadge);

    /// Moves the attached cursor-follow badge.
    fn move_badge(&mut self, position: Vec2);

    /// Removes the cursor-follow badge.
    fn remove_badge(&mut self);
}

/// Advisory redraw scheduling offered by the host render loop.
pub trait RedrawQueue {
    /// Requests a redraw before the next frame. Coalescable; calling it
    /// repeatedly between frames is equivalent to calling it once.
    fn request_redraw(&mut self);
}

/// Simulation controller that owns unit instances and their combat state.
pub trait Simulation {
    /// Constructs a unit of the provided type, or refuses (for example when
    /// the descriptor's cost cannot be met).
    fn create_unit(&mut self, key: &UnitKey, descriptor: &UnitDescriptor) -> Option<UnitId>;

    /// Points the unit's visual at the provided facing.
    fn set_unit_facing(&mut self, unit: UnitId, facing: Facing);

    /// Replaces the unit's stored attack area.
    fn assign_attack_area(&mut self, unit: UnitId, area: AttackArea);

    /// Marks the unit as active and targetable at the provided cell.
    fn register_active(&mut self, key: &UnitKey, unit: UnitId, cell: CellCoord);

    /// Cells occupied by currently active units, for inspection lookups.
    fn active_units(&self) -> Vec<(UnitId, CellCoord)>;
}

/// Camera the direction selector projects its anchor through.
pub trait CameraRig {
    /// Camera's horizontal rotation around the scene's vertical axis, in
    /// radians.
    fn azimuthal_angle(&self) -> f32;

    /// Projects a world-space point to normalized device coordinates.
    fn project_to_ndc(&self, point: Vec3) -> Vec2;
}

/// In-memory overlay surface recording what a renderer would draw.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OverlayState {
    visible: BTreeSet<OverlayKind>,
    placement_wash: BTreeSet<CellCoord>,
    attack_highlight: Option<(CellCoord, Vec<AreaOffset>)>,
    selector: Option<SelectorPaint>,
    indicator: Option<SelectorIndicator>,
    badge: Option<CursorBadge>,
}

impl OverlayState {
    /// Creates an overlay state with every layer hidden.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports whether the provided layer is currently visible.
    #[must_use]
    pub fn is_visible(&self, kind: OverlayKind) -> bool {
        self.visible.contains(&kind)
    }

    /// Cells currently washed by the placement layer.
    #[must_use]
    pub fn placement_wash(&self) -> &BTreeSet<CellCoord> {
        &self.placement_wash
    }

    /// Origin and offsets last highlighted on the attack layer.
    #[must_use]
    pub fn attack_highlight(&self) -> Option<(CellCoord, &[AreaOffset])> {
        self.attack_highlight
            .as_ref()
            .map(|(origin, offsets)| (*origin, offsets.as_slice()))
    }

    /// Backdrop geometry of the open selector, if one is open.
    #[must_use]
    pub fn selector(&self) -> Option<SelectorPaint> {
        self.selector
    }

    /// Indicator last painted inside the selector.
    #[must_use]
    pub fn indicator(&self) -> Option<SelectorIndicator> {
        self.indicator
    }

    /// Cursor badge currently attached, if any.
    #[must_use]
    pub fn badge(&self) -> Option<&CursorBadge> {
        self.badge.as_ref()
    }
}

impl OverlaySurface for OverlayState {
    fn show_overlay(&mut self, kind: OverlayKind) {
        let _ = self.visible.insert(kind);
    }

    fn hide_overlay(&mut self, kind: OverlayKind) {
        let _ = self.visible.remove(&kind);
        if kind == OverlayKind::Attack {
            self.attack_highlight = None;
        }
    }

    fn set_placement_wash(&mut self, cells: &BTreeSet<CellCoord>) {
        self.placement_wash = cells.clone();
    }

    fn highlight_attack(&mut self, origin: CellCoord, offsets: &[AreaOffset]) {
        self.attack_highlight = Some((origin, offsets.to_vec()));
        let _ = self.visible.insert(OverlayKind::Attack);
    }

    fn open_selector(&mut self, paint: SelectorPaint) {
        self.selector = Some(paint);
        self.indicator = None;
        let _ = self.visible.insert(OverlayKind::Selector);
    }

    fn paint_selector(&mut self, indicator: SelectorIndicator) {
        self.indicator = Some(indicator);
    }

    fn close_selector(&mut self) {
        self.selector = None;
        self.indicator = None;
        let _ = self.visible.remove(&OverlayKind::Selector);
    }

    fn attach_badge(&mut self, badge: CursorBadge) {
        self.badge = Some(badge);
    }

    fn move_badge(&mut self, position: Vec2) {
        if let Some(badge) = self.badge.as_mut() {
            badge.position = position;
        }
    }

    fn remove_badge(&mut self) {
        self.badge = None;
    }
}

/// Redraw queue that coalesces requests into a per-frame flag.
#[derive(Clone, Copy, Debug, Default)]
pub struct RedrawCounter {
    pending: bool,
    frames: u64,
}

impl RedrawCounter {
    /// Creates a counter with no pending redraw.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending: false,
            frames: 0,
        }
    }

    /// Reports whether a redraw is pending for the next frame.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending
    }

    /// Consumes the pending flag, counting a frame if one was requested.
    pub fn take_frame(&mut self) -> bool {
        let pending = self.pending;
        self.pending = false;
        if pending {
            self.frames += 1;
        }
        pending
    }

    /// Number of frames actually drawn so far.
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frames
    }
}

impl RedrawQueue for RedrawCounter {
    fn request_redraw(&mut self) {
        self.pending = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rampart_core::AreaOffset;

    #[test]
    fn anchor_projection_maps_ndc_corners_to_canvas_corners() {
        let canvas = Vec2::new(800.0, 600.0);

        assert_eq!(
            anchor_on_canvas(Vec2::new(-1.0, 1.0), canvas),
            Vec2::new(0.0, 0.0)
        );
        assert_eq!(
            anchor_on_canvas(Vec2::new(1.0, -1.0), canvas),
            Vec2::new(800.0, 600.0)
        );
        assert_eq!(
            anchor_on_canvas(Vec2::ZERO, canvas),
            Vec2::new(400.0, 300.0)
        );
    }

    #[test]
    fn selector_paint_derives_dead_zone_from_radius() {
        let paint = SelectorPaint::new(Vec2::ZERO, 80.0, SelectorPaint::DEFAULT_BACKDROP);

        assert_eq!(paint.dead_zone_radius(), 20.0);
        assert_eq!(paint.neutral_ring_radius(), 40.0);
    }

    #[test]
    fn rarity_palette_caps_at_gold_trim() {
        assert_eq!(rarity_color(Rarity::new(5)), rarity_color(Rarity::new(9)));
        assert_ne!(rarity_color(Rarity::new(1)), rarity_color(Rarity::new(4)));
    }

    #[test]
    fn overlay_state_records_attack_highlight_and_visibility() {
        let mut overlay = OverlayState::new();
        let origin = CellCoord::new(5, 5);
        let offsets = vec![AreaOffset::new(1, 0), AreaOffset::new(2, 0)];

        overlay.highlight_attack(origin, &offsets);
        assert!(overlay.is_visible(OverlayKind::Attack));
        assert_eq!(
            overlay.attack_highlight(),
            Some((origin, offsets.as_slice()))
        );

        overlay.hide_overlay(OverlayKind::Attack);
        assert!(!overlay.is_visible(OverlayKind::Attack));
        assert_eq!(overlay.attack_highlight(), None);
    }

    #[test]
    fn overlay_state_moves_attached_badge_only() {
        let mut overlay = OverlayState::new();

        overlay.move_badge(Vec2::new(4.0, 4.0));
        assert!(overlay.badge().is_none());

        overlay.attach_badge(CursorBadge::new("portraits/vanguard.png", Vec2::ZERO));
        overlay.move_badge(Vec2::new(12.0, 7.0));
        let badge = overlay.badge().expect("badge stays attached");
        assert_eq!(badge.position, Vec2::new(12.0, 7.0));

        overlay.remove_badge();
        assert!(overlay.badge().is_none());
    }

    #[test]
    fn selector_lifecycle_clears_indicator_on_close() {
        let mut overlay = OverlayState::new();
        overlay.open_selector(SelectorPaint::new(
            Vec2::new(100.0, 100.0),
            80.0,
            SelectorPaint::DEFAULT_BACKDROP,
        ));
        overlay.paint_selector(SelectorIndicator::NeutralRing { radius: 40.0 });

        assert!(overlay.is_visible(OverlayKind::Selector));
        assert!(overlay.indicator().is_some());

        overlay.close_selector();
        assert!(!overlay.is_visible(OverlayKind::Selector));
        assert!(overlay.indicator().is_none());
        assert!(overlay.selector().is_none());
    }

    #[test]
    fn redraw_counter_coalesces_requests_between_frames() {
        let mut redraw = RedrawCounter::new();
        redraw.request_redraw();
        redraw.request_redraw();

        assert!(redraw.is_pending());
        assert!(redraw.take_frame());
        assert!(!redraw.take_frame());
        assert_eq!(redraw.frames(), 1);
    }
}
