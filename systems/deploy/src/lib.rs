#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Interactive deployment controller for Rampart.
//!
//! [`DeployController`] drives the pointer-driven flow from "unit card
//! pressed" through "facing committed": a placement session previews the
//! unit's attack footprint while the pointer hovers eligible cells, and a
//! direction session turns the camera azimuth plus the pointer's angle from
//! a screen-space anchor into one of four facings. Session state is a tagged
//! variant rather than captured closures, and every handler a session binds
//! is recorded in the controller's [`BindingTable`] so teardown unbinds
//! exactly what was bound.

use std::collections::{BTreeMap, BTreeSet};
use std::f32::consts::FRAC_PI_2;
use std::{error::Error, fmt, mem};

use glam::{Vec2, Vec3};
use rampart_core::{
    AttackArea, CardIndex, CellCoord, Facing, Quadrant, UiEvent, UnitCatalog, UnitDescriptor,
    UnitId, UnitKey,
};
use rampart_scene::{
    anchor_on_canvas, BattleMap, CameraRig, CursorBadge, OverlayKind, OverlaySurface, RedrawQueue,
    SelectorIndicator, SelectorPaint, Simulation,
};

/// Fraction of the canvas width used as the direction-selector radius.
const SELECTOR_RADIUS_FRACTION: f32 = 0.1;

/// Angular width of the golden aim arc drawn while pointing.
const AIM_ARC_WIDTH: f32 = FRAC_PI_2;

/// Pointer event dispatched into the controller by the host event loop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerInput {
    /// Pointer pressed down over a roster card.
    CardPressed(CardIndex),
    /// Pointer released after a card press, resolving the placement.
    CardReleased,
    /// Pointer moved over the canvas; the position is read back from the
    /// map's tracked pointer.
    PointerMoved,
    /// Pointer moved inside the direction selector, in canvas pixels.
    SelectorMoved(Vec2),
    /// Confirming click inside the direction selector, in canvas pixels.
    SelectorClicked(Vec2),
    /// Plain click on the map outside any session flow.
    MapClicked,
}

/// Role a bound handler plays, mirroring the host event source's targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HandlerRole {
    /// Permanent map-click handler backing the passive tracker.
    MapInspect,
    /// Canvas move handler active while a placement session runs.
    PlacementMove,
    /// One-shot pointer-up handler that resolves a placement session.
    PlacementRelease,
    /// Selector move handler active while a direction session runs.
    SelectorMove,
    /// One-shot confirming-click handler of a direction session.
    SelectorConfirm,
}

/// Identifier of a single bound handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(u64);

#[derive(Clone, Copy, Debug)]
struct BindingRecord {
    role: HandlerRole,
    once: bool,
}

/// Registry modelling the host event source's bind/unbind surface.
///
/// One record exists per bound handler. The table is inspectable so tests
/// can prove that sessions unbind exactly the handlers they bound.
#[derive(Debug, Default)]
pub struct BindingTable {
    entries: BTreeMap<BindingId, BindingRecord>,
    next_id: u64,
}

impl BindingTable {
    fn new() -> Self {
        Self::default()
    }

    fn bind(&mut self, role: HandlerRole, once: bool) -> BindingId {
        let id = BindingId(self.next_id);
        self.next_id += 1;
        let _ = self.entries.insert(id, BindingRecord { role, once });
        id
    }

    fn unbind(&mut self, id: BindingId) -> bool {
        self.entries.remove(&id).is_some()
    }

    /// Marks the binding as dispatched; one-shot bindings retire here.
    fn dispatch(&mut self, id: BindingId) -> bool {
        let Some(record) = self.entries.get(&id) else {
            return false;
        };
        if record.once {
            let _ = self.entries.remove(&id);
        }
        true
    }

    /// Reports whether any handler with the provided role is bound.
    #[must_use]
    pub fn is_bound(&self, role: HandlerRole) -> bool {
        self.entries.values().any(|record| record.role == role)
    }

    /// Roles of all currently bound handlers, in bind order.
    #[must_use]
    pub fn active_roles(&self) -> Vec<HandlerRole> {
        self.entries.values().map(|record| record.role).collect()
    }

    /// Number of currently bound handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether no handlers are bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Strip of unit cards the player starts placements from.
#[derive(Clone, Debug)]
pub struct CardRoster {
    cards: Vec<UnitKey>,
    chosen: Option<CardIndex>,
}

impl CardRoster {
    fn new(cards: Vec<UnitKey>) -> Self {
        Self {
            cards,
            chosen: None,
        }
    }

    /// Unit key behind the provided card position.
    #[must_use]
    pub fn card(&self, index: CardIndex) -> Option<&UnitKey> {
        self.cards.get(index.get())
    }

    /// Card currently marked as chosen, if any.
    #[must_use]
    pub const fn chosen(&self) -> Option<CardIndex> {
        self.chosen
    }

    /// Number of cards in the roster.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Reports whether the roster holds no cards.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    fn mark_chosen(&mut self, index: CardIndex) {
        self.chosen = Some(index);
    }

    fn clear_chosen(&mut self) {
        self.chosen = None;
    }
}

/// Ephemeral state of an in-flight placement session.
///
/// The "chosen" marker on the roster is the session's selection handle; it
/// is set on session start and cleared on teardown.
#[derive(Debug)]
struct PlacementSession {
    unit: UnitKey,
    descriptor: UnitDescriptor,
    eligible: BTreeSet<CellCoord>,
    move_binding: BindingId,
    release_binding: BindingId,
}

/// Ephemeral state of a direction session pending a facing choice.
#[derive(Debug)]
struct DirectionSession {
    unit_id: UnitId,
    unit: UnitKey,
    cell: CellCoord,
    base_area: AttackArea,
    paint: SelectorPaint,
    azimuth: f32,
    candidate: Option<(Facing, AttackArea)>,
    move_binding: BindingId,
    confirm_binding: BindingId,
}

#[derive(Debug)]
enum DeployState {
    Idle,
    Placing(PlacementSession),
    Choosing(DirectionSession),
}

/// Pointer-driven deployment controller.
///
/// At most one placement session and one direction session exist at a time;
/// the tagged [`DeployState`] makes the two mutually exclusive. Collaborators
/// are passed into [`handle`](Self::handle) per event so the controller owns
/// no scene resources of its own.
#[derive(Debug)]
pub struct DeployController {
    catalog: UnitCatalog,
    roster: CardRoster,
    bindings: BindingTable,
    state: DeployState,
    canvas: Vec2,
}

impl DeployController {
    /// Creates a controller for the provided catalog and card roster.
    ///
    /// Binds the permanent map-inspect handler. Returns an error when the
    /// canvas has no area, the roster is empty, or a card names a unit type
    /// missing from the catalog.
    pub fn new(
        catalog: UnitCatalog,
        cards: Vec<UnitKey>,
        canvas: Vec2,
    ) -> Result<Self, DeployError> {
        if !canvas.x.is_finite() || !canvas.y.is_finite() || canvas.x <= 0.0 || canvas.y <= 0.0 {
            return Err(DeployError::InvalidCanvasSize {
                width: canvas.x,
                height: canvas.y,
            });
        }
        if cards.is_empty() {
            return Err(DeployError::EmptyRoster);
        }
        if let Some(unknown) = cards.iter().find(|key| catalog.descriptor(key).is_none()) {
            return Err(DeployError::UnknownUnit {
                key: unknown.clone(),
            });
        }

        let mut bindings = BindingTable::new();
        let _ = bindings.bind(HandlerRole::MapInspect, false);

        Ok(Self {
            catalog,
            roster: CardRoster::new(cards),
            bindings,
            state: DeployState::Idle,
            canvas,
        })
    }

    /// Card roster, including which card is currently marked chosen.
    #[must_use]
    pub fn roster(&self) -> &CardRoster {
        &self.roster
    }

    /// Table of currently bound handlers.
    #[must_use]
    pub fn bindings(&self) -> &BindingTable {
        &self.bindings
    }

    /// Reports whether no session is active.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self.state, DeployState::Idle)
    }

    /// Dispatches a pointer event into the active session, if any.
    ///
    /// Events that do not apply to the current state are ignored; every
    /// state transition appends [`UiEvent`] values to `out`.
    pub fn handle<M, O, R, S, C>(
        &mut self,
        input: PointerInput,
        map: &mut M,
        overlay: &mut O,
        redraw: &mut R,
        sim: &mut S,
        camera: &C,
        out: &mut Vec<UiEvent>,
    ) where
        M: BattleMap,
        O: OverlaySurface,
        R: RedrawQueue,
        S: Simulation,
        C: CameraRig,
    {
        match input {
            PointerInput::CardPressed(card) => {
                self.start_placement(card, map, overlay, redraw, out);
            }
            PointerInput::CardReleased => {
                self.resolve_placement(map, overlay, redraw, sim, camera, out);
            }
            PointerInput::PointerMoved => {
                self.update_placement_preview(map, overlay, redraw);
            }
            PointerInput::SelectorMoved(position) => {
                self.update_direction_preview(position, overlay, redraw, sim, out);
            }
            PointerInput::SelectorClicked(position) => {
                self.resolve_direction(position, map, overlay, redraw, sim, out);
            }
            PointerInput::MapClicked => {
                self.inspect_cell(map, sim, out);
            }
        }
    }

    fn start_placement<M, O, R>(
        &mut self,
        card: CardIndex,
        map: &mut M,
        overlay: &mut O,
        redraw: &mut R,
        out: &mut Vec<UiEvent>,
    ) where
        M: BattleMap,
        O: OverlaySurface,
        R: RedrawQueue,
    {
        if !matches!(self.state, DeployState::Idle) {
            return;
        }
        let Some(unit) = self.roster.card(card).cloned() else {
            return;
        };
        let Some(descriptor) = self.catalog.descriptor(&unit).cloned() else {
            return;
        };

        self.roster.mark_chosen(card);

        let eligible = map.eligible_cells(descriptor.placement);
        overlay.hide_overlay(OverlayKind::Attack);
        overlay.set_placement_wash(&eligible);
        overlay.show_overlay(OverlayKind::Placement);

        let pointer = map.tracked_pointer().unwrap_or(Vec2::ZERO);
        overlay.attach_badge(CursorBadge::new(descriptor.portrait.clone(), pointer));

        let move_binding = self.bindings.bind(HandlerRole::PlacementMove, false);
        let release_binding = self.bindings.bind(HandlerRole::PlacementRelease, true);

        out.push(UiEvent::PlacementStarted {
            card,
            unit: unit.clone(),
        });

        self.state = DeployState::Placing(PlacementSession {
            unit,
            descriptor,
            eligible,
            move_binding,
            release_binding,
        });
        redraw.request_redraw();
    }

    fn update_placement_preview<M, O, R>(&mut self, map: &M, overlay: &mut O, redraw: &mut R)
    where
        M: BattleMap,
        O: OverlaySurface,
        R: RedrawQueue,
    {
        let DeployState::Placing(session) = &self.state else {
            return;
        };
        // No tracked pointer means the cursor left the canvas; leave the
        // overlays as they were.
        let Some(pointer) = map.tracked_pointer() else {
            return;
        };

        overlay.move_badge(pointer);
        match map.tracked_cell() {
            Some(cell) => {
                overlay.highlight_attack(cell, session.descriptor.attack_area.offsets());
            }
            None => overlay.hide_overlay(OverlayKind::Attack),
        }
        redraw.request_redraw();
    }

    fn resolve_placement<M, O, R, S, C>(
        &mut self,
        map: &mut M,
        overlay: &mut O,
        redraw: &mut R,
        sim: &mut S,
        camera: &C,
        out: &mut Vec<UiEvent>,
    ) where
        M: BattleMap,
        O: OverlaySurface,
        R: RedrawQueue,
        S: Simulation,
        C: CameraRig,
    {
        let session = match mem::replace(&mut self.state, DeployState::Idle) {
            DeployState::Placing(session) => session,
            // A release without a live session is the symmetric
            // mouse-up-without-down; ignore it.
            other => {
                self.state = other;
                return;
            }
        };

        let _ = self.bindings.dispatch(session.release_binding);
        let _ = self.bindings.unbind(session.move_binding);
        self.roster.clear_chosen();
        overlay.hide_overlay(OverlayKind::Placement);
        overlay.hide_overlay(OverlayKind::Attack);
        overlay.remove_badge();
        redraw.request_redraw();

        // Only the cell tracked at release time counts; a pointer that left
        // the canvas has no tracked cell and the placement cancels.
        let target = match map.tracked_cell() {
            Some(cell) if session.eligible.contains(&cell) => cell,
            _ => {
                out.push(UiEvent::PlacementCancelled { unit: session.unit });
                return;
            }
        };

        let Some(unit_id) = sim.create_unit(&session.unit, &session.descriptor) else {
            out.push(UiEvent::PlacementRefused {
                unit: session.unit,
                cell: target,
            });
            return;
        };

        map.add_unit(target, unit_id);
        out.push(UiEvent::UnitPlaced {
            unit_id,
            unit: session.unit.clone(),
            cell: target,
        });

        self.open_selector(
            unit_id,
            session.unit,
            target,
            session.descriptor.attack_area,
            map,
            overlay,
            sim,
            camera,
            out,
        );
    }

    #[allow(clippy::too_many_arguments)] // Selector setup touches every collaborator once.
    fn open_selector<M, O, S, C>(
        &mut self,
        unit_id: UnitId,
        unit: UnitKey,
        cell: CellCoord,
        base_area: AttackArea,
        map: &M,
        overlay: &mut O,
        sim: &mut S,
        camera: &C,
        out: &mut Vec<UiEvent>,
    ) where
        M: BattleMap,
        O: OverlaySurface,
        S: Simulation,
        C: CameraRig,
    {
        let (Some(center), Some(info)) = (map.cell_center(cell), map.cell_info(cell)) else {
            // The map cannot describe the cell it just accepted a unit on.
            // Register the unit with its default facing rather than leaving
            // it targetless.
            sim.set_unit_facing(unit_id, Facing::Right);
            sim.assign_attack_area(unit_id, base_area);
            sim.register_active(&unit, unit_id, cell);
            out.push(UiEvent::FacingCommitted {
                unit_id,
                facing: Facing::Right,
            });
            return;
        };

        let ndc = camera.project_to_ndc(center + Vec3::Y * info.height);
        let anchor = anchor_on_canvas(ndc, self.canvas);
        let radius = self.canvas.x * SELECTOR_RADIUS_FRACTION;
        let paint = SelectorPaint::new(anchor, radius, SelectorPaint::DEFAULT_BACKDROP);

        overlay.open_selector(paint);
        overlay.show_overlay(OverlayKind::Selector);

        let move_binding = self.bindings.bind(HandlerRole::SelectorMove, false);
        let confirm_binding = self.bindings.bind(HandlerRole::SelectorConfirm, true);

        self.state = DeployState::Choosing(DirectionSession {
            unit_id,
            unit,
            cell,
            base_area,
            paint,
            azimuth: camera.azimuthal_angle(),
            candidate: None,
            move_binding,
            confirm_binding,
        });
    }

    fn update_direction_preview<O, R, S>(
        &mut self,
        position: Vec2,
        overlay: &mut O,
        redraw: &mut R,
        sim: &mut S,
        out: &mut Vec<UiEvent>,
    ) where
        O: OverlaySurface,
        R: RedrawQueue,
        S: Simulation,
    {
        let DeployState::Choosing(session) = &mut self.state else {
            return;
        };

        let delta = position - session.paint.anchor;
        if delta.length() <= session.paint.dead_zone_radius() {
            // Pointing at the center means "no direction yet"; an earlier
            // candidate survives in case the pointer swings back out.
            overlay.paint_selector(SelectorIndicator::NeutralRing {
                radius: session.paint.neutral_ring_radius(),
            });
            overlay.hide_overlay(OverlayKind::Attack);
            redraw.request_redraw();
            return;
        }

        let theta = delta.y.atan2(delta.x);
        overlay.paint_selector(SelectorIndicator::AimArc {
            center_angle: theta,
            width: AIM_ARC_WIDTH,
        });

        let facing = Facing::from_quadrants(
            Quadrant::classify(session.azimuth),
            Quadrant::classify(theta),
        );
        let area = session.base_area.rotated(facing);
        sim.set_unit_facing(session.unit_id, facing);

        let changed = session
            .candidate
            .as_ref()
            .map_or(true, |(previous, _)| *previous != facing);
        if changed {
            out.push(UiEvent::FacingPreviewed {
                unit_id: session.unit_id,
                facing,
            });
        }

        overlay.highlight_attack(session.cell, area.offsets());
        session.candidate = Some((facing, area));
        redraw.request_redraw();
    }

    fn resolve_direction<M, O, R, S>(
        &mut self,
        position: Vec2,
        map: &mut M,
        overlay: &mut O,
        redraw: &mut R,
        sim: &mut S,
        out: &mut Vec<UiEvent>,
    ) where
        M: BattleMap,
        O: OverlaySurface,
        R: RedrawQueue,
        S: Simulation,
    {
        let session = match mem::replace(&mut self.state, DeployState::Idle) {
            DeployState::Choosing(session) => session,
            other => {
                self.state = other;
                return;
            }
        };

        let _ = self.bindings.dispatch(session.confirm_binding);
        let _ = self.bindings.unbind(session.move_binding);
        overlay.close_selector();
        overlay.hide_overlay(OverlayKind::Selector);
        overlay.hide_overlay(OverlayKind::Attack);
        redraw.request_redraw();

        let delta = position - session.paint.anchor;
        if delta.length() <= session.paint.dead_zone_radius() {
            let _ = map.remove_unit(session.unit_id);
            out.push(UiEvent::DeploymentAborted {
                unit_id: session.unit_id,
                cell: session.cell,
            });
            return;
        }

        let (facing, area) = match session.candidate {
            Some(candidate) => candidate,
            // A confirming click before any outside-dead-zone move commits
            // the default orientation.
            None => (Facing::Right, session.base_area),
        };

        sim.set_unit_facing(session.unit_id, facing);
        sim.assign_attack_area(session.unit_id, area);
        sim.register_active(&session.unit, session.unit_id, session.cell);
        out.push(UiEvent::FacingCommitted {
            unit_id: session.unit_id,
            facing,
        });
    }

    fn inspect_cell<M, S>(&self, map: &M, sim: &S, out: &mut Vec<UiEvent>)
    where
        M: BattleMap,
        S: Simulation,
    {
        let Some(cell) = map.tracked_cell() else {
            return;
        };

        for (unit_id, unit_cell) in sim.active_units() {
            if unit_cell == cell {
                out.push(UiEvent::UnitInspected { unit_id, cell });
            }
        }
    }
}

/// Errors that can occur when constructing the deployment controller.
#[derive(Debug, PartialEq)]
pub enum DeployError {
    /// The canvas must have positive finite dimensions.
    InvalidCanvasSize {
        /// Provided canvas width in pixels.
        width: f32,
        /// Provided canvas height in pixels.
        height: f32,
    },
    /// The card roster must contain at least one card.
    EmptyRoster,
    /// A roster card names a unit type missing from the catalog.
    UnknownUnit {
        /// Key that failed the catalog lookup.
        key: UnitKey,
    },
}

impl fmt::Display for DeployError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCanvasSize { width, height } => {
                write!(
                    f,
                    "canvas dimensions must be positive (received {width}x{height})"
                )
            }
            Self::EmptyRoster => write!(f, "card roster must not be empty"),
            Self::UnknownUnit { key } => {
                write!(f, "card references unknown unit type '{}'", key.as_str())
            }
        }
    }
}

impl Error for DeployError {}
