use std::collections::BTreeMap;

use glam::{Vec2, Vec3};
use rampart_core::{
    AreaOffset, AttackArea, CardIndex, CellCoord, Facing, PlacementKind, Rarity, UiEvent,
    UnitCatalog, UnitDescriptor, UnitId, UnitKey,
};
use rampart_grid::GridMap;
use rampart_scene::{
    CameraRig, OverlayKind, OverlayState, RedrawCounter, SelectorIndicator, Simulation,
};
use rampart_system_deploy::{DeployController, HandlerRole, PointerInput};

const CANVAS: Vec2 = Vec2::new(800.0, 600.0);
const ANCHOR: Vec2 = Vec2::new(400.0, 300.0);

/// Camera stub with a fixed azimuth that projects every point to the center
/// of the screen.
struct FixedCamera {
    azimuth: f32,
}

impl CameraRig for FixedCamera {
    fn azimuthal_angle(&self) -> f32 {
        self.azimuth
    }

    fn project_to_ndc(&self, _point: Vec3) -> Vec2 {
        Vec2::ZERO
    }
}

/// Simulation stub recording every call the controller makes.
#[derive(Default)]
struct RecordingSim {
    next_id: u32,
    refuse_creation: bool,
    created: Vec<UnitKey>,
    facings: BTreeMap<UnitId, Facing>,
    areas: BTreeMap<UnitId, AttackArea>,
    active: Vec<(UnitId, CellCoord)>,
}

impl Simulation for RecordingSim {
    fn create_unit(&mut self, key: &UnitKey, _descriptor: &UnitDescriptor) -> Option<UnitId> {
        if self.refuse_creation {
            return None;
        }
        let id = UnitId::new(self.next_id);
        self.next_id += 1;
        self.created.push(key.clone());
        Some(id)
    }

    fn set_unit_facing(&mut self, unit: UnitId, facing: Facing) {
        let _ = self.facings.insert(unit, facing);
    }

    fn assign_attack_area(&mut self, unit: UnitId, area: AttackArea) {
        let _ = self.areas.insert(unit, area);
    }

    fn register_active(&mut self, _key: &UnitKey, unit: UnitId, cell: CellCoord) {
        self.active.push((unit, cell));
    }

    fn active_units(&self) -> Vec<(UnitId, CellCoord)> {
        self.active.clone()
    }
}

struct Rig {
    controller: DeployController,
    map: GridMap,
    overlay: OverlayState,
    redraw: RedrawCounter,
    sim: RecordingSim,
    camera: FixedCamera,
    events: Vec<UiEvent>,
}

fn base_area() -> AttackArea {
    AttackArea::new(vec![AreaOffset::new(1, 0), AreaOffset::new(2, 0)])
}

fn catalog() -> UnitCatalog {
    let mut catalog = UnitCatalog::new();
    let _ = catalog.insert(
        UnitKey::new("vanguard"),
        UnitDescriptor {
            cost: 9,
            rarity: Rarity::new(3),
            placement: PlacementKind::Ground,
            attack_area: base_area(),
            portrait: String::from("portraits/vanguard.png"),
        },
    );
    let _ = catalog.insert(
        UnitKey::new("marksman"),
        UnitDescriptor {
            cost: 14,
            rarity: Rarity::new(4),
            placement: PlacementKind::Elevated,
            attack_area: AttackArea::new(vec![AreaOffset::new(1, 0), AreaOffset::new(1, 1)]),
            portrait: String::from("portraits/marksman.png"),
        },
    );
    catalog
}

fn rig() -> Rig {
    rig_with_azimuth(0.0)
}

fn rig_with_azimuth(azimuth: f32) -> Rig {
    let cards = vec![UnitKey::new("vanguard"), UnitKey::new("marksman")];
    Rig {
        controller: DeployController::new(catalog(), cards, CANVAS)
            .expect("valid controller configuration"),
        map: GridMap::new(10, 10, 10.0).expect("valid grid dimensions"),
        overlay: OverlayState::new(),
        redraw: RedrawCounter::new(),
        sim: RecordingSim::default(),
        camera: FixedCamera { azimuth },
        events: Vec::new(),
    }
}

impl Rig {
    fn dispatch(&mut self, input: PointerInput) {
        self.controller.handle(
            input,
            &mut self.map,
            &mut self.overlay,
            &mut self.redraw,
            &mut self.sim,
            &self.camera,
            &mut self.events,
        );
    }

    fn hover_world(&mut self, x: f32, y: f32) {
        self.map.track_pointer(Some(Vec2::new(x, y)));
        self.dispatch(PointerInput::PointerMoved);
    }

    /// Presses the vanguard card, hovers cell (5, 5) and releases, leaving
    /// the controller in its direction-choosing state.
    fn place_vanguard(&mut self) -> UnitId {
        self.dispatch(PointerInput::CardPressed(CardIndex::new(0)));
        self.hover_world(55.0, 55.0);
        self.dispatch(PointerInput::CardReleased);
        match self.events.iter().rev().find_map(|event| match event {
            UiEvent::UnitPlaced { unit_id, .. } => Some(*unit_id),
            _ => None,
        }) {
            Some(unit_id) => unit_id,
            None => panic!("placement should have produced a UnitPlaced event"),
        }
    }

    fn take_events(&mut self) -> Vec<UiEvent> {
        std::mem::take(&mut self.events)
    }
}

#[test]
fn card_press_marks_the_card_and_binds_placement_handlers() {
    let mut rig = rig();
    rig.map.track_pointer(Some(Vec2::new(12.0, 34.0)));

    rig.dispatch(PointerInput::CardPressed(CardIndex::new(0)));

    assert_eq!(rig.controller.roster().chosen(), Some(CardIndex::new(0)));
    assert!(rig.overlay.is_visible(OverlayKind::Placement));
    assert_eq!(
        rig.overlay.placement_wash().len(),
        100,
        "all ground cells are eligible on an empty map",
    );
    let badge = rig.overlay.badge().expect("cursor badge attached");
    assert_eq!(badge.portrait, "portraits/vanguard.png");
    assert_eq!(badge.position, Vec2::new(12.0, 34.0));
    assert_eq!(
        rig.controller.bindings().active_roles(),
        vec![
            HandlerRole::MapInspect,
            HandlerRole::PlacementMove,
            HandlerRole::PlacementRelease,
        ]
    );
}

#[test]
fn second_card_press_is_ignored_while_a_session_is_active() {
    let mut rig = rig();

    rig.dispatch(PointerInput::CardPressed(CardIndex::new(0)));
    let roles_before = rig.controller.bindings().active_roles();
    rig.dispatch(PointerInput::CardPressed(CardIndex::new(1)));

    assert_eq!(
        rig.controller.roster().chosen(),
        Some(CardIndex::new(0)),
        "the first session keeps the chosen marker",
    );
    assert_eq!(rig.controller.bindings().active_roles(), roles_before);
    let starts = rig
        .events
        .iter()
        .filter(|event| matches!(event, UiEvent::PlacementStarted { .. }))
        .count();
    assert_eq!(starts, 1, "only one session may start");
}

#[test]
fn release_without_a_press_is_a_no_op() {
    let mut rig = rig();

    rig.dispatch(PointerInput::CardReleased);

    assert!(rig.controller.is_idle());
    assert!(rig.events.is_empty());
    assert_eq!(rig.controller.bindings().len(), 1);
}

#[test]
fn handlers_unbind_symmetrically_over_repeated_cancel_cycles() {
    let mut rig = rig();
    rig.map.track_pointer(None);

    for _ in 0..5 {
        rig.dispatch(PointerInput::CardPressed(CardIndex::new(0)));
        rig.dispatch(PointerInput::CardReleased);
    }

    assert_eq!(
        rig.controller.bindings().active_roles(),
        vec![HandlerRole::MapInspect],
        "only the permanent inspect handler survives the cycles",
    );
    assert_eq!(rig.controller.roster().chosen(), None);
    assert!(rig.controller.is_idle());
}

#[test]
fn hovering_a_cell_previews_the_base_attack_area() {
    let mut rig = rig();

    rig.dispatch(PointerInput::CardPressed(CardIndex::new(0)));
    rig.hover_world(55.0, 55.0);

    let (origin, offsets) = rig.overlay.attack_highlight().expect("preview drawn");
    assert_eq!(origin, CellCoord::new(5, 5));
    assert_eq!(offsets, base_area().offsets());
    assert_eq!(
        rig.overlay.badge().expect("badge follows pointer").position,
        Vec2::new(55.0, 55.0)
    );
}

#[test]
fn release_over_an_ineligible_cell_cancels_the_placement() {
    let mut rig = rig();

    // The marksman needs elevated terrain and the default map has none.
    rig.dispatch(PointerInput::CardPressed(CardIndex::new(1)));
    rig.hover_world(55.0, 55.0);
    rig.dispatch(PointerInput::CardReleased);

    assert!(rig.sim.created.is_empty(), "unit creation never requested");
    assert_eq!(rig.map.occupant_count(), 0);
    assert_eq!(rig.controller.roster().chosen(), None);
    assert!(!rig.overlay.is_visible(OverlayKind::Placement));
    assert!(!rig.overlay.is_visible(OverlayKind::Attack));
    assert!(rig.overlay.badge().is_none());
    assert!(rig.events.iter().any(|event| matches!(
        event,
        UiEvent::PlacementCancelled { unit } if unit.as_str() == "marksman"
    )));
}

#[test]
fn release_with_no_tracked_cell_cancels_the_placement() {
    let mut rig = rig();

    rig.dispatch(PointerInput::CardPressed(CardIndex::new(0)));
    rig.map.track_pointer(None);
    rig.dispatch(PointerInput::CardReleased);

    assert!(rig.sim.created.is_empty());
    assert!(rig.controller.is_idle());
    assert!(rig.events.iter().any(|event| matches!(
        event,
        UiEvent::PlacementCancelled { unit } if unit.as_str() == "vanguard"
    )));
}

#[test]
fn release_after_the_pointer_leaves_the_canvas_cancels_the_placement() {
    let mut rig = rig();

    rig.dispatch(PointerInput::CardPressed(CardIndex::new(0)));
    rig.hover_world(55.0, 55.0);
    rig.map.track_pointer(None);
    rig.dispatch(PointerInput::PointerMoved);
    rig.dispatch(PointerInput::CardReleased);

    assert!(
        rig.sim.created.is_empty(),
        "an earlier hover must not stand in for the departed pointer",
    );
    assert_eq!(rig.map.occupant_count(), 0);
    assert!(rig.controller.is_idle());
    assert!(rig.events.iter().any(|event| matches!(
        event,
        UiEvent::PlacementCancelled { unit } if unit.as_str() == "vanguard"
    )));
}

#[test]
fn refused_creation_ends_the_session_without_adding_a_unit() {
    let mut rig = rig();
    rig.sim.refuse_creation = true;

    rig.dispatch(PointerInput::CardPressed(CardIndex::new(0)));
    rig.hover_world(55.0, 55.0);
    rig.dispatch(PointerInput::CardReleased);

    assert_eq!(rig.map.occupant_count(), 0);
    assert!(rig.controller.is_idle());
    assert_eq!(rig.controller.bindings().len(), 1);
    assert!(rig.events.iter().any(|event| matches!(
        event,
        UiEvent::PlacementRefused { cell, .. } if *cell == CellCoord::new(5, 5)
    )));
}

#[test]
fn successful_placement_opens_the_direction_selector() {
    let mut rig = rig();

    let unit_id = rig.place_vanguard();

    assert_eq!(rig.map.unit_cell(unit_id), Some(CellCoord::new(5, 5)));
    assert!(!rig.overlay.is_visible(OverlayKind::Placement));
    assert!(rig.overlay.is_visible(OverlayKind::Selector));
    let paint = rig.overlay.selector().expect("selector open");
    assert_eq!(paint.anchor, ANCHOR);
    assert!(
        (paint.radius - CANVAS.x / 10.0).abs() < 1e-3,
        "selector radius is a tenth of the canvas width, found {}",
        paint.radius,
    );
    assert_eq!(
        rig.controller.bindings().active_roles(),
        vec![
            HandlerRole::MapInspect,
            HandlerRole::SelectorMove,
            HandlerRole::SelectorConfirm,
        ]
    );
    assert!(
        !rig.sim.active.iter().any(|(id, _)| *id == unit_id),
        "the unit is not targetable before its facing is committed",
    );
}

#[test]
fn dead_zone_pointing_shows_the_neutral_ring_and_hides_the_preview() {
    let mut rig = rig();
    let _ = rig.place_vanguard();

    rig.dispatch(PointerInput::SelectorMoved(ANCHOR + Vec2::new(5.0, 0.0)));

    match rig.overlay.indicator() {
        Some(SelectorIndicator::NeutralRing { radius }) => {
            assert!((radius - 40.0).abs() < 1e-3, "ring radius {radius}");
        }
        other => panic!("expected the neutral ring, found {other:?}"),
    }
    assert!(!rig.overlay.is_visible(OverlayKind::Attack));
}

#[test]
fn pointing_down_previews_the_front_down_rotation() {
    let mut rig = rig();
    let unit_id = rig.place_vanguard();
    let _ = rig.take_events();

    rig.dispatch(PointerInput::SelectorMoved(ANCHOR + Vec2::new(0.0, 100.0)));

    let (origin, offsets) = rig.overlay.attack_highlight().expect("candidate drawn");
    assert_eq!(origin, CellCoord::new(5, 5));
    assert_eq!(offsets, [AreaOffset::new(0, 1), AreaOffset::new(0, 2)]);
    assert_eq!(rig.sim.facings.get(&unit_id), Some(&Facing::Down));
    assert_eq!(
        rig.take_events(),
        vec![UiEvent::FacingPreviewed {
            unit_id,
            facing: Facing::Down,
        }]
    );
    match rig.overlay.indicator() {
        Some(SelectorIndicator::AimArc {
            center_angle,
            width,
        }) => {
            assert!((center_angle - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
            assert!((width - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        }
        other => panic!("expected an aim arc, found {other:?}"),
    }
}

#[test]
fn camera_rotation_reorients_the_gesture_to_the_screen() {
    // With the camera swung half way around the scene, pointing down on
    // screen must face the unit up in world terms.
    let mut rig = rig_with_azimuth(std::f32::consts::PI);
    let unit_id = rig.place_vanguard();

    rig.dispatch(PointerInput::SelectorMoved(ANCHOR + Vec2::new(0.0, 100.0)));

    assert_eq!(rig.sim.facings.get(&unit_id), Some(&Facing::Up));
    let (_, offsets) = rig.overlay.attack_highlight().expect("candidate drawn");
    assert_eq!(offsets, [AreaOffset::new(0, -1), AreaOffset::new(0, -2)]);
}

#[test]
fn confirming_click_commits_the_candidate_area() {
    let mut rig = rig();
    let unit_id = rig.place_vanguard();

    rig.dispatch(PointerInput::SelectorMoved(ANCHOR + Vec2::new(0.0, 100.0)));
    rig.dispatch(PointerInput::SelectorClicked(ANCHOR + Vec2::new(0.0, 100.0)));

    assert_eq!(
        rig.sim.areas.get(&unit_id),
        Some(&AttackArea::new(vec![
            AreaOffset::new(0, 1),
            AreaOffset::new(0, 2),
        ]))
    );
    assert_eq!(rig.sim.active, vec![(unit_id, CellCoord::new(5, 5))]);
    assert!(!rig.overlay.is_visible(OverlayKind::Selector));
    assert!(!rig.overlay.is_visible(OverlayKind::Attack));
    assert!(rig.overlay.selector().is_none());
    assert_eq!(rig.controller.bindings().len(), 1);
    assert!(rig.controller.is_idle());
    assert!(rig.events.iter().any(|event| matches!(
        event,
        UiEvent::FacingCommitted { facing: Facing::Down, .. }
    )));
}

#[test]
fn dead_zone_click_removes_the_unit_without_mutating_its_area() {
    let mut rig = rig();
    let unit_id = rig.place_vanguard();

    rig.dispatch(PointerInput::SelectorMoved(ANCHOR + Vec2::new(0.0, 100.0)));
    rig.dispatch(PointerInput::SelectorClicked(ANCHOR + Vec2::new(10.0, 0.0)));

    assert_eq!(rig.map.occupant_count(), 0, "the unit leaves the map");
    assert!(rig.sim.areas.is_empty(), "no attack area was assigned");
    assert!(rig.sim.active.is_empty());
    assert_eq!(rig.controller.bindings().len(), 1);
    assert!(rig.controller.is_idle());
    assert!(rig.events.iter().any(|event| matches!(
        event,
        UiEvent::DeploymentAborted { unit_id: aborted, cell }
            if *aborted == unit_id && *cell == CellCoord::new(5, 5)
    )));
}

#[test]
fn commit_without_any_aim_defaults_to_the_right_facing() {
    let mut rig = rig();
    let unit_id = rig.place_vanguard();

    rig.dispatch(PointerInput::SelectorClicked(ANCHOR + Vec2::new(30.0, 0.0)));

    assert_eq!(rig.sim.facings.get(&unit_id), Some(&Facing::Right));
    assert_eq!(rig.sim.areas.get(&unit_id), Some(&base_area()));
    assert_eq!(rig.sim.active, vec![(unit_id, CellCoord::new(5, 5))]);
}

#[test]
fn map_click_reports_active_units_under_the_cell() {
    let mut rig = rig();
    let unit_id = rig.place_vanguard();
    rig.dispatch(PointerInput::SelectorClicked(ANCHOR + Vec2::new(30.0, 0.0)));
    let _ = rig.take_events();

    rig.map.track_pointer(Some(Vec2::new(55.0, 55.0)));
    rig.dispatch(PointerInput::MapClicked);
    assert_eq!(
        rig.take_events(),
        vec![UiEvent::UnitInspected {
            unit_id,
            cell: CellCoord::new(5, 5),
        }]
    );

    rig.map.track_pointer(Some(Vec2::new(5.0, 5.0)));
    rig.dispatch(PointerInput::MapClicked);
    assert!(rig.take_events().is_empty(), "empty cell reports nothing");

    rig.map.track_pointer(None);
    rig.dispatch(PointerInput::MapClicked);
    assert!(rig.take_events().is_empty(), "no tracked cell, no report");
}

#[test]
fn end_to_end_deployment_scenario() {
    let mut rig = rig();

    // Attempt over ineligible terrain: marksman on a ground-only map.
    rig.dispatch(PointerInput::CardPressed(CardIndex::new(1)));
    rig.hover_world(55.0, 55.0);
    rig.dispatch(PointerInput::CardReleased);

    assert_eq!(rig.map.occupant_count(), 0);
    assert_eq!(rig.controller.roster().chosen(), None);
    assert!(!rig.overlay.is_visible(OverlayKind::Placement));
    assert!(!rig.overlay.is_visible(OverlayKind::Attack));

    // Eligible placement at cell (5, 5) opens the selector.
    rig.dispatch(PointerInput::CardPressed(CardIndex::new(0)));
    rig.hover_world(55.0, 55.0);
    rig.dispatch(PointerInput::CardReleased);

    assert_eq!(rig.map.occupant_count(), 1);
    assert!(rig.overlay.is_visible(OverlayKind::Selector));

    // Aim front-down and confirm outside the dead-zone.
    rig.dispatch(PointerInput::SelectorMoved(ANCHOR + Vec2::new(0.0, 100.0)));
    rig.dispatch(PointerInput::SelectorClicked(ANCHOR + Vec2::new(0.0, 100.0)));

    let unit_id = UnitId::new(0);
    assert_eq!(rig.sim.active, vec![(unit_id, CellCoord::new(5, 5))]);
    assert_eq!(
        rig.sim.areas.get(&unit_id),
        Some(&AttackArea::new(vec![
            AreaOffset::new(0, 1),
            AreaOffset::new(0, 2),
        ]))
    );
    assert!(!rig.overlay.is_visible(OverlayKind::Selector));
    assert!(!rig.overlay.is_visible(OverlayKind::Attack));

    let kinds: Vec<&UiEvent> = rig
        .events
        .iter()
        .filter(|event| {
            matches!(
                event,
                UiEvent::PlacementCancelled { .. }
                    | UiEvent::UnitPlaced { .. }
                    | UiEvent::FacingCommitted { .. }
            )
        })
        .collect();
    assert_eq!(kinds.len(), 3, "cancel, place and commit each reported once");
}
