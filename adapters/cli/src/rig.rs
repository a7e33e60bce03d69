//! Headless stand-ins for the scene collaborators the replay drives.

use std::collections::BTreeMap;
use std::f32::consts::{FRAC_PI_3, FRAC_PI_4};

use glam::{Mat4, Vec2, Vec3};
use rampart_core::{AttackArea, CellCoord, Facing, UnitDescriptor, UnitId, UnitKey};
use rampart_scene::{CameraRig, Simulation};

/// Perspective camera orbiting the grid center at a fixed elevation.
pub(crate) struct OrbitCamera {
    view_projection: Mat4,
    azimuth: f32,
}

impl OrbitCamera {
    const ELEVATION: f32 = FRAC_PI_4;
    const FOV_Y: f32 = FRAC_PI_3;

    /// Creates a camera looking at `target` from the provided azimuth.
    pub(crate) fn new(azimuth: f32, target: Vec3, distance: f32, aspect: f32) -> Self {
        let offset = Vec3::new(
            Self::ELEVATION.cos() * azimuth.cos(),
            Self::ELEVATION.sin(),
            Self::ELEVATION.cos() * azimuth.sin(),
        ) * distance;
        let view = Mat4::look_at_rh(target + offset, target, Vec3::Y);
        let projection = Mat4::perspective_rh(Self::FOV_Y, aspect, 0.1, distance * 4.0);

        Self {
            view_projection: projection * view,
            azimuth,
        }
    }
}

impl CameraRig for OrbitCamera {
    fn azimuthal_angle(&self) -> f32 {
        self.azimuth
    }

    fn project_to_ndc(&self, point: Vec3) -> Vec2 {
        let clip = self.view_projection * point.extend(1.0);
        if clip.w.abs() <= f32::EPSILON {
            return Vec2::ZERO;
        }
        Vec2::new(clip.x / clip.w, clip.y / clip.w)
    }
}

/// Fully registered unit as the simulation stub remembers it.
pub(crate) struct ActiveUnit {
    pub(crate) kind: UnitKey,
    pub(crate) cell: CellCoord,
    pub(crate) facing: Facing,
    pub(crate) attack_area: AttackArea,
}

/// Simulation stub that enforces deployment costs against a funds pool.
pub(crate) struct BudgetSimulation {
    funds: u32,
    next_id: u32,
    facings: BTreeMap<UnitId, Facing>,
    areas: BTreeMap<UnitId, AttackArea>,
    active: BTreeMap<UnitId, ActiveUnit>,
}

impl BudgetSimulation {
    /// Creates a simulation stub with the provided starting funds.
    pub(crate) fn new(funds: u32) -> Self {
        Self {
            funds,
            next_id: 0,
            facings: BTreeMap::new(),
            areas: BTreeMap::new(),
            active: BTreeMap::new(),
        }
    }

    /// Funds left after the deployments so far.
    pub(crate) fn funds(&self) -> u32 {
        self.funds
    }

    /// Active units in identifier order.
    pub(crate) fn deployment(&self) -> impl Iterator<Item = (&UnitId, &ActiveUnit)> {
        self.active.iter()
    }
}

impl Simulation for BudgetSimulation {
    fn create_unit(&mut self, _key: &UnitKey, descriptor: &UnitDescriptor) -> Option<UnitId> {
        if self.funds < descriptor.cost {
            return None;
        }
        self.funds -= descriptor.cost;
        let id = UnitId::new(self.next_id);
        self.next_id += 1;
        Some(id)
    }

    fn set_unit_facing(&mut self, unit: UnitId, facing: Facing) {
        let _ = self.facings.insert(unit, facing);
    }

    fn assign_attack_area(&mut self, unit: UnitId, area: AttackArea) {
        let _ = self.areas.insert(unit, area);
    }

    fn register_active(&mut self, key: &UnitKey, unit: UnitId, cell: CellCoord) {
        let facing = self.facings.get(&unit).copied().unwrap_or(Facing::Right);
        let attack_area = self.areas.get(&unit).cloned().unwrap_or_default();
        let _ = self.active.insert(
            unit,
            ActiveUnit {
                kind: key.clone(),
                cell,
                facing,
                attack_area,
            },
        );
    }

    fn active_units(&self) -> Vec<(UnitId, CellCoord)> {
        self.active
            .iter()
            .map(|(unit, state)| (*unit, state.cell))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rampart_core::{AreaOffset, PlacementKind, Rarity};

    fn descriptor(cost: u32) -> UnitDescriptor {
        UnitDescriptor {
            cost,
            rarity: Rarity::new(2),
            placement: PlacementKind::Ground,
            attack_area: AttackArea::new(vec![AreaOffset::new(1, 0)]),
            portrait: String::from("portraits/vanguard.png"),
        }
    }

    #[test]
    fn creation_charges_funds_and_refuses_when_short() {
        let mut sim = BudgetSimulation::new(10);
        let key = UnitKey::new("vanguard");

        let first = sim.create_unit(&key, &descriptor(6));
        assert!(first.is_some());
        assert_eq!(sim.funds(), 4);

        assert!(
            sim.create_unit(&key, &descriptor(6)).is_none(),
            "a unit costing more than the remaining funds is refused",
        );
        assert_eq!(sim.funds(), 4, "a refused creation charges nothing");
    }

    #[test]
    fn registration_captures_the_last_facing_and_area() {
        let mut sim = BudgetSimulation::new(20);
        let key = UnitKey::new("vanguard");
        let unit = sim
            .create_unit(&key, &descriptor(5))
            .expect("funds suffice");

        sim.set_unit_facing(unit, Facing::Down);
        sim.assign_attack_area(unit, AttackArea::new(vec![AreaOffset::new(0, 1)]));
        sim.register_active(&key, unit, CellCoord::new(5, 5));

        let (registered, state) = sim.deployment().next().expect("one active unit");
        assert_eq!(*registered, unit);
        assert_eq!(state.cell, CellCoord::new(5, 5));
        assert_eq!(state.facing, Facing::Down);
        assert_eq!(
            state.attack_area,
            AttackArea::new(vec![AreaOffset::new(0, 1)])
        );
        assert_eq!(sim.active_units(), vec![(unit, CellCoord::new(5, 5))]);
    }

    #[test]
    fn orbit_camera_projects_its_target_to_the_screen_center() {
        let target = Vec3::new(50.0, 0.0, 50.0);
        let camera = OrbitCamera::new(0.7, target, 150.0, 800.0 / 600.0);

        let ndc = camera.project_to_ndc(target);
        assert!(ndc.x.abs() < 1e-4, "target projects to ndc x {}", ndc.x);
        assert!(ndc.y.abs() < 1e-4, "target projects to ndc y {}", ndc.y);
        assert!((camera.azimuthal_angle() - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn orbit_camera_projects_higher_points_upward() {
        let target = Vec3::new(50.0, 0.0, 50.0);
        let camera = OrbitCamera::new(0.0, target, 150.0, 800.0 / 600.0);

        let raised = camera.project_to_ndc(target + Vec3::Y * 10.0);
        assert!(raised.y > 0.0, "points above the target rise on screen");
    }
}
