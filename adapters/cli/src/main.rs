#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line adapter for the Rampart deployment flow.
//!
//! Builds the reference grid, a fixed orbit camera and a budgeted simulation
//! stub, replays a pointer script through the deployment controller, prints
//! every event the controller emits, and finishes with a single-line
//! transfer encoding of the resulting deployment.

mod rig;
mod roster;
mod script;
mod transfer;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use glam::{Vec2, Vec3};
use rampart_core::{CardIndex, CellCoord, Facing, UiEvent, UnitKey, WELCOME_BANNER};
use rampart_grid::GridMap;
use rampart_scene::{OverlayState, RedrawCounter};
use rampart_system_deploy::{DeployController, PointerInput};

use crate::rig::{BudgetSimulation, OrbitCamera};
use crate::script::ScriptStep;
use crate::transfer::{DeployedUnit, DeploymentSnapshot};

/// Headless replay console for the Rampart deployment flow.
#[derive(Debug, Parser)]
#[command(name = "rampart")]
struct Args {
    /// Number of grid columns.
    #[arg(long, default_value_t = 10)]
    columns: u32,
    /// Number of grid rows.
    #[arg(long, default_value_t = 10)]
    rows: u32,
    /// Side length of a grid cell in world units.
    #[arg(long, default_value_t = 10.0)]
    tile_length: f32,
    /// Canvas width in pixels.
    #[arg(long, default_value_t = 800.0)]
    canvas_width: f32,
    /// Canvas height in pixels.
    #[arg(long, default_value_t = 600.0)]
    canvas_height: f32,
    /// Camera azimuth around the grid, in radians.
    #[arg(long, default_value_t = 0.0)]
    azimuth: f32,
    /// Deployment funds available to the simulation stub.
    #[arg(long, default_value_t = 60)]
    funds: u32,
    /// Path to a TOML unit roster; the built-in roster is used when omitted.
    #[arg(long)]
    roster: Option<PathBuf>,
    /// Path to a JSON pointer script; the built-in demo is used when omitted.
    #[arg(long)]
    script: Option<PathBuf>,
    /// Decode a deployment transfer string and exit.
    #[arg(long)]
    decode: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Some(encoded) = &args.decode {
        return print_decoded(encoded);
    }

    let catalog = match &args.roster {
        Some(path) => roster::load_roster(path)
            .with_context(|| format!("loading roster {}", path.display()))?,
        None => roster::builtin_roster(),
    };
    let cards: Vec<UnitKey> = catalog.iter().map(|(key, _)| key.clone()).collect();

    let mut map = GridMap::new(args.columns, args.rows, args.tile_length)
        .context("constructing the battle grid")?;
    raise_ridge(&mut map, args.columns, args.rows);

    let canvas = Vec2::new(args.canvas_width, args.canvas_height);
    let mut controller = DeployController::new(catalog, cards, canvas)
        .context("constructing the deployment controller")?;

    let grid_center = Vec3::new(
        args.columns as f32 * args.tile_length * 0.5,
        0.0,
        args.rows as f32 * args.tile_length * 0.5,
    );
    let camera = OrbitCamera::new(
        args.azimuth,
        grid_center,
        args.columns as f32 * args.tile_length * 1.8,
        canvas.x / canvas.y,
    );

    let steps = match &args.script {
        Some(path) => script::load_script(path)
            .with_context(|| format!("loading pointer script {}", path.display()))?,
        None => script::demo_script(),
    };

    let mut overlay = OverlayState::new();
    let mut redraw = RedrawCounter::new();
    let mut sim = BudgetSimulation::new(args.funds);

    println!("{WELCOME_BANNER}");
    for step in steps {
        let input = match step {
            ScriptStep::MovePointer { x, y } => {
                map.track_pointer(Some(Vec2::new(x, y)));
                PointerInput::PointerMoved
            }
            ScriptStep::PointerLeave => {
                map.track_pointer(None);
                PointerInput::PointerMoved
            }
            ScriptStep::PressCard { card } => PointerInput::CardPressed(CardIndex::new(card)),
            ScriptStep::Release => PointerInput::CardReleased,
            ScriptStep::Click => PointerInput::MapClicked,
            ScriptStep::SelectorMove { dx, dy } => {
                PointerInput::SelectorMoved(selector_point(&overlay, dx, dy))
            }
            ScriptStep::SelectorClick { dx, dy } => {
                PointerInput::SelectorClicked(selector_point(&overlay, dx, dy))
            }
        };

        let mut events = Vec::new();
        controller.handle(
            input,
            &mut map,
            &mut overlay,
            &mut redraw,
            &mut sim,
            &camera,
            &mut events,
        );
        let _ = redraw.take_frame();
        for event in &events {
            println!("{}", describe_event(event));
        }
    }

    println!("funds remaining: {}", sim.funds());
    println!("frames drawn: {}", redraw.frames());

    let units: Vec<DeployedUnit> = sim
        .deployment()
        .map(|(_, unit)| DeployedUnit {
            kind: unit.kind.clone(),
            cell: unit.cell,
            facing: unit.facing,
        })
        .collect();
    for (id, unit) in sim.deployment() {
        println!(
            "active: {} #{} at {} facing {} threatening {} cells",
            unit.kind.as_str(),
            id.get(),
            cell_label(unit.cell),
            facing_label(unit.facing),
            unit.attack_area.len(),
        );
    }

    let snapshot = DeploymentSnapshot {
        columns: args.columns,
        rows: args.rows,
        units,
    };
    println!("deployment: {}", snapshot.encode());

    Ok(())
}

/// Raises a short ridge of elevated cells near the grid's far edge so the
/// built-in roster's elevated units have somewhere to stand.
fn raise_ridge(map: &mut GridMap, columns: u32, rows: u32) {
    if columns < 3 {
        return;
    }
    let ridge_column = columns - 3;
    for row in 2..rows.min(5) {
        map.raise_cell(CellCoord::new(ridge_column, row));
    }
}

/// Resolves a selector-relative script offset against the open selector's
/// anchor. Falls back to the canvas origin when no selector is open; the
/// controller ignores selector input in that state anyway.
fn selector_point(overlay: &OverlayState, dx: f32, dy: f32) -> Vec2 {
    let anchor = overlay
        .selector()
        .map(|paint| paint.anchor)
        .unwrap_or(Vec2::ZERO);
    anchor + Vec2::new(dx, dy)
}

fn cell_label(cell: CellCoord) -> String {
    format!("({}, {})", cell.column(), cell.row())
}

fn facing_label(facing: Facing) -> &'static str {
    match facing {
        Facing::Right => "right",
        Facing::Down => "down",
        Facing::Left => "left",
        Facing::Up => "up",
    }
}

fn describe_event(event: &UiEvent) -> String {
    match event {
        UiEvent::PlacementStarted { card, unit } => {
            format!("placement started: card {} unit {}", card.get(), unit.as_str())
        }
        UiEvent::PlacementCancelled { unit } => {
            format!("placement cancelled: unit {}", unit.as_str())
        }
        UiEvent::PlacementRefused { unit, cell } => {
            format!(
                "placement refused: unit {} at {}",
                unit.as_str(),
                cell_label(*cell)
            )
        }
        UiEvent::UnitPlaced {
            unit_id,
            unit,
            cell,
        } => {
            format!(
                "unit placed: {} #{} at {}",
                unit.as_str(),
                unit_id.get(),
                cell_label(*cell)
            )
        }
        UiEvent::FacingPreviewed { unit_id, facing } => {
            format!(
                "facing previewed: unit #{} {}",
                unit_id.get(),
                facing_label(*facing)
            )
        }
        UiEvent::FacingCommitted { unit_id, facing } => {
            format!(
                "facing committed: unit #{} {}",
                unit_id.get(),
                facing_label(*facing)
            )
        }
        UiEvent::DeploymentAborted { unit_id, cell } => {
            format!(
                "deployment aborted: unit #{} at {}",
                unit_id.get(),
                cell_label(*cell)
            )
        }
        UiEvent::UnitInspected { unit_id, cell } => {
            format!(
                "unit inspected: #{} at {}",
                unit_id.get(),
                cell_label(*cell)
            )
        }
    }
}

fn print_decoded(encoded: &str) -> anyhow::Result<()> {
    let snapshot =
        DeploymentSnapshot::decode(encoded).context("decoding deployment transfer string")?;
    println!(
        "deployment on a {}x{} grid, {} unit(s):",
        snapshot.columns,
        snapshot.rows,
        snapshot.units.len()
    );
    for unit in &snapshot.units {
        println!(
            "  {} at {} facing {}",
            unit.kind.as_str(),
            cell_label(unit.cell),
            facing_label(unit.facing)
        );
    }
    Ok(())
}
