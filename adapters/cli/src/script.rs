//! Pointer scripts replayed deterministically through the controller.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Single scripted pointer action.
///
/// Pointer positions are world-space floor coordinates; selector offsets are
/// canvas pixels relative to the selector anchor, so a script stays valid
/// regardless of where the camera projects the placement cell.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub(crate) enum ScriptStep {
    /// Moves the pointer over the map at a world-space position.
    MovePointer {
        /// World-space x coordinate on the floor plane.
        x: f32,
        /// World-space y coordinate on the floor plane.
        y: f32,
    },
    /// Moves the pointer off the canvas entirely.
    PointerLeave,
    /// Presses down on the roster card at the provided position.
    PressCard {
        /// Zero-based roster position of the card.
        card: usize,
    },
    /// Releases the pointer, resolving a pending placement.
    Release,
    /// Plain click on the map, feeding the passive inspect tracker.
    Click,
    /// Moves the pointer inside the direction selector.
    SelectorMove {
        /// Canvas-pixel offset from the selector anchor along x.
        dx: f32,
        /// Canvas-pixel offset from the selector anchor along y.
        dy: f32,
    },
    /// Confirming click inside the direction selector.
    SelectorClick {
        /// Canvas-pixel offset from the selector anchor along x.
        dx: f32,
        /// Canvas-pixel offset from the selector anchor along y.
        dy: f32,
    },
}

/// Errors that can occur while loading a pointer script.
#[derive(Debug, Error)]
pub(crate) enum ScriptError {
    /// The script file could not be read.
    #[error("could not read pointer script {}", path.display())]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// The script file did not contain a valid step array.
    #[error("could not parse pointer script {}", path.display())]
    Parse {
        /// Path that failed to parse.
        path: PathBuf,
        /// Underlying JSON failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Loads a pointer script from a JSON file.
pub(crate) fn load_script(path: &Path) -> Result<Vec<ScriptStep>, ScriptError> {
    let contents = fs::read_to_string(path).map_err(|source| ScriptError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ScriptError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Built-in demo session: a vanguard facing down, a marksman on the ridge
/// facing left, and an inspect click on the first unit.
pub(crate) fn demo_script() -> Vec<ScriptStep> {
    vec![
        ScriptStep::PressCard { card: 0 },
        ScriptStep::MovePointer { x: 55.0, y: 55.0 },
        ScriptStep::Release,
        ScriptStep::SelectorMove { dx: 0.0, dy: 120.0 },
        ScriptStep::SelectorClick { dx: 0.0, dy: 120.0 },
        ScriptStep::PressCard { card: 1 },
        ScriptStep::MovePointer { x: 75.0, y: 35.0 },
        ScriptStep::Release,
        ScriptStep::SelectorMove {
            dx: -120.0,
            dy: 0.0,
        },
        ScriptStep::SelectorClick {
            dx: -120.0,
            dy: 0.0,
        },
        ScriptStep::MovePointer { x: 55.0, y: 55.0 },
        ScriptStep::Click,
    ]
}
