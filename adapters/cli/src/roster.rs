//! Unit roster loading for the headless deployment console.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use rampart_core::{
    AreaOffset, AttackArea, PlacementKind, Rarity, UnitCatalog, UnitDescriptor, UnitKey,
};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Deserialize)]
struct RosterFile {
    units: BTreeMap<String, UnitDescriptor>,
}

/// Errors that can occur while loading a unit roster.
#[derive(Debug, Error)]
pub(crate) enum RosterError {
    /// The roster file could not be read.
    #[error("could not read roster {}", path.display())]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// The roster file did not contain valid unit tables.
    #[error("could not parse roster {}", path.display())]
    Parse {
        /// Path that failed to parse.
        path: PathBuf,
        /// Underlying TOML failure.
        #[source]
        source: toml::de::Error,
    },
    /// The roster file declared no units.
    #[error("roster {} declares no units", path.display())]
    Empty {
        /// Path of the empty roster.
        path: PathBuf,
    },
}

/// Loads a unit catalog from a TOML roster file.
///
/// Each `[units.<name>]` table carries `cost`, `rarity`, `placement`,
/// `attack_area` (a list of `[dx, dy]` pairs) and `portrait`.
pub(crate) fn load_roster(path: &Path) -> Result<UnitCatalog, RosterError> {
    let contents = fs::read_to_string(path).map_err(|source| RosterError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file: RosterFile = toml::from_str(&contents).map_err(|source| RosterError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    if file.units.is_empty() {
        return Err(RosterError::Empty {
            path: path.to_path_buf(),
        });
    }

    let mut catalog = UnitCatalog::new();
    for (name, descriptor) in file.units {
        let _ = catalog.insert(UnitKey::new(name), descriptor);
    }
    Ok(catalog)
}

/// Built-in roster used when no roster file is provided.
pub(crate) fn builtin_roster() -> UnitCatalog {
    let mut catalog = UnitCatalog::new();
    let _ = catalog.insert(
        UnitKey::new("vanguard"),
        UnitDescriptor {
            cost: 9,
            rarity: Rarity::new(3),
            placement: PlacementKind::Ground,
            attack_area: AttackArea::new(vec![AreaOffset::new(1, 0), AreaOffset::new(2, 0)]),
            portrait: String::from("portraits/vanguard.png"),
        },
    );
    let _ = catalog.insert(
        UnitKey::new("marksman"),
        UnitDescriptor {
            cost: 14,
            rarity: Rarity::new(4),
            placement: PlacementKind::Elevated,
            attack_area: AttackArea::new(vec![
                AreaOffset::new(1, 0),
                AreaOffset::new(2, 0),
                AreaOffset::new(3, 0),
            ]),
            portrait: String::from("portraits/marksman.png"),
        },
    );
    let _ = catalog.insert(
        UnitKey::new("warden"),
        UnitDescriptor {
            cost: 12,
            rarity: Rarity::new(2),
            placement: PlacementKind::Ground,
            attack_area: AttackArea::new(vec![
                AreaOffset::new(1, 0),
                AreaOffset::new(1, 1),
                AreaOffset::new(1, -1),
            ]),
            portrait: String::from("portraits/warden.png"),
        },
    );
    catalog
}
