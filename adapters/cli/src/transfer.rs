#![allow(clippy::missing_errors_doc)]

//! Single-line transfer encoding for a finished deployment.

use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use rampart_core::{CellCoord, Facing, UnitKey};
use serde::{Deserialize, Serialize};

const SNAPSHOT_DOMAIN: &str = "rampart";
const SNAPSHOT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded snapshot payload.
pub(crate) const SNAPSHOT_HEADER: &str = "rampart:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Snapshot of the active units deployed onto the grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct DeploymentSnapshot {
    /// Number of grid columns the deployment was made on.
    pub columns: u32,
    /// Number of grid rows the deployment was made on.
    pub rows: u32,
    /// Units composing the deployment.
    pub units: Vec<DeployedUnit>,
}

impl DeploymentSnapshot {
    /// Encodes the snapshot into a single-line string suitable for clipboard
    /// transfer.
    #[must_use]
    pub(crate) fn encode(&self) -> String {
        let payload = SerializablePayload {
            units: self.units.clone(),
        };
        let json =
            serde_json::to_vec(&payload).expect("deployment snapshot serialization never fails");
        let encoded = STANDARD_NO_PAD.encode(json);
        format!("{SNAPSHOT_HEADER}:{}x{}:{encoded}", self.columns, self.rows)
    }

    /// Decodes a snapshot from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, TransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(TransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(TransferError::MissingPrefix)?;
        let version = parts.next().ok_or(TransferError::MissingVersion)?;
        let dimensions = parts.next().ok_or(TransferError::MissingDimensions)?;
        let payload = parts.next().ok_or(TransferError::MissingPayload)?;

        if domain != SNAPSHOT_DOMAIN {
            return Err(TransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != SNAPSHOT_VERSION {
            return Err(TransferError::UnsupportedVersion(version.to_owned()));
        }

        let (columns, rows) = parse_dimensions(dimensions)?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(TransferError::InvalidEncoding)?;
        let decoded: SerializablePayload =
            serde_json::from_slice(&bytes).map_err(TransferError::InvalidPayload)?;

        Ok(Self {
            columns,
            rows,
            units: decoded.units,
        })
    }
}

/// Unit description captured within a deployment snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct DeployedUnit {
    /// Catalog key of the deployed unit type.
    pub kind: UnitKey,
    /// Cell the unit occupies.
    pub cell: CellCoord,
    /// Facing the unit committed to.
    pub facing: Facing,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SerializablePayload {
    units: Vec<DeployedUnit>,
}

/// Errors that can occur while decoding deployment transfer strings.
#[derive(Debug)]
pub(crate) enum TransferError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing from the encoded snapshot.
    MissingPrefix,
    /// The encoded snapshot did not contain a version segment.
    MissingVersion,
    /// The encoded snapshot did not include grid dimensions.
    MissingDimensions,
    /// The encoded snapshot did not include the payload segment.
    MissingPayload,
    /// The encoded snapshot used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The encoded snapshot used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed from the encoded snapshot.
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The decoded payload could not be deserialised.
    InvalidPayload(serde_json::Error),
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "transfer payload was empty"),
            Self::MissingPrefix => write!(f, "transfer string is missing the prefix"),
            Self::MissingVersion => write!(f, "transfer string is missing the version"),
            Self::MissingDimensions => {
                write!(f, "transfer string is missing the grid dimensions")
            }
            Self::MissingPayload => write!(f, "transfer string is missing the payload"),
            Self::InvalidPrefix(prefix) => {
                write!(f, "transfer prefix '{prefix}' is not supported")
            }
            Self::UnsupportedVersion(version) => {
                write!(f, "transfer version '{version}' is not supported")
            }
            Self::InvalidDimensions(dimensions) => {
                write!(f, "could not parse grid dimensions '{dimensions}'")
            }
            Self::InvalidEncoding(error) => {
                write!(f, "could not decode transfer payload: {error}")
            }
            Self::InvalidPayload(error) => {
                write!(f, "could not parse transfer payload: {error}")
            }
        }
    }
}

impl Error for TransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            _ => None,
        }
    }
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), TransferError> {
    let (columns, rows) = dimensions
        .split_once(['x', 'X'])
        .ok_or_else(|| TransferError::InvalidDimensions(dimensions.to_owned()))?;

    let columns = columns
        .trim()
        .parse::<u32>()
        .map_err(|_| TransferError::InvalidDimensions(dimensions.to_owned()))?;
    let rows = rows
        .trim()
        .parse::<u32>()
        .map_err(|_| TransferError::InvalidDimensions(dimensions.to_owned()))?;

    if columns == 0 || rows == 0 {
        return Err(TransferError::InvalidDimensions(dimensions.to_owned()));
    }

    Ok((columns, rows))
}
