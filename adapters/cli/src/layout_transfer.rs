//! Single-line fortress layout transfer codec.
//!
//! Layouts are exchanged as `bastion:v1:<cols>x<rows>:<base64 json>` strings:
//! compact enough for a clipboard, self-describing enough to validate before
//! use.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use bastion_defence_core::{Orientation, TileCoord};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const SNAPSHOT_DOMAIN: &str = "bastion";
const SNAPSHOT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded snapshot payload.
const SNAPSHOT_HEADER: &str = "bastion:v1";
/// Delimiter used to separate the prefix, grid dimensions, and payload.
const FIELD_DELIMITER: char = ':';

/// Snapshot of the fortress walls and turrets plus the grid dimensions.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct FortressLayoutSnapshot {
    /// Number of tile columns contained in the grid.
    pub(crate) columns: u32,
    /// Number of tile rows contained in the grid.
    pub(crate) rows: u32,
    /// Wall tiles composing the fortress.
    pub(crate) walls: Vec<TileCoord>,
    /// Turrets standing when the snapshot was captured.
    pub(crate) turrets: Vec<LayoutTurret>,
}

/// Turret description captured within a layout snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct LayoutTurret {
    /// Anchor tile of the turret footprint.
    pub(crate) anchor: TileCoord,
    /// Orientation of the two-cell footprint.
    pub(crate) orientation: Orientation,
}

#[derive(Serialize, Deserialize)]
struct SerializablePayload {
    walls: Vec<TileCoord>,
    turrets: Vec<LayoutTurret>,
}

impl FortressLayoutSnapshot {
    /// Encodes the snapshot into a single-line string suitable for transfer.
    #[must_use]
    pub(crate) fn encode(&self) -> String {
        let payload = SerializablePayload {
            walls: self.walls.clone(),
            turrets: self.turrets.clone(),
        };
        let json = serde_json::to_vec(&payload).expect("layout snapshot serialization never fails");
        let encoded = STANDARD_NO_PAD.encode(json);
        format!("{SNAPSHOT_HEADER}:{}x{}:{encoded}", self.columns, self.rows)
    }

    /// Decodes a snapshot from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, LayoutTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(LayoutTransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(LayoutTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(LayoutTransferError::MissingVersion)?;
        let dimensions = parts.next().ok_or(LayoutTransferError::MissingDimensions)?;
        let payload = parts.next().ok_or(LayoutTransferError::MissingPayload)?;

        if domain != SNAPSHOT_DOMAIN {
            return Err(LayoutTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != SNAPSHOT_VERSION {
            return Err(LayoutTransferError::UnsupportedVersion(version.to_owned()));
        }

        let (columns, rows) = parse_dimensions(dimensions)?;
        let bytes = STANDARD_NO_PAD.decode(payload.as_bytes())?;
        let decoded: SerializablePayload = serde_json::from_slice(&bytes)?;

        Ok(Self {
            columns,
            rows,
            walls: decoded.walls,
            turrets: decoded.turrets,
        })
    }
}

/// Errors that can occur while decoding layout transfer strings.
#[derive(Debug, Error)]
pub(crate) enum LayoutTransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("layout string was empty")]
    EmptyPayload,
    /// The prefix segment was missing from the encoded snapshot.
    #[error("layout string is missing the prefix")]
    MissingPrefix,
    /// The encoded snapshot did not contain a version segment.
    #[error("layout string is missing the version")]
    MissingVersion,
    /// The encoded snapshot did not include grid dimensions.
    #[error("layout string is missing the grid dimensions")]
    MissingDimensions,
    /// The encoded snapshot did not include the payload segment.
    #[error("layout string is missing the payload")]
    MissingPayload,
    /// The encoded snapshot used an unexpected prefix segment.
    #[error("layout prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The encoded snapshot used an unsupported version identifier.
    #[error("layout version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed from the encoded snapshot.
    #[error("could not parse grid dimensions '{0}'")]
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode layout payload: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),
    /// The decoded payload could not be deserialised.
    #[error("could not parse layout payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), LayoutTransferError> {
    let invalid = || LayoutTransferError::InvalidDimensions(dimensions.to_owned());

    let (columns, rows) = dimensions.split_once(['x', 'X']).ok_or_else(invalid)?;
    let columns: u32 = columns.trim().parse().map_err(|_| invalid())?;
    let rows: u32 = rows.trim().parse().map_err(|_| invalid())?;

    if columns == 0 || rows == 0 {
        return Err(invalid());
    }
    Ok((columns, rows))
}
