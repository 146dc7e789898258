//! Single-line board snapshots used to check a move sequence's outcome.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use scale_sokoban_core::{CellCoord, ElementKind, ElementSnapshot};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const SNAPSHOT_DOMAIN: &str = "sokoban";
const SNAPSHOT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded snapshot payload.
pub(crate) const SNAPSHOT_HEADER: &str = "sokoban:v1";
const FIELD_DELIMITER: char = ':';

/// Element layout of a board together with its completion flag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct BoardSnapshot {
    /// Number of grid columns.
    pub(crate) columns: u32,
    /// Number of grid rows.
    pub(crate) rows: u32,
    /// Whether the completion evaluator last succeeded.
    pub(crate) complete: bool,
    /// Elements ordered by identifier.
    pub(crate) elements: Vec<SnapshotElement>,
}

/// Element record carried by a board snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct SnapshotElement {
    pub(crate) kind: ElementKind,
    pub(crate) anchor: CellCoord,
    pub(crate) big: bool,
}

impl From<&ElementSnapshot> for SnapshotElement {
    fn from(snapshot: &ElementSnapshot) -> Self {
        Self {
            kind: snapshot.kind,
            anchor: snapshot.anchor,
            big: snapshot.big,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct Payload {
    complete: bool,
    elements: Vec<SnapshotElement>,
}

/// Errors raised while encoding or decoding snapshot strings.
#[derive(Debug, Error)]
pub(crate) enum SnapshotTransferError {
    #[error("snapshot string was empty")]
    EmptyPayload,
    #[error("snapshot string is missing the {0} segment")]
    MissingSegment(&'static str),
    #[error("snapshot prefix '{0}' is not supported")]
    InvalidPrefix(String),
    #[error("snapshot version '{0}' is not supported")]
    UnsupportedVersion(String),
    #[error("could not parse grid dimensions '{0}'")]
    InvalidDimensions(String),
    #[error("could not decode snapshot payload: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),
    #[error("could not process snapshot payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}

impl BoardSnapshot {
    /// Encodes the snapshot as `sokoban:v1:<columns>x<rows>:<payload>`.
    pub(crate) fn encode(&self) -> Result<String, SnapshotTransferError> {
        let payload = Payload {
            complete: self.complete,
            elements: self.elements.clone(),
        };
        let json = serde_json::to_vec(&payload)?;
        let encoded = STANDARD_NO_PAD.encode(json);
        Ok(format!(
            "{SNAPSHOT_HEADER}:{}x{}:{encoded}",
            self.columns, self.rows
        ))
    }

    /// Decodes a snapshot from its single-line representation.
    pub(crate) fn decode(value: &str) -> Result<Self, SnapshotTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(SnapshotTransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let mut next = |name| parts.next().ok_or(SnapshotTransferError::MissingSegment(name));
        let domain = next("prefix")?;
        let version = next("version")?;
        let dimensions = next("dimensions")?;
        let payload = next("payload")?;

        if domain != SNAPSHOT_DOMAIN {
            return Err(SnapshotTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != SNAPSHOT_VERSION {
            return Err(SnapshotTransferError::UnsupportedVersion(
                version.to_owned(),
            ));
        }

        let (columns, rows) = parse_dimensions(dimensions)?;
        let bytes = STANDARD_NO_PAD.decode(payload.as_bytes())?;
        let decoded: Payload = serde_json::from_slice(&bytes)?;

        Ok(Self {
            columns,
            rows,
            complete: decoded.complete,
            elements: decoded.elements,
        })
    }
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), SnapshotTransferError> {
    let invalid = || SnapshotTransferError::InvalidDimensions(dimensions.to_owned());
    let (columns, rows) = dimensions.split_once(['x', 'X']).ok_or_else(invalid)?;
    let columns = columns.trim().parse::<u32>().map_err(|_| invalid())?;
    let rows = rows.trim().parse::<u32>().map_err(|_| invalid())?;
    if columns == 0 || rows == 0 {
        return Err(invalid());
    }
    Ok((columns, rows))
}
