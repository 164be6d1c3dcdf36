// Snapshot file framing: magic, format version, then the bincode body

use crate::canvas::{CanvasSnapshot, MAX_CELLS};
use crate::canvas_errors::{CanvasError, CanvasResult};

pub const SNAPSHOT_MAGIC: &[u8; 5] = b"PXMAP";
pub const SNAPSHOT_FORMAT_VERSION: u8 = 1;

const HEADER_LEN: usize = SNAPSHOT_MAGIC.len() + 1;

/// Encode a snapshot into the on-disk format
pub fn encode_snapshot(snapshot: &CanvasSnapshot) -> CanvasResult<Vec<u8>> {
    let body = bincode::serialize(snapshot)?;
    let mut bytes = Vec::with_capacity(HEADER_LEN + body.len());
    bytes.extend_from_slice(SNAPSHOT_MAGIC);
    bytes.push(SNAPSHOT_FORMAT_VERSION);
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

/// Decode and validate a snapshot; the cell count must match the declared size
pub fn decode_snapshot(bytes: &[u8]) -> CanvasResult<CanvasSnapshot> {
    if bytes.len() < HEADER_LEN {
        return Err(CanvasError::InvalidSnapshot(format!(
            "file is {} bytes, shorter than the {} byte header",
            bytes.len(),
            HEADER_LEN
        )));
    }

    let (header, body) = bytes.split_at(HEADER_LEN);
    if &header[..SNAPSHOT_MAGIC.len()] != SNAPSHOT_MAGIC {
        return Err(CanvasError::InvalidSnapshot(
            "missing snapshot magic".to_string(),
        ));
    }
    let version = header[SNAPSHOT_MAGIC.len()];
    if version != SNAPSHOT_FORMAT_VERSION {
        return Err(CanvasError::InvalidSnapshot(format!(
            "unsupported format version {}",
            version
        )));
    }

    let snapshot: CanvasSnapshot = bincode::deserialize(body)?;
    match snapshot.expected_cell_count() {
        Some(expected) if expected > 0 && expected <= MAX_CELLS => {
            if snapshot.cells.len() != expected {
                return Err(CanvasError::InvalidSnapshot(format!(
                    "{}x{} snapshot carries {} cells",
                    snapshot.width,
                    snapshot.height,
                    snapshot.cells.len()
                )));
            }
        }
        _ => {
            return Err(CanvasError::InvalidSnapshot(format!(
                "unusable dimensions {}x{}",
                snapshot.width, snapshot.height
            )))
        }
    }
    Ok(snapshot)
}
