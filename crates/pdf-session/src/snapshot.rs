//! Scene snapshots
//!
//! A snapshot is the serialized form of a page overlay, wrapped in a tagged,
//! versioned envelope. Holders treat it as an opaque value: it can be stored,
//! compared and replayed through [`restore`], nothing else.

use crate::scene::{CanvasSurface, Scene};
use crate::types::*;
use serde::{Deserialize, Serialize};

const SNAPSHOT_FORMAT: &str = "scene";
const SNAPSHOT_VERSION: u16 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    format: &'a str,
    version: u16,
    scene: &'a Scene,
}

#[derive(Deserialize)]
struct Envelope {
    format: String,
    version: u16,
    scene: Scene,
}

/// Immutable serialized overlay of one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    payload: String,
}

impl Snapshot {
    pub fn encode(scene: &Scene) -> Result<Self> {
        let payload = serde_json::to_string(&EnvelopeRef {
            format: SNAPSHOT_FORMAT,
            version: SNAPSHOT_VERSION,
            scene,
        })?;
        Ok(Self { payload })
    }

    pub fn decode(&self) -> Result<Scene> {
        let envelope: Envelope = serde_json::from_str(&self.payload)?;
        if envelope.format != SNAPSHOT_FORMAT {
            return Err(SessionError::Config(format!(
                "Unknown snapshot format '{}'",
                envelope.format
            )));
        }
        if envelope.version != SNAPSHOT_VERSION {
            return Err(SessionError::Config(format!(
                "Unsupported snapshot version {}",
                envelope.version
            )));
        }
        Ok(envelope.scene)
    }

    /// Wrap a payload produced by [`Snapshot::as_str`]
    pub fn from_payload(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.payload
    }

    /// Encoded size in bytes
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

/// Capture the current overlay of a canvas
pub fn capture<C: CanvasSurface + ?Sized>(canvas: &C) -> Result<Snapshot> {
    canvas.serialize_scene()
}

/// Replace the overlay of a canvas with the one in `snapshot`.
///
/// Prior objects and selection are discarded; the background layer is kept.
pub fn restore<C: CanvasSurface + ?Sized>(canvas: &mut C, snapshot: &Snapshot) -> Result<()> {
    canvas.deserialize_scene(snapshot)
}
