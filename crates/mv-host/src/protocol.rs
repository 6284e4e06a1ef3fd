//! Wire frames exchanged with the host peer.
//!
//! Frames are JSON text.  Requests:
//!
//! ```json
//! {"id": 12, "type": "find-path", "from": [0.0, 0.0], "to": [10.0, 0.0]}
//! ```
//!
//! Responses carry the same `id` and either a path or `null`:
//!
//! ```json
//! {"id": 12, "path": [[5.0, 0.0], [10.0, 0.0]]}
//! {"id": 12, "path": null}
//! ```
//!
//! The path excludes the start point and ends at the destination.

use mv_core::{CorrelationId, Point2, Waypoint};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{HostError, HostResult};

// ── Requests ──────────────────────────────────────────────────────────────────

/// Work the server can ask the host peer to do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum HostRequest {
    FindPath { from: Point2, to: Point2 },
}

/// A request together with its correlation id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestFrame {
    pub id: CorrelationId,
    #[serde(flatten)]
    pub body: HostRequest,
}

impl RequestFrame {
    pub fn find_path(id: CorrelationId, from: Point2, to: Point2) -> Self {
        Self { id, body: HostRequest::FindPath { from, to } }
    }

    pub fn encode(&self) -> HostResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(raw: &str) -> HostResult<Self> {
        serde_json::from_str(raw).map_err(|e| HostError::Unreadable(e.to_string()))
    }
}

// ── Responses ─────────────────────────────────────────────────────────────────

/// The host peer's answer, as the host writes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseFrame {
    pub id:   CorrelationId,
    pub path: Option<Vec<Waypoint>>,
}

impl ResponseFrame {
    pub fn encode(&self) -> HostResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// A response as the server understands it.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedResponse {
    Path { id: CorrelationId, waypoints: Vec<Waypoint> },
    NoPath { id: CorrelationId },
    /// The id was readable but the body was not.
    Malformed { id: CorrelationId, reason: String },
}

impl DecodedResponse {
    pub fn id(&self) -> CorrelationId {
        match self {
            DecodedResponse::Path { id, .. }
            | DecodedResponse::NoPath { id }
            | DecodedResponse::Malformed { id, .. } => *id,
        }
    }
}

/// Decode a response frame.
///
/// Decoding is two-staged so a damaged body can still be attributed to its
/// request: only a frame without a readable `id` is an error.  A missing
/// `path` key, a path of the wrong shape, and non-finite coordinates all
/// yield [`DecodedResponse::Malformed`].
pub fn decode_response(raw: &str) -> HostResult<DecodedResponse> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| HostError::Unreadable(e.to_string()))?;

    let id = value
        .get("id")
        .and_then(Value::as_u64)
        .map(CorrelationId)
        .ok_or_else(|| HostError::Unreadable("missing or non-integer id".into()))?;

    let decoded = match value.get("path") {
        None => DecodedResponse::Malformed { id, reason: "missing path".into() },
        Some(Value::Null) => DecodedResponse::NoPath { id },
        Some(path) => match serde_json::from_value::<Vec<Point2>>(path.clone()) {
            Ok(waypoints) if waypoints.iter().all(|w| w.is_finite()) => {
                DecodedResponse::Path { id, waypoints }
            }
            Ok(_) => DecodedResponse::Malformed { id, reason: "non-finite waypoint".into() },
            Err(e) => DecodedResponse::Malformed { id, reason: e.to_string() },
        },
    };
    Ok(decoded)
}
