//! Text protocol between the editor view and the session.
//!
//! Requests are `COMMAND` or `COMMAND:payload`; replies are
//! `DRAWING_UPDATE:{..}`, `RESOLVE_UPDATE:{..}` or `ERROR_UPDATE:{..}`.

use draft_core::drawing::{Drawing, DrawingError};
use draft_core::pieces::{Piece, PieceId};
use draft_core::points::{Point, PointId};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    Unknown(String),
    #[error("Invalid {command} payload: {message}")]
    BadPayload { command: &'static str, message: String },
    #[error(transparent)]
    Drawing(#[from] DrawingError),
}

impl CommandError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unknown(_) => "UNKNOWN_COMMAND",
            Self::BadPayload { .. } => "BAD_PAYLOAD",
            Self::Drawing(_) => "EDIT_FAILED",
        }
    }

    pub fn severity(&self) -> &'static str {
        match self {
            Self::Unknown(_) => "warning",
            _ => "error",
        }
    }
}

/// What to send back once the command has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Drawing,
    Resolution,
}

/// Result of applying one command to the current snapshot.
#[derive(Debug)]
pub struct Applied {
    /// Replacement snapshot, when the command edited the drawing
    pub next: Option<Drawing>,
    pub replies: Vec<Reply>,
}

impl Applied {
    fn read(replies: Vec<Reply>) -> Self {
        Self { next: None, replies }
    }

    fn edited(next: Drawing) -> Self {
        Self {
            next: Some(next),
            replies: vec![Reply::Drawing, Reply::Resolution],
        }
    }
}

#[derive(Deserialize)]
struct PointAddCmd {
    #[serde(default)]
    name: String,
    point: Point,
}

#[derive(Deserialize)]
struct PointUpdateCmd {
    id: PointId,
    point: Point,
}

#[derive(Deserialize)]
struct PointRenameCmd {
    id: PointId,
    name: String,
}

#[derive(Deserialize)]
struct VariableSetCmd {
    name: String,
    expression: String,
}

#[derive(Deserialize)]
struct VariableRenameCmd {
    old_name: String,
    new_name: String,
}

#[derive(Deserialize)]
struct VariableReorderCmd {
    name: String,
    new_index: usize,
}

#[derive(Deserialize)]
struct PieceUpdateCmd {
    id: PieceId,
    piece: Piece,
}

fn payload<T: DeserializeOwned>(command: &'static str, raw: &str) -> Result<T, CommandError> {
    serde_json::from_str(raw).map_err(|e| CommandError::BadPayload {
        command,
        message: e.to_string(),
    })
}

/// Apply `text` to a copy of `current`. `current` itself is never modified.
pub fn apply(current: &Drawing, text: &str) -> Result<Applied, CommandError> {
    let (command, raw) = match text.split_once(':') {
        Some((command, raw)) => (command, raw),
        None => (text, ""),
    };

    match command {
        "GET" => Ok(Applied::read(vec![Reply::Drawing])),
        "RESOLVE" => Ok(Applied::read(vec![Reply::Resolution])),

        "POINT_ADD" => {
            let cmd: PointAddCmd = payload("POINT_ADD", raw)?;
            let mut next = current.clone();
            next.add_point(&cmd.name, cmd.point);
            Ok(Applied::edited(next))
        }
        "POINT_UPDATE" => {
            let cmd: PointUpdateCmd = payload("POINT_UPDATE", raw)?;
            let mut next = current.clone();
            next.update_point(cmd.id, cmd.point)?;
            Ok(Applied::edited(next))
        }
        "POINT_RENAME" => {
            let cmd: PointRenameCmd = payload("POINT_RENAME", raw)?;
            let mut next = current.clone();
            next.rename_point(cmd.id, &cmd.name)?;
            Ok(Applied::edited(next))
        }
        "POINT_DELETE" => {
            let id: PointId = payload("POINT_DELETE", raw)?;
            let mut next = current.clone();
            next.remove_point(id)?;
            Ok(Applied::edited(next))
        }

        "VARIABLE_SET" => {
            let cmd: VariableSetCmd = payload("VARIABLE_SET", raw)?;
            let mut next = current.clone();
            next.set_variable(&cmd.name, &cmd.expression)?;
            Ok(Applied::edited(next))
        }
        "VARIABLE_RENAME" => {
            let cmd: VariableRenameCmd = payload("VARIABLE_RENAME", raw)?;
            let mut next = current.clone();
            next.rename_variable(&cmd.old_name, &cmd.new_name)?;
            Ok(Applied::edited(next))
        }
        "VARIABLE_REORDER" => {
            let cmd: VariableReorderCmd = payload("VARIABLE_REORDER", raw)?;
            let mut next = current.clone();
            next.variables
                .reorder(&cmd.name, cmd.new_index)
                .map_err(DrawingError::from)?;
            // Order does not affect geometry
            Ok(Applied {
                next: Some(next),
                replies: vec![Reply::Drawing],
            })
        }
        "VARIABLE_DELETE" => {
            // Bare name, e.g. VARIABLE_DELETE:seam
            let name = raw.trim();
            if name.is_empty() {
                return Err(CommandError::BadPayload {
                    command: "VARIABLE_DELETE",
                    message: "missing variable name".to_string(),
                });
            }
            let mut next = current.clone();
            next.remove_variable(name)?;
            Ok(Applied::edited(next))
        }

        "PIECE_ADD" => {
            let piece: Piece = payload("PIECE_ADD", raw)?;
            let mut next = current.clone();
            next.add_piece(piece);
            Ok(Applied::edited(next))
        }
        "PIECE_UPDATE" => {
            let cmd: PieceUpdateCmd = payload("PIECE_UPDATE", raw)?;
            let mut next = current.clone();
            next.update_piece(cmd.id, cmd.piece)?;
            Ok(Applied::edited(next))
        }
        "PIECE_DELETE" => {
            let id: PieceId = payload("PIECE_DELETE", raw)?;
            let mut next = current.clone();
            next.remove_piece(id)?;
            Ok(Applied::edited(next))
        }

        other => Err(CommandError::Unknown(other.to_string())),
    }
}

/// Render a reply against the snapshot it describes.
pub fn render(reply: Reply, drawing: &Drawing) -> String {
    match reply {
        Reply::Drawing => encode("DRAWING_UPDATE", drawing),
        Reply::Resolution => encode("RESOLVE_UPDATE", &drawing.resolve_all()),
    }
}

fn encode<T: Serialize>(prefix: &str, value: &T) -> String {
    match serde_json::to_string(value) {
        Ok(json) => format!("{}:{}", prefix, json),
        Err(e) => {
            warn!("Failed to serialize {}: {}", prefix, e);
            format!("{}:{{}}", prefix)
        }
    }
}

/// Format an error as a JSON message for the frontend
pub fn format_error(err: &CommandError) -> String {
    format!(
        "ERROR_UPDATE:{}",
        json!({
            "code": err.code(),
            "message": err.to_string(),
            "severity": err.severity(),
        })
    )
}
