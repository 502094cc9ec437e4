use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::components::{EntityKind, Pos};

/// Failures of runtime grid queries and mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("position {pos} is outside the {cols}x{rows} grid")]
    OutOfBounds { pos: Pos, cols: usize, rows: usize },
    #[error("tile at {0} holds no collectible")]
    NotCollectible(Pos),
}

/// A level template that cannot start a session.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("level template has no cells")]
    Empty,
    #[error("row {row} has {found} columns, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("{kind} spawn {pos} lies outside the grid")]
    SpawnOutOfBounds { kind: EntityKind, pos: Pos },
    #[error("{kind} spawn {pos} is a wall")]
    SpawnOnWall { kind: EntityKind, pos: Pos },
    #[error("no collectible cell is reachable from the player spawn")]
    NoCollectibles,
    #[error("failed to read level template {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
