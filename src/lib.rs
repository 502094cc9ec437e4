//! A single-screen maze chase.
//!
//! The player walks a tile maze picking up collectibles while one pursuer
//! wanders it at random. [`session::GameSession`] owns a playthrough and
//! advances it in fixed steps; front-ends read [`session::Snapshot`]s and feed
//! direction intents back in.

pub mod clock;
pub mod components;
pub mod error;
pub mod ghost;
pub mod input;
pub mod level;
pub mod movement;
pub mod render;
pub mod session;
pub mod settings;

pub use components::{Direction, Entity, EntityKind, Pos, Tile};
pub use error::{GridError, TemplateError};
pub use level::{GridMap, LevelTemplate};
pub use session::{GameSession, SessionOutcome, Snapshot};
