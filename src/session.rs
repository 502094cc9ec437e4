use std::time::Instant;

use log::{debug, info, warn};

use crate::clock::SimulationClock;
use crate::components::{Direction, Entity, EntityKind, Tile};
use crate::error::TemplateError;
use crate::ghost::{self, RandomSource};
use crate::level::{GridMap, LevelTemplate};
use crate::movement;

/// Points awarded per collectible.
pub const COLLECT_SCORE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    InProgress,
    Won(u32),
    Lost(u32),
}

impl SessionOutcome {
    pub fn is_terminal(self) -> bool {
        !matches!(self, SessionOutcome::InProgress)
    }
}

/// Read-only view of a session between steps.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub map: &'a GridMap,
    pub player: Entity,
    pub pursuer: Entity,
    pub score: u32,
    pub remaining: usize,
    pub outcome: SessionOutcome,
}

/// One playthrough of a level.
pub struct GameSession<R> {
    map: GridMap,
    player: Entity,
    pursuer: Entity,
    score: u32,
    outcome: SessionOutcome,
    clock: SimulationClock,
    rng: R,
}

impl<R: RandomSource> GameSession<R> {
    pub fn new(template: &LevelTemplate, rng: R) -> Result<Self, TemplateError> {
        let map = GridMap::from_template(template)?;
        info!(
            "session started on {}x{} map with {} collectibles",
            map.width(),
            map.height(),
            map.remaining_collectibles()
        );
        Ok(Self {
            map,
            player: Entity::spawn(EntityKind::Player, template.player_spawn()),
            pursuer: Entity::spawn(EntityKind::Pursuer, template.pursuer_spawn()),
            score: 0,
            outcome: SessionOutcome::InProgress,
            clock: SimulationClock::default(),
            rng,
        })
    }

    pub fn with_clock(mut self, clock: SimulationClock) -> Self {
        self.clock = clock;
        self
    }

    /// Records the player's latest intent. It replaces any intent not yet
    /// consumed by a step.
    pub fn set_player_direction(&mut self, dir: Direction) {
        self.player.desired = Some(dir);
    }

    /// Steps the simulation if the clock says one is due. Returns whether a
    /// step ran.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.clock.poll(now) || self.outcome.is_terminal() {
            return false;
        }
        self.step();
        true
    }

    /// Advances the simulation by one step. Does nothing once the session
    /// has ended.
    pub fn step(&mut self) {
        if self.outcome.is_terminal() {
            return;
        }

        let dir = ghost::maybe_retarget(&self.pursuer, &self.map, &mut self.rng);
        let (pos, dir) = movement::resolve(self.pursuer.pos, dir, &self.map);
        self.pursuer.pos = pos;
        self.pursuer.direction = dir;

        if let Some(desired) = self.player.desired.take() {
            self.player.direction = desired;
        }
        let (pos, dir) = movement::resolve(self.player.pos, self.player.direction, &self.map);
        self.player.pos = pos;
        self.player.direction = dir;

        if self.map.tile_at(self.player.pos) == Ok(Tile::Collectible) {
            match self.map.collect(self.player.pos) {
                Ok(()) => {
                    self.score += COLLECT_SCORE;
                    debug!("collected {} (score {})", self.player.pos, self.score);
                    if self.map.remaining_collectibles() == 0 {
                        self.finish(SessionOutcome::Won(self.score));
                        return;
                    }
                }
                Err(err) => warn!("ignoring failed collect: {err}"),
            }
        }

        if self.player.pos == self.pursuer.pos {
            self.finish(SessionOutcome::Lost(self.score));
        }
    }

    fn finish(&mut self, outcome: SessionOutcome) {
        info!("session ended: {outcome:?}");
        self.outcome = outcome;
    }
}

impl<R> GameSession<R> {
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            map: &self.map,
            player: self.player,
            pursuer: self.pursuer,
            score: self.score,
            remaining: self.map.remaining_collectibles(),
            outcome: self.outcome,
        }
    }

    pub fn outcome(&self) -> SessionOutcome {
        self.outcome
    }

    pub fn score(&self) -> u32 {
        self.score
    }
}
