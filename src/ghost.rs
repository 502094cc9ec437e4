use log::debug;
use rand::Rng;

use crate::components::{Direction, Entity};
use crate::level::GridMap;

/// Chance per step that the pursuer picks a new direction.
pub const RETARGET_CHANCE: f64 = 0.1;

/// Randomness the pursuer draws on.
pub trait RandomSource {
    /// A uniform sample in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// A uniform index in `0..len`. `len` is never zero.
    fn next_index(&mut self, len: usize) -> usize;
}

/// Adapts any `rand` generator into a [`RandomSource`].
#[derive(Debug, Clone)]
pub struct RngSource<R>(pub R);

impl<R: Rng> RandomSource for RngSource<R> {
    fn next_unit(&mut self) -> f64 {
        self.0.gen::<f64>()
    }

    fn next_index(&mut self, len: usize) -> usize {
        self.0.gen_range(0..len)
    }
}

/// Most steps the pursuer keeps going the way it was. Occasionally it picks a
/// random open neighbour instead. Neighbours across a wrap edge are not
/// offered; only cells next to it on the grid count.
pub fn maybe_retarget(pursuer: &Entity, map: &GridMap, rng: &mut impl RandomSource) -> Direction {
    if rng.next_unit() >= RETARGET_CHANCE {
        return pursuer.direction;
    }

    let options: Vec<Direction> = Direction::CARDINAL
        .into_iter()
        .filter(|dir| {
            let (dx, dy) = dir.delta();
            map.checked_pos(pursuer.pos.x as isize + dx, pursuer.pos.y as isize + dy)
                .is_some_and(|next| !map.is_wall(next))
        })
        .collect();
    if options.is_empty() {
        return pursuer.direction;
    }

    let dir = options[rng.next_index(options.len())];
    debug!("pursuer at {} retargets {:?}", pursuer.pos, dir);
    dir
}
