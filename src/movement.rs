use crate::components::{Direction, Pos};
use crate::level::GridMap;

/// Works out where an entity at `pos` heading `dir` ends up after one step.
///
/// Leaving the grid sideways on a wrap row lands on the opposite edge with the
/// direction kept. Any other move that leaves the grid or hits a wall keeps
/// the position and drops the direction to `None`. There is no vertical wrap.
pub fn resolve(pos: Pos, dir: Direction, map: &GridMap) -> (Pos, Direction) {
    if dir == Direction::None {
        return (pos, Direction::None);
    }

    let (dx, dy) = dir.delta();
    let nx = pos.x as isize + dx;
    let ny = pos.y as isize + dy;

    let off_side = nx < 0 || nx >= map.width() as isize;
    if dir.is_horizontal() && off_side && map.row_allows_wrap(pos.y) {
        let x = if nx < 0 { map.width() - 1 } else { 0 };
        return (Pos::new(x, pos.y), dir);
    }

    match map.checked_pos(nx, ny) {
        Some(next) if !map.is_wall(next) => (next, dir),
        _ => (pos, Direction::None),
    }
}
