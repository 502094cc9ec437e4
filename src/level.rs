use std::collections::VecDeque;
use std::fs;
use std::path::Path;

use log::debug;

use crate::components::{Direction, EntityKind, Pos, Tile};
use crate::error::{GridError, TemplateError};

/// The built-in maze. `1` is a wall, anything else is open floor.
pub const CLASSIC_LEVEL: &str = "\
11111111111111111111111111111
10000000000000100000000000001
10111101111110101111110111101
10111101100010001000110111101
10000001101010101010110000001
11110111100010101000111101111
11110100111110001111100101111
00000001011111011111010000000
11110101000000000000010101111
11110101011110101111010101111
10000000000000100000000000001
10111101111110101111110111101
10001000000000000000000010001
10101010111111111111101010101
11111111111111111111111111111
";

const WALL_CHAR: char = '1';

/// Wall layout plus spawn cells, before reachability is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelTemplate {
    walls: Vec<Vec<bool>>,
    player_spawn: Pos,
    pursuer_spawn: Pos,
}

impl LevelTemplate {
    /// Parses a template. Spawns default to (1, 1) for the player and the
    /// cell diagonally inside the opposite corner for the pursuer.
    pub fn parse(text: &str) -> Result<Self, TemplateError> {
        let walls: Vec<Vec<bool>> = text
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty())
            .map(|line| line.chars().map(|c| c == WALL_CHAR).collect())
            .collect();

        let width = walls.first().map_or(0, Vec::len);
        if width == 0 {
            return Err(TemplateError::Empty);
        }
        if let Some((row, cells)) = walls.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(TemplateError::RaggedRow {
                row,
                expected: width,
                found: cells.len(),
            });
        }

        let height = walls.len();
        Ok(Self {
            walls,
            player_spawn: Pos::new(1, 1),
            pursuer_spawn: Pos::new(width.saturating_sub(2), height.saturating_sub(2)),
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TemplateError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| TemplateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn classic() -> Self {
        Self::parse(CLASSIC_LEVEL).expect("built-in level parses")
    }

    pub fn with_spawns(mut self, player: Pos, pursuer: Pos) -> Self {
        self.player_spawn = player;
        self.pursuer_spawn = pursuer;
        self
    }

    pub fn width(&self) -> usize {
        self.walls[0].len()
    }

    pub fn height(&self) -> usize {
        self.walls.len()
    }

    pub fn player_spawn(&self) -> Pos {
        self.player_spawn
    }

    pub fn pursuer_spawn(&self) -> Pos {
        self.pursuer_spawn
    }

    fn check_spawn(&self, kind: EntityKind, pos: Pos) -> Result<(), TemplateError> {
        if pos.x >= self.width() || pos.y >= self.height() {
            return Err(TemplateError::SpawnOutOfBounds { kind, pos });
        }
        if self.walls[pos.y][pos.x] {
            return Err(TemplateError::SpawnOnWall { kind, pos });
        }
        Ok(())
    }
}

/// The maze a session plays on: fixed walls and the collectibles still
/// waiting to be picked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridMap {
    grid: Vec<Vec<Tile>>,
    width: usize,
    height: usize,
    remaining: usize,
}

impl GridMap {
    /// Builds the map for a template.
    ///
    /// Open cells reachable from the player spawn (orthogonally, plus across
    /// wrap rows) become collectibles; unreachable open cells stay empty. Both
    /// spawn cells are cleared afterwards.
    pub fn from_template(template: &LevelTemplate) -> Result<Self, TemplateError> {
        template.check_spawn(EntityKind::Player, template.player_spawn)?;
        template.check_spawn(EntityKind::Pursuer, template.pursuer_spawn)?;

        let width = template.width();
        let height = template.height();
        let mut grid: Vec<Vec<Tile>> = template
            .walls
            .iter()
            .map(|row| {
                row.iter()
                    .map(|&wall| if wall { Tile::Wall } else { Tile::Empty })
                    .collect()
            })
            .collect();

        let reachable = flood(&grid, width, height, template.player_spawn);
        for y in 0..height {
            for x in 0..width {
                if reachable[y][x] && grid[y][x] != Tile::Wall {
                    grid[y][x] = Tile::Collectible;
                }
            }
        }
        for spawn in [template.player_spawn, template.pursuer_spawn] {
            grid[spawn.y][spawn.x] = Tile::Empty;
        }

        let remaining = grid
            .iter()
            .flat_map(|row| row.iter())
            .filter(|&&tile| tile == Tile::Collectible)
            .count();
        if remaining == 0 {
            return Err(TemplateError::NoCollectibles);
        }
        debug!("populated {width}x{height} map with {remaining} collectibles");

        Ok(Self {
            grid,
            width,
            height,
            remaining,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> + '_ {
        self.grid.iter().map(Vec::as_slice)
    }

    /// Converts signed coordinates to a position if they fall on the grid.
    pub fn checked_pos(&self, x: isize, y: isize) -> Option<Pos> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        (x < self.width && y < self.height).then_some(Pos { x, y })
    }

    pub fn tile_at(&self, pos: Pos) -> Result<Tile, GridError> {
        self.grid
            .get(pos.y)
            .and_then(|row| row.get(pos.x))
            .copied()
            .ok_or(GridError::OutOfBounds {
                pos,
                cols: self.width,
                rows: self.height,
            })
    }

    /// Off-grid positions count as walls.
    pub fn is_wall(&self, pos: Pos) -> bool {
        !matches!(self.tile_at(pos), Ok(Tile::Empty | Tile::Collectible))
    }

    pub fn row_allows_wrap(&self, y: usize) -> bool {
        match self.grid.get(y) {
            Some(row) => row[0] != Tile::Wall && row[self.width - 1] != Tile::Wall,
            None => false,
        }
    }

    pub fn collect(&mut self, pos: Pos) -> Result<(), GridError> {
        match self.tile_at(pos)? {
            Tile::Collectible => {
                self.grid[pos.y][pos.x] = Tile::Empty;
                self.remaining -= 1;
                Ok(())
            }
            _ => Err(GridError::NotCollectible(pos)),
        }
    }

    pub fn remaining_collectibles(&self) -> usize {
        self.remaining
    }
}

fn flood(grid: &[Vec<Tile>], width: usize, height: usize, start: Pos) -> Vec<Vec<bool>> {
    let mut seen = vec![vec![false; width]; height];
    let mut q = VecDeque::new();
    seen[start.y][start.x] = true;
    q.push_back(start);

    while let Some(pos) = q.pop_front() {
        let mut next = Vec::with_capacity(5);
        for dir in Direction::CARDINAL {
            let (dx, dy) = dir.delta();
            let nx = pos.x as isize + dx;
            let ny = pos.y as isize + dy;
            if nx < 0 || ny < 0 || nx >= width as isize || ny >= height as isize {
                continue;
            }
            next.push(Pos::new(nx as usize, ny as usize));
        }
        let row = &grid[pos.y];
        if row[0] != Tile::Wall && row[width - 1] != Tile::Wall {
            if pos.x == 0 {
                next.push(Pos::new(width - 1, pos.y));
            }
            if pos.x == width - 1 {
                next.push(Pos::new(0, pos.y));
            }
        }

        for npos in next {
            if seen[npos.y][npos.x] || grid[npos.y][npos.x] == Tile::Wall {
                continue;
            }
            seen[npos.y][npos.x] = true;
            q.push_back(npos);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    use super::*;

    const POCKETS: [(usize, usize); 16] = [
        (9, 3),
        (10, 3),
        (11, 3),
        (9, 4),
        (11, 4),
        (9, 5),
        (10, 5),
        (11, 5),
        (17, 3),
        (18, 3),
        (19, 3),
        (17, 4),
        (19, 4),
        (17, 5),
        (18, 5),
        (19, 5),
    ];

    #[test]
    fn classic_level_dimensions_and_spawns() {
        let template = LevelTemplate::classic();
        assert_eq!((template.width(), template.height()), (29, 15));
        assert_eq!(template.player_spawn(), Pos::new(1, 1));
        assert_eq!(template.pursuer_spawn(), Pos::new(27, 13));
    }

    #[test]
    fn classic_level_fills_reachable_cells_only() {
        let map = GridMap::from_template(&LevelTemplate::classic()).unwrap();
        assert_eq!(map.remaining_collectibles(), 171);
        for (x, y) in POCKETS {
            assert_eq!(map.tile_at(Pos::new(x, y)).unwrap(), Tile::Empty, "pocket ({x}, {y})");
        }
        assert_eq!(map.tile_at(Pos::new(1, 1)).unwrap(), Tile::Empty);
        assert_eq!(map.tile_at(Pos::new(27, 13)).unwrap(), Tile::Empty);
        assert_eq!(map.tile_at(Pos::new(0, 7)).unwrap(), Tile::Collectible);
        assert_eq!(map.tile_at(Pos::new(28, 7)).unwrap(), Tile::Collectible);
    }

    #[test]
    fn walls_survive_population() {
        let template = LevelTemplate::classic();
        let map = GridMap::from_template(&template).unwrap();
        for (y, line) in CLASSIC_LEVEL.lines().enumerate() {
            for (x, c) in line.chars().enumerate() {
                assert_eq!(map.is_wall(Pos::new(x, y)), c == '1', "cell ({x}, {y})");
            }
        }
    }

    #[test]
    fn only_edge_open_rows_wrap() {
        let map = GridMap::from_template(&LevelTemplate::classic()).unwrap();
        let wrapping: Vec<usize> = (0..map.height()).filter(|&y| map.row_allows_wrap(y)).collect();
        assert_eq!(wrapping, vec![7]);
        assert!(!map.row_allows_wrap(map.height()));
    }

    #[test]
    fn flood_fill_crosses_wrap_rows() {
        let template = LevelTemplate::parse("1111111\n0011100\n1111111\n")
            .unwrap()
            .with_spawns(Pos::new(1, 1), Pos::new(0, 1));
        let map = GridMap::from_template(&template).unwrap();
        assert_eq!(map.tile_at(Pos::new(5, 1)).unwrap(), Tile::Collectible);
        assert_eq!(map.tile_at(Pos::new(6, 1)).unwrap(), Tile::Collectible);
        assert_eq!(map.remaining_collectibles(), 2);
    }

    #[test]
    fn flood_fill_stops_without_wrap() {
        let template = LevelTemplate::parse("1111111\n1001100\n1111111\n")
            .unwrap()
            .with_spawns(Pos::new(1, 1), Pos::new(5, 1));
        let map = GridMap::from_template(&template).unwrap();
        assert_eq!(map.tile_at(Pos::new(2, 1)).unwrap(), Tile::Collectible);
        assert_eq!(map.tile_at(Pos::new(6, 1)).unwrap(), Tile::Empty);
        assert_eq!(map.remaining_collectibles(), 1);
    }

    #[test]
    fn rejects_malformed_templates() {
        assert!(matches!(LevelTemplate::parse(""), Err(TemplateError::Empty)));
        assert!(matches!(
            LevelTemplate::parse("111\n10\n111"),
            Err(TemplateError::RaggedRow {
                row: 1,
                expected: 3,
                found: 2
            })
        ));

        let walled = LevelTemplate::parse("1111\n1111\n1111").unwrap();
        assert!(matches!(
            GridMap::from_template(&walled),
            Err(TemplateError::SpawnOnWall {
                kind: EntityKind::Player,
                ..
            })
        ));

        let outside = LevelTemplate::parse("10001\n10001")
            .unwrap()
            .with_spawns(Pos::new(1, 1), Pos::new(9, 9));
        assert!(matches!(
            GridMap::from_template(&outside),
            Err(TemplateError::SpawnOutOfBounds {
                kind: EntityKind::Pursuer,
                ..
            })
        ));

        let cramped = LevelTemplate::parse("111\n101\n111").unwrap();
        assert!(matches!(
            GridMap::from_template(&cramped),
            Err(TemplateError::NoCollectibles)
        ));
    }

    #[test]
    fn load_reports_missing_files() {
        let err = LevelTemplate::load("/definitely/not/a/level.txt").unwrap_err();
        assert!(matches!(err, TemplateError::Io { .. }));
    }

    #[test]
    fn collect_counts_down_and_is_idempotent() {
        let mut map = GridMap::from_template(&LevelTemplate::classic()).unwrap();
        let pos = Pos::new(2, 1);
        let before = map.remaining_collectibles();

        map.collect(pos).unwrap();
        assert_eq!(map.remaining_collectibles(), before - 1);
        assert_eq!(map.tile_at(pos).unwrap(), Tile::Empty);

        assert_eq!(map.collect(pos), Err(GridError::NotCollectible(pos)));
        assert_eq!(map.remaining_collectibles(), before - 1);
        assert_eq!(map.collect(Pos::new(0, 0)), Err(GridError::NotCollectible(Pos::new(0, 0))));
    }

    #[test]
    fn remaining_tracks_every_collection() {
        let mut map = GridMap::from_template(&LevelTemplate::classic()).unwrap();
        let cells: Vec<Pos> = (0..map.height())
            .flat_map(|y| (0..map.width()).map(move |x| Pos::new(x, y)))
            .filter(|&pos| map.tile_at(pos) == Ok(Tile::Collectible))
            .collect();
        for (n, pos) in cells.iter().enumerate() {
            map.collect(*pos).unwrap();
            assert_eq!(map.remaining_collectibles(), cells.len() - n - 1);
        }
        assert_eq!(map.remaining_collectibles(), 0);
    }

    #[test]
    fn out_of_bounds_queries_fail() {
        let mut map = GridMap::from_template(&LevelTemplate::classic()).unwrap();
        let pos = Pos::new(29, 0);
        assert_eq!(
            map.tile_at(pos),
            Err(GridError::OutOfBounds {
                pos,
                cols: 29,
                rows: 15
            })
        );
        assert!(matches!(map.collect(pos), Err(GridError::OutOfBounds { .. })));
        assert!(map.is_wall(pos));
        assert_eq!(map.checked_pos(-1, 3), None);
        assert_eq!(map.checked_pos(28, 14), Some(Pos::new(28, 14)));
    }

    struct Components {
        parent: Vec<usize>,
    }

    impl Components {
        fn new(n: usize) -> Self {
            Self {
                parent: (0..n).collect(),
            }
        }

        fn root(&mut self, mut i: usize) -> usize {
            while self.parent[i] != i {
                self.parent[i] = self.parent[self.parent[i]];
                i = self.parent[i];
            }
            i
        }

        fn join(&mut self, a: usize, b: usize) {
            let (ra, rb) = (self.root(a), self.root(b));
            self.parent[ra] = rb;
        }
    }

    #[test]
    fn random_templates_match_connected_components() {
        let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);
        for _ in 0..300 {
            let width = rng.gen_range(3..14);
            let height = rng.gen_range(3..10);
            let walls: Vec<Vec<bool>> = (0..height)
                .map(|_| (0..width).map(|_| rng.gen_bool(0.35)).collect())
                .collect();
            let open: Vec<Pos> = (0..height)
                .flat_map(|y| (0..width).map(move |x| Pos::new(x, y)))
                .filter(|p| !walls[p.y][p.x])
                .collect();
            if open.is_empty() {
                continue;
            }
            let player = open[rng.gen_range(0..open.len())];
            let pursuer = open[rng.gen_range(0..open.len())];

            let text: String = walls
                .iter()
                .map(|row| {
                    let mut line: String = row.iter().map(|&w| if w { '1' } else { '.' }).collect();
                    line.push('\n');
                    line
                })
                .collect();
            let template = LevelTemplate::parse(&text)
                .unwrap()
                .with_spawns(player, pursuer);

            let idx = |x: usize, y: usize| y * width + x;
            let mut sets = Components::new(width * height);
            for y in 0..height {
                for x in 0..width {
                    if walls[y][x] {
                        continue;
                    }
                    if x + 1 < width && !walls[y][x + 1] {
                        sets.join(idx(x, y), idx(x + 1, y));
                    }
                    if y + 1 < height && !walls[y + 1][x] {
                        sets.join(idx(x, y), idx(x, y + 1));
                    }
                }
                if !walls[y][0] && !walls[y][width - 1] {
                    sets.join(idx(0, y), idx(width - 1, y));
                }
            }
            let origin = sets.root(idx(player.x, player.y));
            let expected: Vec<Pos> = open
                .iter()
                .copied()
                .filter(|&p| p != player && p != pursuer)
                .filter(|p| sets.root(idx(p.x, p.y)) == origin)
                .collect();

            match GridMap::from_template(&template) {
                Ok(map) => {
                    assert_eq!(map.remaining_collectibles(), expected.len());
                    for y in 0..height {
                        for x in 0..width {
                            let pos = Pos::new(x, y);
                            let want = if walls[y][x] {
                                Tile::Wall
                            } else if expected.contains(&pos) {
                                Tile::Collectible
                            } else {
                                Tile::Empty
                            };
                            assert_eq!(map.tile_at(pos).unwrap(), want, "cell {pos} in\n{text}");
                        }
                    }
                }
                Err(TemplateError::NoCollectibles) => assert!(expected.is_empty(), "{text}"),
                Err(other) => panic!("unexpected error {other} for\n{text}"),
            }
        }
    }
}
