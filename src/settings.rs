use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_TICK_MS: u64 = 150;
const DEFAULT_RENDER_FPS: u64 = 60;

/// Runtime knobs for the terminal game, read from `MAZE_*` environment
/// variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub tick: Duration,
    pub render_fps: u64,
    pub seed: Option<u64>,
    pub level: Option<PathBuf>,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let positive = |key: &str| {
            lookup(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|v| *v > 0)
        };
        let tick_ms = positive("MAZE_TICK_MS").unwrap_or(DEFAULT_TICK_MS);
        let render_fps = positive("MAZE_FPS").unwrap_or(DEFAULT_RENDER_FPS);
        let seed = lookup("MAZE_SEED").and_then(|v| v.trim().parse::<u64>().ok());
        let level = lookup("MAZE_LEVEL")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        Self {
            tick: Duration::from_millis(tick_ms),
            render_fps,
            seed,
            level,
        }
    }

    pub fn frame_time(&self) -> Duration {
        Duration::from_micros(1_000_000 / self.render_fps.max(1))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
