use std::io::{self, Stdout};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use log::info;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use maze_chase::clock::SimulationClock;
use maze_chase::ghost::RngSource;
use maze_chase::input::{intent_for, Intent};
use maze_chase::level::LevelTemplate;
use maze_chase::render::{Renderer, Sound};
use maze_chase::session::GameSession;
use maze_chase::settings::Settings;

type Session = GameSession<RngSource<ChaCha8Rng>>;

fn main() -> Result<()> {
    env_logger::init();
    let settings = Settings::from_env();
    let template = match &settings.level {
        Some(path) => LevelTemplate::load(path)?,
        None => LevelTemplate::classic(),
    };
    let mut rng = match settings.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    // Build the first session before touching the terminal so template
    // errors print normally.
    let game = new_session(&template, &settings, &mut rng)?;

    let mut stdout = io::stdout();
    terminal::enable_raw_mode().context("enabling raw mode")?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout, game, &template, &settings, &mut rng);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

/// Each session gets its own generator forked from the parent so a seeded
/// run replays identically across restarts.
fn new_session(template: &LevelTemplate, settings: &Settings, rng: &mut ChaCha8Rng) -> Result<Session> {
    let session_rng = ChaCha8Rng::from_rng(&mut *rng).context("seeding session rng")?;
    let game = GameSession::new(template, RngSource(session_rng))?
        .with_clock(SimulationClock::new(settings.tick));
    Ok(game)
}

fn run(
    stdout: &mut Stdout,
    mut game: Session,
    template: &LevelTemplate,
    settings: &Settings,
    rng: &mut ChaCha8Rng,
) -> Result<()> {
    let mut renderer = Renderer::new(template.width(), template.height());
    let mut sound = Sound::new();
    let frame_time = settings.frame_time();

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            match intent_for(key) {
                Some(Intent::Quit) => return Ok(()),
                Some(Intent::Move(dir)) => game.set_player_direction(dir),
                Some(Intent::ToggleSound) => sound.toggle(),
                Some(Intent::Restart) if game.outcome().is_terminal() => {
                    info!("restarting after {:?}", game.outcome());
                    game = new_session(template, settings, rng)?;
                    sound.reset();
                    renderer.invalidate();
                }
                Some(Intent::Restart) | None => {}
            }
        }

        game.tick(Instant::now());
        let snapshot = game.snapshot();
        sound.observe(stdout, &snapshot)?;
        renderer.draw(stdout, &snapshot, &sound, terminal::size()?)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}
