//! Jug Dash entry point
//!
//! On the web the page drives `platform::web::WebGame`; this only sets up
//! logging. Natively it runs a headless autopilot over one track:
//!
//! ```text
//! jug-dash [easy|normal|hard|custom] [seed] [tuning.json]
//! ```

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    log::info!("Jug Dash starting...");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use jug_dash::consts::*;
    use jug_dash::sim::collision::obstacle_box;
    use jug_dash::sim::{GameEvent, GameState, Intent, RunPhase, TickInput, tick};
    use jug_dash::{Difficulty, GeneratorConfig, Settings, format_time};

    const FRAME: f32 = 1.0 / 60.0;
    /// Give up after this much simulated time
    const MAX_FRAMES: u32 = 60 * 180;

    /// Hold up and steer toward the nearest gap in the next wall row
    pub fn autopilot(state: &GameState) -> Intent {
        let pos = state.player.pos;
        let runner_low = pos.y - RUNNER_TOP_OFFSET;

        let boxes: Vec<_> = state
            .world
            .obstacles
            .iter()
            .map(|(_, ob)| obstacle_box(ob))
            .filter(|b| b.max.y >= runner_low)
            .collect();
        let Some(row_y) = boxes.iter().map(|b| b.min.y).min_by(|a, b| a.total_cmp(b)) else {
            return Intent::UP;
        };

        // Runner x ranges that would clip a wall of that row
        let blocked: Vec<(f32, f32)> = boxes
            .iter()
            .filter(|b| (b.min.y - row_y).abs() < 1.0)
            .map(|b| (b.min.x - RUNNER_HALF_WIDTH, b.max.x + RUNNER_HALF_WIDTH))
            .collect();
        let is_free = |x: f32| blocked.iter().all(|&(lo, hi)| x < lo || x > hi);

        let candidates = std::iter::once(pos.x)
            .chain(blocked.iter().flat_map(|&(lo, hi)| [lo - 2.0, hi + 2.0]))
            .filter(|&x| (EDGE_MARGIN..=VIEW_W - EDGE_MARGIN).contains(&x) && is_free(x));
        let target = candidates
            .min_by(|a, b| (a - pos.x).abs().total_cmp(&(b - pos.x).abs()))
            .unwrap_or(pos.x);

        Intent {
            up: true,
            left: target < pos.x - 1.0,
            right: target > pos.x + 1.0,
            down: false,
        }
    }

    fn parse_args() -> Result<(Settings, u64), String> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let mut settings = Settings::load();

        if let Some(name) = args.first() {
            settings.difficulty =
                Difficulty::from_str(name).ok_or_else(|| format!("unknown difficulty '{}'", name))?;
        }
        let seed = match args.get(1) {
            Some(s) => s.parse().map_err(|e| format!("bad seed '{}': {}", s, e))?,
            None => settings.seed.unwrap_or_else(|| {
                std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .map(|d| d.as_millis() as u64)
                    .unwrap_or(0)
            }),
        };
        if let Some(path) = args.get(2) {
            let json = std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path, e))?;
            settings.custom_tuning = GeneratorConfig::from_json(&json).map_err(|e| format!("{}: {}", path, e))?;
        }
        Ok((settings, seed))
    }

    pub fn run() -> i32 {
        let (settings, seed) = match parse_args() {
            Ok(parsed) => parsed,
            Err(e) => {
                log::error!("{}", e);
                eprintln!("usage: jug-dash [easy|normal|hard|custom] [seed] [tuning.json]");
                return 2;
            }
        };

        let mut state = GameState::with_tuning(seed, settings.difficulty, settings.custom_tuning);
        state.start();
        log::info!("Autopilot run: {} (seed {})", settings.difficulty.as_str(), seed);

        for frame in 0..MAX_FRAMES {
            let input = TickInput::held(autopilot(&state));
            for event in tick(&mut state, &input, FRAME) {
                match event {
                    GameEvent::Collected { .. } => {
                        log::info!("Jug at y={:.0} ({})", state.player.pos.y, format_time(state.elapsed))
                    }
                    GameEvent::HazardHit { .. } => {
                        log::info!("Hazard at y={:.0} ({})", state.player.pos.y, format_time(state.elapsed))
                    }
                    _ => {}
                }
            }
            if state.phase == RunPhase::Finished {
                break;
            }
            if frame % 600 == 0 {
                log::debug!("Frame {}: at {:?}", frame, state.player.pos);
            }
        }

        match state.final_time {
            Some(t) => {
                println!(
                    "Finished {} in {} with {} jugs and {} hazards",
                    settings.difficulty.as_str(),
                    format_time(t),
                    state.collected,
                    state.hazards_hit
                );
                0
            }
            None => {
                println!(
                    "Autopilot stuck at y={:.0} of {:.0} after {}",
                    state.player.pos.y,
                    TRACK_LEN,
                    format_time(state.elapsed)
                );
                1
            }
        }
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Jug Dash (native) starting...");
    std::process::exit(headless::run());
}
