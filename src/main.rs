/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use rand::Rng;

use config::GameConfig;
use domain::entity::{Archetype, Character, FrameInput, ARCHETYPES, SCREEN_W};
use sim::event::GameEvent;
use sim::leaderboard::{self, Leaderboard};
use sim::step;
use sim::wave;
use sim::world::{GameWorld, Phase, HINT_ROTATE_TICKS, LOADING_HINTS, LOADING_STEP};
use ui::input::InputState;
use ui::renderer::Renderer;

const FRAME_SLEEP: Duration = Duration::from_millis(2);

fn main() {
    let config = GameConfig::load();

    let board = Leaderboard::load(leaderboard::resolve_path(&config.leaderboard_file));
    let mut world = GameWorld::new(config.tuning.clone(), board);

    let mut renderer = Renderer::new(&config.assets_dir);
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut world, &mut renderer, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Sporefall!");
    println!("Final score: {}", world.score);
}

fn game_loop(
    world: &mut GameWorld,
    renderer: &mut Renderer,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut rng = rand::thread_rng();
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.tuning.tick_rate_ms);

    loop {
        kb.drain_events();

        if kb.ctrl_c() {
            break;
        }
        if handle_meta(world, &kb, &mut rng) {
            break;
        }

        if last_tick.elapsed() >= tick_rate {
            match world.phase {
                Phase::Loading => tick_loading(world),
                Phase::Playing | Phase::MovingForward => {
                    let input = FrameInput {
                        movement: kb.movement(),
                        attack: kb.pressed(KeyCode::Char(' ')),
                        weapon_select: kb.weapon_digit(),
                    };
                    let events = step::step(world, input, &mut rng);
                    announce_events(world, &events);
                }
                _ => {}
            }

            // Global: tick the message timer (works in all phases)
            if world.message_timer > 0 {
                world.message_timer -= 1;
                if world.message_timer == 0 {
                    world.message.clear();
                }
            }

            last_tick = Instant::now();
        }

        renderer.render(world)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

// ── Phase-keyed input handling ──

fn handle_meta(world: &mut GameWorld, kb: &InputState, rng: &mut impl Rng) -> bool {
    let esc = kb.pressed(KeyCode::Esc);

    match world.phase {
        // ── Loading ──
        Phase::Loading => {
            // Any key skips straight to the end of the bar
            if kb.any_pressed() && world.loading_progress < 100.0 {
                world.loading_progress = 100.0;
            }
        }

        // ── Character Select ──
        Phase::CharacterSelect => {
            if let Some(idx) = kb.archetype_digit() {
                choose_character(world, ARCHETYPES[idx], rng);
            }
        }

        // ── Playing ──
        Phase::Playing => {
            if esc {
                // Giving up ends the run without recording a score
                world.phase = Phase::GameOver;
            }
        }

        // ── Moving Forward ──
        Phase::MovingForward => {
            // Scroll can't be skipped
        }

        // ── Game Over ──
        Phase::GameOver => {
            if kb.pressed(KeyCode::Enter) {
                world.reset();
                world.phase = Phase::CharacterSelect;
            } else if kb.pressed(KeyCode::Char('l')) || kb.pressed(KeyCode::Char('L')) {
                world.phase = Phase::Leaderboard;
            } else if kb.pressed(KeyCode::Char('q')) || kb.pressed(KeyCode::Char('Q')) {
                return true;
            }
        }

        // ── Leaderboard ──
        Phase::Leaderboard => {
            if esc {
                world.phase = Phase::GameOver;
            }
        }
    }

    false
}

fn choose_character(world: &mut GameWorld, kind: Archetype, rng: &mut impl Rng) {
    world.character = Some(Character::new(
        SCREEN_W / 4,
        kind,
        world.tuning.character_speed,
    ));
    world.player_name = kind.name().to_string();
    world.phase = Phase::Playing;
    let spawned = wave::spawn_wave(world, rng);
    announce_events(world, &[spawned]);
}

// ── Loading screen tick ──

fn tick_loading(world: &mut GameWorld) {
    world.loading_progress += LOADING_STEP;
    world.hint_timer += 1;
    if world.hint_timer >= HINT_ROTATE_TICKS {
        world.hint_timer = 0;
        world.hint_index = (world.hint_index + 1) % LOADING_HINTS.len();
    }
    if world.loading_progress >= 100.0 {
        world.loading_progress = 100.0;
        world.phase = Phase::CharacterSelect;
    }
}

// ── Event → HUD messages ──

fn announce_events(world: &mut GameWorld, events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::WaveSpawned { size } => {
                world.set_message(&format!("Wave {}: {} mushrooms!", world.wave, size), 90);
            }
            GameEvent::WaveCleared { wave } => {
                world.set_message(&format!("Wave {wave} cleared — onward!"), 90);
            }
            GameEvent::MushroomSlain { points } => {
                world.set_message(&format!("+{points}"), 30);
            }
            GameEvent::BrainDropped { .. } => {
                world.set_message("A brain dropped!", 60);
            }
            GameEvent::BrainPicked { bonus } => {
                world.set_message(&format!("+{bonus}"), 45);
            }
            GameEvent::CharacterHurt { health_left } => {
                world.set_message(&format!("Ouch! {health_left} health left"), 45);
            }
            GameEvent::RunFailed => {
                world.set_message("The mushrooms got you...", 120);
            }
            GameEvent::RunCompleted => {
                world.set_message("You made it through the forest!", 120);
            }
            GameEvent::ScoreRecorded => {
                world.set_message("Score saved to the leaderboard", 120);
            }
        }
    }
}
