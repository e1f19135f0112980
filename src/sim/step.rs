/// The step function: advances the run by one tick.
///
/// Playing order:
///   1. Character movement + timers (held input also mirrored into the arrows)
///   2. Attack resolution (swing → hits → kills → pickup drops)
///   3. Mushroom removal, behavior, contact damage, death check
///   4. Brain lifetime + pickup
///   5. Wave bookkeeping (all cleared → MovingForward)
///
/// MovingForward: auto-walk and scroll until the screen midpoint (back to
/// Playing, next wave spawns) or the scroll limit (run complete). The scroll
/// limit wins when both trigger on the same tick.

use rand::Rng;

use crate::domain::behavior;
use crate::domain::entity::{Brain, Facing, FrameInput, MAX_SCROLL, SCREEN_W};
use crate::domain::weapon::ARSENAL;
use super::event::GameEvent;
use super::wave;
use super::world::{GameWorld, Phase};

/// A swing lands on any standing mushroom within this slop of the reach point.
const MELEE_SLOP: i32 = 30;
/// A mushroom's strike connects within this distance of the character.
const CONTACT_RANGE: i32 = 50;
/// Score bonus for picking up a brain.
pub const BRAIN_BONUS: u32 = 100;

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut GameWorld, input: FrameInput, rng: &mut impl Rng) -> Vec<GameEvent> {
    let mut events: Vec<GameEvent> = Vec::new();

    match world.phase {
        Phase::Playing => {
            world.tick += 1;
            resolve_character(world, &input);
            resolve_attack(world, input.attack, rng, &mut events);
            resolve_mushrooms(world, rng, &mut events);
            if world.phase == Phase::GameOver {
                return events; // death ends the tick
            }
            resolve_brains(world, &mut events);
            resolve_wave_clear(world, &mut events);
        }
        Phase::MovingForward => {
            world.tick += 1;
            resolve_advance(world, rng, &mut events);
        }
        _ => {}
    }

    events
}

// ══════════════════════════════════════════════════════════════
// Character
// ══════════════════════════════════════════════════════════════

fn resolve_character(world: &mut GameWorld, input: &FrameInput) {
    world.left_arrow.pressed = input.movement == Some(Facing::Left);
    world.right_arrow.pressed = input.movement == Some(Facing::Right);

    let c = match world.character.as_mut() {
        Some(c) => c,
        None => return,
    };

    if let Some(dir) = input.movement {
        c.body.x += dir.sign() * c.speed;
        c.facing = dir;
    }
    c.body.x = c.body.x.clamp(0, SCREEN_W);
    c.body.pin_to_ground();

    if let Some(slot) = input.weapon_select {
        if slot < ARSENAL.len() {
            c.current_weapon = slot;
        }
    }

    c.tick_timers();
}

// ══════════════════════════════════════════════════════════════
// Attack
// ══════════════════════════════════════════════════════════════

fn resolve_attack(
    world: &mut GameWorld,
    attack: bool,
    rng: &mut impl Rng,
    events: &mut Vec<GameEvent>,
) {
    if !attack {
        return;
    }
    let (reach_x, damage) = {
        let c = match world.character.as_mut() {
            Some(c) => c,
            None => return,
        };
        let swing = match c.attack() {
            Some(w) => w,
            None => return, // still on cooldown
        };
        (c.body.x + c.facing.sign() * swing.range, swing.damage)
    };

    let fade = world.tuning.death_fade_ticks;
    let mut drops: Vec<(i32, i32)> = vec![];

    for m in world.mushrooms.iter_mut() {
        if !m.is_active() {
            continue;
        }
        if (m.body.x - reach_x).abs() < MELEE_SLOP {
            let (destroyed, drop) = m.take_damage(damage, fade, rng);
            if destroyed {
                world.score += m.points;
                events.push(GameEvent::MushroomSlain { points: m.points });
                if drop {
                    drops.push((m.body.x, m.body.y));
                }
            }
        }
    }

    let lifetime = world.tuning.brain_lifetime_ticks;
    for (x, y) in drops {
        world.brains.push(Brain::new(x, y, lifetime));
        events.push(GameEvent::BrainDropped { x, y });
    }
}

// ══════════════════════════════════════════════════════════════
// Mushrooms: removal, behavior, contact damage
// ══════════════════════════════════════════════════════════════

fn resolve_mushrooms(world: &mut GameWorld, rng: &mut impl Rng, events: &mut Vec<GameEvent>) {
    world.mushrooms.retain(|m| !m.is_dead());

    let target_x = world
        .character
        .as_ref()
        .map(|c| c.body.x)
        .unwrap_or(SCREEN_W / 2);
    for m in world.mushrooms.iter_mut() {
        behavior::update_mushroom(m, target_x, rng);
    }

    let invincible = world.tuning.invincible_ticks;
    let mut died = false;
    if let Some(c) = world.character.as_mut() {
        for m in world.mushrooms.iter() {
            if m.is_attacking() && (m.body.x - c.body.x).abs() < CONTACT_RANGE {
                if c.take_damage(invincible) {
                    events.push(GameEvent::CharacterHurt { health_left: c.health });
                    if c.health <= 0 {
                        died = true;
                    }
                }
            }
        }
    }

    if died {
        world.phase = Phase::GameOver;
        events.push(GameEvent::RunFailed);
        if world.record_score() {
            events.push(GameEvent::ScoreRecorded);
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Brains
// ══════════════════════════════════════════════════════════════

fn resolve_brains(world: &mut GameWorld, events: &mut Vec<GameEvent>) {
    let character_body = world.character.as_ref().map(|c| c.body.clone());
    let mut picked: u32 = 0;

    world.brains.retain_mut(|b| {
        if b.tick() {
            return false; // expired unclaimed
        }
        if let Some(ref cb) = character_body {
            if cb.overlaps(&b.body) {
                picked += 1;
                return false;
            }
        }
        true
    });

    for _ in 0..picked {
        world.score += BRAIN_BONUS;
        events.push(GameEvent::BrainPicked { bonus: BRAIN_BONUS });
    }
}

// ══════════════════════════════════════════════════════════════
// Wave bookkeeping
// ══════════════════════════════════════════════════════════════

fn resolve_wave_clear(world: &mut GameWorld, events: &mut Vec<GameEvent>) {
    if world.active_mushrooms() == 0 && !world.mushrooms.is_empty() {
        // Remaining husks vanish with the wave.
        world.mushrooms.clear();
        world.wave_defeated = true;
        world.phase = Phase::MovingForward;
        events.push(GameEvent::WaveCleared { wave: world.wave });
    }
}

// ══════════════════════════════════════════════════════════════
// Moving forward
// ══════════════════════════════════════════════════════════════

fn resolve_advance(world: &mut GameWorld, rng: &mut impl Rng, events: &mut Vec<GameEvent>) {
    let speed = {
        let c = match world.character.as_mut() {
            Some(c) => c,
            None => return,
        };
        c.tick_timers();
        c.body.x += c.speed;
        c.speed
    };
    world.scroll += speed;

    let reached_mid = world
        .character
        .as_ref()
        .map_or(false, |c| c.body.x >= SCREEN_W / 2);
    if reached_mid {
        if let Some(c) = world.character.as_mut() {
            c.body.x = SCREEN_W / 4;
        }
        world.phase = Phase::Playing;
        if world.wave_defeated && world.mushrooms.is_empty() {
            let spawned = wave::spawn_wave(world, rng);
            events.push(spawned);
        }
    }

    if world.scroll >= MAX_SCROLL - SCREEN_W {
        world.scroll = MAX_SCROLL - SCREEN_W;
        world.phase = Phase::GameOver;
        events.push(GameEvent::RunCompleted);
        if world.record_score() {
            events.push(GameEvent::ScoreRecorded);
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TuningConfig;
    use crate::domain::entity::{Archetype, Character, Mushroom, MushroomState, ATTACK_WINDOW};
    use crate::sim::leaderboard::Leaderboard;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn world_with_board(board: Leaderboard) -> GameWorld {
        let mut w = GameWorld::new(TuningConfig::default(), board);
        w.phase = Phase::Playing;
        w.character = Some(Character::new(400, Archetype::Warrior, 5));
        w.player_name = "Tess".to_string();
        w
    }

    fn world() -> GameWorld {
        world_with_board(Leaderboard::default())
    }

    /// A mushroom parked on the character, mid-strike.
    fn striking_mushroom_at(x: i32) -> Mushroom {
        let mut m = Mushroom::new(x, false, 2);
        m.state = MushroomState::Attacking;
        m.state_timer = ATTACK_WINDOW;
        m
    }

    #[test]
    fn five_hits_end_the_run_and_record_the_score() {
        let dir = tempfile::tempdir().expect("tempdir");
        let board = Leaderboard::load(dir.path().join("leaderboard.json"));
        let mut w = world_with_board(board);
        let mut rng = StdRng::seed_from_u64(2);
        w.score = 35;

        for hit in 0..5 {
            w.mushrooms.clear();
            w.mushrooms.push(striking_mushroom_at(400));
            if let Some(c) = w.character.as_mut() {
                c.invincible_timer = 0; // each hit lands un-invincible
            }
            step(&mut w, FrameInput::default(), &mut rng);
            let health = w.character.as_ref().map(|c| c.health).unwrap_or(0);
            assert_eq!(health, 4 - hit);
        }

        assert_eq!(w.phase, Phase::GameOver);
        assert_eq!(w.leaderboard.entries.len(), 1);
        assert_eq!(w.leaderboard.entries[0].name, "Tess");
        assert_eq!(w.leaderboard.entries[0].score, 35);
        assert_eq!(w.leaderboard.entries[0].character, "Warrior");
    }

    #[test]
    fn contact_damage_blocked_while_invincible() {
        let mut w = world();
        let mut rng = StdRng::seed_from_u64(2);
        w.mushrooms.push(striking_mushroom_at(400));

        step(&mut w, FrameInput::default(), &mut rng);
        let health = w.character.as_ref().map(|c| c.health).unwrap_or(0);
        assert_eq!(health, 4);

        // Immediately struck again: the invincibility window absorbs it.
        w.mushrooms.clear();
        w.mushrooms.push(striking_mushroom_at(400));
        step(&mut w, FrameInput::default(), &mut rng);
        let health = w.character.as_ref().map(|c| c.health).unwrap_or(0);
        assert_eq!(health, 4);
    }

    #[test]
    fn swing_kills_in_range_and_scores() {
        let mut w = world();
        let mut rng = StdRng::seed_from_u64(6);

        // Pen: damage 1, range 60. Two swings kill a small mushroom at 460.
        let mut m = Mushroom::new(460, false, 2);
        m.state_timer = 100_000; // stays idle in place
        w.mushrooms.push(m);

        let swing = FrameInput { attack: true, ..FrameInput::default() };
        step(&mut w, swing, &mut rng);
        assert_eq!(w.mushrooms[0].health, 1);
        assert_eq!(w.score, 0);

        if let Some(c) = w.character.as_mut() {
            c.attack_cooldown = 0;
        }
        step(&mut w, swing, &mut rng);
        assert_eq!(w.score, 5);
        // The kill emptied the wave, so the run moves forward.
        assert!(w.mushrooms.is_empty());
        assert_eq!(w.phase, Phase::MovingForward);
    }

    #[test]
    fn swing_out_of_range_misses() {
        let mut w = world();
        let mut rng = StdRng::seed_from_u64(6);
        let mut m = Mushroom::new(700, false, 2);
        m.state_timer = 100_000;
        w.mushrooms.push(m);

        let swing = FrameInput { attack: true, ..FrameInput::default() };
        step(&mut w, swing, &mut rng);
        assert_eq!(w.mushrooms[0].health, 2);
    }

    #[test]
    fn cleared_wave_moves_the_run_forward() {
        let mut w = world();
        let mut rng = StdRng::seed_from_u64(3);

        let mut m = Mushroom::new(500, false, 2);
        m.take_damage(10, 20, &mut rng); // fading, no longer active
        w.mushrooms.push(m);

        let events = step(&mut w, FrameInput::default(), &mut rng);
        assert_eq!(w.phase, Phase::MovingForward);
        assert!(w.mushrooms.is_empty());
        assert!(w.wave_defeated);
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::WaveCleared { .. })));
    }

    #[test]
    fn midpoint_returns_to_playing_and_spawns_next_wave() {
        let mut w = world();
        let mut rng = StdRng::seed_from_u64(5);
        w.phase = Phase::MovingForward;
        w.wave_defeated = true;
        if let Some(c) = w.character.as_mut() {
            c.body.x = SCREEN_W / 2 - 3;
        }

        step(&mut w, FrameInput::default(), &mut rng);
        assert_eq!(w.phase, Phase::Playing);
        assert_eq!(w.character.as_ref().map(|c| c.body.x), Some(SCREEN_W / 4));
        assert!(!w.mushrooms.is_empty());
        assert_eq!(w.wave, 1);
    }

    #[test]
    fn scroll_limit_ends_the_run_regardless_of_enemies() {
        let dir = tempfile::tempdir().expect("tempdir");
        let board = Leaderboard::load(dir.path().join("leaderboard.json"));
        let mut w = world_with_board(board);
        let mut rng = StdRng::seed_from_u64(9);

        w.phase = Phase::MovingForward;
        w.scroll = MAX_SCROLL - SCREEN_W - 3;
        w.mushrooms.push(Mushroom::new(900, false, 2)); // still standing
        if let Some(c) = w.character.as_mut() {
            c.body.x = 100;
        }

        let events = step(&mut w, FrameInput::default(), &mut rng);
        assert_eq!(w.phase, Phase::GameOver);
        assert_eq!(w.scroll, MAX_SCROLL - SCREEN_W);
        assert!(events.iter().any(|e| matches!(e, GameEvent::RunCompleted)));
        assert_eq!(w.leaderboard.entries.len(), 1);
    }

    #[test]
    fn brain_pickup_scores_and_expiry_removes() {
        let mut w = world();
        let mut rng = StdRng::seed_from_u64(12);

        // One on the character, one far away about to expire.
        w.brains.push(Brain::new(400, 455, 100));
        w.brains.push(Brain::new(50, 455, 1));

        let events = step(&mut w, FrameInput::default(), &mut rng);
        assert_eq!(w.score, BRAIN_BONUS);
        assert!(w.brains.is_empty());
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, GameEvent::BrainPicked { .. }))
                .count(),
            1
        );
    }

    #[test]
    fn movement_clamps_to_screen_bounds() {
        let mut w = world();
        let mut rng = StdRng::seed_from_u64(1);
        if let Some(c) = w.character.as_mut() {
            c.body.x = 2;
        }

        let left = FrameInput { movement: Some(Facing::Left), ..FrameInput::default() };
        step(&mut w, left, &mut rng);
        assert_eq!(w.character.as_ref().map(|c| c.body.x), Some(0));
        assert!(w.left_arrow.pressed);
        assert!(!w.right_arrow.pressed);
    }

    #[test]
    fn weapon_select_is_bounds_checked() {
        let mut w = world();
        let mut rng = StdRng::seed_from_u64(1);

        let select = FrameInput { weapon_select: Some(3), ..FrameInput::default() };
        step(&mut w, select, &mut rng);
        assert_eq!(w.character.as_ref().map(|c| c.current_weapon), Some(3));

        let bogus = FrameInput { weapon_select: Some(9), ..FrameInput::default() };
        step(&mut w, bogus, &mut rng);
        assert_eq!(w.character.as_ref().map(|c| c.current_weapon), Some(3));
    }
}
