/// Wave spawning. One wave at a time: the previous wave must be fully
/// cleared before the next one enters from beyond the right screen edge.

use rand::Rng;

use crate::domain::entity::{Mushroom, SCREEN_W};
use super::event::GameEvent;
use super::world::GameWorld;

/// Chance that a wave contains one big mushroom (always spawned last).
const BIG_WAVE_CHANCE: f64 = 0.3;
/// First spawn position past the right screen edge.
const ENTRY_MARGIN: i32 = 100;
/// Horizontal spacing between spawned mushrooms.
const SPACING: i32 = 100;

/// Spawn a randomly sized wave (3–6 mushrooms).
pub fn spawn_wave(world: &mut GameWorld, rng: &mut impl Rng) -> GameEvent {
    let size = rng.gen_range(3..=6);
    let has_big = rng.gen_bool(BIG_WAVE_CHANCE);
    spawn_wave_sized(world, size, has_big, rng)
}

/// Spawn a wave of an explicit size and composition. Each mushroom gets a
/// random initial idle timer so the wave doesn't act in lockstep.
pub fn spawn_wave_sized(
    world: &mut GameWorld,
    size: usize,
    has_big: bool,
    rng: &mut impl Rng,
) -> GameEvent {
    let start_x = SCREEN_W + ENTRY_MARGIN;
    for i in 0..size {
        let is_big = has_big && i == size - 1;
        let mut m = Mushroom::new(start_x + i as i32 * SPACING, is_big, world.tuning.mushroom_speed);
        m.state_timer = rng.gen_range(30..=90);
        world.mushrooms.push(m);
    }
    world.wave_defeated = false;
    world.wave += 1;
    GameEvent::WaveSpawned { size }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TuningConfig;
    use crate::sim::leaderboard::Leaderboard;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn world() -> GameWorld {
        GameWorld::new(TuningConfig::default(), Leaderboard::default())
    }

    #[test]
    fn wave_of_four_smalls() {
        let mut rng = StdRng::seed_from_u64(21);
        let mut w = world();
        spawn_wave_sized(&mut w, 4, false, &mut rng);

        assert_eq!(w.mushrooms.len(), 4);
        for m in &w.mushrooms {
            assert!(!m.is_big);
            assert_eq!(m.health, 2);
            assert_eq!(m.points, 5);
            assert!((30..=90).contains(&m.state_timer));
        }
        assert_eq!(w.wave, 1);
        assert!(!w.wave_defeated);
    }

    #[test]
    fn big_mushroom_spawns_last() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut w = world();
        spawn_wave_sized(&mut w, 5, true, &mut rng);

        assert!(w.mushrooms.last().map_or(false, |m| m.is_big));
        assert_eq!(w.mushrooms.iter().filter(|m| m.is_big).count(), 1);
    }

    #[test]
    fn wave_enters_off_screen_with_even_spacing() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut w = world();
        spawn_wave_sized(&mut w, 3, false, &mut rng);

        let xs: Vec<i32> = w.mushrooms.iter().map(|m| m.body.x).collect();
        assert_eq!(xs, vec![900, 1000, 1100]);
        assert!(xs.iter().all(|&x| x > SCREEN_W));
    }

    #[test]
    fn random_wave_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(15);
        for _ in 0..50 {
            let mut w = world();
            spawn_wave(&mut w, &mut rng);
            assert!((3..=6).contains(&w.mushrooms.len()));
            assert!(w.mushrooms.iter().filter(|m| m.is_big).count() <= 1);
        }
    }
}
