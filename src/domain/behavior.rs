/// Mushroom behavior — the per-tick state machine.
///
/// Three live states plus the death fade:
///   Idle      — count down, then roll: 30% chance to start moving,
///               otherwise idle again with a fresh timer.
///   Moving    — shamble toward the target x; attack when the timer runs
///               out or the target is within closing distance.
///   Attacking — hold for a fixed window (the strike itself only connects
///               during the opening ticks, see `Mushroom::is_attacking`),
///               then drop back to Idle.
///
/// A fading mushroom does nothing but lose alpha until fully transparent.

use rand::Rng;

use super::entity::{Mushroom, MushroomState, ATTACK_WINDOW, FADE_STEP};

/// Chance per idle expiry to start moving.
const MOVE_CHANCE: f64 = 0.3;
/// Close enough to the target to switch from Moving to Attacking.
const CLOSING_DISTANCE: i32 = 20;

pub fn update_mushroom(m: &mut Mushroom, target_x: i32, rng: &mut impl Rng) {
    if m.death_timer > 0 {
        m.death_timer -= 1;
        m.body.alpha = m.body.alpha.saturating_sub(FADE_STEP);
        return;
    }

    match m.state {
        MushroomState::Idle => {
            m.state_timer = m.state_timer.saturating_sub(1);
            if m.state_timer == 0 {
                if rng.gen_bool(MOVE_CHANCE) {
                    m.state = MushroomState::Moving;
                    m.state_timer = rng.gen_range(30..=90);
                } else {
                    m.state_timer = rng.gen_range(30..=60);
                }
            }
        }
        MushroomState::Moving => {
            if m.body.x < target_x {
                m.body.x += m.speed;
            } else if m.body.x > target_x {
                m.body.x -= m.speed;
            }
            m.state_timer = m.state_timer.saturating_sub(1);
            if m.state_timer == 0 || (m.body.x - target_x).abs() < CLOSING_DISTANCE {
                m.state = MushroomState::Attacking;
                m.state_timer = ATTACK_WINDOW;
            }
        }
        MushroomState::Attacking => {
            m.state_timer = m.state_timer.saturating_sub(1);
            if m.state_timer == 0 {
                m.state = MushroomState::Idle;
                m.state_timer = rng.gen_range(60..=120);
            }
        }
    }

    m.body.pin_to_ground();
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn mushroom_at(x: i32) -> Mushroom {
        Mushroom::new(x, false, 2)
    }

    #[test]
    fn idle_expiry_rolls_a_valid_timer() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let mut m = mushroom_at(600);
            m.state_timer = 1;
            update_mushroom(&mut m, 100, &mut rng);
            match m.state {
                MushroomState::Idle => assert!((30..=60).contains(&m.state_timer)),
                MushroomState::Moving => assert!((30..=90).contains(&m.state_timer)),
                MushroomState::Attacking => panic!("idle never jumps straight to attacking"),
            }
        }
    }

    #[test]
    fn idle_starts_moving_roughly_a_third_of_the_time() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut moved = 0;
        for _ in 0..2000 {
            let mut m = mushroom_at(600);
            m.state_timer = 1;
            update_mushroom(&mut m, 100, &mut rng);
            if m.state == MushroomState::Moving {
                moved += 1;
            }
        }
        let rate = moved as f64 / 2000.0;
        assert!(rate > 0.2 && rate < 0.4, "move rate {rate} outside expected band");
    }

    #[test]
    fn moving_closes_distance_and_attacks_when_near() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut m = mushroom_at(600);
        m.state = MushroomState::Moving;
        m.state_timer = 1000;

        let target = 500;
        for _ in 0..200 {
            update_mushroom(&mut m, target, &mut rng);
            if m.state == MushroomState::Attacking {
                break;
            }
        }
        assert_eq!(m.state, MushroomState::Attacking);
        assert!((m.body.x - target).abs() < CLOSING_DISTANCE);
        assert_eq!(m.state_timer, ATTACK_WINDOW);
    }

    #[test]
    fn moving_attacks_when_timer_expires_even_far_away() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut m = mushroom_at(600);
        m.state = MushroomState::Moving;
        m.state_timer = 1;
        update_mushroom(&mut m, -5000, &mut rng);
        assert_eq!(m.state, MushroomState::Attacking);
    }

    #[test]
    fn attack_window_connects_only_in_the_opening_ticks() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut m = mushroom_at(500);
        m.state = MushroomState::Attacking;
        m.state_timer = ATTACK_WINDOW;

        let mut hot_ticks = 0;
        while m.state == MushroomState::Attacking {
            if m.is_attacking() {
                hot_ticks += 1;
            }
            update_mushroom(&mut m, 500, &mut rng);
        }
        assert_eq!(hot_ticks, 5);
        assert_eq!(m.state, MushroomState::Idle);
        assert!((60..=120).contains(&m.state_timer));
    }

    #[test]
    fn death_fade_runs_to_transparent_then_removable() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut m = mushroom_at(500);
        m.take_damage(10, 20, &mut rng);

        for tick in 0..20 {
            assert!(!m.is_dead(), "removable too early at tick {tick}");
            update_mushroom(&mut m, 500, &mut rng);
        }
        assert_eq!(m.body.alpha, 0);
        assert!(m.is_dead());
    }

    #[test]
    fn fading_mushroom_does_not_act() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut m = mushroom_at(500);
        m.state = MushroomState::Moving;
        m.take_damage(10, 20, &mut rng);

        let x_before = m.body.x;
        update_mushroom(&mut m, 0, &mut rng);
        assert_eq!(m.body.x, x_before);
        assert!(!m.is_attacking());
    }
}
