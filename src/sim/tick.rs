//! Fixed timestep simulation tick
//!
//! One tick per display refresh: speed ramp, scoring, lane easing, jump
//! integration, shake, entity advance/recycle, collision, spawn trial.
//! The caller renders from the post-tick state.

use glam::Vec2;
use rand::Rng;

use super::collision::{in_trigger_band, obstacle_hits};
use super::state::{DamageState, GameEvent, GameState, Obstacle};
use crate::consts::*;

/// Input commands for a single tick (one-shots; caller clears after use)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Shift one lane left
    pub steer_left: bool,
    /// Shift one lane right
    pub steer_right: bool,
    /// Start a jump
    pub jump: bool,
}

/// Advance the game state by one tick.
///
/// Per-tick constants are tuned for the 60 Hz fixed step; `dt` drives the
/// wall-clock damage cooldown so invulnerability lasts one real second
/// regardless of how many frames that is.
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    // One-shot inputs
    if input.steer_left {
        state.player.steer_left();
    }
    if input.steer_right {
        state.player.steer_right();
    }
    if input.jump && state.player.start_jump() {
        state.events.push(GameEvent::Jumped);
    }

    // Speed ramp, capped
    if state.speed < SPEED_CAP {
        state.speed = (state.speed + SPEED_RAMP).min(SPEED_CAP);
    }

    // Score accrues every tick survived
    state.score += 1;

    // Lateral easing toward the target lane
    {
        let p = &mut state.player;
        p.lateral += (p.target_lane - p.lateral) * LANE_EASING;

        // Jump integration, semi-implicit Euler
        if p.airborne {
            p.height += p.vertical_vel;
            p.vertical_vel += GRAVITY;
            if p.height <= REST_HEIGHT {
                p.height = REST_HEIGHT;
                p.airborne = false;
                p.vertical_vel = 0.0;
            }
        }
    }

    // Damage cooldown counts real seconds
    if let DamageState::Invulnerable { cooldown } = &mut state.damage {
        *cooldown -= dt;
        if *cooldown <= 0.0 {
            state.damage = DamageState::Vulnerable;
        }
    }

    // Shake: burst timer decays; magnitude blends a speed term with the
    // burst term. The offset is regenerated every tick and only ever read
    // by the renderer, so the true camera position cannot drift.
    if state.shake_timer > 0.0 {
        state.shake_timer -= SHAKE_DECAY;
    }
    let burst = if state.shake_timer > 0.0 {
        SHAKE_INTENSITY * state.shake_timer
    } else {
        0.0
    };
    let magnitude = SHAKE_INTENSITY * (state.speed / SPEED_CAP) * 0.2 + burst;
    let jitter_x = (state.rng.random::<f32>() * 2.0 - 1.0) * magnitude * 0.01;
    let jitter_y = (state.rng.random::<f32>() * 2.0 - 1.0) * magnitude * 0.01;
    state.shake_offset = Vec2::new(jitter_x, jitter_y);

    // Advance the world toward the camera
    let advance = state.speed * SCROLL_FACTOR;
    for stripe in &mut state.stripes {
        stripe.distance += advance;
        if stripe.distance > STRIPE_RECYCLE_Z {
            stripe.distance = STRIPE_RESET_Z;
        }
    }
    for obstacle in &mut state.obstacles {
        obstacle.distance += advance;
    }

    // Collision scan inside the trigger band. Every struck obstacle is
    // removed, including while invulnerable, so the same obstacle cannot
    // hit twice. A fatal hit resets the round and empties the list.
    let mut i = 0;
    while i < state.obstacles.len() {
        let obstacle = state.obstacles[i];
        if in_trigger_band(obstacle.distance) && obstacle_hits(&obstacle, &state.player) {
            apply_collision(state);
            if state.obstacles.is_empty() {
                break;
            }
            state.obstacles.remove(i);
            continue;
        }
        i += 1;
    }

    // Obstacles that passed the camera are done
    state.obstacles.retain(|o| o.distance <= OBSTACLE_DESPAWN_Z);

    // Spawn trial
    try_spawn_obstacle(state);
}

/// Damage state machine: Vulnerable -> lose a life and shield for one
/// second; at zero lives the round resets in place instead.
fn apply_collision(state: &mut GameState) {
    if !state.damage.is_vulnerable() {
        return;
    }

    state.lives -= 1;
    state.events.push(GameEvent::Collision {
        lives_left: state.lives,
    });

    if state.lives == 0 {
        state.events.push(GameEvent::GameOver {
            final_score: state.score,
        });
        state.reset_round();
    } else {
        state.damage = DamageState::Invulnerable {
            cooldown: DAMAGE_COOLDOWN_SECS,
        };
        state.shake_timer = SHAKE_BURST;
    }
}

/// Probabilistic spawn: chance scales linearly with current speed
fn try_spawn_obstacle(state: &mut GameState) {
    let p = SPAWN_BASE_RATE * (state.speed / INITIAL_SPEED);
    if state.rng.random::<f32>() < p {
        let lane = LANE_CENTERS[state.rng.random_range(0..LANE_CENTERS.len())];
        state.obstacles.push(Obstacle::at_lane(lane));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Obstacle positioned so the next tick's advance lands it dead center
    /// of the trigger band at the given speed
    fn obstacle_entering_band(lane_x: f32, speed: f32) -> Obstacle {
        Obstacle {
            distance: -speed * SCROLL_FACTOR,
            ..Obstacle::at_lane(lane_x)
        }
    }

    #[test]
    fn test_score_and_speed_advance() {
        let mut state = GameState::new(1);
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.score, 1);
        assert!(state.speed > INITIAL_SPEED);
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.score, 2);
    }

    #[test]
    fn test_speed_never_overshoots_cap() {
        let mut state = GameState::new(1);
        state.speed = SPEED_CAP - SPEED_RAMP / 2.0;
        for _ in 0..10 {
            tick(&mut state, &TickInput::default(), SIM_DT);
            assert!(state.speed <= SPEED_CAP);
        }
        assert_eq!(state.speed, SPEED_CAP);
    }

    #[test]
    fn test_steer_right_twice_clamps() {
        let mut state = GameState::new(1);
        let input = TickInput {
            steer_right: true,
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.player.target_lane, 2.0);
    }

    #[test]
    fn test_lateral_eases_toward_target() {
        let mut state = GameState::new(1);
        let input = TickInput {
            steer_right: true,
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        // Half the distance covered on the tick that steered
        assert!((state.player.lateral - 1.0).abs() < 1e-6);
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert!((state.player.lateral - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_jump_arc_returns_to_rest() {
        let mut state = GameState::new(1);
        let input = TickInput {
            jump: true,
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert!(state.player.airborne);
        assert!(state.player.height > REST_HEIGHT);
        assert!(state.events.iter().any(|e| *e == GameEvent::Jumped));

        for _ in 0..60 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert!(!state.player.airborne);
        assert_eq!(state.player.height, REST_HEIGHT);
        assert_eq!(state.player.vertical_vel, 0.0);
    }

    #[test]
    fn test_jump_input_while_airborne_is_noop() {
        let mut state = GameState::new(1);
        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        tick(&mut state, &jump, SIM_DT);
        state.drain_events();

        // Second jump press mid-air: no new event, still one arc
        tick(&mut state, &jump, SIM_DT);
        assert!(!state.events.iter().any(|e| *e == GameEvent::Jumped));
        assert!(state.player.airborne);
    }

    #[test]
    fn test_collision_costs_life_then_shields_for_one_second() {
        let mut state = GameState::new(1);
        state
            .obstacles
            .push(obstacle_entering_band(0.0, state.speed + SPEED_RAMP));
        tick(&mut state, &TickInput::default(), SIM_DT);

        assert_eq!(state.lives, 2);
        // The struck obstacle is gone; only far-away fresh spawns may exist
        assert!(state.obstacles.iter().all(|o| o.distance < -100.0));
        assert!(matches!(state.damage, DamageState::Invulnerable { .. }));
        assert!(state
            .events
            .iter()
            .any(|e| *e == GameEvent::Collision { lives_left: 2 }));
        assert_eq!(state.shake_timer, SHAKE_BURST);

        // The shield lasts one second of ticks, give or take a rounding ulp
        let mut shielded_ticks = 0;
        while matches!(state.damage, DamageState::Invulnerable { .. }) {
            tick(&mut state, &TickInput::default(), SIM_DT);
            shielded_ticks += 1;
            assert!(shielded_ticks <= 61, "cooldown never expired");
        }
        assert!(shielded_ticks >= 59);
    }

    #[test]
    fn test_invulnerable_collision_ignored_but_obstacle_removed() {
        let mut state = GameState::new(1);
        state.damage = DamageState::Invulnerable { cooldown: 0.5 };
        state
            .obstacles
            .push(obstacle_entering_band(0.0, state.speed + SPEED_RAMP));
        tick(&mut state, &TickInput::default(), SIM_DT);

        assert_eq!(state.lives, STARTING_LIVES);
        assert!(state.obstacles.iter().all(|o| o.distance < -100.0));
        assert!(!state
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::Collision { .. })));
    }

    #[test]
    fn test_last_life_triggers_game_over_reset() {
        let mut state = GameState::new(1);
        state.lives = 1;
        state.score = 499;
        state.player.lateral = 0.0;
        state
            .obstacles
            .push(obstacle_entering_band(0.0, state.speed + SPEED_RAMP));
        tick(&mut state, &TickInput::default(), SIM_DT);

        // Score ticked to 500 before the hit landed
        assert!(state
            .events
            .iter()
            .any(|e| *e == GameEvent::GameOver { final_score: 500 }));
        assert_eq!(state.score, 0);
        assert_eq!(state.lives, STARTING_LIVES);
        assert_eq!(state.speed, INITIAL_SPEED);
        // Reset cleared the field; at most a fresh far spawn from this tick
        assert!(state.obstacles.iter().all(|o| o.distance < -100.0));
        assert_eq!(state.player.height, REST_HEIGHT);
        assert_eq!(state.player.lateral, 0.0);
        assert!(state.damage.is_vulnerable());
    }

    #[test]
    fn test_obstacle_crosses_band_at_expected_frame() {
        // Mirror the ramp-and-advance arithmetic to predict the crossing
        let mut z = OBSTACLE_SPAWN_Z;
        let mut speed = INITIAL_SPEED;
        let mut frames = 0u32;
        while z <= -TRIGGER_BAND {
            speed = (speed + SPEED_RAMP).min(SPEED_CAP);
            z += speed * SCROLL_FACTOR;
            frames += 1;
        }

        // Side lane so the crossing never collides with the centered player
        let mut state = GameState::new(1);
        state.obstacles.insert(0, Obstacle::at_lane(2.0));
        for _ in 0..frames {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        let tracked = state.obstacles[0];
        assert_eq!(tracked.lane_x, 2.0);
        assert!((tracked.distance - z).abs() < 1e-3);
        assert!(in_trigger_band(tracked.distance));
    }

    #[test]
    fn test_obstacle_removed_past_despawn_threshold() {
        let mut state = GameState::new(1);
        state.obstacles.push(Obstacle {
            distance: OBSTACLE_DESPAWN_Z - 0.01,
            ..Obstacle::at_lane(2.0)
        });
        tick(&mut state, &TickInput::default(), SIM_DT);
        // Only far-away fresh spawns may remain
        assert!(state.obstacles.iter().all(|o| o.distance < -100.0));
    }

    #[test]
    fn test_stripes_recycle_not_despawn() {
        let mut state = GameState::new(1);
        for _ in 0..600 {
            tick(&mut state, &TickInput::default(), SIM_DT);
            assert_eq!(state.stripes.len(), STRIPE_COUNT);
            for stripe in &state.stripes {
                assert!(stripe.distance >= STRIPE_RESET_Z);
                assert!(stripe.distance <= STRIPE_RECYCLE_Z);
            }
        }
    }

    #[test]
    fn test_spawner_eventually_produces_obstacles() {
        let mut state = GameState::new(2024);
        let mut spawned_any = false;
        for _ in 0..2000 {
            tick(&mut state, &TickInput::default(), SIM_DT);
            spawned_any |= !state.obstacles.is_empty();
        }
        assert!(spawned_any);
        // Fresh spawns always appear at the far distance in a real lane
        for o in &state.obstacles {
            assert!(LANE_CENTERS.contains(&o.lane_x));
        }
    }

    #[test]
    fn test_shake_offset_is_render_only() {
        let mut state = GameState::new(1);
        state.shake_timer = SHAKE_BURST;
        tick(&mut state, &TickInput::default(), SIM_DT);
        // Burst active: offset non-zero in general, but the authoritative
        // camera stays exactly on the easing curve
        assert_eq!(state.player.lateral, 0.0);
        assert_eq!(state.player.height, REST_HEIGHT);
        assert!(state.shake_timer < SHAKE_BURST);
    }

    proptest! {
        #[test]
        fn prop_invariants_hold_under_any_input(
            seed in any::<u64>(),
            presses in prop::collection::vec(0u8..8, 1..300),
        ) {
            let mut state = GameState::new(seed);
            for bits in presses {
                let input = TickInput {
                    steer_left: bits & 1 != 0,
                    steer_right: bits & 2 != 0,
                    jump: bits & 4 != 0,
                };
                let prev_speed = state.speed;
                tick(&mut state, &input, SIM_DT);
                let game_over = state
                    .drain_events()
                    .iter()
                    .any(|e| matches!(e, GameEvent::GameOver { .. }));

                prop_assert!(state.lives >= 1 && state.lives <= STARTING_LIVES);
                prop_assert!(state.speed >= INITIAL_SPEED && state.speed <= SPEED_CAP);
                // Monotone within a round; exactly INITIAL_SPEED right after one
                if game_over {
                    prop_assert_eq!(state.speed, INITIAL_SPEED);
                } else {
                    prop_assert!(state.speed >= prev_speed);
                }
                prop_assert!(LANE_CENTERS.contains(&state.player.target_lane));
                prop_assert!(state.player.height >= REST_HEIGHT);
                prop_assert_eq!(state.stripes.len(), STRIPE_COUNT);
            }
        }

        #[test]
        fn prop_equal_seeds_stay_in_lockstep(seed in any::<u64>()) {
            let mut a = GameState::new(seed);
            let mut b = GameState::new(seed);
            let input = TickInput { steer_right: true, jump: true, ..Default::default() };
            for _ in 0..120 {
                tick(&mut a, &input, SIM_DT);
                tick(&mut b, &input, SIM_DT);
            }
            prop_assert_eq!(a.score, b.score);
            prop_assert_eq!(a.speed, b.speed);
            prop_assert_eq!(a.player, b.player);
            prop_assert_eq!(a.obstacles, b.obstacles);
        }
    }
}
