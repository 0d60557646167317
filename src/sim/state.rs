//! Game state and core simulation types
//!
//! Everything gameplay-visible lives here; the renderer and platform shell
//! only read from this state after a tick.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::consts::*;

/// Damage handling state for the player
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageState {
    /// Collisions cost a life
    Vulnerable,
    /// Collisions are ignored until the cooldown (seconds) runs out
    Invulnerable { cooldown: f32 },
}

impl DamageState {
    pub fn is_vulnerable(&self) -> bool {
        matches!(self, DamageState::Vulnerable)
    }
}

/// One-shot gameplay events drained by the platform shell each frame
/// (audio cues, HUD flashes, the game-over alert)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// A jump started
    Jumped,
    /// A vulnerable collision happened; lives remaining after the hit
    Collision { lives_left: u8 },
    /// Lives hit zero; the round has already been reset in place
    GameOver { final_score: u64 },
}

/// A collidable obstacle on the road
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    /// Lane center x the obstacle occupies
    pub lane_x: f32,
    /// Center height above the road
    pub height: f32,
    /// Forward distance (negative = ahead of the camera)
    pub distance: f32,
    /// Roll tilt in radians (visual)
    pub tilt: f32,
}

impl Obstacle {
    /// New obstacle at the far spawn distance in the given lane
    pub fn at_lane(lane_x: f32) -> Self {
        Self {
            lane_x,
            height: OBSTACLE_HEIGHT,
            distance: OBSTACLE_SPAWN_Z,
            tilt: OBSTACLE_TILT,
        }
    }
}

/// A lane-divider stripe; fixed population, recycled instead of destroyed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stripe {
    /// Forward distance (negative = ahead of the camera)
    pub distance: f32,
}

/// First-person camera kinematics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Player {
    /// Discrete steering target, one of LANE_CENTERS
    pub target_lane: f32,
    /// Eased lateral position (authoritative, shake never touches it)
    pub lateral: f32,
    /// Camera height
    pub height: f32,
    /// Vertical velocity while airborne
    pub vertical_vel: f32,
    /// True between jump start and touchdown
    pub airborne: bool,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            target_lane: 0.0,
            lateral: 0.0,
            height: REST_HEIGHT,
            vertical_vel: 0.0,
            airborne: false,
        }
    }
}

impl Player {
    /// Shift the steering target one lane left, clamped at the edge
    pub fn steer_left(&mut self) {
        self.target_lane = crate::clamp_lane(self.target_lane - LANE_STEP);
    }

    /// Shift the steering target one lane right, clamped at the edge
    pub fn steer_right(&mut self) {
        self.target_lane = crate::clamp_lane(self.target_lane + LANE_STEP);
    }

    /// Start a jump. Returns false (and changes nothing) while airborne.
    pub fn start_jump(&mut self) -> bool {
        if self.airborne {
            return false;
        }
        self.airborne = true;
        self.vertical_vel = JUMP_POWER;
        true
    }
}

/// Complete session state for one page load
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Frame-incremented score
    pub score: u64,
    /// Remaining lives, 0..=STARTING_LIVES
    pub lives: u8,
    /// Forward speed, INITIAL_SPEED..=SPEED_CAP
    pub speed: f32,
    /// Camera kinematics
    pub player: Player,
    /// Collision/damage state machine
    pub damage: DamageState,
    /// Shake burst timer; decays each tick and may dip below zero
    pub shake_timer: f32,
    /// Per-tick random jitter applied only to the rendered camera transform
    pub shake_offset: Vec2,
    /// Active obstacles (sole owner)
    pub obstacles: Vec<Obstacle>,
    /// Lane stripes (fixed count, recycled)
    pub stripes: Vec<Stripe>,
    /// Events produced since the last drain
    pub events: Vec<GameEvent>,
    /// Seeded RNG for spawn rolls and shake jitter
    pub rng: Pcg32,
}

impl GameState {
    /// Create a fresh session with the given seed
    pub fn new(seed: u64) -> Self {
        // Seed stripes evenly over the steady-state ring so the road is
        // fully dressed on the first frame.
        let spacing = (STRIPE_RECYCLE_Z - STRIPE_RESET_Z) / STRIPE_COUNT as f32;
        let stripes = (0..STRIPE_COUNT)
            .map(|i| Stripe {
                distance: STRIPE_RESET_Z + i as f32 * spacing,
            })
            .collect();

        Self {
            seed,
            score: 0,
            lives: STARTING_LIVES,
            speed: INITIAL_SPEED,
            player: Player::default(),
            damage: DamageState::Vulnerable,
            shake_timer: 0.0,
            shake_offset: Vec2::ZERO,
            obstacles: Vec::new(),
            stripes,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Reset the round in place after game over.
    ///
    /// Clears score, lives, speed, obstacles, camera, shake, and the damage
    /// state. Assigning `Vulnerable` also cancels any pending cooldown, so
    /// no stale invulnerability can leak into the next round. Stripes and
    /// the RNG stream carry over.
    pub fn reset_round(&mut self) {
        self.score = 0;
        self.lives = STARTING_LIVES;
        self.speed = INITIAL_SPEED;
        self.player = Player::default();
        self.damage = DamageState::Vulnerable;
        self.shake_timer = 0.0;
        self.shake_offset = Vec2::ZERO;
        self.obstacles.clear();
    }

    /// Take all events accumulated since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_invariants() {
        let state = GameState::new(7);
        assert_eq!(state.score, 0);
        assert_eq!(state.lives, STARTING_LIVES);
        assert_eq!(state.speed, INITIAL_SPEED);
        assert_eq!(state.stripes.len(), STRIPE_COUNT);
        assert!(state.obstacles.is_empty());
        assert!(state.damage.is_vulnerable());
        assert_eq!(state.player.height, REST_HEIGHT);
    }

    #[test]
    fn test_stripes_within_ring() {
        let state = GameState::new(7);
        for stripe in &state.stripes {
            assert!(stripe.distance >= STRIPE_RESET_Z);
            assert!(stripe.distance < STRIPE_RECYCLE_Z);
        }
    }

    #[test]
    fn test_reset_round_is_idempotent() {
        let mut state = GameState::new(42);
        state.score = 900;
        state.lives = 1;
        state.speed = SPEED_CAP;
        state.player.lateral = 1.3;
        state.player.airborne = true;
        state.damage = DamageState::Invulnerable { cooldown: 0.4 };
        state.obstacles.push(Obstacle::at_lane(2.0));

        state.reset_round();
        let snapshot = (state.score, state.lives, state.speed, state.player);
        state.reset_round();
        assert_eq!(snapshot, (state.score, state.lives, state.speed, state.player));
        assert!(state.obstacles.is_empty());
        assert!(state.damage.is_vulnerable());
    }

    #[test]
    fn test_steer_clamps_at_edges() {
        let mut player = Player::default();
        player.steer_right();
        assert_eq!(player.target_lane, 2.0);
        player.steer_right();
        assert_eq!(player.target_lane, 2.0);
        player.steer_left();
        player.steer_left();
        player.steer_left();
        assert_eq!(player.target_lane, -2.0);
    }

    #[test]
    fn test_no_double_jump() {
        let mut player = Player::default();
        assert!(player.start_jump());
        let vel = player.vertical_vel;
        assert!(!player.start_jump());
        assert_eq!(player.vertical_vel, vel);
    }
}
