//! Road Rush - a first-person three-lane road runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (movement, collisions, game state)
//! - `renderer`: WebGPU rendering pipeline
//! - `audio`: Procedural Web Audio cues and loops (wasm only)
//! - `settings`: User preferences with LocalStorage persistence

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use settings::{QualityPreset, Settings};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz - one tick per display refresh)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Starting forward speed (world units per tick, pre scroll factor)
    pub const INITIAL_SPEED: f32 = 0.05;
    /// Forward speed cap
    pub const SPEED_CAP: f32 = 0.25;
    /// Speed gained per tick until the cap
    pub const SPEED_RAMP: f32 = 0.00005;
    /// World units scrolled per tick = speed * SCROLL_FACTOR
    pub const SCROLL_FACTOR: f32 = 20.0;

    /// Lane center x coordinates, left to right
    pub const LANE_CENTERS: [f32; 3] = [-2.0, 0.0, 2.0];
    /// Lateral distance between adjacent lanes
    pub const LANE_STEP: f32 = 2.0;
    /// Fraction of remaining lateral distance covered per tick
    pub const LANE_EASING: f32 = 0.5;

    /// Camera resting height (first-person eye level)
    pub const REST_HEIGHT: f32 = 0.7;
    /// Vertical field of view in degrees (mirrored by road_shader.wgsl)
    pub const FOV_DEGREES: f32 = 90.0;
    /// Upward velocity applied when a jump starts
    pub const JUMP_POWER: f32 = 0.5;
    /// Per-tick gravity applied to vertical velocity while airborne
    pub const GRAVITY: f32 = -0.05;

    /// Obstacle spawn probability per tick at INITIAL_SPEED
    pub const SPAWN_BASE_RATE: f32 = 0.008;
    /// Forward distance obstacles spawn at
    pub const OBSTACLE_SPAWN_Z: f32 = -200.0;
    /// Obstacle center height
    pub const OBSTACLE_HEIGHT: f32 = 0.25;
    /// Obstacle roll tilt (radians)
    pub const OBSTACLE_TILT: f32 = -0.1;
    /// Obstacles past this forward distance are removed
    pub const OBSTACLE_DESPAWN_Z: f32 = 5.0;
    /// Obstacle half extents (x, y, z), mirrored by road_shader.wgsl
    pub const OBSTACLE_HALF_EXTENTS: [f32; 3] = [1.0, 0.25, 0.5];

    /// Half-width of the forward band where collision is evaluated
    pub const TRIGGER_BAND: f32 = 0.5;
    /// Maximum lateral distance that still counts as a hit
    pub const HIT_LATERAL_RANGE: f32 = 1.5;
    /// Camera must be at or below obstacle height + this pad to collide
    pub const HIT_HEIGHT_PAD: f32 = 0.55;

    /// Lives at round start
    pub const STARTING_LIVES: u8 = 3;
    /// Seconds of invulnerability after a collision
    pub const DAMAGE_COOLDOWN_SECS: f32 = 1.0;

    /// Base shake intensity
    pub const SHAKE_INTENSITY: f32 = 0.15;
    /// Shake timer value set on collision
    pub const SHAKE_BURST: f32 = 5.0;
    /// Shake timer decrement per tick
    pub const SHAKE_DECAY: f32 = 0.1;

    /// Number of lane stripes on the road (fixed count, recycled)
    pub const STRIPE_COUNT: usize = 50;
    /// Stripes past this forward distance wrap to STRIPE_RESET_Z
    pub const STRIPE_RECYCLE_Z: f32 = 25.0;
    /// Forward distance stripes wrap back to
    pub const STRIPE_RESET_Z: f32 = -50.0;

    /// Road surface width (mirrored by road_shader.wgsl)
    pub const ROAD_WIDTH: f32 = 10.0;
    /// Road surface length (mirrored by road_shader.wgsl)
    pub const ROAD_LENGTH: f32 = 500.0;
    /// Star count for the background field
    pub const STAR_COUNT: u32 = 500;

    /// Vignette post-process offset
    pub const VIGNETTE_OFFSET: f32 = 0.95;
    /// Vignette post-process darkness
    pub const VIGNETTE_DARKNESS: f32 = 1.6;

    /// Ambience loop volume
    pub const AMBIENCE_VOLUME: f32 = 0.5;
    /// Running loop volume
    pub const RUNNING_VOLUME: f32 = 0.2;
    /// Collision cue volume
    pub const COLLISION_VOLUME: f32 = 1.0;
    /// Jump cue volume
    pub const JUMP_VOLUME: f32 = 0.8;
}

/// Clamp a target lane coordinate to the outer lane centers
#[inline]
pub fn clamp_lane(x: f32) -> f32 {
    let bound = consts::LANE_CENTERS[consts::LANE_CENTERS.len() - 1];
    x.clamp(-bound, bound)
}
