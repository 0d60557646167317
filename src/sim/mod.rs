//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod collision;
pub mod state;
pub mod tick;

pub use collision::{in_trigger_band, obstacle_hits};
pub use state::{DamageState, GameEvent, GameState, Obstacle, Player, Stripe};
pub use tick::{TickInput, tick};
