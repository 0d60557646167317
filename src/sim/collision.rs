//! Obstacle hit testing
//!
//! Collision is only evaluated inside a narrow forward band around the
//! camera plane; within it the test is a lateral distance check plus a
//! height check that a jump clears.

use super::state::{Obstacle, Player};
use crate::consts::*;

/// True while the obstacle is passing through the camera's forward plane
#[inline]
pub fn in_trigger_band(distance: f32) -> bool {
    distance > -TRIGGER_BAND && distance < TRIGGER_BAND
}

/// Hit test for an obstacle already inside the trigger band.
///
/// Uses the authoritative (un-shaken) lateral position. An airborne player
/// never collides, regardless of height.
#[inline]
pub fn obstacle_hits(obstacle: &Obstacle, player: &Player) -> bool {
    let lateral_distance = (obstacle.lane_x - player.lateral).abs();
    lateral_distance < HIT_LATERAL_RANGE
        && player.height <= obstacle.height + HIT_HEIGHT_PAD
        && !player.airborne
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grounded_player(lateral: f32) -> Player {
        Player {
            lateral,
            ..Player::default()
        }
    }

    #[test]
    fn test_trigger_band_bounds() {
        assert!(in_trigger_band(0.0));
        assert!(in_trigger_band(-0.49));
        assert!(in_trigger_band(0.49));
        assert!(!in_trigger_band(-0.5));
        assert!(!in_trigger_band(0.5));
        assert!(!in_trigger_band(-200.0));
    }

    #[test]
    fn test_hit_same_lane() {
        let ob = Obstacle::at_lane(0.0);
        assert!(obstacle_hits(&ob, &grounded_player(0.0)));
    }

    #[test]
    fn test_miss_adjacent_lane() {
        // Lane centers are 2.0 apart, beyond the 1.5 hit range
        let ob = Obstacle::at_lane(2.0);
        assert!(!obstacle_hits(&ob, &grounded_player(0.0)));
    }

    #[test]
    fn test_hit_while_easing_between_lanes() {
        // Mid-ease the camera can clip an obstacle in the lane it is leaving
        let ob = Obstacle::at_lane(0.0);
        assert!(obstacle_hits(&ob, &grounded_player(1.2)));
        assert!(!obstacle_hits(&ob, &grounded_player(1.6)));
    }

    #[test]
    fn test_airborne_never_hits() {
        let ob = Obstacle::at_lane(0.0);
        let mut player = grounded_player(0.0);
        player.airborne = true;
        // Even at rest height, being airborne clears the obstacle
        assert!(!obstacle_hits(&ob, &player));
    }

    #[test]
    fn test_height_threshold() {
        let ob = Obstacle::at_lane(0.0);
        let mut player = grounded_player(0.0);
        // Rest height 0.7 is under 0.25 + 0.55 = 0.8
        assert!(obstacle_hits(&ob, &player));
        player.height = ob.height + HIT_HEIGHT_PAD + 0.01;
        assert!(!obstacle_hits(&ob, &player));
    }
}
