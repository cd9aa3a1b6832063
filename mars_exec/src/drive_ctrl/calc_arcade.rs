//! Arcade mixing for the tank geometry

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal imports
use super::{TankDem, NUM_TANK_WHEELS};
use util::maths::clamp_norm;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TankDem {
    /// Calculate the `[left, right]` motor group demands.
    ///
    /// Rotation is clockwise positive, so positive rotation speeds up the
    /// left side. The larger of the two inputs always reaches the wheels
    /// unchanged so full forward and full rotation remain achievable.
    pub fn wheel_speeds(&self) -> [f64; NUM_TANK_WHEELS] {
        let (forward, rotation) = match *self {
            TankDem::Feed => return [0.0; NUM_TANK_WHEELS],
            TankDem::Arcade { forward, rotation } => {
                (clamp_norm(forward).0, clamp_norm(rotation).0)
            }
        };

        let max = forward.abs().max(rotation.abs());

        let (left, right) = if forward >= 0.0 {
            if rotation >= 0.0 {
                (max, forward - rotation)
            } else {
                (forward + rotation, max)
            }
        } else if rotation >= 0.0 {
            (forward + rotation, -max)
        } else {
            (-max, forward - rotation)
        };

        [clamp_norm(left).0, clamp_norm(right).0]
    }
}
