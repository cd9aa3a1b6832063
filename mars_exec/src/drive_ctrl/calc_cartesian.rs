//! Cartesian mixing for the mecanum geometry

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal imports
use super::{MecanumDem, NUM_MECANUM_WHEELS};

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MecanumDem {
    /// Calculate the `[front_left, front_right, rear_left, rear_right]` wheel
    /// demands.
    ///
    /// If any wheel would exceed full speed all of them are scaled down by the
    /// same factor, which keeps the direction of travel.
    pub fn wheel_speeds(&self) -> [f64; NUM_MECANUM_WHEELS] {
        let (f, s, r) = match *self {
            MecanumDem::Feed => return [0.0; NUM_MECANUM_WHEELS],
            MecanumDem::Cartesian {
                forward,
                strafe,
                rotation,
            } => (forward, strafe, rotation),
        };

        let mut speeds = [f + s + r, f - s - r, f - s + r, f + s - r];

        let max = speeds.iter().fold(0.0f64, |m, v| m.max(v.abs()));
        if max > 1.0 {
            for v in speeds.iter_mut() {
                *v /= max;
            }
        }

        speeds
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const EPS: f64 = 1e-9;

    fn cart(forward: f64, strafe: f64, rotation: f64) -> MecanumDem {
        MecanumDem::Cartesian {
            forward,
            strafe,
            rotation,
        }
    }

    #[test]
    fn test_feed_is_idle() {
        assert_eq!(MecanumDem::Feed.wheel_speeds(), [0.0; 4]);
    }

    #[test]
    fn test_pure_axes() {
        assert_eq!(cart(0.5, 0.0, 0.0).wheel_speeds(), [0.5; 4]);
        assert_eq!(cart(0.0, 0.5, 0.0).wheel_speeds(), [0.5, -0.5, -0.5, 0.5]);
        assert_eq!(cart(0.0, 0.0, 0.5).wheel_speeds(), [0.5, -0.5, 0.5, -0.5]);
    }

    #[test]
    fn test_normalised() {
        let w = cart(1.0, 1.0, 1.0).wheel_speeds();
        assert!((w[0] - 1.0).abs() < EPS);
        assert!((w[1] + 1.0 / 3.0).abs() < EPS);
        assert!((w[2] - 1.0 / 3.0).abs() < EPS);
        assert!((w[3] - 1.0 / 3.0).abs() < EPS);

        for f in (-4..=4).map(|i| i as f64 / 4.0) {
            for s in (-4..=4).map(|i| i as f64 / 4.0) {
                for r in (-4..=4).map(|i| i as f64 / 4.0) {
                    let w = cart(f, s, r).wheel_speeds();
                    assert!(w.iter().all(|v| v.abs() <= 1.0 + EPS));
                }
            }
        }
    }
}
