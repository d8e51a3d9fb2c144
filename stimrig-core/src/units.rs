use serde::{Deserialize, Serialize};

/// Unit conversion applied when a resolved value is written to its target
/// channel. `factor` covers spatial units (pixels per degree, per cm, ...);
/// `time_exponent` covers time units: +1 turns seconds into frames, -1 turns
/// a per-second rate into a per-frame rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitSpec {
    pub factor: f32,
    pub time_exponent: i32,
}

impl UnitSpec {
    pub const NONE: UnitSpec = UnitSpec {
        factor: 1.0,
        time_exponent: 0,
    };

    /// Seconds to frames.
    pub const SECONDS: UnitSpec = UnitSpec {
        factor: 1.0,
        time_exponent: 1,
    };

    pub fn scaled(factor: f32) -> UnitSpec {
        UnitSpec {
            factor,
            time_exponent: 0,
        }
    }

    pub fn apply(&self, value: f32, frame_rate: f32) -> f32 {
        value * self.factor * frame_rate.powi(self.time_exponent)
    }
}

impl Default for UnitSpec {
    fn default() -> Self {
        UnitSpec::NONE
    }
}

pub fn polar_to_cartesian(radius: f32, angle: f32) -> (f32, f32) {
    (radius * angle.cos(), radius * angle.sin())
}

pub fn cartesian_to_polar(x: f32, y: f32) -> (f32, f32) {
    ((x * x + y * y).sqrt(), y.atan2(x))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_become_frames() {
        let frames = UnitSpec::SECONDS.apply(0.5, 60.0);
        assert_eq!(frames, 30.0);
    }

    #[test]
    fn polar_round_trip() {
        let (x, y) = polar_to_cartesian(2.0, std::f32::consts::FRAC_PI_2);
        assert!(x.abs() < 1e-6);
        assert!((y - 2.0).abs() < 1e-6);
        let (r, a) = cartesian_to_polar(x, y);
        assert!((r - 2.0).abs() < 1e-6);
        assert!((a - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }
}
