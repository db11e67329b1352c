// THEORY:
// The `DirectionPolicy` maps the geometry of the tracked object to one discrete
// steering command. It is a pure, first-match decision table; the order of the
// rules carries meaning and must not change:
//
//   1. radius >  stop_radius  -> Stop   (too close: proximity beats position)
//   2. x      <  left_bound   -> Left
//   3. x      >  right_bound  -> Right
//   4. radius <  stop_radius  -> Front
//   5. otherwise              -> Stop   (radius == stop_radius)
//
// The left/right bounds are expressed against a reference frame width and are
// scaled proportionally to the width actually being analysed, so the policy
// keeps its meaning when the preprocessing width changes. Scaling can be
// switched off for exact legacy parity.

use crate::config::PolicyConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Left,
    Right,
    Front,
    Stop,
    /// No actionable command (nothing tracked, or the object is too small).
    None,
}

impl Command {
    /// The wire word written to the command sink; `None` writes nothing.
    pub fn as_str(self) -> Option<&'static str> {
        match self {
            Command::Left => Some("Left"),
            Command::Right => Some("Right"),
            Command::Front => Some("Front"),
            Command::Stop => Some("Stop"),
            Command::None => None,
        }
    }
}

/// Left/right bounds effective for a frame of `frame_width` pixels.
pub fn effective_bounds(frame_width: u32, config: &PolicyConfig) -> (f64, f64) {
    if !config.scale_with_width || config.reference_width == 0 || frame_width == config.reference_width {
        return (config.left_bound, config.right_bound);
    }
    let scale = frame_width as f64 / config.reference_width as f64;
    (config.left_bound * scale, config.right_bound * scale)
}

/// Decides the command for an object centred at `centroid_x` with enclosing
/// `radius`, seen in a frame `frame_width` pixels wide.
pub fn decide(centroid_x: f64, radius: f64, frame_width: u32, config: &PolicyConfig) -> Command {
    let (left_bound, right_bound) = effective_bounds(frame_width, config);

    if radius > config.stop_radius {
        Command::Stop
    } else if centroid_x < left_bound {
        Command::Left
    } else if centroid_x > right_bound {
        Command::Right
    } else if radius < config.stop_radius {
        Command::Front
    } else {
        Command::Stop
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> PolicyConfig {
        PolicyConfig::default()
    }

    #[test]
    fn proximity_overrides_position() {
        assert_eq!(decide(10.0, 251.0, 900, &policy()), Command::Stop);
        assert_eq!(decide(800.0, 300.0, 900, &policy()), Command::Stop);
    }

    #[test]
    fn position_rules() {
        assert_eq!(decide(100.0, 50.0, 900, &policy()), Command::Left);
        assert_eq!(decide(500.0, 50.0, 900, &policy()), Command::Right);
        assert_eq!(decide(300.0, 50.0, 900, &policy()), Command::Front);
    }

    #[test]
    fn boundary_values_resolve_by_rule_order() {
        // Bounds are strict: exactly on a bound is not past it.
        assert_eq!(decide(150.0, 50.0, 900, &policy()), Command::Front);
        assert_eq!(decide(450.0, 50.0, 900, &policy()), Command::Front);
        assert_eq!(decide(149.9, 50.0, 900, &policy()), Command::Left);
        assert_eq!(decide(450.1, 50.0, 900, &policy()), Command::Right);
        // Exactly the stop radius falls through to the final rule when centred,
        // but position still wins off-centre.
        assert_eq!(decide(300.0, 250.0, 900, &policy()), Command::Stop);
        assert_eq!(decide(100.0, 250.0, 900, &policy()), Command::Left);
        assert_eq!(decide(300.0, 10.0, 900, &policy()), Command::Front);
    }

    #[test]
    fn every_input_yields_an_actionable_command() {
        for x in (0..=900).step_by(25) {
            for r in (0..=400).step_by(10) {
                let command = decide(x as f64, r as f64, 900, &policy());
                assert_ne!(command, Command::None);
                assert_eq!(command, decide(x as f64, r as f64, 900, &policy()));
            }
        }
    }

    #[test]
    fn bounds_scale_with_frame_width() {
        assert_eq!(effective_bounds(450, &policy()), (75.0, 225.0));
        assert_eq!(decide(100.0, 50.0, 450, &policy()), Command::Front);
        assert_eq!(decide(70.0, 50.0, 450, &policy()), Command::Left);

        let legacy = PolicyConfig {
            scale_with_width: false,
            ..policy()
        };
        assert_eq!(effective_bounds(450, &legacy), (150.0, 450.0));
        assert_eq!(decide(100.0, 50.0, 450, &legacy), Command::Left);
    }

    #[test]
    fn wire_words() {
        assert_eq!(Command::Left.as_str(), Some("Left"));
        assert_eq!(Command::Stop.as_str(), Some("Stop"));
        assert_eq!(Command::None.as_str(), None);
    }
}
