//! Entity trajectory models and state propagation.
//!
//! Each entity has a true position and velocity and a `MotionSpec`
//! describing how it moves. The simulator steps each entity forward in time.

use serde::{Deserialize, Serialize};

/// Describes entity motion.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum MotionSpec {
    /// Holds position (e.g. a fixed camera or a downed player).
    Stationary,
    /// Constant velocity.
    ConstantVelocity,
    /// Constant turn rate on the XY plane. `omega` = yaw rate (rad/s).
    ConstantTurn { omega: f64 },
    /// Walk towards each `(t, x, y, z)` waypoint in turn at `speed`,
    /// stopping at the last one.
    Waypoints { waypoints: Vec<[f64; 4]>, speed: f64 },
    /// Teleport to `to` when the clock passes `at`, keeping velocity, then
    /// move under `then`.
    Respawn {
        at: f64,
        to: [f64; 3],
        then: Box<MotionSpec>,
    },
}

/// A simulated entity with ground-truth state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Entity {
    /// Ground-truth label (used for metrics only)
    pub id: u32,
    pub position: [f64; 3],
    pub velocity: [f64; 3],
    pub motion: MotionSpec,
    /// Optional: entity appears after this time (no samples before)
    pub appear_at: Option<f64>,
    /// Optional: entity stops reporting after this time
    pub disappear_at: Option<f64>,
}

impl Entity {
    pub fn new(id: u32, position: [f64; 3], velocity: [f64; 3], motion: MotionSpec) -> Self {
        Self {
            id,
            position,
            velocity,
            motion,
            appear_at: None,
            disappear_at: None,
        }
    }

    /// Propagate the true state from `t` to `t + dt`.
    pub fn step(&mut self, t: f64, dt: f64) {
        let motion = self.motion.clone();
        self.apply(&motion, t, dt);
    }

    fn apply(&mut self, motion: &MotionSpec, t: f64, dt: f64) {
        let p = &mut self.position;
        let v = &mut self.velocity;
        match motion {
            MotionSpec::Stationary => {
                *v = [0.0; 3];
            }
            MotionSpec::ConstantVelocity => {
                for i in 0..3 {
                    p[i] += v[i] * dt;
                }
            }
            MotionSpec::ConstantTurn { omega } => {
                let speed = (v[0] * v[0] + v[1] * v[1]).sqrt();
                let heading = v[1].atan2(v[0]);
                let new_heading = heading + omega * dt;
                p[0] += speed * heading.cos() * dt;
                p[1] += speed * heading.sin() * dt;
                v[0] = speed * new_heading.cos();
                v[1] = speed * new_heading.sin();
            }
            MotionSpec::Waypoints { waypoints, speed } => {
                // Head for the first waypoint not yet due.
                let target = waypoints
                    .iter()
                    .find(|wp| wp[0] >= t)
                    .or_else(|| waypoints.last());
                if let Some(wp) = target {
                    let d = [wp[1] - p[0], wp[2] - p[1], wp[3] - p[2]];
                    let dist = (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt();
                    let reach = speed * dt;
                    if dist <= reach {
                        *p = [wp[1], wp[2], wp[3]];
                        *v = [0.0; 3];
                    } else {
                        for i in 0..3 {
                            v[i] = speed * d[i] / dist;
                            p[i] += v[i] * dt;
                        }
                    }
                }
            }
            MotionSpec::Respawn { at, to, then } => {
                if t < *at && t + dt >= *at {
                    *p = *to;
                } else if t >= *at {
                    self.apply(then, t, dt);
                }
            }
        }
    }

    /// True if the entity reports at time `t`.
    pub fn is_active(&self, t: f64) -> bool {
        if let Some(appear) = self.appear_at {
            if t < appear {
                return false;
            }
        }
        if let Some(disappear) = self.disappear_at {
            if t >= disappear {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn constant_velocity_moves() {
        let mut e = Entity::new(0, [0.0, 0.0, 0.0], [2.0, -1.0, 0.0], MotionSpec::ConstantVelocity);
        e.step(0.0, 0.5);
        assert_abs_diff_eq!(e.position[0], 1.0);
        assert_abs_diff_eq!(e.position[1], -0.5);
    }

    #[test]
    fn waypoint_walk_stops_at_goal() {
        let mut e = Entity::new(
            0,
            [0.0, 0.0, 0.0],
            [0.0; 3],
            MotionSpec::Waypoints {
                waypoints: vec![[10.0, 3.0, 4.0, 0.0]],
                speed: 1.0,
            },
        );
        let mut t = 0.0;
        for _ in 0..100 {
            e.step(t, 0.1);
            t += 0.1;
        }
        assert_abs_diff_eq!(e.position[0], 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(e.position[1], 4.0, epsilon = 1e-9);
    }

    #[test]
    fn respawn_teleports_once() {
        let mut e = Entity::new(
            0,
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            MotionSpec::Respawn {
                at: 1.0,
                to: [50.0, 50.0, 0.0],
                then: Box::new(MotionSpec::Stationary),
            },
        );
        e.step(0.5, 0.5);
        assert_eq!(e.position, [50.0, 50.0, 0.0]);
        e.step(1.0, 0.5);
        assert_eq!(e.position, [50.0, 50.0, 0.0]);
    }

    #[test]
    fn activity_window() {
        let mut e = Entity::new(0, [0.0; 3], [0.0; 3], MotionSpec::Stationary);
        e.appear_at = Some(1.0);
        e.disappear_at = Some(2.0);
        assert!(!e.is_active(0.5));
        assert!(e.is_active(1.5));
        assert!(!e.is_active(2.0));
    }
}
