use serde::{Deserialize, Serialize};

use crate::units::{
  meter,
  motion::{meters_per_second, rads_per_second, AngularVelocity, Velocity},
  traits::{atan2, Angle as _},
  Angle, Length, QuantityBase, Time,
};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose2d {
  pub x: Length,
  pub y: Length,
  pub rotation: Angle,
}

impl Pose2d {
  pub fn new(x: Length, y: Length, rotation: Angle) -> Self {
    Self { x, y, rotation: rotation.wrapped() }
  }

  pub fn origin() -> Self {
    Self::default()
  }

  pub fn distance_to(&self, other: &Pose2d) -> Length {
    let dx = (other.x - self.x).to_base();
    let dy = (other.y - self.y).to_base();
    Length::from_base(dx.hypot(dy))
  }

  /// Field-relative direction from this pose to `other`.
  pub fn bearing_to(&self, other: &Pose2d) -> Angle {
    atan2(other.y - self.y, other.x - self.x)
  }

  /// Advances the pose by field-relative speeds held for `dt`.
  pub fn integrate(&self, speeds: &ChassisSpeeds, dt: Time) -> Pose2d {
    let dt = dt.to_base();
    Pose2d::new(
      self.x + Length::from_base(speeds.vx.to_base() * dt),
      self.y + Length::from_base(speeds.vy.to_base() * dt),
      self.rotation + Angle::from_base(speeds.omega.to_base() * dt),
    )
  }
}

/// Serialised form of a pose, as written in auto files and config.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseSpec {
  pub x: f64,
  pub y: f64,
  #[serde(default)]
  pub rotation_degrees: f64,
}

impl From<PoseSpec> for Pose2d {
  fn from(value: PoseSpec) -> Self {
    Pose2d::new(value.x * meter, value.y * meter, Angle::from_base(value.rotation_degrees.to_radians()))
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChassisSpeeds {
  pub vx: Velocity,
  pub vy: Velocity,
  pub omega: AngularVelocity,
}

impl ChassisSpeeds {
  pub fn new(vx: Velocity, vy: Velocity, omega: AngularVelocity) -> Self {
    Self { vx, vy, omega }
  }

  /// Converts robot-relative speeds to field-relative, given the robot's heading.
  pub fn robot_to_field(&self, heading: Angle) -> ChassisSpeeds {
    let (s, c) = (heading.sin(), heading.cos());
    let vx = self.vx.to::<meters_per_second>();
    let vy = self.vy.to::<meters_per_second>();
    ChassisSpeeds {
      vx: (vx * c - vy * s) * meters_per_second,
      vy: (vx * s + vy * c) * meters_per_second,
      omega: self.omega,
    }
  }

  pub fn stopped() -> Self {
    Self { vx: 0.0 * meters_per_second, vy: 0.0 * meters_per_second, omega: 0.0 * rads_per_second }
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_relative_eq;

  use crate::units::{
    degree, meter,
    motion::{meters_per_second, rads_per_second},
    radian, second,
  };

  use super::{ChassisSpeeds, Pose2d, PoseSpec};

  #[test]
  fn test_distance_and_bearing() {
    let a = Pose2d::origin();
    let b = Pose2d::new(3.0 * meter, 4.0 * meter, 0.0 * degree);
    assert_relative_eq!(a.distance_to(&b), 5.0 * meter);
    assert_relative_eq!(a.bearing_to(&b), 4.0f64.atan2(3.0) * radian);
    assert_relative_eq!(b.bearing_to(&a), (-4.0f64).atan2(-3.0) * radian);
  }

  #[test]
  fn test_integrate_and_rotate() {
    let speeds = ChassisSpeeds::new(1.0 * meters_per_second, 0.0 * meters_per_second, 0.0 * rads_per_second);
    let field = speeds.robot_to_field(90.0 * degree);
    assert_relative_eq!(field.vy, 1.0 * meters_per_second, epsilon = 1e-9 * meters_per_second);

    let pose = Pose2d::origin().integrate(&field, 2.0 * second);
    assert_relative_eq!(pose.y, 2.0 * meter, epsilon = 1e-9 * meter);
    assert_relative_eq!(pose.x, 0.0 * meter, epsilon = 1e-9 * meter);
  }

  #[test]
  fn test_pose_spec() {
    let spec: PoseSpec = serde_json::from_str(r#"{"x": 1.5, "y": 6.25, "rotation_degrees": 180.0}"#).unwrap();
    let pose: Pose2d = spec.into();
    assert_relative_eq!(pose.rotation, 180.0 * degree, epsilon = 1e-9 * radian);
  }
}
