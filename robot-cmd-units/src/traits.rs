use std::f64::consts::PI;

use num_traits::Zero;

use crate::{Dimension, Quantity, QuantityBase};

pub trait Angle : Sized {
  fn sin(self) -> f64;
  fn cos(self) -> f64;

  /// Normalises the angle into (-pi, pi].
  fn wrapped(self) -> Self;
}

impl Angle for crate::base::Angle {
  fn sin(self) -> f64 {
    self.to_base().sin()
  }

  fn cos(self) -> f64 {
    self.to_base().cos()
  }

  fn wrapped(self) -> Self {
    Self::from_base(wrap_radians(self.to_base()))
  }
}

fn wrap_radians(value: f64) -> f64 {
  let wrapped = (value + PI).rem_euclid(2.0 * PI) - PI;
  if wrapped <= -PI { wrapped + 2.0 * PI } else { wrapped }
}

/// Bearing of the vector (x, y), measured counter-clockwise from +x.
pub fn atan2<D: Dimension + ?Sized>(y: Quantity<D>, x: Quantity<D>) -> crate::base::Angle {
  crate::base::Angle::from_base(y.to_base().atan2(x.to_base()))
}

pub trait MaybeUnitNumber : Zero + PartialOrd + Copy {
  fn abs(self) -> Self;
  fn max(self, other: Self) -> Self;
  fn min(self, other: Self) -> Self;

  fn clamp_to(self, min: Self, max: Self) -> Self {
    self.max(min).min(max)
  }
}

impl<D: Dimension + ?Sized> MaybeUnitNumber for Quantity<D> {
  fn abs(self) -> Self {
    Quantity::from_base(self.to_base().abs())
  }

  fn max(self, other: Self) -> Self {
    Quantity::from_base(self.to_base().max(other.to_base()))
  }

  fn min(self, other: Self) -> Self {
    Quantity::from_base(self.to_base().min(other.to_base()))
  }
}

impl MaybeUnitNumber for f64 {
  fn abs(self) -> Self {
    f64::abs(self)
  }

  fn max(self, other: Self) -> Self {
    f64::max(self, other)
  }

  fn min(self, other: Self) -> Self {
    f64::min(self, other)
  }
}

pub trait ToFloat {
  fn to_f64(self) -> f64;
}

impl ToFloat for f64 {
  fn to_f64(self) -> f64 {
    self
  }
}

impl<T: QuantityBase> ToFloat for T {
  fn to_f64(self) -> f64 {
    self.to_base()
  }
}
