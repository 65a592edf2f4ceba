pub mod base;
pub mod motion;
pub mod traits;

pub use base::*;
pub use typenum;

use std::{marker::PhantomData, ops::{Mul, Add, Div, Sub, AddAssign, SubAssign, Neg}, fmt::Debug};

use approx::{RelativeEq, AbsDiffEq};
use num_traits::Zero;

// Only the axes a mechanism controller cares about. Everything else (mass, current, ...)
// lives in the motor controller's native units.
pub trait Dimension : Send + Sync + Unpin {
  type Time: typenum::Integer;
  type Length: typenum::Integer;
  type Angle: typenum::Integer;
}

pub type ISQ<Time, Length, Angle> = dyn Dimension<Time = Time, Length = Length, Angle = Angle>;

pub trait QuantityBase : Sized {
  type Dimension: ?Sized;
  fn new<U: Unit<Self>>(value: f64) -> Self;
  fn from_base(value: f64) -> Self;
  fn to<U: Unit<Self>>(&self) -> f64;
  fn to_base(&self) -> f64;
}

pub trait Unit<Q> {
  const FACTOR_TO_BASE: f64;
  const ABBREVIATION: &'static str;
}

pub struct Quantity<Dim: ?Sized + Dimension> {
  dimension: PhantomData<Dim>,
  base_unit_value: f64
}

impl<Dim: ?Sized + Dimension> Clone for Quantity<Dim> {
  fn clone(&self) -> Self {
    *self
  }
}

impl<Dim: ?Sized + Dimension> Copy for Quantity<Dim> { }

impl<Dim: ?Sized + Dimension> Default for Quantity<Dim> {
  fn default() -> Self {
    Self::zero()
  }
}

impl<Dim: ?Sized + Dimension> QuantityBase for Quantity<Dim> {
  type Dimension = Dim;

  fn new<U: Unit<Self>>(value: f64) -> Self {
    Self::from_base(value * U::FACTOR_TO_BASE)
  }

  fn from_base(value: f64) -> Self {
    Self {
      base_unit_value: value,
      dimension: PhantomData
    }
  }

  fn to<U: Unit<Self>>(&self) -> f64 {
    self.base_unit_value / U::FACTOR_TO_BASE
  }

  fn to_base(&self) -> f64 {
    self.base_unit_value
  }
}

fn format_unit(f: &mut std::fmt::Formatter<'_>, value: isize, abbrev: &str) -> std::fmt::Result {
  if value == 1 { write!(f, " {}", abbrev)?; }
  else if value != 0 { write!(f, " {}^{{{}}}", abbrev, value)?; }
  Ok(())
}

impl<Dim: ?Sized + Dimension> Debug for Quantity<Dim> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.base_unit_value)?;
    format_unit(f, <Dim::Length as typenum::Integer>::to_isize(), "m")?;
    format_unit(f, <Dim::Angle as typenum::Integer>::to_isize(), "rad")?;
    format_unit(f, <Dim::Time as typenum::Integer>::to_isize(), "s")?;
    Ok(())
  }
}

impl<Dim: ?Sized + Dimension> std::fmt::Display for Quantity<Dim> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    <Self as Debug>::fmt(self, f)
  }
}

impl<D: Dimension + ?Sized> Neg for Quantity<D> {
  type Output = Quantity<D>;

  fn neg(self) -> Self::Output {
    Quantity::from_base(-self.base_unit_value)
  }
}

impl<D: Dimension + ?Sized> Mul<f64> for Quantity<D> {
  type Output = Quantity<D>;

  fn mul(self, rhs: f64) -> Self::Output {
    Quantity::from_base(self.base_unit_value * rhs)
  }
}

impl<D: Dimension + ?Sized> Mul<Quantity<D>> for f64 {
  type Output = Quantity<D>;

  fn mul(self, rhs: Quantity<D>) -> Self::Output {
    Quantity::from_base(self * rhs.base_unit_value)
  }
}

impl<D: Dimension + ?Sized> Div<f64> for Quantity<D> {
  type Output = Quantity<D>;

  fn div(self, rhs: f64) -> Self::Output {
    Quantity::from_base(self.base_unit_value / rhs)
  }
}

impl<D: Dimension + ?Sized> Add<Quantity<D>> for Quantity<D> {
  type Output = Quantity<D>;

  fn add(self, rhs: Quantity<D>) -> Self::Output {
    Quantity::from_base(self.base_unit_value + rhs.base_unit_value)
  }
}

impl<D: Dimension + ?Sized> AddAssign<Quantity<D>> for Quantity<D> {
  fn add_assign(&mut self, rhs: Quantity<D>) {
    self.base_unit_value += rhs.base_unit_value
  }
}

impl<D: Dimension + ?Sized> SubAssign<Quantity<D>> for Quantity<D> {
  fn sub_assign(&mut self, rhs: Quantity<D>) {
    self.base_unit_value -= rhs.base_unit_value
  }
}

impl<D: Dimension + ?Sized> Sub<Quantity<D>> for Quantity<D> {
  type Output = Quantity<D>;

  fn sub(self, rhs: Quantity<D>) -> Self::Output {
    Quantity::from_base(self.base_unit_value - rhs.base_unit_value)
  }
}

impl<Dl: Dimension + ?Sized, Dr: Dimension + ?Sized> Mul<Quantity<Dr>> for Quantity<Dl>
where
  Dl::Time: Add<Dr::Time>,
  <Dl::Time as Add<Dr::Time>>::Output: typenum::Integer,
  Dl::Length: Add<Dr::Length>,
  <Dl::Length as Add<Dr::Length>>::Output: typenum::Integer,
  Dl::Angle: Add<Dr::Angle>,
  <Dl::Angle as Add<Dr::Angle>>::Output: typenum::Integer,
{
  type Output = Quantity<
    ISQ<
      <Dl::Time as Add<Dr::Time>>::Output,
      <Dl::Length as Add<Dr::Length>>::Output,
      <Dl::Angle as Add<Dr::Angle>>::Output,
    >
  >;

  fn mul(self, rhs: Quantity<Dr>) -> Self::Output {
    Quantity::from_base(self.base_unit_value * rhs.base_unit_value)
  }
}

impl<Dl: Dimension + ?Sized, Dr: Dimension + ?Sized> Div<Quantity<Dr>> for Quantity<Dl>
where
  Dl::Time: Sub<Dr::Time>,
  <Dl::Time as Sub<Dr::Time>>::Output: typenum::Integer,
  Dl::Length: Sub<Dr::Length>,
  <Dl::Length as Sub<Dr::Length>>::Output: typenum::Integer,
  Dl::Angle: Sub<Dr::Angle>,
  <Dl::Angle as Sub<Dr::Angle>>::Output: typenum::Integer,
{
  type Output = Quantity<
    ISQ<
      <Dl::Time as Sub<Dr::Time>>::Output,
      <Dl::Length as Sub<Dr::Length>>::Output,
      <Dl::Angle as Sub<Dr::Angle>>::Output,
    >
  >;

  fn div(self, rhs: Quantity<Dr>) -> Self::Output {
    Quantity::from_base(self.base_unit_value / rhs.base_unit_value)
  }
}

impl<D: Dimension + ?Sized> PartialEq<Quantity<D>> for Quantity<D> {
  fn eq(&self, other: &Quantity<D>) -> bool {
    self.base_unit_value.eq(&other.base_unit_value)
  }
}

impl<D: Dimension + ?Sized> PartialOrd<Quantity<D>> for Quantity<D> {
  fn partial_cmp(&self, other: &Quantity<D>) -> Option<std::cmp::Ordering> {
    self.base_unit_value.partial_cmp(&other.base_unit_value)
  }
}

impl<D: Dimension + ?Sized> AbsDiffEq<Quantity<D>> for Quantity<D> {
  type Epsilon = Quantity<D>;

  fn default_epsilon() -> Self::Epsilon {
    Quantity::from_base(f64::default_epsilon())
  }

  fn abs_diff_eq(&self, other: &Quantity<D>, epsilon: Self::Epsilon) -> bool {
    self.base_unit_value.abs_diff_eq(&other.base_unit_value, epsilon.base_unit_value)
  }
}

impl<D: Dimension + ?Sized> RelativeEq<Quantity<D>> for Quantity<D> {
  fn default_max_relative() -> Self::Epsilon {
    Quantity::from_base(f64::default_max_relative())
  }

  fn relative_eq(&self, other: &Quantity<D>, epsilon: Self::Epsilon, max_relative: Self::Epsilon) -> bool {
    self.base_unit_value.relative_eq(&other.base_unit_value, epsilon.base_unit_value, max_relative.base_unit_value)
  }
}

impl<D: Dimension + ?Sized> Zero for Quantity<D> {
  fn zero() -> Self {
    Quantity::from_base(f64::zero())
  }

  fn is_zero(&self) -> bool {
    self.base_unit_value.is_zero()
  }
}

#[macro_export]
macro_rules! unit {
  ($qty:path, $name:ident, $abbrev:literal, $factor:expr) => {
    #[allow(non_camel_case_types)]
    pub struct $name;
    impl Unit<$qty> for $name {
      const FACTOR_TO_BASE: f64 = $factor;
      const ABBREVIATION: &'static str = $abbrev;
    }

    impl std::ops::Mul<$name> for f64 {
      type Output = $qty;

      fn mul(self, _rhs: $name) -> Self::Output {
        <$qty>::new::<$name>(self)
      }
    }
  }
}

/// Formats a quantity in the given unit, e.g. `48.5 deg`.
pub fn display_in<Q: QuantityBase, U: Unit<Q>>(quantity: &Q) -> String {
  format!("{} {}", quantity.to::<U>(), U::ABBREVIATION)
}

#[cfg(test)]
mod tests {
  use approx::{assert_relative_eq, assert_abs_diff_eq};

  use crate::{base::*, motion::*, display_in, QuantityBase};

  #[test]
  fn test_derived_dimensions() {
    let vel: Velocity = (3.0 * meter) / (2.0 * second);
    assert_relative_eq!(vel, 1.5 * meters_per_second);

    let swept: Angle = (60.0 * rpm) * (1.0 * second);
    assert_relative_eq!(swept, 360.0 * degree, epsilon = 1e-9 * radian);
  }

  #[test]
  fn test_abs_diff_compares_both_sides() {
    assert_abs_diff_eq!(1.0 * degree, 1.05 * degree, epsilon = 0.1 * degree);
    assert!(!approx::abs_diff_eq!(1.0 * degree, 2.0 * degree, epsilon = 0.1 * degree));
  }

  #[test]
  fn test_display_in() {
    assert_eq!(display_in::<_, meter>(&(1.5 * meter)), "1.5 m");
    assert_relative_eq!((2.0 * meter).to::<centimeter>(), 200.0, epsilon = 1e-9);
  }
}
