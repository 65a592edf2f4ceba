use std::f64::consts::PI;

use typenum::{P1, Z0};

use crate::unit;
use super::{Unit, Quantity, ISQ, QuantityBase};

pub type Unitless           = Quantity<ISQ<Z0, Z0, Z0>>;
pub type Time               = Quantity<ISQ<P1, Z0, Z0>>;
pub type Length             = Quantity<ISQ<Z0, P1, Z0>>;
pub type Angle              = Quantity<ISQ<Z0, Z0, P1>>;

impl From<f64> for Unitless {
  fn from(value: f64) -> Self {
    Unitless::new::<ratio>(value)
  }
}

impl From<Unitless> for f64 {
  fn from(value: Unitless) -> Self {
    value.to_base()
  }
}

unit!(Unitless, ratio, "", 1.0);

unit!(Time, second, "s", 1.0);
unit!(Time, millisecond, "ms", 1.0e-3);
unit!(Time, microsecond, "us", 1.0e-6);

unit!(Length, meter, "m", 1.0);
unit!(Length, centimeter, "cm", 1e-2);
unit!(Length, millimeter, "mm", 1e-3);
unit!(Length, inch, "in", 0.0254);
unit!(Length, foot, "ft", 0.3048);

unit!(Angle, radian, "rad", 1.0);
unit!(Angle, degree, "deg", PI / 180.0);
unit!(Angle, rotation, "rot", 2.0 * PI);
