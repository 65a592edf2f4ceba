use std::f64::consts::PI;

use typenum::{N1, P1, Z0};

use super::{Unit, Quantity, ISQ, QuantityBase};
use crate::unit;

pub type Velocity             = Quantity<ISQ<N1, P1, Z0>>;
pub type AngularVelocity      = Quantity<ISQ<N1, Z0, P1>>;

unit!(Velocity, meters_per_second, "m/s", 1.0);
unit!(Velocity, feet_per_second, "ft/s", 0.3048);

unit!(AngularVelocity, rads_per_second, "rad/s", 1.0);
unit!(AngularVelocity, degrees_per_second, "deg/s", PI / 180.0);
unit!(AngularVelocity, rpm, "rpm", 2.0 * PI / 60.0);
