pub mod arm;
pub mod climber;
pub mod feeder;
pub mod intake;
pub mod lights;
pub mod shooter;
pub mod swerve;

pub use arm::Arm;
pub use climber::Climber;
pub use feeder::{FeedMode, Feeder};
pub use intake::Intake;
pub use lights::Lights;
pub use shooter::Shooter;
pub use swerve::Swerve;
