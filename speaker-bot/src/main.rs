use std::{path::PathBuf, rc::Rc};

use clap::Parser;
use log::{debug, info};
use robot_cmd::{
  dashboard::Dashboard,
  ds::MatchScript,
  hardware::{FileFlash, FlashStore, MemoryFlash},
  robot_main,
  start::{periodic_loop, RobotResult, RobotState},
  units::second,
};
use speaker_bot::{config::RobotConfig, container::RobotContainer, robot::Robot};

/// Runs the robot program against simulated hardware through a scripted match.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
  /// JSON config file. Defaults apply to anything it leaves out
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Directory of .auto routines, overriding the config
  #[arg(long)]
  autos: Option<PathBuf>,

  /// Directory to burn motor parameters to, overriding the config
  #[arg(long)]
  flash: Option<PathBuf>,

  /// Auto routine to select on the dashboard
  #[arg(short, long)]
  auto: Option<String>,

  /// Seconds spent disabled before autonomous
  #[arg(long, default_value_t = 1.0)]
  disabled: f64,

  /// Seconds of autonomous
  #[arg(long, default_value_t = 15.0)]
  autonomous: f64,

  /// Seconds of teleop
  #[arg(long, default_value_t = 135.0)]
  teleop: f64,

  /// Pace the loop to the wall clock instead of running as fast as possible
  #[arg(short, long)]
  realtime: bool,
}

async fn robot(state: RobotState) -> RobotResult {
  let args = Args::parse();

  let mut config = match &args.config {
    Some(path) => RobotConfig::load(path)?,
    None => RobotConfig::default(),
  };
  if let Some(autos) = args.autos {
    config.autos_dir = autos;
  }
  if let Some(flash) = args.flash {
    config.flash_dir = Some(flash);
  }

  let flash: Rc<dyn FlashStore> = match &config.flash_dir {
    Some(dir) => Rc::new(FileFlash::new(dir)),
    None => Rc::new(MemoryFlash::new()),
  };

  let dashboard = Dashboard::new();
  if let Some(auto) = &args.auto {
    dashboard.put_string("autos/selected", auto);
  }

  let period = config.period();
  let mut robot = Robot::new(RobotContainer::new(config, flash, dashboard.clone())?);
  let script = MatchScript::new(args.disabled * second, args.autonomous * second, args.teleop * second);

  let stopper = state.clone();
  periodic_loop(&state, period, args.realtime, |now| {
    match script.state_at(now) {
      Some(ds) => robot.tick(&ds, now)?,
      None => {
        info!("Match over");
        stopper.stop();
      },
    }
    Ok(())
  }).await?;

  debug!("Dashboard: {}", dashboard.snapshot());
  Ok(())
}

robot_main!(async robot);
