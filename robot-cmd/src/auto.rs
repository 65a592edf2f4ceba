//! Autonomous routines: a registry of named command factories, `.auto` routine files in the
//! PathPlanner layout, and the dashboard chooser the drive team picks a routine from.

use std::{collections::BTreeMap, fs, path::Path};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::{
  command::{Command, CommandExt, DeadlineGroup, ParallelGroup, RaceGroup, SequentialGroup, WaitCommand},
  dashboard::{Dashboard, GenericPublisher, GenericSubscriber},
  error::CommandError,
  geometry::Pose2d,
  units::{degree, meter, second},
};

pub const NONE_OPTION: &str = "None";

type CommandFactory = Box<dyn Fn() -> Box<dyn Command>>;

/// Commands an auto routine can refer to by name. Each use builds a fresh instance, so the
/// same name can appear more than once in a routine.
#[derive(Default)]
pub struct NamedCommands {
  factories: BTreeMap<String, CommandFactory>,
}

impl NamedCommands {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn register<F: Fn() -> Box<dyn Command> + 'static>(&mut self, name: &str, factory: F) -> &mut Self {
    self.factories.insert(name.to_owned(), Box::new(factory));
    self
  }

  pub fn contains(&self, name: &str) -> bool {
    self.factories.contains_key(name)
  }

  pub fn names(&self) -> Vec<String> {
    self.factories.keys().cloned().collect()
  }

  pub fn build(&self, name: &str) -> Result<Box<dyn Command>, CommandError> {
    self.factories
      .get(name)
      .map(|f| f())
      .ok_or_else(|| CommandError::UnknownNamedCommand(name.to_owned()))
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum AutoCommandSpec {
  Sequential { commands: Vec<AutoCommandSpec> },
  Parallel { commands: Vec<AutoCommandSpec> },
  /// The first command is the deadline.
  Deadline { commands: Vec<AutoCommandSpec> },
  Race { commands: Vec<AutoCommandSpec> },
  Named { name: String },
  Wait {
    #[serde(rename = "waitTime")]
    wait_time: f64,
  },
  Path {
    #[serde(rename = "pathName")]
    path_name: String,
  },
}

impl AutoCommandSpec {
  pub fn build(&self, auto: &str, named: &NamedCommands) -> Result<Box<dyn Command>, CommandError> {
    let children = |commands: &[AutoCommandSpec]| -> Result<Vec<Box<dyn Command>>, CommandError> {
      commands.iter().map(|c| c.build(auto, named)).collect()
    };

    Ok(match self {
      AutoCommandSpec::Sequential { commands } => SequentialGroup::new(children(commands)?).boxed(),
      AutoCommandSpec::Parallel { commands } => ParallelGroup::new(children(commands)?).boxed(),
      AutoCommandSpec::Race { commands } => RaceGroup::new(children(commands)?).boxed(),
      AutoCommandSpec::Deadline { commands } => {
        let mut built = children(commands)?.into_iter();
        match built.next() {
          Some(deadline) => DeadlineGroup::new(deadline, built.collect()).boxed(),
          None => SequentialGroup::new(vec![]).boxed(),
        }
      },
      AutoCommandSpec::Named { name } => named.build(name)?,
      AutoCommandSpec::Wait { wait_time } => WaitCommand::new(*wait_time * second).boxed(),
      AutoCommandSpec::Path { .. } => {
        return Err(CommandError::UnsupportedAutoCommand { auto: auto.to_owned(), kind: "path".to_owned() })
      },
    })
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
  pub x: f64,
  pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartingPose {
  pub position: Position,
  /// Degrees.
  #[serde(default)]
  pub rotation: f64,
}

impl From<&StartingPose> for Pose2d {
  fn from(value: &StartingPose) -> Self {
    Pose2d::new(value.position.x * meter, value.position.y * meter, value.rotation * degree)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct AutoFile {
  command: AutoCommandSpec,
  #[serde(rename = "startingPose", default)]
  starting_pose: Option<StartingPose>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AutoRoutine {
  pub name: String,
  pub command: AutoCommandSpec,
  pub starting_pose: Option<StartingPose>,
}

impl AutoRoutine {
  pub fn parse(name: &str, json: &str) -> Result<Self, CommandError> {
    let file: AutoFile = serde_json::from_str(json)
      .map_err(|e| CommandError::MalformedAuto { path: name.to_owned(), reason: e.to_string() })?;
    Ok(Self { name: name.to_owned(), command: file.command, starting_pose: file.starting_pose })
  }

  /// Loads `path`, naming the routine after the file stem.
  pub fn load(path: &Path) -> Result<Self, CommandError> {
    let display = path.display().to_string();
    let name = path.file_stem().and_then(|s| s.to_str()).unwrap_or(&display).to_owned();
    let json = fs::read_to_string(path)
      .map_err(|e| CommandError::MalformedAuto { path: display.clone(), reason: e.to_string() })?;
    Self::parse(&name, &json)
      .map_err(|e| match e {
        CommandError::MalformedAuto { reason, .. } => CommandError::MalformedAuto { path: display, reason },
        other => other,
      })
  }

  pub fn starting_pose(&self) -> Option<Pose2d> {
    self.starting_pose.as_ref().map(Pose2d::from)
  }

  pub fn build(&self, named: &NamedCommands) -> Result<Box<dyn Command>, CommandError> {
    let command = self.command.build(&self.name, named)?;
    command.validate()?;
    Ok(command.with_name(&self.name).boxed())
  }
}

/// Every `*.auto` file in `dir`, sorted by name. A missing directory has no routines, and a
/// file that cannot be read or parsed is skipped with a warning.
pub fn load_autos(dir: &Path) -> Result<Vec<AutoRoutine>, CommandError> {
  if !dir.is_dir() {
    warn!("No autos directory at {}", dir.display());
    return Ok(vec![]);
  }

  let entries = fs::read_dir(dir)
    .map_err(|e| CommandError::MalformedAuto { path: dir.display().to_string(), reason: e.to_string() })?;

  let mut routines = vec![];
  for entry in entries.flatten() {
    let path = entry.path();
    if path.extension().and_then(|e| e.to_str()) == Some("auto") {
      match AutoRoutine::load(&path) {
        Ok(routine) => routines.push(routine),
        Err(e) => warn!("Skipping auto: {}", e),
      }
    }
  }
  routines.sort_by(|a, b| a.name.cmp(&b.name));
  Ok(routines)
}

/// The dashboard's auto selector. Publishes `autos/options` and `autos/default`, and reads the
/// drive team's pick back from `autos/selected`.
pub struct AutoChooser {
  dashboard: Dashboard,
  routines: BTreeMap<String, AutoRoutine>,
}

impl AutoChooser {
  /// Offers every routine that builds against `named`. Routines that do not are left out with
  /// a warning.
  pub fn new(dashboard: Dashboard, routines: Vec<AutoRoutine>, named: &NamedCommands) -> Self {
    let mut accepted = BTreeMap::new();
    for routine in routines {
      match routine.build(named) {
        Ok(_) => {
          accepted.insert(routine.name.clone(), routine);
        },
        Err(e) => warn!("Skipping auto {}: {}", routine.name, e),
      }
    }

    let chooser = Self { dashboard, routines: accepted };
    chooser.dashboard.topic("autos/options").publish::<Vec<String>>().set(chooser.options());
    chooser.dashboard.topic("autos/default").publish::<String>().set(NONE_OPTION.to_owned());
    info!("Autos available: {:?}", chooser.options());
    chooser
  }

  pub fn options(&self) -> Vec<String> {
    std::iter::once(NONE_OPTION.to_owned()).chain(self.routines.keys().cloned()).collect()
  }

  /// The selected routine's name, falling back to "None" when nothing valid is selected.
  pub fn selected_name(&self) -> String {
    match self.dashboard.topic("autos/selected").subscribe::<String>().get() {
      Some(name) if self.routines.contains_key(&name) => name,
      Some(name) if name != NONE_OPTION => {
        warn!("Selected auto {} is not available, running none", name);
        NONE_OPTION.to_owned()
      },
      _ => NONE_OPTION.to_owned(),
    }
  }

  pub fn selected(&self) -> Option<&AutoRoutine> {
    self.routines.get(&self.selected_name())
  }
}

#[cfg(test)]
mod tests {
  use std::fs;

  use crate::{
    command::{CommandExt, InstantCommand},
    dashboard::Dashboard,
    error::CommandError,
  };

  use super::{load_autos, AutoChooser, AutoCommandSpec, AutoRoutine, NamedCommands, NONE_OPTION};

  const SHOOT_AND_WAIT: &str = r#"{
    "version": 1.0,
    "startingPose": { "position": { "x": 1.3, "y": 5.55 }, "rotation": 180.0 },
    "command": {
      "type": "sequential",
      "data": {
        "commands": [
          { "type": "named", "data": { "name": "shoot" } },
          { "type": "wait", "data": { "waitTime": 1.5 } }
        ]
      }
    },
    "folder": null,
    "choreoAuto": false
  }"#;

  const WITH_PATH: &str = r#"{
    "command": {
      "type": "sequential",
      "data": { "commands": [ { "type": "path", "data": { "pathName": "Amp Side" } } ] }
    }
  }"#;

  fn named() -> NamedCommands {
    let mut named = NamedCommands::new();
    named.register("shoot", || InstantCommand::new(|| (), &[]).boxed());
    named
  }

  #[test]
  fn test_parse_and_build() {
    let routine = AutoRoutine::parse("Shoot", SHOOT_AND_WAIT).unwrap();
    match &routine.command {
      AutoCommandSpec::Sequential { commands } => assert_eq!(commands.len(), 2),
      other => panic!("unexpected {:?}", other),
    }
    assert!(routine.starting_pose().is_some());

    let command = routine.build(&named()).unwrap();
    assert_eq!(command.name(), "Shoot");
  }

  #[test]
  fn test_unknown_named_and_paths() {
    let routine = AutoRoutine::parse("Shoot", SHOOT_AND_WAIT).unwrap();
    assert_eq!(
      routine.build(&NamedCommands::new()).err(),
      Some(CommandError::UnknownNamedCommand("shoot".to_owned()))
    );

    let routine = AutoRoutine::parse("Path", WITH_PATH).unwrap();
    assert_eq!(
      routine.build(&named()).err(),
      Some(CommandError::UnsupportedAutoCommand { auto: "Path".to_owned(), kind: "path".to_owned() })
    );
  }

  #[test]
  fn test_malformed() {
    assert!(matches!(AutoRoutine::parse("Bad", "{ \"command\": 5 }"), Err(CommandError::MalformedAuto { .. })));
  }

  #[test]
  fn test_load_dir_and_chooser() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("Shoot.auto"), SHOOT_AND_WAIT).unwrap();
    fs::write(dir.path().join("Amp Path.auto"), WITH_PATH).unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let routines = load_autos(dir.path()).unwrap();
    assert_eq!(routines.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(), vec!["Amp Path", "Shoot"]);

    let dashboard = Dashboard::new();
    let chooser = AutoChooser::new(dashboard.clone(), routines, &named());
    assert_eq!(chooser.options(), vec![NONE_OPTION.to_owned(), "Shoot".to_owned()]);
    assert_eq!(dashboard.get_string("autos/default").as_deref(), Some(NONE_OPTION));

    assert_eq!(chooser.selected_name(), NONE_OPTION);
    assert!(chooser.selected().is_none());

    dashboard.put_string("autos/selected", "Shoot");
    assert_eq!(chooser.selected().map(|r| r.name.as_str()), Some("Shoot"));

    dashboard.put_string("autos/selected", "Amp Path");
    assert_eq!(chooser.selected_name(), NONE_OPTION);
  }

  #[test]
  fn test_malformed_file_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("Broken.auto"), "{ not json").unwrap();
    fs::write(dir.path().join("Shoot.auto"), SHOOT_AND_WAIT).unwrap();

    let routines = load_autos(dir.path()).unwrap();
    assert_eq!(routines.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(), vec!["Shoot"]);

    let chooser = AutoChooser::new(Dashboard::new(), routines, &named());
    assert_eq!(chooser.options(), vec![NONE_OPTION.to_owned(), "Shoot".to_owned()]);
  }

  #[test]
  fn test_missing_dir_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_autos(&dir.path().join("autos")).unwrap().is_empty());
  }
}
