use std::{marker::PhantomData, sync::Arc};

use dashmap::DashMap;
use log::debug;
use serde::Serialize;

use crate::{command::{Command, CommandExt, CommandRef}, error::CommandError, scheduler::CommandScheduler};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DashboardValue {
  Number(f64),
  Boolean(bool),
  String(String),
  NumberArray(Vec<f64>),
  StringArray(Vec<String>),
}

pub trait Value : Sized {
  fn to_value(self) -> DashboardValue;
  fn from_value(value: &DashboardValue) -> Option<Self>;
}

macro_rules! dashboard_value {
  ($ty:ty, $variant:ident) => {
    impl Value for $ty {
      fn to_value(self) -> DashboardValue {
        DashboardValue::$variant(self)
      }

      fn from_value(value: &DashboardValue) -> Option<Self> {
        match value {
          DashboardValue::$variant(v) => Some(v.clone()),
          _ => None
        }
      }
    }
  }
}

dashboard_value!(f64, Number);
dashboard_value!(bool, Boolean);
dashboard_value!(String, String);
dashboard_value!(Vec<f64>, NumberArray);
dashboard_value!(Vec<String>, StringArray);

/// Key/value telemetry registry. Clones share the same table.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
  entries: Arc<DashMap<String, DashboardValue>>,
}

impl Dashboard {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn topic(&self, name: &str) -> Topic {
    Topic { dashboard: self.clone(), name: name.to_owned() }
  }

  pub fn get(&self, name: &str) -> Option<DashboardValue> {
    self.entries.get(name).map(|v| v.value().clone())
  }

  pub fn get_number(&self, name: &str) -> Option<f64> {
    self.topic(name).subscribe::<f64>().get()
  }

  pub fn get_bool(&self, name: &str) -> Option<bool> {
    self.topic(name).subscribe::<bool>().get()
  }

  pub fn get_string(&self, name: &str) -> Option<String> {
    self.topic(name).subscribe::<String>().get()
  }

  pub fn put_number(&self, name: &str, value: f64) {
    self.topic(name).publish::<f64>().set(value)
  }

  pub fn put_string(&self, name: &str, value: &str) {
    self.topic(name).publish::<String>().set(value.to_owned())
  }

  pub fn keys(&self) -> Vec<String> {
    let mut keys: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
    keys.sort();
    keys
  }

  /// The whole table as JSON, for dumping at the end of a simulated match.
  pub fn snapshot(&self) -> serde_json::Value {
    let map: serde_json::Map<String, serde_json::Value> = self.entries
      .iter()
      .map(|e| (e.key().clone(), serde_json::to_value(e.value()).unwrap_or(serde_json::Value::Null)))
      .collect();
    serde_json::Value::Object(map)
  }
}

pub trait GenericPublisher<V> {
  fn set(&self, v: V);
}

pub trait GenericSubscriber<V> {
  fn get(&self) -> Option<V>;
}

#[derive(Debug, Clone)]
pub struct Topic {
  dashboard: Dashboard,
  name: String,
}

impl Topic {
  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn exists(&self) -> bool {
    self.dashboard.entries.contains_key(&self.name)
  }

  pub fn publish<V: Value>(&self) -> Publisher<V> {
    Publisher { topic: self.clone(), value_t: PhantomData }
  }

  pub fn subscribe<V: Value>(&self) -> Subscriber<V> {
    Subscriber { topic: self.clone(), value_t: PhantomData }
  }

  pub fn child(&self, name: &str) -> Topic {
    self.dashboard.topic(&format!("{}/{}", self.name, name))
  }
}

pub struct Publisher<V: Value> {
  topic: Topic,
  value_t: PhantomData<V>,
}

impl<V: Value> GenericPublisher<V> for Publisher<V> {
  fn set(&self, v: V) {
    self.topic.dashboard.entries.insert(self.topic.name.clone(), v.to_value());
  }
}

pub struct Subscriber<V: Value> {
  topic: Topic,
  value_t: PhantomData<V>,
}

impl<V: Value> GenericSubscriber<V> for Subscriber<V> {
  /// None if the topic is unset or holds a value of another type.
  fn get(&self) -> Option<V> {
    self.topic.dashboard.entries.get(&self.topic.name).and_then(|v| V::from_value(v.value()))
  }
}

/// Operator-triggerable commands shown on the dashboard as buttons.
pub struct CommandButtons {
  dashboard: Dashboard,
  commands: Vec<(String, CommandRef)>,
}

impl CommandButtons {
  pub fn new(dashboard: Dashboard) -> Self {
    Self { dashboard, commands: vec![] }
  }

  pub fn put<C: Command + 'static>(&mut self, name: &str, command: C) {
    self.put_ref(name, command.into_ref())
  }

  pub fn put_ref(&mut self, name: &str, command: CommandRef) {
    self.commands.retain(|(n, _)| n != name);
    self.commands.push((name.to_owned(), command));
    self.dashboard.topic(name).child("running").publish::<bool>().set(false);
    self.dashboard.topic("commands").publish::<Vec<String>>().set(self.names());
  }

  pub fn names(&self) -> Vec<String> {
    self.commands.iter().map(|(n, _)| n.clone()).collect()
  }

  pub fn get(&self, name: &str) -> Result<CommandRef, CommandError> {
    self.commands
      .iter()
      .find(|(n, _)| n == name)
      .map(|(_, c)| c.clone())
      .ok_or_else(|| CommandError::UnknownDashboardCommand(name.to_owned()))
  }

  /// Schedules the named command, as if its dashboard button was clicked.
  pub fn press(&self, name: &str, scheduler: &mut CommandScheduler) -> Result<bool, CommandError> {
    let command = self.get(name)?;
    debug!("Dashboard button {} pressed", name);
    Ok(scheduler.schedule(&command))
  }

  pub fn publish_running(&self, scheduler: &CommandScheduler) {
    for (name, command) in &self.commands {
      self.dashboard.topic(name).child("running").publish::<bool>().set(scheduler.is_scheduled(command));
    }
  }
}
