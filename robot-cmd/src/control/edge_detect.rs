#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
  Rising,
  Falling,
}

/// Turns a sampled boolean into edges. The first sample primes the detector without
/// producing an edge, so a button already held at startup does not fire.
#[derive(Debug, Clone, Default)]
pub struct EdgeDetector {
  last: Option<bool>,
}

impl EdgeDetector {
  pub fn new() -> Self {
    Self { last: None }
  }

  pub fn primed(value: bool) -> Self {
    Self { last: Some(value) }
  }

  pub fn last(&self) -> Option<bool> {
    self.last
  }

  pub fn update(&mut self, value: bool) -> Option<Edge> {
    let edge = match (self.last, value) {
      (Some(false), true) => Some(Edge::Rising),
      (Some(true), false) => Some(Edge::Falling),
      _ => None
    };
    self.last = Some(value);
    edge
  }
}
