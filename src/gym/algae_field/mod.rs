use std::f64::consts::FRAC_1_SQRT_2;

use rand::{thread_rng, Rng};
use strum::{EnumIter, FromRepr, VariantArray};

use crate::{
    env::{DiscreteSpace, Environment, Report},
    error::{Error, Result},
};

pub mod encoder;

pub use encoder::{Bearing, NO_TARGET_STATE, NUM_STATES};

/// Closest the agent may get to any edge of the field
pub const MARGIN: f64 = 3.0;
/// Closest to an edge that the agent and algae are spawned on reset
pub const SPAWN_MARGIN: f64 = 10.0;
/// Algae strictly closer than this to the agent is eaten
pub const EAT_RADIUS: f64 = 5.0;
/// Reward per algae eaten
pub const EAT_REWARD: f64 = 100.0;
/// Weight of the distance improvement towards the nearest algae
pub const SHAPING_FACTOR: f64 = 0.5;
/// Flat penalty for every step that eats nothing
pub const STEP_PENALTY: f64 = 0.1;
/// The episode ends once the step count exceeds this
pub const MAX_STEPS: usize = 300;

/// A position on the field
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Movement directions at 45° increments, clockwise from north (y grows northwards)
#[derive(EnumIter, VariantArray, FromRepr, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Heading {
    North = 0,
    NorthEast = 1,
    East = 2,
    SouthEast = 3,
    South = 4,
    SouthWest = 5,
    West = 6,
    NorthWest = 7,
}

impl Heading {
    /// Displacement for one step at `speed`; every heading moves the same distance
    pub fn velocity(self, speed: f64) -> (f64, f64) {
        let d = speed * FRAC_1_SQRT_2;
        match self {
            Heading::North => (0.0, speed),
            Heading::NorthEast => (d, d),
            Heading::East => (speed, 0.0),
            Heading::SouthEast => (d, -d),
            Heading::South => (0.0, -speed),
            Heading::SouthWest => (-d, -d),
            Heading::West => (-speed, 0.0),
            Heading::NorthWest => (-d, d),
        }
    }
}

/// Configuration for the [`AlgaeField`]
#[derive(Debug, Clone, PartialEq)]
pub struct AlgaeFieldConfig {
    /// **Default**: `100.0`
    pub width: f64,
    /// **Default**: `100.0`
    pub height: f64,
    /// Algae spawned on every reset
    ///
    /// **Default**: `8`
    pub num_algae: usize,
    /// Distance covered by one step
    ///
    /// **Default**: `3.0`
    pub max_speed: f64,
}

impl Default for AlgaeFieldConfig {
    fn default() -> Self {
        Self {
            width: 100.0,
            height: 100.0,
            num_algae: 8,
            max_speed: 3.0,
        }
    }
}

impl AlgaeFieldConfig {
    fn validate(&self) -> Result<()> {
        let min_side = 2.0 * SPAWN_MARGIN;
        let sides_ok = [self.width, self.height]
            .iter()
            .all(|side| side.is_finite() && *side > min_side);
        if !sides_ok {
            return Err(Error::Field(format!(
                "width and height must exceed {min_side}, got {}x{}",
                self.width, self.height
            )));
        }
        if self.num_algae == 0 {
            return Err(Error::Field(String::from("num_algae must be at least 1")));
        }
        if !(self.max_speed.is_finite() && self.max_speed > 0.0) {
            return Err(Error::Field(format!(
                "max_speed must be positive, got {}",
                self.max_speed
            )));
        }
        Ok(())
    }
}

/// The algae nearest to the agent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest {
    /// Index into [`AlgaeField::algae`]
    pub index: usize,
    pub position: Point,
    pub bearing: Bearing,
}

/// A bounded 2-D field where an agent swims around eating algae
///
/// The agent picks one of 8 [headings](Heading) per step. Eating algae pays
/// [`EAT_REWARD`]; otherwise the reward is shaped by how much closer the agent
/// got to the nearest algae, minus [`STEP_PENALTY`]. An episode ends when the
/// field is cleared or after [`MAX_STEPS`] steps.
///
/// States are the nearest-algae [`Bearing`] [encoded](encoder::encode) into
/// `0..NUM_STATES`, actions are heading indices `0..8`.
#[derive(Debug, Clone)]
pub struct AlgaeField {
    config: AlgaeFieldConfig,
    agent: Point,
    algae: Vec<Point>,
    score: usize,
    steps: usize,
    total_reward: f64,
}

impl AlgaeField {
    /// Create a field and start its first episode
    pub fn new(config: AlgaeFieldConfig) -> Result<Self> {
        config.validate()?;
        let mut field = Self {
            agent: Point::new(config.width / 2.0, config.height / 2.0),
            algae: Vec::with_capacity(config.num_algae),
            config,
            score: 0,
            steps: 0,
            total_reward: 0.0,
        };
        field.reset();
        Ok(field)
    }

    /// Start an episode from a fixed layout
    ///
    /// The agent is clamped into the field's margin. **Returns** the encoded state
    pub fn place(&mut self, agent: Point, algae: Vec<Point>) -> usize {
        self.agent = self.clamp(agent);
        self.algae = algae;
        self.clear_counters();
        self.state()
    }

    pub fn config(&self) -> &AlgaeFieldConfig {
        &self.config
    }

    pub fn agent(&self) -> Point {
        self.agent
    }

    pub fn algae(&self) -> &[Point] {
        &self.algae
    }

    /// Algae eaten this episode
    pub fn score(&self) -> usize {
        self.score
    }

    /// Steps taken this episode
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Reward accumulated this episode
    pub fn total_reward(&self) -> f64 {
        self.total_reward
    }

    pub fn diagonal(&self) -> f64 {
        self.config.width.hypot(self.config.height)
    }

    /// The nearest algae, with the lowest index winning ties
    pub fn nearest(&self) -> Option<Nearest> {
        let mut nearest: Option<Nearest> = None;
        for (index, &position) in self.algae.iter().enumerate() {
            let bearing = Bearing::towards(self.agent, position);
            if nearest.map_or(true, |n| bearing.distance < n.bearing.distance) {
                nearest = Some(Nearest {
                    index,
                    position,
                    bearing,
                });
            }
        }
        nearest
    }

    /// Encoded state of the current layout, [`NO_TARGET_STATE`] once the field is empty
    pub fn state(&self) -> usize {
        let bearing = self.nearest().map_or(Bearing::NONE, |n| n.bearing);
        encoder::encode(&bearing, self.diagonal())
    }

    fn clamp(&self, p: Point) -> Point {
        Point::new(
            p.x.clamp(MARGIN, self.config.width - MARGIN),
            p.y.clamp(MARGIN, self.config.height - MARGIN),
        )
    }

    fn clear_counters(&mut self) {
        self.score = 0;
        self.steps = 0;
        self.total_reward = 0.0;
    }

    fn spawn_point(&self, rng: &mut impl Rng) -> Point {
        Point::new(
            rng.gen_range(SPAWN_MARGIN..self.config.width - SPAWN_MARGIN),
            rng.gen_range(SPAWN_MARGIN..self.config.height - SPAWN_MARGIN),
        )
    }
}

impl Environment for AlgaeField {
    type State = usize;
    type Action = usize;

    fn reset(&mut self) -> Self::State {
        let mut rng = thread_rng();
        self.agent = self.spawn_point(&mut rng);
        self.algae = (0..self.config.num_algae)
            .map(|_| self.spawn_point(&mut rng))
            .collect();
        self.clear_counters();
        log::trace!(
            "Field reset with agent at ({:.1}, {:.1})",
            self.agent.x,
            self.agent.y
        );
        self.state()
    }

    /// **Panics** if `action` is not a valid [`Heading`] index
    fn step(&mut self, action: Self::Action) -> (Self::State, f64, bool) {
        assert!(action < Heading::VARIANTS.len(), "Invalid action: {}", action);
        let (dx, dy) = Heading::VARIANTS[action].velocity(self.config.max_speed);

        let prev_distance = self.nearest().map(|n| n.bearing.distance);

        self.agent = self.clamp(Point::new(self.agent.x + dx, self.agent.y + dy));

        let agent = self.agent;
        let before = self.algae.len();
        self.algae.retain(|&a| agent.distance(a) >= EAT_RADIUS);
        let eaten = before - self.algae.len();

        let mut reward = eaten as f64 * EAT_REWARD;
        self.score += eaten;

        if eaten == 0 {
            if let (Some(prev), Some(nearest)) = (prev_distance, self.nearest()) {
                reward += (prev - nearest.bearing.distance) * SHAPING_FACTOR;
                reward -= STEP_PENALTY;
            }
        }

        self.steps += 1;
        self.total_reward += reward;

        let done = self.algae.is_empty() || self.steps > MAX_STEPS;
        (self.state(), reward, done)
    }

    fn report(&self) -> Report {
        Report {
            score: self.score,
            steps: self.steps,
            total_reward: self.total_reward,
        }
    }
}

impl DiscreteSpace for AlgaeField {
    fn num_states(&self) -> usize {
        NUM_STATES
    }

    fn num_actions(&self) -> usize {
        Heading::VARIANTS.len()
    }
}
