/// Learning agent interface
pub mod agent;

/// Implemented RL algorithms
pub mod algo;

/// Implementations of strategies for decaying hyperparameters
pub mod decay;

/// Data structures
pub mod ds;

/// Environment
pub mod env;

/// Crate error type
pub mod error;

/// Transitions
pub mod exp;

/// Exploration policies
pub mod exploration;

/// Training environments
pub mod gym;

/// Training and demo loops
pub mod train;

/// Live training dashboard
#[cfg(feature = "viz")]
pub mod viz;

mod util;

pub use error::{Error, Result};
