use crate::error::{Error, Result};

/// A hyperparameter that decays one tick at a time
pub trait Decay {
    /// Value before any decay has been applied
    fn start(&self) -> f64;

    /// Value following `current` after one tick
    ///
    /// Implementations must never return more than `current` for any `current`
    /// at or above their floor
    fn next(&self, current: f64) -> f64;
}

fn validate(rate: f64, vi: f64, vf: f64) -> Result<()> {
    if !(rate > 0.0 && rate <= 1.0) {
        return Err(Error::Decay("`rate` must be in the interval (0, 1]"));
    }
    if !(0.0..=1.0).contains(&vi) || !(0.0..=1.0).contains(&vf) {
        return Err(Error::Decay("`vi` and `vf` must be in the interval [0, 1]"));
    }
    if vi < vf {
        return Err(Error::Decay("`vi` must not be less than `vf`"));
    }
    Ok(())
}

/// A constant value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constant {
    value: f64,
}

impl Constant {
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

impl Decay for Constant {
    fn start(&self) -> f64 {
        self.value
    }

    fn next(&self, _current: f64) -> f64 {
        self.value
    }
}

/// v<sub>t+1</sub> = max(v<sub>t</sub> * r, v<sub>f</sub>), starting from v<sub>i</sub>
#[derive(Debug, Clone, PartialEq)]
pub struct Geometric {
    rate: f64,
    vi: f64,
    vf: f64,
}

impl Geometric {
    /// **Errors** unless `0 < rate <= 1` and `0 <= vf <= vi <= 1`
    pub fn new(rate: f64, vi: f64, vf: f64) -> Result<Self> {
        validate(rate, vi, vf)?;
        Ok(Self { rate, vi, vf })
    }

    /// The floor the value never decays below
    pub fn floor(&self) -> f64 {
        self.vf
    }
}

impl Default for Geometric {
    fn default() -> Self {
        Self {
            rate: 0.996,
            vi: 0.9,
            vf: 0.05,
        }
    }
}

impl Decay for Geometric {
    fn start(&self) -> f64 {
        self.vi
    }

    fn next(&self, current: f64) -> f64 {
        (current * self.rate).max(self.vf)
    }
}
