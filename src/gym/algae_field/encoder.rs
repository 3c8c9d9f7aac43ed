//! Discretization of the agent's view of its nearest target into a bounded state index

use super::Point;

/// Number of bins for the distance to the nearest algae
pub const DISTANCE_BINS: usize = 8;

/// Number of bins for each component of the direction to the nearest algae
pub const DIRECTION_BINS: usize = 5;

/// Size of the encoded state space
pub const NUM_STATES: usize = DISTANCE_BINS * DIRECTION_BINS * DIRECTION_BINS;

/// Fraction of the field diagonal that maps onto the full distance range
const REACH: f64 = 0.7;

/// State reported when no algae remains: farthest distance bin, centred direction bins
pub const NO_TARGET_STATE: usize = (DISTANCE_BINS - 1) * DIRECTION_BINS * DIRECTION_BINS
    + (DIRECTION_BINS / 2) * DIRECTION_BINS
    + DIRECTION_BINS / 2;

/// Distance and unit direction from the agent to a target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bearing {
    pub distance: f64,
    pub dx: f64,
    pub dy: f64,
}

impl Bearing {
    /// Bearing of a target that does not exist
    pub const NONE: Self = Self {
        distance: f64::INFINITY,
        dx: 0.0,
        dy: 0.0,
    };

    /// Bearing from `from` to `to`; a zero distance has a zero direction
    pub fn towards(from: Point, to: Point) -> Self {
        let distance = from.distance(to);
        if distance == 0.0 {
            return Self {
                distance,
                dx: 0.0,
                dy: 0.0,
            };
        }
        Self {
            distance,
            dx: (to.x - from.x) / distance,
            dy: (to.y - from.y) / distance,
        }
    }
}

/// Encode a bearing on a field with the given diagonal into `0..NUM_STATES`
///
/// `state = distance_bin * 25 + dx_bin * 5 + dy_bin`
pub fn encode(bearing: &Bearing, diagonal: f64) -> usize {
    let normalized = (bearing.distance / (diagonal * REACH)).clamp(0.0, 1.0);
    let distance_bin = bin(normalized * (DISTANCE_BINS - 1) as f64, DISTANCE_BINS);
    let dx_bin = direction_bin(bearing.dx);
    let dy_bin = direction_bin(bearing.dy);

    let state = distance_bin * DIRECTION_BINS * DIRECTION_BINS + dx_bin * DIRECTION_BINS + dy_bin;
    state.min(NUM_STATES - 1)
}

/// Maps a direction component in `[-1, 1]` onto `0..DIRECTION_BINS`
fn direction_bin(component: f64) -> usize {
    bin((component + 1.0) * 2.0, DIRECTION_BINS)
}

/// Floors `x` into `0..bins`; NaN lands in bin 0
fn bin(x: f64, bins: usize) -> usize {
    (x.floor().clamp(0.0, (bins - 1) as f64)) as usize
}
