/// Agents that keep an explicit value per state-action pair
pub mod tabular;
