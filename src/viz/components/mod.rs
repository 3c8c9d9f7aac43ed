pub mod field;
pub mod help;
pub mod log;
pub mod plot;
pub mod stats;

use crossterm::event::Event;
use ratatui::widgets::WidgetRef;

pub use field::Field;
pub use log::Logs;
pub use plot::Plots;
pub use stats::Stats;

/// A widget that reacts to terminal input
pub trait Component: WidgetRef {
    /// Update from a terminal event; keys the component has no use for are ignored
    fn handle_ui_event(&mut self, event: &Event);
}
