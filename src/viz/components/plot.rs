use ratatui::{prelude::*, symbols::Marker, widgets::*};

use crate::{train::History, viz::util::{axis_labels, padded_bounds}};

/// A per-episode time series with an optional trailing moving average
pub struct Plot {
    title: &'static str,
    y_title: &'static str,
    color: Color,
    precision: usize,
    trend_window: Option<usize>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    data: Vec<(f64, f64)>,
    trend: Vec<(f64, f64)>,
}

impl Plot {
    pub fn new(title: &'static str, y_title: &'static str, color: Color) -> Self {
        Self {
            title,
            y_title,
            color,
            precision: 2,
            trend_window: None,
            x_bounds: [f64::MAX, f64::MIN],
            y_bounds: [f64::MAX, f64::MIN],
            data: Vec::new(),
            trend: Vec::new(),
        }
    }

    /// Provide initial x bounds
    pub fn with_x_bounds(mut self, x_bounds: [f64; 2]) -> Self {
        self.x_bounds = x_bounds;
        self
    }

    /// Overlay a moving average over the last `window` points once there are more than `window` of them
    pub fn with_trend(mut self, window: usize) -> Self {
        self.trend_window = Some(window.max(1));
        self
    }

    /// Decimal places of the y axis labels
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    pub fn update(&mut self, point: (f64, f64)) {
        self.x_bounds[0] = self.x_bounds[0].min(point.0);
        self.x_bounds[1] = self.x_bounds[1].max(point.0);
        self.y_bounds[0] = self.y_bounds[0].min(point.1);
        self.y_bounds[1] = self.y_bounds[1].max(point.1);
        self.data.push(point);

        if let Some(window) = self.trend_window {
            let recent = &self.data[self.data.len().saturating_sub(window)..];
            let mean = recent.iter().map(|p| p.1).sum::<f64>() / recent.len() as f64;
            self.trend.push((point.0, mean));
        }
    }

    fn show_trend(&self) -> bool {
        self.trend_window.is_some_and(|w| self.data.len() > w)
    }
}

impl Widget for &Plot {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut datasets = vec![Dataset::default()
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(self.color))
            .data(&self.data)];

        if self.show_trend() {
            datasets.push(
                Dataset::default()
                    .name("Moving Avg")
                    .marker(Marker::Braille)
                    .graph_type(GraphType::Line)
                    .light_red()
                    .data(&self.trend),
            );
        }

        let x_bounds = padded_bounds(self.x_bounds);
        let y_bounds = padded_bounds(self.y_bounds);

        let x_axis = Axis::default()
            .title("Episode")
            .dark_gray()
            .labels(axis_labels(x_bounds, 0))
            .bounds(x_bounds);

        let y_axis = Axis::default()
            .title(self.y_title)
            .dark_gray()
            .labels(axis_labels(y_bounds, self.precision))
            .bounds(y_bounds);

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .title(self.title);

        Chart::new(datasets)
            .block(block)
            .x_axis(x_axis)
            .y_axis(y_axis)
            .render(area, buf);
    }
}

/// The three training curves
pub struct Plots {
    pub score: Plot,
    pub exploration: Plot,
    pub reward: Plot,
}

impl Plots {
    pub fn new(episodes: usize) -> Self {
        let x_bounds = [0.0, episodes as f64];
        Self {
            score: Plot::new("Score per Episode", "Algae Eaten", Color::Cyan)
                .with_x_bounds(x_bounds)
                .with_trend(20)
                .with_precision(1),
            exploration: Plot::new("Exploration Rate", "Epsilon", Color::LightGreen)
                .with_x_bounds(x_bounds)
                .with_precision(3),
            reward: Plot::new("Average Reward per Episode", "Avg Reward", Color::Magenta)
                .with_x_bounds(x_bounds)
                .with_trend(10),
        }
    }

    /// Append any episodes of `history` not plotted yet
    pub fn update(&mut self, history: &History) {
        for i in self.score.len()..history.len() {
            let episode = (i + 1) as f64;
            self.score.update((episode, history.scores()[i] as f64));
            self.exploration.update((episode, history.exploration()[i]));
            self.reward.update((episode, history.avg_rewards()[i]));
        }
    }
}
