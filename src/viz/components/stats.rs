use ratatui::{prelude::*, widgets::*};

use crate::{
    algo::tabular::QTableAgent,
    decay::Decay,
    gym::AlgaeField,
    train::{History, Progress},
};

/// Text panel with the numbers behind the plots
#[derive(Debug, Default, Clone)]
pub struct Stats {
    episode: usize,
    score: usize,
    num_algae: usize,
    steps: usize,
    reward: f64,
    total_reward: f64,
    epsilon: f64,
    alpha: f64,
    position: (f64, f64),
    recent_avg: f64,
    best_score: usize,
    episodes_done: usize,
}

impl Stats {
    pub fn observe<D: Decay>(&mut self, progress: &Progress<'_, AlgaeField, QTableAgent<D>>) {
        let env = progress.env;
        let agent = env.agent();
        self.episode = progress.episode;
        self.score = env.score();
        self.num_algae = env.config().num_algae;
        self.steps = env.steps();
        self.reward = progress.reward;
        self.total_reward = env.total_reward();
        self.epsilon = progress.agent.epsilon();
        self.alpha = progress.agent.alpha();
        self.position = (agent.x, agent.y);
        self.observe_history(progress.history);
    }

    fn observe_history(&mut self, history: &History) {
        // The demo runs against an empty history; keep the training figures
        if history.is_empty() {
            return;
        }
        self.recent_avg = history.recent_mean_score(10);
        self.best_score = history.best_score();
        self.episodes_done = history.len();
    }

    fn lines(&self) -> Vec<Line<'static>> {
        let row = |label: &str, value: String| {
            Line::from(vec![
                Span::raw(format!("{label:<22}")),
                Span::from(value).light_cyan(),
            ])
        };
        let heading = |text: &'static str| Line::from(text.bold());

        vec![
            heading("Episode"),
            row("Episode", self.episode.to_string()),
            row("Current Score", format!("{}/{}", self.score, self.num_algae)),
            row("Steps", self.steps.to_string()),
            row("Current Reward", format!("{:.3}", self.reward)),
            row("Total Episode Reward", format!("{:.1}", self.total_reward)),
            Line::default(),
            heading("Agent Parameters"),
            row("Epsilon", format!("{:.4}", self.epsilon)),
            row("Learning Rate", self.alpha.to_string()),
            row(
                "Position",
                format!("({:.1}, {:.1})", self.position.0, self.position.1),
            ),
            Line::default(),
            heading("Performance"),
            row("Recent Avg (10 eps)", format!("{:.2}", self.recent_avg)),
            row("Best Score", self.best_score.to_string()),
            row("Total Episodes", self.episodes_done.to_string()),
        ]
    }
}

impl Widget for &Stats {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.lines())
            .block(
                Block::bordered()
                    .border_type(BorderType::Rounded)
                    .padding(Padding::horizontal(1))
                    .title("Training Statistics"),
            )
            .render(area, buf);
    }
}
