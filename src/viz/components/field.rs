use ratatui::{
    prelude::*,
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Circle, Line as Segment},
        *,
    },
};

use crate::{
    ds::RingBuffer,
    gym::{algae_field::EAT_RADIUS, AlgaeField, Point},
    train::Phase,
};

/// Snapshot of the field drawn on a canvas
///
/// During training only the last few agent positions are kept as a trail; a
/// demo episode keeps its whole path from the reset position, and marks its
/// start and, once finished, its end.
pub struct Field {
    width: f64,
    height: f64,
    num_algae: usize,
    agent: Point,
    algae: Vec<Point>,
    target: Option<(Point, f64)>,
    score: usize,
    steps: usize,
    phase: Phase,
    episode: usize,
    trail: RingBuffer<Point>,
    path: Vec<Point>,
    finished: bool,
}

impl Field {
    pub fn new(trail_len: usize) -> Self {
        Self {
            width: 100.0,
            height: 100.0,
            num_algae: 0,
            agent: Point::default(),
            algae: Vec::new(),
            target: None,
            score: 0,
            steps: 0,
            phase: Phase::Train,
            episode: 0,
            trail: RingBuffer::new(trail_len),
            path: Vec::new(),
            finished: false,
        }
    }

    /// Copy the current layout of `env` and extend the agent's track
    pub fn observe(&mut self, env: &AlgaeField, phase: Phase, episode: usize) {
        if phase != self.phase || episode != self.episode {
            self.trail.clear();
            self.path.clear();
            self.phase = phase;
            self.episode = episode;
            self.finished = false;
        }

        let config = env.config();
        self.width = config.width;
        self.height = config.height;
        self.num_algae = config.num_algae;
        self.agent = env.agent();
        self.algae.clear();
        self.algae.extend_from_slice(env.algae());
        self.target = env.nearest().map(|n| (n.position, n.bearing.distance));
        self.score = env.score();
        self.steps = env.steps();

        match phase {
            Phase::Train => {
                self.trail.push(self.agent);
            }
            Phase::Demo => self.path.push(self.agent),
        }
    }

    /// Mark the current episode as over
    pub fn finish(&mut self) {
        self.finished = true;
    }

    fn track(&self) -> Vec<Point> {
        match self.phase {
            Phase::Train => self.trail.iter().copied().collect(),
            Phase::Demo => self.path.clone(),
        }
    }

    fn title(&self) -> String {
        let label = match self.phase {
            Phase::Train => "Episode",
            Phase::Demo => "Demo Episode",
        };
        let target = self
            .target
            .map(|(_, d)| format!(" | Target d={d:.1}"))
            .unwrap_or_default();
        format!(
            " {label} {} | Score: {}/{} | Steps: {}{target} ",
            self.episode, self.score, self.num_algae, self.steps
        )
    }
}

impl Widget for &Field {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let track = self.track();

        Canvas::default()
            .block(
                Block::bordered()
                    .border_type(BorderType::Rounded)
                    .title(self.title()),
            )
            .marker(Marker::Braille)
            .x_bounds([0.0, self.width])
            .y_bounds([0.0, self.height])
            .paint(|ctx| {
                for pair in track.windows(2) {
                    ctx.draw(&Segment {
                        x1: pair[0].x,
                        y1: pair[0].y,
                        x2: pair[1].x,
                        y2: pair[1].y,
                        color: Color::Blue,
                    });
                }
                if let Some((target, _)) = self.target {
                    ctx.draw(&Segment {
                        x1: self.agent.x,
                        y1: self.agent.y,
                        x2: target.x,
                        y2: target.y,
                        color: Color::Red,
                    });
                }
                ctx.draw(&Circle {
                    x: self.agent.x,
                    y: self.agent.y,
                    radius: EAT_RADIUS,
                    color: Color::DarkGray,
                });
                ctx.layer();

                for algae in &self.algae {
                    ctx.print(algae.x, algae.y, "●".green());
                }
                if self.phase == Phase::Demo {
                    if let Some(start) = self.path.first() {
                        ctx.print(start.x, start.y, "■".light_blue().bold());
                    }
                }
                if self.phase == Phase::Demo && self.finished {
                    ctx.print(self.agent.x, self.agent.y, "✖".light_red().bold());
                } else {
                    ctx.print(self.agent.x, self.agent.y, "■".red().bold());
                }
            })
            .render(area, buf);
    }
}
