use std::{
    ops::ControlFlow,
    time::{Duration, Instant},
};

use crossterm::event::{self, Event, KeyCode};
use log::LevelFilter;
use ratatui::{prelude::*, widgets::*};

use super::{
    components::{help, Component, Field, Logs, Plots, Stats},
    tui::{self, RestoreGuard, Tui},
    util::event_keycode,
};
use crate::{
    algo::tabular::QTableAgent,
    decay::Decay,
    error::Result,
    gym::AlgaeField,
    train::{Observer, Phase, Progress},
};

const TABS: [&str; 2] = ["Training", "Logs"];

/// Configuration for the [`Visualizer`]
#[derive(Debug, Clone, PartialEq)]
pub struct VizConfig {
    /// Time spent handling input after each observed step
    ///
    /// **Default**: `16ms`
    pub frame_delay: Duration,
    /// How long the final frame of a demo episode stays up
    ///
    /// **Default**: `1.5s`
    pub demo_hold: Duration,
    /// Number of recent positions drawn behind the agent during training
    ///
    /// **Default**: `15`
    pub trail_len: usize,
}

impl Default for VizConfig {
    fn default() -> Self {
        Self {
            frame_delay: Duration::from_millis(16),
            demo_hold: Duration::from_millis(1500),
            trail_len: 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    Run,
    Prompt(String),
    Quit,
}

/// Dashboard state and layout
struct App {
    mode: Mode,
    selected_tab: usize,
    show_help: bool,
    phase: Phase,
    episode: usize,
    total_episodes: usize,
    field: Field,
    plots: Plots,
    stats: Stats,
    logs: Logs,
}

impl App {
    fn new(total_episodes: usize, trail_len: usize) -> Self {
        Self {
            mode: Mode::Run,
            selected_tab: 0,
            show_help: false,
            phase: Phase::Train,
            episode: 0,
            total_episodes,
            field: Field::new(trail_len),
            plots: Plots::new(total_episodes),
            stats: Stats::default(),
            logs: Logs::default(),
        }
    }

    fn handle_event(&mut self, event: &Event) {
        let Some(key) = event_keycode(event) else {
            return;
        };

        match key {
            KeyCode::Char('q') => self.mode = Mode::Quit,
            KeyCode::Char('h') => self.show_help = !self.show_help,
            KeyCode::Tab => self.selected_tab = (self.selected_tab + 1) % TABS.len(),
            KeyCode::Enter if matches!(self.mode, Mode::Prompt(_)) => self.mode = Mode::Run,
            _ if self.selected_tab == 1 => self.logs.handle_ui_event(event),
            _ => {}
        }
    }

    fn observe<D: Decay>(&mut self, progress: &Progress<'_, AlgaeField, QTableAgent<D>>) {
        self.phase = progress.phase;
        self.episode = progress.episode;
        self.total_episodes = progress.total_episodes;
        self.stats.observe(progress);
        if progress.phase == Phase::Train {
            self.plots.update(progress.history);
        }
    }

    fn progress_ratio(&self) -> f64 {
        if self.total_episodes == 0 {
            return 0.0;
        }
        (self.episode as f64 / self.total_episodes as f64).clamp(0.0, 1.0)
    }

    fn render_training(&self, area: Rect, buf: &mut Buffer) {
        let [field_area, charts_area] =
            Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)])
                .areas(area);
        let [top, bottom] = Layout::vertical([Constraint::Fill(1); 2]).areas(charts_area);
        let [score_area, exploration_area] =
            Layout::horizontal([Constraint::Fill(1); 2]).areas(top);
        let [reward_area, stats_area] = Layout::horizontal([Constraint::Fill(1); 2]).areas(bottom);

        self.field.render(field_area, buf);
        self.plots.score.render(score_area, buf);
        self.plots.exploration.render(exploration_area, buf);
        self.plots.reward.render(reward_area, buf);
        self.stats.render(stats_area, buf);
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Layout
        let [menu_area, main_area, progress_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(3),
        ])
        .areas(area);

        // Menu
        Tabs::new(TABS)
            .block(Block::default().padding(Padding::uniform(1)))
            .white()
            .bold()
            .highlight_style(Style::default().light_green())
            .select(self.selected_tab)
            .render(menu_area, buf);

        // Main
        match self.selected_tab {
            0 => self.render_training(main_area, buf),
            _ => self.logs.render_ref(main_area, buf),
        }

        // Progress Bar
        let label = match self.phase {
            Phase::Train => "Episode",
            Phase::Demo => "Demo",
        };
        Gauge::default()
            .block(
                Block::bordered()
                    .border_type(BorderType::Rounded)
                    .title("Progress"),
            )
            .gauge_style(Color::Cyan)
            .label(format!("{label} {}/{}", self.episode, self.total_episodes))
            .ratio(self.progress_ratio())
            .render(progress_area, buf);

        // Popups
        if self.show_help {
            help::render_help(area, buf, self.selected_tab);
        }
        if let Mode::Prompt(message) = &self.mode {
            help::render_prompt(area, buf, message);
        }
    }
}

/// Live dashboard that watches training and demo runs of a [`QTableAgent`] on an [`AlgaeField`]
///
/// The dashboard owns the terminal from [`init`](Visualizer::init) until
/// [`restore`](Visualizer::restore), or until it is dropped, and installs
/// `tui-logger` as the global logger, so every `log` record shows up in the
/// Logs tab. Pressing `q` makes the next observer callback return
/// [`ControlFlow::Break`].
pub struct Visualizer {
    guard: RestoreGuard,
    terminal: Tui,
    app: App,
    config: VizConfig,
}

impl Visualizer {
    pub fn init(total_episodes: usize, config: VizConfig) -> Result<Self> {
        tui_logger::init_logger(LevelFilter::Trace)?;
        tui_logger::set_default_level(LevelFilter::Trace);
        let guard = RestoreGuard::new();
        let terminal = tui::init()?;

        Ok(Self {
            guard,
            terminal,
            app: App::new(total_episodes, config.trail_len),
            config,
        })
    }

    /// Whether the user pressed `q`
    pub fn quit_requested(&self) -> bool {
        self.app.mode == Mode::Quit
    }

    /// Show `message` over the dashboard until the user presses Enter
    ///
    /// **Returns** `false` if the user quit instead
    pub fn prompt(&mut self, message: &str) -> Result<bool> {
        if self.quit_requested() {
            return Ok(false);
        }

        self.app.mode = Mode::Prompt(message.to_owned());
        while matches!(self.app.mode, Mode::Prompt(_)) {
            self.draw()?;
            self.pump(self.config.frame_delay)?;
        }
        Ok(!self.quit_requested())
    }

    /// Give the terminal back to the shell
    pub fn restore(mut self) -> Result<()> {
        self.guard.restore()?;
        Ok(())
    }

    fn draw(&mut self) -> Result<()> {
        let app = &self.app;
        self.terminal
            .draw(|frame| frame.render_widget(app, frame.size()))?;
        Ok(())
    }

    /// Handle input until `timeout` has passed or the user quits
    fn pump(&mut self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if !event::poll(remaining)? {
                return Ok(());
            }

            let event = event::read()?;
            self.app.handle_event(&event);
            self.draw()?;
            if self.quit_requested() {
                return Ok(());
            }
        }
    }

    fn frame(&mut self, delay: Duration) -> Result<ControlFlow<()>> {
        self.draw()?;
        self.pump(delay)?;
        if self.quit_requested() {
            Ok(ControlFlow::Break(()))
        } else {
            Ok(ControlFlow::Continue(()))
        }
    }
}

impl<D: Decay> Observer<AlgaeField, QTableAgent<D>> for Visualizer {
    fn on_episode_start(
        &mut self,
        progress: Progress<'_, AlgaeField, QTableAgent<D>>,
    ) -> Result<ControlFlow<()>> {
        self.app
            .field
            .observe(progress.env, progress.phase, progress.episode);
        self.app.observe(&progress);
        Ok(ControlFlow::Continue(()))
    }

    fn on_step(
        &mut self,
        progress: Progress<'_, AlgaeField, QTableAgent<D>>,
    ) -> Result<ControlFlow<()>> {
        self.app
            .field
            .observe(progress.env, progress.phase, progress.episode);
        self.app.observe(&progress);
        self.frame(self.config.frame_delay)
    }

    fn on_episode_end(
        &mut self,
        progress: Progress<'_, AlgaeField, QTableAgent<D>>,
    ) -> Result<ControlFlow<()>> {
        self.app.observe(&progress);
        let hold = match progress.phase {
            Phase::Train => Duration::ZERO,
            Phase::Demo => {
                self.app.field.finish();
                self.config.demo_hold
            }
        };
        self.frame(hold)
    }
}
