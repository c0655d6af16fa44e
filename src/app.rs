//! App: terminal init, main loop, tick and key handling.

use crate::Args;
use crate::input::{Action, key_to_action};
use crate::ui::{self, Shading, View};
use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use passivetris::{Rgb, SimConfig, Simulation, Tick};
use ratatui::DefaultTerminal;
use ratatui::layout::Rect;
use ratatui::style::Color;
use std::time::{Duration, Instant};
use tachyonfx::Effect;

/// Slowest accepted frame rate; anything lower is raised to this.
const MIN_FRAME_RATE: f64 = 0.1;
const DEFAULT_FRAME_RATE: f64 = 60.0;

/// Time per frame for `rate` frames per second. Non-finite or non-positive rates fall back to
/// the default.
fn frame_duration(rate: f64) -> Duration {
    let rate = if rate.is_finite() && rate > 0.0 {
        rate.max(MIN_FRAME_RATE)
    } else {
        DEFAULT_FRAME_RATE
    };
    Duration::from_secs_f64(1.0 / rate)
}

pub struct App {
    args: Args,
    sim: Simulation,
    view: View,
    frame_duration: Duration,
    /// Terminal size last used to size the board.
    area: Rect,
    /// TachyonFX fade played after the board starts over.
    reset_effect: Option<Effect>,
    /// Last time we processed the reset effect (for delta).
    reset_effect_process_time: Option<Instant>,
}

impl App {
    pub fn new(args: Args, config: SimConfig, background: Option<Rgb>) -> Result<Self> {
        let sim = Simulation::new(config).context("invalid simulation options")?;
        log::info!(
            "seed {} time step {} ms",
            sim.seed(),
            sim.time_step().as_millis()
        );
        let frame_duration = frame_duration(args.frame_rate);
        let view = View {
            background: background.map_or(Color::Reset, |Rgb(r, g, b)| Color::Rgb(r, g, b)),
            shading: Shading {
                outer: args.outer.clamp(0.0, 1.0),
                middle: args.middle.clamp(0.0, 1.0),
            },
        };
        Ok(Self {
            args,
            sim,
            view,
            frame_duration,
            area: Rect::default(),
            reset_effect: None,
            reset_effect_process_time: None,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode, size},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal = DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let result = size()
            .context("reading terminal size")
            .and_then(|(cols, rows)| self.resize(cols, rows))
            .and_then(|()| self.run_loop(&mut terminal));

        // Restore
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    /// Size the board to the terminal. Starts a new board.
    fn resize(&mut self, cols: u16, rows: u16) -> Result<()> {
        self.area = Rect::new(0, 0, cols, rows);
        let (px_w, px_h) = ui::surface_size(ui::board_area(self.area));
        let dims = self
            .sim
            .resize(px_w, px_h)
            .with_context(|| format!("sizing board for a {cols}x{rows} terminal"))?;
        log::info!("terminal {cols}x{rows}, board {}x{}", dims.width, dims.height);
        self.restarted()
    }

    /// Common follow-up whenever a fresh board appears.
    fn restarted(&mut self) -> Result<()> {
        if self.args.prefill {
            self.sim.randomly_fill()?;
        }
        self.reset_effect = Some(ui::reset_fade(self.area, &self.view));
        self.reset_effect_process_time = None;
        Ok(())
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            let now = Instant::now();
            if self.sim.advance(now)? == Tick::Reset {
                self.restarted()?;
            }

            terminal.draw(|f| {
                ui::draw(
                    f,
                    &self.sim,
                    &self.view,
                    &mut self.reset_effect,
                    &mut self.reset_effect_process_time,
                    now,
                );
            })?;

            if self.reset_effect.as_ref().is_some_and(Effect::done) {
                self.reset_effect = None;
            }

            let timeout = self.frame_duration.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    match event::read()? {
                        Event::Key(key) if key.kind == KeyEventKind::Press => match key_to_action(key) {
                            Action::Quit => return Ok(()),
                            Action::Reset => {
                                self.sim.reset()?;
                                self.restarted()?;
                            }
                            Action::Fill => self.sim.randomly_fill()?,
                            Action::None => {}
                        },
                        Event::Resize(cols, rows) => self.resize(cols, rows)?,
                        _ => {}
                    }
                }
            }
        }
    }
}
