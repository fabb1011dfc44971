//! App: terminal init, frame loop and key handling.

use crate::GameConfig;
use crate::game::GameState;
use crate::host::{Banner, FramePoll, FrameScheduler, Scoreboard, TerminalFrames};
use crate::input::{Command, key_to_command};
use crate::session::Session;
use crate::theme::Theme;
use crate::ui::{self, BannerFx, View};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};
use tracing::info;

pub struct App {
    config: GameConfig,
    theme: Theme,
    session: Session<Banner, Scoreboard>,
    frames: TerminalFrames,
    banner_fx: BannerFx,
}

impl App {
    pub fn new(config: GameConfig, theme: Theme) -> Self {
        let state = GameState::new(&config.engine);
        let session = Session::new(state, Banner::default(), Scoreboard::default());
        let frames = TerminalFrames::new(config.frame_rate);
        Self {
            config,
            theme,
            session,
            frames,
            banner_fx: BannerFx::default(),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;
        terminal.hide_cursor()?;

        info!(
            width = self.config.engine.width,
            height = self.config.engine.height,
            drop_interval_ms = self.config.engine.drop_interval.as_millis() as u64,
            "session started"
        );
        let result = self.run_loop(&mut terminal);

        // Restore
        let _ = terminal.show_cursor();
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        let board = self.session.display();
        info!(score = board.score, best = board.best, "session ended");
        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            match self.frames.poll_frame() {
                FramePoll::Cancelled => return Ok(()),
                FramePoll::Ready(timestamp) => {
                    self.session.frame(timestamp);
                    self.draw(terminal)?;
                }
                FramePoll::Pending(wait) => self.handle_input(wait)?,
            }
        }
    }

    fn draw(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let now = Instant::now();
        let view = View {
            state: self.session.state(),
            scoreboard: self.session.display(),
            banner: self.session.notifier(),
            theme: &self.theme,
            paused: self.session.is_paused(),
        };
        let banner_fx = &mut self.banner_fx;
        terminal.draw(|f| ui::draw(f, &view, banner_fx, now))?;
        Ok(())
    }

    /// Wait up to `wait` for key presses and apply every one that is queued.
    fn handle_input(&mut self, wait: Duration) -> Result<()> {
        if !event::poll(wait)? {
            return Ok(());
        }
        while event::poll(Duration::ZERO)? {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            // One command per press; ignore repeats and releases.
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key_to_command(key) {
                Command::Quit => {
                    self.frames.cancel();
                    return Ok(());
                }
                Command::None => {}
                command => self.session.command(command),
            }
        }
        Ok(())
    }
}
