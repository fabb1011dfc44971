//! Session: owns the game state, turns frames and commands into state changes and
//! forwards the resulting events to the notifier and score display.

use crate::game::{GameEvent, GameState};
use crate::host::{Notifier, ScoreDisplay};
use crate::input::Command;
use crate::piece::Rotation;
use std::time::Duration;
use tracing::debug;

pub const GAME_OVER_MESSAGE: &str = "Game Over!";

pub struct Session<N, D> {
    state: GameState,
    notifier: N,
    display: D,
    last_frame: Duration,
    paused: bool,
}

impl<N: Notifier, D: ScoreDisplay> Session<N, D> {
    pub fn new(state: GameState, notifier: N, mut display: D) -> Self {
        display.show_score(state.score, state.lines);
        Self {
            state,
            notifier,
            display,
            last_frame: Duration::ZERO,
            paused: false,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// One animation frame at `timestamp` (monotonic, from the scheduler). Gravity
    /// only accumulates while unpaused.
    pub fn frame(&mut self, timestamp: Duration) {
        let delta = timestamp.saturating_sub(self.last_frame);
        self.last_frame = timestamp;
        if !self.paused {
            self.state.advance(delta);
        }
        self.flush();
    }

    /// Apply one input command. `Quit` and `None` are left to the host.
    pub fn command(&mut self, command: Command) {
        if command == Command::Pause {
            self.paused = !self.paused;
            debug!(paused = self.paused, "pause toggled");
            return;
        }
        if self.paused {
            return;
        }
        match command {
            Command::MoveLeft => {
                self.state.move_piece(-1);
            }
            Command::MoveRight => {
                self.state.move_piece(1);
            }
            Command::SoftDrop => {
                self.state.drop();
            }
            Command::RotateCw => {
                self.state.rotate(Rotation::Clockwise);
            }
            Command::RotateCcw => {
                self.state.rotate(Rotation::CounterClockwise);
            }
            Command::Pause | Command::Quit | Command::None => {}
        }
        self.flush();
    }

    fn flush(&mut self) {
        for event in self.state.take_events() {
            match event {
                GameEvent::Scored {
                    lines,
                    points,
                    score,
                    total_lines,
                } => {
                    debug!(lines, points, score, total_lines, "clearing pass");
                    self.display.show_score(score, total_lines);
                }
                GameEvent::GameOver { final_score, lines } => {
                    debug!(final_score, lines, "notifying game over");
                    self.display.show_score(self.state.score, self.state.lines);
                    self.notifier.notify(GAME_OVER_MESSAGE);
                }
            }
        }
    }
}
