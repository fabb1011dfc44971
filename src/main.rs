//! arenatris — classic falling-block puzzle game in the terminal.

mod app;
mod board;
mod game;
mod host;
mod input;
mod piece;
mod session;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use game::EngineConfig;
use piece::PieceKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::Level;

/// Largest board side accepted on the command line; keeps terminal coordinates in range.
pub const MAX_BOARD_SIDE: usize = 256;

/// Validated settings for one run: engine rules plus host timing.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub engine: EngineConfig,
    pub frame_rate: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("board must be at least {min} columns wide to fit every piece, got {got}")]
    TooNarrow { min: usize, got: usize },
    #[error("board must be at least {min} rows tall to fit every piece, got {got}")]
    TooShort { min: usize, got: usize },
    #[error("board must be at most {max} columns wide, got {got}")]
    TooWide { max: usize, got: usize },
    #[error("board must be at most {max} rows tall, got {got}")]
    TooTall { max: usize, got: usize },
    #[error("drop interval must be greater than zero")]
    ZeroDropInterval,
    #[error("frame rate must be a positive number, got {0}")]
    InvalidFrameRate(f64),
}

impl GameConfig {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let widest = PieceKind::ALL
            .iter()
            .map(|k| k.shape().width())
            .max()
            .unwrap_or(0);
        let tallest = PieceKind::ALL
            .iter()
            .map(|k| k.shape().height())
            .max()
            .unwrap_or(0);
        let width = usize::from(args.width);
        let height = usize::from(args.height);
        if width < widest {
            return Err(ConfigError::TooNarrow { min: widest, got: width });
        }
        if height < tallest {
            return Err(ConfigError::TooShort { min: tallest, got: height });
        }
        if width > MAX_BOARD_SIDE {
            return Err(ConfigError::TooWide { max: MAX_BOARD_SIDE, got: width });
        }
        if height > MAX_BOARD_SIDE {
            return Err(ConfigError::TooTall { max: MAX_BOARD_SIDE, got: height });
        }
        if args.drop_interval_ms == 0 {
            return Err(ConfigError::ZeroDropInterval);
        }
        if !(args.frame_rate.is_finite() && args.frame_rate > 0.0) {
            return Err(ConfigError::InvalidFrameRate(args.frame_rate));
        }
        Ok(Self {
            engine: EngineConfig {
                width,
                height,
                drop_interval: Duration::from_millis(args.drop_interval_ms),
                allow_repeats: args.allow_repeats,
                seed: args.seed,
            },
            frame_rate: args.frame_rate,
        })
    }
}

/// Log to a file only: the game owns the terminal while it runs.
fn init_logging(path: &Path, level: Level) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_target(false)
        .with_writer(std::sync::Mutex::new(file))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = args.log_file.as_deref() {
        init_logging(path, args.log_level)?;
    }
    let config = GameConfig::from_args(&args)?;
    let theme = theme::Theme::load(args.theme.as_deref()).unwrap_or_default();
    tracing::info!(?config, "starting");
    let mut app = App::new(config, theme);
    app.run()?;
    Ok(())
}

/// Classic falling-block puzzle game in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "arenatris",
    version,
    about = "Classic falling-block puzzle in the terminal. Fill rows edge to edge to clear them.",
    long_about = "arenatris is a terminal take on the classic falling-block puzzle.\n\n\
        Pieces fall one row per drop interval. Complete a horizontal row to clear it: \
        1/2/3/4 rows at once score 40/100/300/1200. If a new piece has no room to spawn \
        the board and score are reset and play continues.\n\n\
        CONTROLS:\n  Left/Right or h/l  Move     Down or j   Drop\n  \
        Up, k or x         Rotate   z or u      Rotate counter-clockwise\n  \
        p                  Pause    q / Esc     Quit"
)]
pub struct Args {
    /// Board width in columns.
    #[arg(long, default_value = "12", value_name = "COLS")]
    pub width: u16,

    /// Board height in rows.
    #[arg(long, default_value = "20", value_name = "ROWS")]
    pub height: u16,

    /// Gravity: milliseconds between automatic drops.
    #[arg(long, default_value = "1000", value_name = "MS")]
    pub drop_interval_ms: u64,

    /// Target render frames per second.
    #[arg(long, default_value = "60.0", value_name = "RATE")]
    pub frame_rate: f64,

    /// Seed for the piece sequence (random when omitted).
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Allow the same piece twice in a row.
    #[arg(long)]
    pub allow_repeats: bool,

    /// Path to theme file (btop-style theme[key]="value"; keys piece_i..piece_z, bg, border, main_fg, title).
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Write logs to this file.
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log level for --log-file (error, warn, info, debug, trace).
    #[arg(long, default_value = "info", value_name = "LEVEL")]
    pub log_level: Level,
}
