//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use crate::piece::PieceKind;
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Piece colours and UI colours, optionally loaded from a theme file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// One colour per piece kind, in `PieceKind::ALL` order (I, J, L, O, S, T, Z).
    pub pieces: [Color; 7],
    /// Board background.
    pub bg: Color,
    /// Borders.
    pub border: Color,
    /// Text (score, lines).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

/// Theme file keys for the piece colours, in `PieceKind::ALL` order.
const PIECE_KEYS: [&str; 7] = [
    "piece_i", "piece_j", "piece_l", "piece_o", "piece_s", "piece_t", "piece_z",
];

const DEFAULT_PIECES: [Color; 7] = [
    Color::Rgb(0x56, 0xB6, 0xC2), // I cyan
    Color::Rgb(0x61, 0xAF, 0xEF), // J blue
    Color::Rgb(0xD1, 0x9A, 0x66), // L orange
    Color::Rgb(0xE5, 0xC0, 0x7B), // O yellow
    Color::Rgb(0x98, 0xC3, 0x79), // S green
    Color::Rgb(0xC6, 0x78, 0xDD), // T magenta
    Color::Rgb(0xE0, 0x6C, 0x75), // Z red
];

impl Default for Theme {
    fn default() -> Self {
        Self {
            pieces: DEFAULT_PIECES,
            bg: Color::Rgb(0x28, 0x2C, 0x34),
            border: Color::Rgb(0x3F, 0x44, 0x4F),
            main_fg: Color::Rgb(0xAB, 0xB2, 0xBF),
            title: Color::Rgb(0xE5, 0xC0, 0x7B),
        }
    }
}

impl Theme {
    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Defaults when `path` is None or missing; keys that are absent or invalid keep
    /// their default colour.
    pub fn load(path: Option<&Path>) -> Result<Self, ThemeError> {
        let path = match path {
            Some(p) if p.exists() => p,
            _ => return Ok(Self::default()),
        };
        let s = std::fs::read_to_string(path)?;
        Ok(Self::from_map(&parse_theme_file(&s)))
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let defaults = Self::default();
        let get = |key: &str, fallback: Color| {
            map.get(key)
                .and_then(|v| parse_hex(v).ok())
                .unwrap_or(fallback)
        };
        let mut pieces = defaults.pieces;
        for (color, key) in pieces.iter_mut().zip(PIECE_KEYS) {
            *color = get(key, *color);
        }
        Self {
            pieces,
            bg: get("bg", defaults.bg),
            border: get("border", defaults.border),
            main_fg: get("main_fg", defaults.main_fg),
            title: get("title", defaults.title),
        }
    }

    #[inline]
    pub fn piece_color(&self, kind: PieceKind) -> Color {
        self.pieces[kind.color_index()]
    }

    /// Colour for a board cell value; `None` for empty or unknown cells.
    pub fn cell_color(&self, value: u8) -> Option<Color> {
        PieceKind::from_cell_value(value).map(|kind| self.piece_color(kind))
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(stripped) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some(end) = stripped.find(']') else {
            continue;
        };
        let key = stripped[..end].trim();
        let rest = stripped[end + 1..].trim();
        if let Some(value) = rest.strip_prefix('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if !value.is_empty() {
                map.insert(key.to_string(), value.to_string());
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let channel = |digits: &str| {
        u8::from_str_radix(digits, 16).map_err(|_| ThemeError::InvalidHex(s.to_string()))
    };
    let (r, g, b) = match s.len() {
        6 if s.is_ascii() => (channel(&s[0..2])?, channel(&s[2..4])?, channel(&s[4..6])?),
        3 if s.is_ascii() => (
            channel(&s[0..1])? * 17,
            channel(&s[1..2])? * 17,
            channel(&s[2..3])? * 17,
        ),
        _ => return Err(ThemeError::InvalidHex(s.to_string())),
    };
    Ok(Color::Rgb(r, g, b))
}
