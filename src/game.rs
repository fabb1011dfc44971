//! Game state: board, active piece, spawn, movement, drop, rotation with wall kick, gravity.

use crate::board::{Board, Position, line_clear_points};
use crate::piece::{PieceKind, Rotation, Shape};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tracing::{debug, info};

/// Default board width in cells.
pub const BOARD_WIDTH: usize = 12;
/// Default board height in cells.
pub const BOARD_HEIGHT: usize = 20;
/// Default gravity: one drop per second.
pub const DROP_INTERVAL: Duration = Duration::from_millis(1000);

/// Engine settings; built from CLI args in `main.rs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub width: usize,
    pub height: usize,
    pub drop_interval: Duration,
    /// Skip the "never the same kind twice in a row" reroll.
    pub allow_repeats: bool,
    /// Fixed seed for a reproducible piece sequence; entropy when `None`.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: BOARD_WIDTH,
            height: BOARD_HEIGHT,
            drop_interval: DROP_INTERVAL,
            allow_repeats: false,
            seed: None,
        }
    }
}

/// The falling piece: its kind, current rotation and top-left board position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub kind: PieceKind,
    pub shape: Shape,
    pub pos: Position,
}

impl Player {
    /// Canonical orientation at the top row, horizontally centred.
    pub fn spawn(kind: PieceKind, board_width: usize) -> Self {
        let shape = kind.shape();
        let x = (board_width / 2) as i32 - (shape.width() / 2) as i32;
        Self {
            kind,
            shape,
            pos: Position::new(x, 0),
        }
    }
}

/// Things the outside world should hear about, drained by the session after each step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// A piece locked and the board was scanned; `lines` may be zero.
    /// `score` and `total_lines` are the running totals after this pass.
    Scored {
        lines: u32,
        points: u32,
        score: u32,
        total_lines: u32,
    },
    /// A new piece collided at spawn; board and score have already been reset.
    GameOver { final_score: u32, lines: u32 },
}

/// Game state: board, active piece, score and gravity accumulator.
#[derive(Debug)]
pub struct GameState {
    pub board: Board,
    pub player: Player,
    pub score: u32,
    /// Rows cleared since the last game over.
    pub lines: u32,
    last_kind: Option<PieceKind>,
    drop_counter: Duration,
    drop_interval: Duration,
    allow_repeats: bool,
    rng: StdRng,
    events: Vec<GameEvent>,
}

/// Uniform pick from the catalog, rerolling while it matches `last` unless repeats are allowed.
fn choose_kind(rng: &mut StdRng, last: Option<PieceKind>, allow_repeats: bool) -> PieceKind {
    loop {
        let kind = PieceKind::ALL[rng.gen_range(0..PieceKind::ALL.len())];
        if allow_repeats || Some(kind) != last {
            return kind;
        }
    }
}

impl GameState {
    /// Empty board with the first piece already spawned.
    pub fn new(config: &EngineConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let kind = choose_kind(&mut rng, None, config.allow_repeats);
        debug!(kind = %kind.name(), "first piece");
        Self {
            board: Board::new(config.width, config.height),
            player: Player::spawn(kind, config.width),
            score: 0,
            lines: 0,
            last_kind: Some(kind),
            drop_counter: Duration::ZERO,
            drop_interval: config.drop_interval,
            allow_repeats: config.allow_repeats,
            rng,
            events: Vec::new(),
        }
    }

    pub fn drop_interval(&self) -> Duration {
        self.drop_interval
    }

    /// Time accumulated towards the next gravity drop.
    pub fn drop_counter(&self) -> Duration {
        self.drop_counter
    }

    /// Take the events produced since the last call.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// True if the active piece overlaps the board or its bounds.
    pub fn player_collides(&self) -> bool {
        self.board.collides(&self.player.shape, self.player.pos)
    }

    /// Replace the active piece with a fresh random one. If it collides straight
    /// away the board is full: wipe it, reset the score and report game over.
    /// Returns true on game over.
    pub fn spawn(&mut self) -> bool {
        let kind = choose_kind(&mut self.rng, self.last_kind, self.allow_repeats);
        self.last_kind = Some(kind);
        self.player = Player::spawn(kind, self.board.width);
        debug!(kind = %kind.name(), x = self.player.pos.x, "spawn");

        if !self.player_collides() {
            return false;
        }
        let final_score = self.score;
        let lines = self.lines;
        self.board.clear();
        self.score = 0;
        self.lines = 0;
        info!(final_score, lines, "game over, board reset");
        self.events.push(GameEvent::GameOver { final_score, lines });
        true
    }

    /// Shift the active piece `dir` columns; reverted if it would collide.
    pub fn move_piece(&mut self, dir: i32) -> bool {
        self.player.pos.x += dir;
        if self.player_collides() {
            self.player.pos.x -= dir;
            return false;
        }
        true
    }

    /// One gravity step. On landing the piece is merged, full rows are cleared and
    /// scored, and the next piece spawns. Resets the gravity accumulator either way.
    /// Returns true if the piece locked.
    pub fn drop(&mut self) -> bool {
        self.drop_counter = Duration::ZERO;
        self.player.pos.y += 1;
        if !self.player_collides() {
            return false;
        }
        self.player.pos.y -= 1;
        self.board.merge(&self.player.shape, self.player.pos);
        self.sweep();
        self.spawn();
        true
    }

    fn sweep(&mut self) {
        let lines = self.board.clear_lines();
        let points = line_clear_points(lines);
        self.score = self.score.saturating_add(points);
        self.lines = self.lines.saturating_add(lines);
        if lines > 0 {
            info!(lines, points, score = self.score, "lines cleared");
        }
        self.events.push(GameEvent::Scored {
            lines,
            points,
            score: self.score,
            total_lines: self.lines,
        });
    }

    /// Rotate the active piece a quarter turn. If the new orientation collides,
    /// probe horizontal offsets +1, -1, +2, -2, ... until one fits; give up and
    /// restore the piece once the probe step exceeds the shape width.
    /// Returns true if the rotation was kept.
    pub fn rotate(&mut self, rotation: Rotation) -> bool {
        let original_x = self.player.pos.x;
        self.player.shape = self.player.shape.rotated(rotation);
        let width = self.player.shape.width() as i32;
        let mut offset = 1i32;
        while self.player_collides() {
            self.player.pos.x += offset;
            offset = -(offset + offset.signum());
            if offset > width {
                self.player.shape = self.player.shape.rotated(rotation.inverse());
                self.player.pos.x = original_x;
                return false;
            }
        }
        true
    }

    /// Add frame time to the gravity accumulator; drop once it passes the interval.
    /// Returns true if a drop happened.
    pub fn advance(&mut self, delta: Duration) -> bool {
        self.drop_counter = self.drop_counter.saturating_add(delta);
        if self.drop_counter > self.drop_interval {
            self.drop();
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn seeded(seed: u64) -> GameState {
        GameState::new(&EngineConfig {
            seed: Some(seed),
            ..EngineConfig::default()
        })
    }

    fn with_piece(kind: PieceKind) -> GameState {
        let mut state = seeded(7);
        state.player = Player::spawn(kind, state.board.width);
        state
    }

    fn assert_dims(state: &GameState) {
        assert_eq!(state.board.rows().count(), BOARD_HEIGHT);
        assert!(state.board.rows().all(|r| r.len() == BOARD_WIDTH));
    }

    #[test]
    fn spawn_centres_piece_on_top_row() {
        let o = Player::spawn(PieceKind::O, 12);
        assert_eq!(o.pos, Position::new(5, 0));
        let i = Player::spawn(PieceKind::I, 12);
        assert_eq!(i.pos, Position::new(4, 0));
        let t = Player::spawn(PieceKind::T, 12);
        assert_eq!(t.pos, Position::new(5, 0));
    }

    #[test]
    fn new_game_starts_empty_with_a_piece() {
        let state = seeded(1);
        assert!(state.board.is_empty());
        assert_eq!(state.score, 0);
        assert_eq!(state.player.pos.y, 0);
        assert!(!state.player_collides());
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = seeded(42);
        let mut b = seeded(42);
        for _ in 0..20 {
            assert_eq!(a.player.kind, b.player.kind);
            a.spawn();
            b.spawn();
        }
    }

    #[test]
    fn consecutive_spawns_never_repeat_a_kind() {
        let mut state = seeded(3);
        let mut previous = state.player.kind;
        for _ in 0..500 {
            state.spawn();
            assert_ne!(state.player.kind, previous);
            previous = state.player.kind;
        }
    }

    #[test]
    fn allow_repeats_can_repeat() {
        let mut state = GameState::new(&EngineConfig {
            seed: Some(3),
            allow_repeats: true,
            ..EngineConfig::default()
        });
        let mut previous = state.player.kind;
        let mut repeated = false;
        for _ in 0..500 {
            state.spawn();
            repeated |= state.player.kind == previous;
            previous = state.player.kind;
        }
        assert!(repeated);
    }

    #[test]
    fn move_round_trip_restores_position() {
        let mut state = with_piece(PieceKind::T);
        let start = state.player.pos;
        assert!(state.move_piece(-1));
        assert!(state.move_piece(1));
        assert_eq!(state.player.pos, start);
        assert!(state.move_piece(1));
        assert!(state.move_piece(-1));
        assert_eq!(state.player.pos, start);
    }

    #[test]
    fn move_into_wall_is_a_no_op() {
        let mut state = with_piece(PieceKind::O);
        while state.move_piece(-1) {}
        assert_eq!(state.player.pos.x, 0);
        assert!(!state.move_piece(-1));
        assert_eq!(state.player.pos.x, 0);
        while state.move_piece(1) {}
        assert_eq!(state.player.pos.x, 10);
    }

    #[test]
    fn o_piece_lands_at_the_bottom_and_respawns() {
        let mut state = with_piece(PieceKind::O);
        assert_eq!(state.player.pos, Position::new(5, 0));
        assert!(!state.player_collides());

        let mut drops = 0;
        while !state.drop() {
            drops += 1;
        }
        assert_eq!(drops, 18);

        for (x, y) in [(5, 18), (6, 18), (5, 19), (6, 19)] {
            assert_eq!(state.board.get(x, y), Some(PieceKind::O.cell_value()));
        }
        let filled: usize = state
            .board
            .rows()
            .map(|r| r.iter().filter(|&&c| c != 0).count())
            .sum();
        assert_eq!(filled, 4);
        assert_eq!(state.score, 0);
        assert_eq!(state.player.pos.y, 0);
        assert_eq!(
            state.take_events(),
            vec![GameEvent::Scored {
                lines: 0,
                points: 0,
                score: 0,
                total_lines: 0,
            }]
        );
        assert_dims(&state);
    }

    #[test]
    fn completing_the_bottom_row_clears_it() {
        let mut state = with_piece(PieceKind::O);
        for x in 0..12 {
            if x != 5 && x != 6 {
                state.board.set(x, 19, 1);
            }
        }
        while !state.drop() {}
        // Bottom row cleared; the O's upper half fell into row 19.
        assert_eq!(state.board.get(5, 19), Some(PieceKind::O.cell_value()));
        assert_eq!(state.board.get(0, 19), Some(0));
        assert_eq!(state.board.get(5, 18), Some(0));
        assert_eq!(state.score, 40);
        assert_eq!(state.lines, 1);
        assert_dims(&state);
    }

    fn clear_rows_with_i(rows: usize) -> GameState {
        let mut state = with_piece(PieceKind::I);
        // Vertical I occupies column pos.x + 2 after a clockwise turn.
        assert!(state.rotate(Rotation::Clockwise));
        let column = (state.player.pos.x + 2) as usize;
        for y in (20 - rows)..20 {
            for x in 0..12 {
                if x != column {
                    state.board.set(x, y, 1);
                }
            }
        }
        while !state.drop() {}
        state
    }

    #[test]
    fn score_table_by_rows_cleared() {
        for (rows, expected) in [(1, 40), (2, 100), (3, 300), (4, 1200)] {
            let mut state = clear_rows_with_i(rows);
            assert_eq!(state.score, expected, "{} rows", rows);
            assert_eq!(state.lines, rows as u32);
            let events = state.take_events();
            assert!(events.contains(&GameEvent::Scored {
                lines: rows as u32,
                points: expected,
                score: expected,
                total_lines: rows as u32,
            }));
            assert_dims(&state);
        }
    }

    #[test]
    fn spawn_into_full_board_resets_game() {
        let mut state = seeded(9);
        for y in 0..3 {
            for x in 1..12 {
                state.board.set(x, y, 2);
            }
        }
        state.score = 740;
        state.lines = 9;
        assert!(state.spawn());
        assert!(state.board.is_empty());
        assert_eq!(state.score, 0);
        assert_eq!(state.lines, 0);
        assert!(!state.player_collides());
        assert_eq!(
            state.take_events(),
            vec![GameEvent::GameOver {
                final_score: 740,
                lines: 9
            }]
        );
    }

    #[test]
    fn spawn_on_free_board_is_not_game_over() {
        let mut state = seeded(9);
        state.board.set(0, 19, 1);
        state.score = 100;
        assert!(!state.spawn());
        assert_eq!(state.score, 100);
        assert!(!state.board.is_empty());
        assert!(state.take_events().is_empty());
    }

    #[test]
    fn landing_that_blocks_spawn_ends_the_game() {
        let mut state = with_piece(PieceKind::O);
        for y in 2..20 {
            for x in 0..11 {
                state.board.set(x, y, 3);
            }
        }
        state.score = 40;
        assert!(state.drop());
        let events = state.take_events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], GameEvent::GameOver { final_score: 40, .. }));
        assert!(state.board.is_empty());
        assert_eq!(state.score, 0);
    }

    #[test]
    fn rotation_kicks_off_left_wall() {
        let mut state = with_piece(PieceKind::I);
        assert!(state.rotate(Rotation::Clockwise));
        while state.move_piece(-1) {}
        // Vertical I sits in matrix column 2, flush against the wall.
        assert_eq!(state.player.pos.x, -2);
        assert!(state.rotate(Rotation::Clockwise));
        assert_eq!(state.player.pos.x, 0);
        assert!(!state.player_collides());
    }

    #[test]
    fn blocked_rotation_restores_piece() {
        let mut state = with_piece(PieceKind::I);
        assert!(state.rotate(Rotation::Clockwise));
        state.player.pos = Position::new(3, 14);
        for y in 10..20 {
            for x in 0..12 {
                if x != 5 {
                    state.board.set(x, y, 4);
                }
            }
        }
        assert!(!state.player_collides());
        let before = state.player.clone();
        assert!(!state.rotate(Rotation::Clockwise));
        assert_eq!(state.player, before);
        assert!(!state.rotate(Rotation::CounterClockwise));
        assert_eq!(state.player, before);
    }

    #[test]
    fn free_rotation_keeps_position() {
        let mut state = with_piece(PieceKind::T);
        state.player.pos.y = 5;
        let start = state.player.pos;
        for _ in 0..4 {
            assert!(state.rotate(Rotation::Clockwise));
            assert_eq!(state.player.pos, start);
        }
        assert_eq!(state.player.shape, PieceKind::T.shape());
    }

    #[test]
    fn gravity_waits_for_the_interval() {
        let mut state = with_piece(PieceKind::T);
        assert!(!state.advance(Duration::from_millis(600)));
        assert_eq!(state.player.pos.y, 0);
        assert!(!state.advance(Duration::from_millis(400)));
        assert_eq!(state.drop_counter(), Duration::from_millis(1000));
        assert_eq!(state.player.pos.y, 0);
        assert!(state.advance(Duration::from_millis(1)));
        assert_eq!(state.player.pos.y, 1);
        assert_eq!(state.drop_counter(), Duration::ZERO);
    }

    #[test]
    fn manual_drop_resets_gravity() {
        let mut state = with_piece(PieceKind::T);
        state.advance(Duration::from_millis(900));
        state.drop();
        assert_eq!(state.drop_counter(), Duration::ZERO);
        assert_eq!(state.player.pos.y, 1);
    }

    proptest! {
        #[test]
        fn rotation_never_leaves_piece_colliding(
            kind in 0usize..7,
            x in -1i32..11,
            y in 0i32..18,
            cw in any::<bool>(),
            filled in proptest::collection::vec((0usize..12, 0usize..20), 0..30),
        ) {
            let mut state = with_piece(PieceKind::ALL[kind]);
            for (fx, fy) in filled {
                state.board.set(fx, fy, 1);
            }
            state.player.pos = Position::new(x, y);
            prop_assume!(!state.player_collides());
            let before = state.player.clone();
            let rotation = if cw { Rotation::Clockwise } else { Rotation::CounterClockwise };
            let kept = state.rotate(rotation);
            prop_assert!(!state.player_collides());
            if kept {
                prop_assert_eq!(&state.player.shape, &before.shape.rotated(rotation));
                prop_assert_eq!(state.player.pos.y, before.pos.y);
                prop_assert!((state.player.pos.x - before.pos.x).abs() <= before.shape.width() as i32);
            } else {
                prop_assert_eq!(&state.player, &before);
            }
        }

        #[test]
        fn zero_move_reports_collision_and_keeps_position(
            kind in 0usize..7,
            x in -3i32..14,
            y in -3i32..22,
        ) {
            let mut state = with_piece(PieceKind::ALL[kind]);
            state.board.fill_row(19, 1);
            state.player.pos = Position::new(x, y);
            let colliding = state.player_collides();
            prop_assert_eq!(state.move_piece(0), !colliding);
            prop_assert_eq!(state.player.pos, Position::new(x, y));
        }

        #[test]
        fn board_keeps_dimensions_under_play(
            seed in any::<u64>(),
            moves in proptest::collection::vec(0u8..5, 1..300),
        ) {
            let mut state = seeded(seed);
            for m in moves {
                match m {
                    0 => { state.move_piece(-1); }
                    1 => { state.move_piece(1); }
                    2 => { state.rotate(Rotation::Clockwise); }
                    3 => { state.rotate(Rotation::CounterClockwise); }
                    _ => { state.drop(); }
                }
                prop_assert!(!state.player_collides());
                prop_assert_eq!(state.board.rows().count(), BOARD_HEIGHT);
                prop_assert!(state.board.rows().all(|r| r.len() == BOARD_WIDTH));
            }
        }
    }
}
