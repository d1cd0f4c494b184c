//! Game state and engine transitions
//!
//! `State` is the single source of truth. It is never mutated in place: every
//! transition consumes a reference and returns a fully consistent successor,
//! so a caller either keeps the old value or swaps in the new one atomically.

use arrayvec::ArrayVec;

use blockfall_types::{
    PieceId, Tint, CANVAS_HEIGHT, CELL_HEIGHT, GRID_HEIGHT, GRID_WIDTH,
};

use crate::block::{spawn_block, Block, Piece};

/// Complete game state
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    /// Terminal flag, set once any settled cube reaches the top boundary.
    pub game_end: bool,
    /// All settled cubes (the playfield).
    pub cubes: Vec<Piece>,
    /// Monotonic counter seeding the next block's cube ids (+4 per spawn).
    pub obj_count: u32,
    /// The currently falling block.
    pub piece_in_play: Block,
    /// The next block, pre-generated for the preview pane.
    pub preview_piece: Block,
    /// Last generator output in [0, 7); `floor` selects the next spawn shape.
    pub block_generator: f64,
    /// Cumulative count of cleared rows.
    pub lines_cleared: u32,
    /// Best `lines_cleared` observed this session.
    pub highscore: u32,
    /// Cubes removed by the most recent clear, kept so renderers can retract
    /// their visuals. Replaced on every line-clear pass.
    pub remove: Vec<Piece>,
}

impl State {
    /// The state the game boots with: empty field, first two blocks spawned
    /// from shape index 0.
    pub fn initial() -> Self {
        Self {
            game_end: false,
            cubes: Vec::new(),
            obj_count: 8,
            piece_in_play: spawn_block(0, 0),
            preview_piece: spawn_block(0, 4),
            block_generator: 0.0,
            lines_cleared: 0,
            highscore: 0,
            remove: Vec::new(),
        }
    }
}

/// Settlement test, run once per tick after the gravity step.
///
/// The falling block settles when any cube sits on the floor row or directly
/// above a settled cube in its column. On settlement the preview block is
/// promoted, a fresh preview is spawned from the current generator value, and
/// the object counter advances by four. Non-settling states pass through.
pub fn check_collision(s: &State) -> State {
    let floor_y = CANVAS_HEIGHT - CELL_HEIGHT;
    let on_floor = s.piece_in_play.pieces.iter().any(|p| p.y == floor_y);
    let on_cube = s.cubes.iter().any(|c| {
        s.piece_in_play
            .pieces
            .iter()
            .any(|p| p.x == c.x && p.y == c.y - CELL_HEIGHT)
    });

    if !(on_floor || on_cube) {
        return s.clone();
    }

    let mut cubes = s.cubes.clone();
    cubes.extend(s.piece_in_play.pieces);

    State {
        piece_in_play: s.preview_piece,
        preview_piece: spawn_block(s.block_generator.floor() as i32, s.obj_count),
        cubes,
        obj_count: s.obj_count + 4,
        ..s.clone()
    }
}

/// Remove every full row and let the cubes above fall in.
///
/// A row is full when the number of settled cubes at that (cell-aligned) y
/// equals the grid width. Survivors shift down one cell per cleared row below
/// them. Removed cubes are surfaced through `remove` for the renderer.
pub fn clear_lines(s: &State) -> State {
    // Settled cubes are always cell-aligned, so only row-aligned y values
    // can fill.
    let mut full_rows: ArrayVec<i32, { GRID_HEIGHT as usize }> = ArrayVec::new();
    for row in 0..GRID_HEIGHT {
        let y = row * CELL_HEIGHT;
        let filled = s.cubes.iter().filter(|c| c.y == y).count();
        if filled == GRID_WIDTH as usize {
            full_rows.push(y);
        }
    }

    let removed: Vec<Piece> = s
        .cubes
        .iter()
        .copied()
        .filter(|c| full_rows.contains(&c.y))
        .collect();

    let cubes: Vec<Piece> = s
        .cubes
        .iter()
        .copied()
        .filter(|c| !full_rows.contains(&c.y))
        .map(|c| {
            let shift = full_rows.iter().filter(|&&row_y| c.y < row_y).count() as i32;
            Piece {
                y: c.y + shift * CELL_HEIGHT,
                ..c
            }
        })
        .collect();

    // The highscore comparison reads the running total before this clear is
    // added, so a clear only registers on the following one.
    let highscore = if s.lines_cleared > s.highscore {
        s.lines_cleared
    } else {
        s.highscore
    };

    State {
        cubes,
        lines_cleared: s.lines_cleared + full_rows.len() as u32,
        highscore,
        remove: removed,
        ..s.clone()
    }
}

/// Detect a topped-out field.
///
/// Any settled cube at or above the top boundary ends the game and recolors
/// the field to the neutral tint. The flag is never cleared here; only the
/// reset action does that.
pub fn check_game_end(s: &State) -> State {
    let topped_out = s.cubes.iter().any(|c| c.y <= 0);
    if !topped_out {
        return s.clone();
    }

    let cubes = s
        .cubes
        .iter()
        .map(|c| Piece {
            tint: Tint::Ash,
            ..*c
        })
        .collect();

    State {
        game_end: true,
        cubes,
        ..s.clone()
    }
}

/// Build a settled cube at a grid cell, bypassing the spawn offset.
///
/// Test helper for constructing playfields directly.
#[doc(hidden)]
pub fn settled_cube(col: i32, row: i32, tint: Tint, id: u32) -> Piece {
    Piece {
        x: col * blockfall_types::CELL_WIDTH,
        y: row * CELL_HEIGHT,
        tint,
        id: PieceId(id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_row(row: i32, base_id: u32) -> Vec<Piece> {
        (0..GRID_WIDTH)
            .map(|col| settled_cube(col, row, Tint::Green, base_id + col as u32))
            .collect()
    }

    #[test]
    fn test_initial_state_shape() {
        let s = State::initial();
        assert!(!s.game_end);
        assert!(s.cubes.is_empty());
        assert_eq!(s.obj_count, 8);
        assert_eq!(s.piece_in_play.ids().map(|id| id.0), [0, 1, 2, 3]);
        assert_eq!(s.preview_piece.ids().map(|id| id.0), [4, 5, 6, 7]);
        assert_eq!(s.block_generator, 0.0);
        assert_eq!(s.lines_cleared, 0);
        assert_eq!(s.highscore, 0);
        assert!(s.remove.is_empty());
    }

    #[test]
    fn test_check_collision_passthrough_in_open_air() {
        let s = State::initial();
        let next = check_collision(&s);
        assert_eq!(next, s);
    }

    #[test]
    fn test_check_collision_settles_on_floor() {
        let mut s = State::initial();
        // Park the falling block so its lowest cubes sit on the floor row.
        let lowest = s.piece_in_play.pieces.iter().map(|p| p.y).max().unwrap();
        let floor_y = CANVAS_HEIGHT - CELL_HEIGHT;
        s.piece_in_play = s.piece_in_play.translated(0, floor_y - lowest);

        let next = check_collision(&s);
        assert_eq!(next.cubes.len(), 4);
        assert_eq!(next.piece_in_play, s.preview_piece);
        assert_eq!(next.obj_count, s.obj_count + 4);
        assert_eq!(
            next.preview_piece.ids().map(|id| id.0),
            [8, 9, 10, 11],
            "new preview takes its ids from the pre-settlement counter"
        );
    }

    #[test]
    fn test_check_collision_settles_on_top_of_cube() {
        let mut s = State::initial();
        s.cubes = vec![settled_cube(4, 19, Tint::Red, 100)];
        // Rest the falling block's lowest cubes one cell above the settled
        // cube (the spawn block already occupies columns 4 and 5).
        let lowest = s.piece_in_play.pieces.iter().map(|p| p.y).max().unwrap();
        s.piece_in_play = s.piece_in_play.translated(0, 18 * CELL_HEIGHT - lowest);

        let next = check_collision(&s);
        assert_eq!(next.cubes.len(), 5);
    }

    #[test]
    fn test_clear_lines_noop_without_full_rows() {
        let mut s = State::initial();
        s.cubes = vec![settled_cube(0, 19, Tint::Blue, 50)];
        s.remove = vec![settled_cube(9, 19, Tint::Blue, 51)];

        let next = clear_lines(&s);
        assert_eq!(next.cubes, s.cubes);
        assert_eq!(next.lines_cleared, s.lines_cleared);
        assert!(next.remove.is_empty(), "remove is replaced every pass");
    }

    #[test]
    fn test_clear_lines_removes_row_and_shifts() {
        let mut s = State::initial();
        s.cubes = full_row(19, 100);
        s.cubes.push(settled_cube(3, 18, Tint::Orchid, 200));

        let next = clear_lines(&s);
        assert_eq!(next.lines_cleared, 1);
        assert_eq!(next.remove.len(), GRID_WIDTH as usize);
        assert_eq!(next.cubes.len(), 1);
        assert_eq!(next.cubes[0].y, 19 * CELL_HEIGHT);
        assert_eq!(next.cubes[0].id, PieceId(200));
    }

    #[test]
    fn test_clear_lines_double_clear_shifts_twice() {
        let mut s = State::initial();
        s.cubes = full_row(19, 100);
        s.cubes.extend(full_row(18, 120));
        s.cubes.push(settled_cube(0, 10, Tint::Cyan, 300));

        let next = clear_lines(&s);
        assert_eq!(next.lines_cleared, 2);
        assert_eq!(next.cubes.len(), 1);
        assert_eq!(next.cubes[0].y, 12 * CELL_HEIGHT);
    }

    #[test]
    fn test_clear_lines_highscore_lags_by_one_clear() {
        let mut s = State::initial();
        s.cubes = full_row(19, 100);

        let first = clear_lines(&s);
        assert_eq!(first.lines_cleared, 1);
        assert_eq!(first.highscore, 0, "highscore compares the pre-clear total");

        let mut again = first.clone();
        again.cubes = full_row(19, 200);
        let second = clear_lines(&again);
        assert_eq!(second.lines_cleared, 2);
        assert_eq!(second.highscore, 1);
    }

    #[test]
    fn test_check_game_end_recolors_field() {
        let mut s = State::initial();
        s.cubes = vec![
            settled_cube(4, 0, Tint::Red, 10),
            settled_cube(4, 1, Tint::Red, 11),
        ];

        let next = check_game_end(&s);
        assert!(next.game_end);
        assert!(next.cubes.iter().all(|c| c.tint == Tint::Ash));
    }

    #[test]
    fn test_check_game_end_passthrough_below_top() {
        let mut s = State::initial();
        s.cubes = vec![settled_cube(4, 5, Tint::Red, 10)];

        let next = check_game_end(&s);
        assert!(!next.game_end);
        assert_eq!(next, s);
    }

    #[test]
    fn test_check_game_end_never_clears_the_flag() {
        let mut s = State::initial();
        s.game_end = true;

        let next = check_game_end(&s);
        assert!(next.game_end);
    }
}
