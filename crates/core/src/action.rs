//! Action application - one pure transition per protocol variant
//!
//! Each variant is atomic: it returns either the unchanged input state (a
//! rejected move) or a fully consistent successor, never a half-applied one.

use blockfall_types::{Action, CANVAS_HEIGHT, CANVAS_WIDTH, CELL_HEIGHT, CELL_WIDTH};

use crate::block::{spawn_block, Block, Piece};
use crate::rng;
use crate::state::{check_collision, check_game_end, clear_lines, State};

impl State {
    /// Apply one action, producing the successor state.
    pub fn apply(&self, action: &Action) -> State {
        match *action {
            Action::Move { dx, dy } => move_piece(self, dx, dy),
            Action::Rotate => rotate_piece(self),
            Action::Drop => drop_piece(self),
            Action::Tick { .. } => tick(self),
            Action::RngGen { elapsed } => advance_generator(self, elapsed),
            Action::Reset => reset(self),
        }
    }
}

/// Fold point for the merged event stream: every external event becomes an
/// action, and every action application yields the next state to render.
pub fn reduce(state: &State, action: &Action) -> State {
    state.apply(action)
}

/// Translate the falling block, rejecting any move that would leave the
/// horizontal canvas bounds or land on a settled cube.
///
/// Floor contact is deliberately not checked here: lateral blocking is this
/// function's job, settling belongs to the collision pass.
fn move_piece(s: &State, dx: i32, dy: i32) -> State {
    let moved = s.piece_in_play.translated(dx, dy);

    let hits_wall = moved
        .pieces
        .iter()
        .any(|p| p.x < 0 || p.x + CELL_WIDTH > CANVAS_WIDTH);
    let hits_cube = moved
        .pieces
        .iter()
        .any(|p| s.cubes.iter().any(|c| c.x == p.x && c.y == p.y));

    if hits_wall || hits_cube {
        s.clone()
    } else {
        State {
            piece_in_play: moved,
            ..s.clone()
        }
    }
}

/// Rotate the falling block 90 degrees about its first cube via
/// `(rel_x, rel_y) -> (-rel_y, rel_x)`.
///
/// No wall kick and no bounds or collision check: a rotation into a wall or
/// the settled field is accepted as-is and left for the next move or tick to
/// resolve.
fn rotate_piece(s: &State) -> State {
    let pivot = s.piece_in_play.pieces[0];
    let pieces = s.piece_in_play.pieces.map(|p| {
        let rel_x = p.x - pivot.x;
        let rel_y = p.y - pivot.y;
        Piece {
            x: pivot.x - rel_y,
            y: pivot.y + rel_x,
            ..p
        }
    });

    State {
        piece_in_play: Block { pieces },
        ..s.clone()
    }
}

/// Hard drop: send the falling block to rest atop the highest settled cube
/// sharing one of its columns, or one cell above the floor when the columns
/// are clear (the next tick walks it down and settles it).
fn drop_piece(s: &State) -> State {
    let pieces = s.piece_in_play.pieces;
    let lowest = pieces
        .iter()
        .copied()
        .fold(pieces[0], |acc, p| if p.y > acc.y { p } else { acc });

    let below: Vec<Piece> = s
        .cubes
        .iter()
        .copied()
        .filter(|c| pieces.iter().any(|p| p.x == c.x && c.y > p.y))
        .collect();

    let dy = match below
        .iter()
        .copied()
        .reduce(|acc, c| if c.y < acc.y { c } else { acc })
    {
        None => CANVAS_HEIGHT - lowest.y - CELL_HEIGHT - CELL_HEIGHT,
        Some(highest) => highest.y - lowest.y - CELL_HEIGHT,
    };

    State {
        piece_in_play: s.piece_in_play.translated(0, dy),
        ..s.clone()
    }
}

/// One gravity step: move down a cell, settle, clear lines, check for the
/// end of the game — in that fixed order, every invocation.
fn tick(s: &State) -> State {
    let stepped = move_piece(s, 0, CELL_HEIGHT);
    let settled = check_collision(&stepped);
    let cleared = clear_lines(&settled);
    check_game_end(&cleared)
}

/// Refresh the shape generator from the decoupled randomness channel.
fn advance_generator(s: &State, elapsed: i64) -> State {
    State {
        block_generator: rng::channel_sample(elapsed),
        ..s.clone()
    }
}

/// Restore a fresh playfield while the session keeps running.
///
/// The highscore, the preview block and the generator survive; the object
/// counter continues rather than restarting so ids stay unique. The settled
/// cubes are handed back through `remove` so the renderer can retract them —
/// the action itself performs no side effects.
fn reset(s: &State) -> State {
    State {
        game_end: false,
        cubes: Vec::new(),
        obj_count: s.obj_count + 4,
        piece_in_play: spawn_block(s.block_generator.floor() as i32, s.obj_count),
        preview_piece: s.preview_piece,
        block_generator: s.block_generator,
        lines_cleared: 0,
        highscore: s.highscore,
        remove: s.cubes.clone(),
    }
}
