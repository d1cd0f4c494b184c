//! Block catalog - the seven tetromino layouts as unit-cube lists
//!
//! Pieces are 1x1 cubes positioned in pixel-scaled grid coordinates; a block
//! is four of them. There is no bitboard: collision and clearing downstream
//! work directly on cube lists.

use blockfall_types::{
    PieceId, Tint, CELL_HEIGHT, CELL_WIDTH, SPAWN_COL_CELLS, SPAWN_ROW_CELLS,
};

/// One grid-cell-sized cube.
///
/// Width and height are fixed at one cell, so only the position, tint and
/// identity are carried. Immutable value: transitions replace, never mutate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    /// Horizontal position in pixels
    pub x: i32,
    /// Vertical position in pixels (negative while above the visible top)
    pub y: i32,
    pub tint: Tint,
    pub id: PieceId,
}

impl Piece {
    pub fn translated(&self, dx: i32, dy: i32) -> Piece {
        Piece {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }
}

/// A tetromino: exactly four cubes. The first cube is the rotation pivot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Block {
    pub pieces: [Piece; 4],
}

impl Block {
    pub fn translated(&self, dx: i32, dy: i32) -> Block {
        Block {
            pieces: self.pieces.map(|p| p.translated(dx, dy)),
        }
    }

    pub fn ids(&self) -> [PieceId; 4] {
        self.pieces.map(|p| p.id)
    }
}

/// Create a cube at a layout cell, applying the fixed spawn offset
/// (+4 columns, -3 rows) that places fresh blocks above the visible top.
///
/// No bounds checking here; bounds are enforced downstream by the move and
/// collision logic.
pub fn create_piece(grid_x: i32, grid_y: i32, tint: Tint, id: PieceId) -> Piece {
    Piece {
        x: grid_x * CELL_WIDTH + SPAWN_COL_CELLS * CELL_WIDTH,
        y: grid_y * CELL_HEIGHT + SPAWN_ROW_CELLS * CELL_HEIGHT,
        tint,
        id,
    }
}

fn layout(cells: [(i32, i32); 4], tint: Tint, base_id: u32) -> Block {
    Block {
        pieces: std::array::from_fn(|k| {
            let (gx, gy) = cells[k];
            create_piece(gx, gy, tint, PieceId(base_id + k as u32))
        }),
    }
}

/// Build the block for a shape index in `[0, 7)` with cube ids
/// `base_id + 0..=3`.
///
/// Any out-of-range index yields the T layout. That branch is defensive, not
/// an eighth shape: the generator's range keeps indices in bounds except at
/// the scale boundary.
pub fn spawn_block(shape_index: i32, base_id: u32) -> Block {
    match shape_index {
        0 => layout([(0, 0), (0, 1), (1, 0), (1, 1)], Tint::Yellow, base_id),
        1 => layout([(0, 1), (0, 0), (0, 2), (1, 2)], Tint::Orange, base_id),
        2 => layout([(1, 1), (1, 0), (1, 2), (0, 2)], Tint::Blue, base_id),
        3 => layout([(1, 1), (0, 0), (0, 1), (0, 2)], Tint::Orchid, base_id),
        4 => layout([(0, 2), (0, 0), (0, 1), (0, 3)], Tint::Cyan, base_id),
        5 => layout([(1, 1), (0, 1), (1, 0), (2, 0)], Tint::Green, base_id),
        6 => layout([(1, 1), (0, 0), (1, 0), (2, 1)], Tint::Red, base_id),
        _ => layout([(1, 1), (0, 0), (0, 1), (0, 2)], Tint::Orchid, base_id),
    }
}
