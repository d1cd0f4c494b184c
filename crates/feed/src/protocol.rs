//! Wire protocol for the observation feed.
//!
//! Newline-delimited JSON: a `hello` message on connect, then one
//! `observation` per published state.

use serde::{Deserialize, Serialize};

use blockfall_core::{Block, Piece, State};
use blockfall_types::{GRID_HEIGHT, GRID_WIDTH};

pub const PROTOCOL_NAME: &str = "blockfall-observe";
pub const PROTOCOL_VERSION: u32 = 1;

/// One cube on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieceMessage {
    pub id: u32,
    pub x: i32,
    pub y: i32,
    pub tint: String,
}

impl From<&Piece> for PieceMessage {
    fn from(piece: &Piece) -> Self {
        Self {
            id: piece.id.0,
            x: piece.x,
            y: piece.y,
            tint: piece.tint.as_str().to_string(),
        }
    }
}

/// A full state snapshot on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationMessage {
    pub seq: u64,
    pub game_end: bool,
    pub lines_cleared: u32,
    pub highscore: u32,
    pub piece_in_play: Vec<PieceMessage>,
    pub preview_piece: Vec<PieceMessage>,
    pub cubes: Vec<PieceMessage>,
    /// Ids whose visuals observers should retract.
    pub remove: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedMessage {
    Hello {
        protocol: String,
        version: u32,
        grid_width: i32,
        grid_height: i32,
    },
    Observation(ObservationMessage),
}

pub fn hello() -> FeedMessage {
    FeedMessage::Hello {
        protocol: PROTOCOL_NAME.to_string(),
        version: PROTOCOL_VERSION,
        grid_width: GRID_WIDTH,
        grid_height: GRID_HEIGHT,
    }
}

fn block_pieces(block: &Block) -> Vec<PieceMessage> {
    block.pieces.iter().map(PieceMessage::from).collect()
}

pub fn observation(seq: u64, state: &State) -> ObservationMessage {
    ObservationMessage {
        seq,
        game_end: state.game_end,
        lines_cleared: state.lines_cleared,
        highscore: state.highscore,
        piece_in_play: block_pieces(&state.piece_in_play),
        preview_piece: block_pieces(&state.preview_piece),
        cubes: state.cubes.iter().map(PieceMessage::from).collect(),
        remove: state.remove.iter().map(|p| p.id.0).collect(),
    }
}
