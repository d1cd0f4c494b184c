//! Observation feed crate - streams game states to remote observers.
//!
//! An optional collaborator on the output side: the game loop publishes each
//! new state and connected observers receive it as newline-delimited JSON.

pub mod protocol;
pub mod server;

pub use protocol::{hello, observation, FeedMessage, ObservationMessage, PieceMessage};
pub use server::ObservationFeed;
