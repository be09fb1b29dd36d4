//! HTTP API handlers for music-lib

pub mod error;
pub mod health;
pub mod songs;

pub use error::ApiError;
pub use health::health_routes;
pub use songs::{add_song, delete_song, get_all_songs, get_song_by_id, get_song_text, update_song};
