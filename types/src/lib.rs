pub mod color;
pub mod player_record;
pub mod position;

pub use color::Color;
pub use player_record::{PlayerRecord, PlayerUpdate};
pub use position::round_position;
