//! Records and settings kept between games: the append-only result history and the player preferences.

pub use error::*;
pub use history::*;
pub use preferences::*;
pub use record::*;

mod error;
mod history;
mod preferences;
mod record;
