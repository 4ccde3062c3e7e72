pub mod colors;
pub mod date;
pub mod table;
pub mod time;

pub use colors::colorize_status;
