//! The attendance engine: period resolution, classification, duplicate
//! guard, recorder and absentee sweeper, plus the pieces the CLI builds on
//! top of them.

pub mod classifier;
pub mod clock;
pub mod guard;
pub mod log;
pub mod provider;
pub mod recorder;
pub mod resolver;
pub mod status;
pub mod store;
pub mod sweeper;
