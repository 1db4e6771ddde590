//! Bookkeeping shared by drivers of the bot.
//!
//! - [`GameStats`] - pieces locked, lines cleared, tetrises, top-outs
//! - [`PieceSeed`] - seed for reproducible piece selection

pub use self::{game_stats::*, piece_seed::*};

mod game_stats;
mod piece_seed;
