//! Configuration loader and schema types.
//!
//! This module exposes the configuration schema used to tune the engine
//! (search fixup width, history debounce, lookahead size and playback
//! defaults) and helpers to load configuration from disk and environment.

mod load;
mod schema;

pub use schema::*;
