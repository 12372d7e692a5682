//! Tidal host tool.
//!
//! Reads a byte stream, pushes it through a fixed-size [`tidal_ring::Ring`]
//! and splits it into delimiter-terminated records on the consumer side.
//!
//! Pipeline: load `tidal.toml` → apply CLI overrides → validate →
//!           allocate ring → produce/consume until end of input.

pub mod app;
pub mod cli;
pub mod config;
pub mod logger;
