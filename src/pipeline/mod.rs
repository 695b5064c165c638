pub mod config;
pub mod generator;
pub mod pattern;
pub mod sequencer;
pub mod transport;
