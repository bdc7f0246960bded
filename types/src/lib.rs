pub mod altair;
pub mod cache;
pub mod combined;
pub mod config;
pub mod consts;
pub mod error;
pub mod nonstandard;
pub mod phase0;
pub mod preset;
pub mod primitives;

pub use config::Config;
pub use preset::{Mainnet, Minimal, Preset};
