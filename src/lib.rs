pub mod analysis;
pub mod config;
pub mod error;
pub mod extract;
pub mod parse;
pub mod validate;
pub mod views;
pub mod wasm;
