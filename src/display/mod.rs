// src/display/mod.rs
//! Display of the committed fix

pub mod terminal;

pub use terminal::TerminalDisplay;
