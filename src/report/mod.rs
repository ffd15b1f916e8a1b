//! Output generation for the consolidated document.

pub mod generator;

pub use generator::*;
