//! Desktop GUI for FaceSwap Studio (library).

pub mod app;
pub mod core;
pub mod theme;
pub mod types;
pub mod ui;

pub use types::*;
