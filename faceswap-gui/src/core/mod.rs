//! Non-UI logic for the GUI.
//!
//! - `settings`: settings persistence and loading
//! - `swap`: model loading and running a swap request
//! - `textures`: turning RGB buffers into egui textures

pub mod settings;
pub mod swap;
pub mod textures;
