//! Panels drawn each frame.

pub mod controls;
pub mod previews;
pub mod status_bar;
