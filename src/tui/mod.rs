//! TUI module: Terminal User Interface using Ratatui.
//!
//! Screens:
//! - Clinical data entry form
//! - Prediction result with class probabilities
//! - About page with risk factor background

mod app;
mod styles;
mod ui;

pub use app::{App, Screen};
pub use styles::Palette;
