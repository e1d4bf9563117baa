//! Renders an interactive movie menu: pick a title from the list, then play
//! it or read its synopsis.

pub mod app;
pub mod browser;
pub mod catalog;
