//! lyra-tui: Terminal UI components
//!
//! Widgets, key mapping and theming for the lyra chat client, built on
//! ratatui and crossterm.

pub mod input;
pub mod theme;
pub mod widgets;

pub use input::{Action, event_to_action};
pub use theme::Theme;
