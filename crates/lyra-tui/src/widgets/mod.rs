//! Custom widgets for the TUI

pub mod banner;
pub mod input_box;
pub mod markdown;
pub mod message_list;
pub mod settings_panel;
pub mod spinner;

pub use banner::Banner;
pub use input_box::InputBox;
pub use message_list::{ChatMessage, MessageList, Speaker};
pub use settings_panel::{ModeOption, SettingsPanel};
pub use spinner::Spinner;
