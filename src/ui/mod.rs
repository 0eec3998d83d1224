//! User interface rendering
//!
//! This module provides all terminal UI rendering functionality:
//! - `render` - Main rendering entry point
//! - `components` - Header, stats bar, filter bar, footer, dialog frame
//! - `process_list` - Process list rendering
//! - `performance`, `system_info`, `network`, `startup` - The other pages
//! - `detail_view` - Detailed process information view
//! - `help` - Help overlay
//! - `affinity`, `prompt` - Action dialogs
//! - `utils` - Shared formatting

mod affinity;
mod components;
mod detail_view;
mod help;
mod network;
mod performance;
mod process_list;
mod prompt;
mod render;
mod startup;
mod system_info;
mod utils;

pub use render::render;
pub use utils::{format_kbs, format_timestamp};
