//! BlueprintBoard Application
//!
//! Command-line shell around the canvas engine: blueprint file commands,
//! PNG export and scripted drawing sessions.

mod app;
mod shortcuts;

pub use app::{
    App, AppConfig, AppError, AppResult, Command, ExportOptions, USAGE, default_script, info_report,
    replay,
};
pub use shortcuts::{Shortcut, ShortcutRegistry};
