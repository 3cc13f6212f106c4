pub mod actions;
pub mod registry;

pub use actions::{register_standard_actions, CommandSink, StandardActions, TrayCommand};
pub use registry::{ActionId, ActionOptions, ActionRegistry, MenuEntry};
