// gloudapp-lib: everything behind the GloudApp tray binary except the
// native tray icon and event loop.

pub mod capture;
pub mod cli;
pub mod clipboard;
pub mod cloud;
pub mod config;
pub mod credentials;
pub mod errors;
pub mod fileops;
pub mod http_client;
pub mod logger;
pub mod output;
pub mod pipeline;
pub mod platform;
pub mod report;
pub mod session;
pub mod signal;
pub mod tray;
pub mod tui;
