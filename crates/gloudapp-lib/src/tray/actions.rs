//! The standard GloudApp tray menu.
//!
//! Handlers here do not touch the GUI or the network; they turn a menu pick
//! into a [`TrayCommand`] for the event loop to carry out.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use super::registry::{ActionId, ActionOptions, ActionRegistry, MenuEntry};
use crate::clipboard::ClipboardSnapshot;
use crate::errors::Result;
use crate::pipeline::{clipboard_source, validate_source};

pub const UPLOAD_PLACEHOLDER: &str = "Upload...";
pub const UPLOAD_FILE: &str = "Upload file...";
pub const TAKE_SCREENSHOT: &str = "Take screenshot";
pub const ABOUT: &str = "About";
pub const QUIT: &str = "Quit";

/// Work requested from the tray.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrayCommand {
    Screenshot,
    Upload(PathBuf),
    ChooseFile,
    About,
    Quit,
}

/// Where tray commands go (normally the event loop proxy).
pub type CommandSink = Rc<dyn Fn(TrayCommand)>;

/// Ids of the registered standard actions.
#[derive(Debug, Clone, Copy)]
pub struct StandardActions {
    pub clipboard_upload: ActionId,
    pub choose_file: ActionId,
    pub screenshot: ActionId,
    pub about: ActionId,
    pub quit: ActionId,
}

/// Title and enabled flag of the clipboard upload action for `text`.
/// Returns the path the title now names.
pub fn refresh_clipboard_entry(text: Option<&str>, entry: &mut MenuEntry) -> Option<PathBuf> {
    let source = clipboard_source(text);
    match &source {
        Some(path) => {
            entry.title = format!("Upload: {}", path.display());
            entry.enabled = true;
        }
        None => {
            entry.title = UPLOAD_PLACEHOLDER.to_string();
            entry.enabled = false;
        }
    }
    source
}

/// Register the standard menu, in display order.
pub fn register_standard_actions(
    registry: &mut ActionRegistry,
    snapshot: ClipboardSnapshot,
    sink: CommandSink,
) -> StandardActions {
    // The clipboard may change while the menu is open; activation uploads
    // the path on the label, not whatever the clipboard holds by then.
    let labelled: Rc<RefCell<Option<PathBuf>>> = Rc::new(RefCell::new(None));
    let shown = labelled.clone();
    let upload_sink = sink.clone();
    let clipboard_upload = registry.register(
        UPLOAD_PLACEHOLDER,
        ActionOptions::new().disabled().refresh(move |entry| {
            *shown.borrow_mut() = refresh_clipboard_entry(snapshot.get().as_deref(), entry);
            Ok(())
        }),
        move || {
            let Some(path) = labelled.borrow().clone() else {
                tracing::debug!("No clipboard file on the menu, nothing to upload");
                return Ok(());
            };
            upload_sink(TrayCommand::Upload(validate_source(&path)?));
            Ok(())
        },
    );

    let choose_file = registry.register(UPLOAD_FILE, ActionOptions::new(), send(&sink, TrayCommand::ChooseFile));
    let screenshot = registry.register(TAKE_SCREENSHOT, ActionOptions::new(), send(&sink, TrayCommand::Screenshot));
    let about = registry.register(
        ABOUT,
        ActionOptions::new().separator_before(),
        send(&sink, TrayCommand::About),
    );
    let quit = registry.register(
        QUIT,
        ActionOptions::new().separator_before(),
        send(&sink, TrayCommand::Quit),
    );

    StandardActions {
        clipboard_upload,
        choose_file,
        screenshot,
        about,
        quit,
    }
}

fn send(sink: &CommandSink, command: TrayCommand) -> impl FnMut() -> Result<()> + 'static {
    let sink = sink.clone();
    move || {
        sink(command.clone());
        Ok(())
    }
}

/// Text of the About dialog.
pub fn about_text() -> String {
    format!(
        "GloudApp {}\n\nUpload screenshots and files to CloudApp from the system tray.\n\
         Left-click the icon to take a screenshot.",
        env!("CARGO_PKG_VERSION")
    )
}
