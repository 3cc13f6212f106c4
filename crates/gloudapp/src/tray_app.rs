//! Tray icon and event loop.
//!
//! Everything that touches the GUI (menu items, dialogs, clipboard writes)
//! happens on the tao loop. Uploads run on the tokio runtime and the
//! clipboard probe on its own thread; both report back as [`UserEvent`]s.

use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, Instant};

use gloudapp_lib::clipboard::{ClipboardProbe, ClipboardSnapshot, SystemClipboard};
use gloudapp_lib::errors::{handle_fatal, GloudError, Result};
use gloudapp_lib::pipeline::{self, UploadPipeline, UploadResult};
use gloudapp_lib::report::{DialogFilePicker, DialogReporter, FilePicker, Reporter};
use gloudapp_lib::session::Session;
use gloudapp_lib::signal::SignalHandler;
use gloudapp_lib::tray::actions::about_text;
use gloudapp_lib::tray::{
    register_standard_actions, ActionId, ActionRegistry, CommandSink, StandardActions, TrayCommand,
};
use tao::event::{Event, StartCause};
use tao::event_loop::{ControlFlow, EventLoopBuilder, EventLoopProxy};
use tray_icon::menu::{Menu, MenuEvent, MenuId, MenuItem, PredefinedMenuItem};
use tray_icon::{Icon, MouseButton, MouseButtonState, TrayIcon, TrayIconBuilder, TrayIconEvent};

/// How often the clipboard is re-read while idle. Linux trays deliver no
/// click events, so this is the only refresh path there.
const PROBE_INTERVAL: Duration = Duration::from_secs(2);

pub enum UserEvent {
    Tray(TrayIconEvent),
    Menu(MenuEvent),
    Clipboard(Option<String>),
    Command(TrayCommand),
    Uploaded(Result<UploadResult>),
    Shutdown,
}

fn tray_error(e: impl std::fmt::Display) -> GloudError {
    GloudError::Tray(e.to_string())
}

/// Native menu items mirroring the registry.
struct NativeMenu {
    menu: Menu,
    items: Vec<(ActionId, MenuItem)>,
    by_menu_id: HashMap<MenuId, ActionId>,
}

impl NativeMenu {
    fn build(registry: &ActionRegistry) -> Result<Self> {
        let menu = Menu::new();
        let mut items = Vec::with_capacity(registry.len());
        let mut by_menu_id = HashMap::new();

        for (id, entry) in registry.entries() {
            if entry.separator_before {
                menu.append(&PredefinedMenuItem::separator())
                    .map_err(tray_error)?;
            }
            let item = MenuItem::new(&entry.title, entry.enabled, None);
            menu.append(&item).map_err(tray_error)?;
            by_menu_id.insert(item.id().clone(), id);
            items.push((id, item));
        }

        Ok(Self {
            menu,
            items,
            by_menu_id,
        })
    }

    fn sync(&self, registry: &ActionRegistry) {
        for (id, item) in &self.items {
            if let Some(entry) = registry.entry(*id) {
                item.set_text(&entry.title);
                item.set_enabled(entry.enabled);
            }
        }
    }

    fn action_for(&self, menu_id: &MenuId) -> Option<ActionId> {
        self.by_menu_id.get(menu_id).copied()
    }
}

/// A small cloud glyph, drawn at runtime.
fn cloud_icon() -> Result<Icon> {
    const SIZE: u32 = 32;
    const BLOBS: [(f32, f32, f32); 3] = [(10.5, 19.0, 6.5), (18.0, 14.5, 8.0), (24.5, 20.0, 5.5)];

    let mut rgba = Vec::with_capacity((SIZE * SIZE * 4) as usize);
    for y in 0..SIZE {
        for x in 0..SIZE {
            let (fx, fy) = (x as f32 + 0.5, y as f32 + 0.5);
            let in_blob = BLOBS
                .iter()
                .any(|&(cx, cy, r)| (fx - cx).powi(2) + (fy - cy).powi(2) <= r * r);
            let in_base = (19.0..=25.5).contains(&fy) && (10.5..=24.5).contains(&fx);
            if in_blob || in_base {
                rgba.extend_from_slice(&[0x2d, 0x9c, 0xdb, 0xff]);
            } else {
                rgba.extend_from_slice(&[0, 0, 0, 0]);
            }
        }
    }
    Icon::from_rgba(rgba, SIZE, SIZE).map_err(tray_error)
}

struct TrayApp {
    runtime: tokio::runtime::Runtime,
    session: Session,
    pipeline: UploadPipeline,
    registry: ActionRegistry,
    actions: StandardActions,
    menu: NativeMenu,
    tray: Option<TrayIcon>,
    snapshot: ClipboardSnapshot,
    probe: ClipboardProbe,
    clipboard: Option<SystemClipboard>,
    reporter: DialogReporter,
    picker: DialogFilePicker,
    signals: SignalHandler,
    proxy: EventLoopProxy<UserEvent>,
    uploads_in_flight: usize,
    next_probe: Instant,
}

impl TrayApp {
    fn start(&mut self) -> Result<()> {
        let tray = TrayIconBuilder::new()
            .with_menu(Box::new(self.menu.menu.clone()))
            .with_menu_on_left_click(false)
            .with_tooltip(self.tooltip())
            .with_icon(cloud_icon()?)
            .build()
            .map_err(tray_error)?;
        self.tray = Some(tray);
        tracing::info!("Tray icon ready");
        Ok(())
    }

    fn tooltip(&self) -> String {
        match self.uploads_in_flight {
            0 => format!("GloudApp: {} ({})", self.session.username(), self.session.domain()),
            n => format!("GloudApp: uploading {n}..."),
        }
    }

    fn update_tooltip(&self) {
        if let Some(tray) = &self.tray {
            if let Err(e) = tray.set_tooltip(Some(self.tooltip())) {
                tracing::debug!("Failed to update tooltip: {}", e);
            }
        }
    }

    /// Request a probe when due and return how long to sleep.
    fn tick(&mut self) -> ControlFlow {
        let now = Instant::now();
        if now >= self.next_probe {
            self.request_probe();
            self.next_probe = now + PROBE_INTERVAL;
        }
        ControlFlow::WaitUntil(self.next_probe)
    }

    fn request_probe(&self) {
        let proxy = self.proxy.clone();
        self.probe.request(move |text| {
            let _ = proxy.send_event(UserEvent::Clipboard(text));
        });
    }

    fn refresh_menu(&mut self) {
        if self.registry.prepare_for_display() {
            self.menu.sync(&self.registry);
        }
    }

    fn handle(&mut self, event: UserEvent) {
        match event {
            UserEvent::Tray(event) => self.on_tray_event(event),
            UserEvent::Menu(event) => match self.menu.action_for(&event.id) {
                Some(id) => self.dispatch(id),
                None => tracing::debug!(id = ?event.id, "Menu event for unknown item"),
            },
            UserEvent::Clipboard(text) => {
                if self.snapshot.set(text) {
                    self.refresh_menu();
                }
            }
            UserEvent::Command(command) => self.run_command(command),
            UserEvent::Uploaded(result) => self.finish_upload(result),
            UserEvent::Shutdown => {}
        }
    }

    fn on_tray_event(&mut self, event: TrayIconEvent) {
        match event {
            TrayIconEvent::Click {
                button: MouseButton::Left,
                button_state: MouseButtonState::Up,
                ..
            } => self.dispatch(self.actions.screenshot),
            TrayIconEvent::Click { .. } | TrayIconEvent::Enter { .. } => {
                self.refresh_menu();
                self.request_probe();
            }
            _ => {}
        }
    }

    fn dispatch(&mut self, id: ActionId) {
        if let Err(e) = self.registry.dispatch(id) {
            self.reporter.report_error(&e);
        }
    }

    fn run_command(&mut self, command: TrayCommand) {
        tracing::debug!(command = ?command, "Tray command");
        match command {
            TrayCommand::Screenshot => self.spawn_upload(None),
            TrayCommand::Upload(path) => self.spawn_upload(Some(path)),
            TrayCommand::ChooseFile => {
                let Some(path) = self.picker.pick_file() else {
                    return;
                };
                match pipeline::validate_source(&path) {
                    Ok(path) => self.spawn_upload(Some(path)),
                    Err(e) => self.reporter.report_error(&e),
                }
            }
            TrayCommand::About => {
                let message = format!(
                    "{}\n\nLogged in as {} ({}).",
                    about_text(),
                    self.session.username(),
                    self.session.domain()
                );
                self.reporter.info("About GloudApp", &message);
            }
            TrayCommand::Quit => self.signals.shutdown(),
        }
    }

    /// Upload `path`, or a fresh screenshot when `None`, on the runtime.
    fn spawn_upload(&mut self, path: Option<PathBuf>) {
        let pipeline = self.pipeline.clone();
        let proxy = self.proxy.clone();
        self.uploads_in_flight += 1;
        self.update_tooltip();

        self.runtime.spawn(async move {
            let result = match path {
                Some(path) => pipeline.upload(&path).await,
                None => pipeline.screenshot_and_upload().await,
            };
            if proxy.send_event(UserEvent::Uploaded(result)).is_err() {
                tracing::warn!("Event loop closed before the upload finished");
            }
        });
    }

    fn clipboard(&mut self) -> Result<&mut SystemClipboard> {
        if self.clipboard.is_none() {
            self.clipboard = Some(SystemClipboard::new()?);
        }
        self.clipboard
            .as_mut()
            .ok_or_else(|| GloudError::Clipboard("clipboard unavailable".into()))
    }

    fn finish_upload(&mut self, result: Result<UploadResult>) {
        self.uploads_in_flight = self.uploads_in_flight.saturating_sub(1);
        self.update_tooltip();

        let outcome = result.and_then(|uploaded| {
            pipeline::deliver(&uploaded, self.clipboard()?)?;
            Ok(uploaded)
        });
        match outcome {
            Ok(uploaded) => {
                self.snapshot.set(Some(uploaded.url));
                self.refresh_menu();
            }
            Err(e) => self.reporter.report_error(&e),
        }
    }
}

/// Show the tray and run the event loop until Quit or a signal.
pub fn run(runtime: tokio::runtime::Runtime, session: Session, pipeline: UploadPipeline) -> ! {
    let event_loop = EventLoopBuilder::<UserEvent>::with_user_event().build();
    let proxy = event_loop.create_proxy();

    TrayIconEvent::set_event_handler(Some({
        let proxy = proxy.clone();
        move |event| {
            let _ = proxy.send_event(UserEvent::Tray(event));
        }
    }));
    MenuEvent::set_event_handler(Some({
        let proxy = proxy.clone();
        move |event| {
            let _ = proxy.send_event(UserEvent::Menu(event));
        }
    }));

    let signals = SignalHandler::new();
    runtime.spawn({
        let signals = signals.clone();
        async move { signals.listen().await }
    });
    runtime.spawn({
        let token = signals.token();
        let proxy = proxy.clone();
        async move {
            token.cancelled().await;
            let _ = proxy.send_event(UserEvent::Shutdown);
        }
    });

    let sink: CommandSink = {
        let proxy = proxy.clone();
        Rc::new(move |command| {
            if proxy.send_event(UserEvent::Command(command)).is_err() {
                tracing::warn!("Event loop closed, dropping tray command");
            }
        })
    };
    let snapshot = ClipboardSnapshot::new();
    let mut registry = ActionRegistry::new();
    let actions = register_standard_actions(&mut registry, snapshot.clone(), sink);
    let menu = NativeMenu::build(&registry).unwrap_or_else(|e| handle_fatal(e));

    let clipboard = SystemClipboard::new()
        .map_err(|e| tracing::warn!("Clipboard not available yet: {}", e))
        .ok();

    let mut app = TrayApp {
        runtime,
        session,
        pipeline,
        registry,
        actions,
        menu,
        tray: None,
        snapshot,
        probe: ClipboardProbe::new(),
        clipboard,
        reporter: DialogReporter,
        picker: DialogFilePicker::default(),
        signals,
        proxy,
        uploads_in_flight: 0,
        next_probe: Instant::now(),
    };

    event_loop.run(move |event, _target, control_flow| {
        match event {
            Event::NewEvents(StartCause::Init) => {
                if let Err(e) = app.start() {
                    app.reporter.report_error(&e);
                    handle_fatal(e);
                }
            }
            Event::UserEvent(UserEvent::Shutdown) => {
                tracing::info!("Shutting down");
                app.tray.take();
                *control_flow = ControlFlow::Exit;
                return;
            }
            Event::UserEvent(event) => app.handle(event),
            _ => {}
        }
        *control_flow = app.tick();
    })
}
