mod tray_app;

use std::sync::Arc;

use gloudapp_lib::capture::CommandCaptureTool;
use gloudapp_lib::cli::{create_root_command, CliArgs};
use gloudapp_lib::cloud::{CloudAppClient, DropService};
use gloudapp_lib::config::{ConfigManager, SimplifiedConfig};
use gloudapp_lib::credentials::CredentialStore;
use gloudapp_lib::errors::{handle_fatal, GloudError};
use gloudapp_lib::http_client::HttpClient;
use gloudapp_lib::pipeline::UploadPipeline;
use gloudapp_lib::report::{DialogReporter, Reporter};
use gloudapp_lib::session::SessionManager;
use gloudapp_lib::tui::TerminalPrompt;

fn main() {
    // Step 1: Parse arguments
    let matches = create_root_command().get_matches();
    let args = CliArgs::from_matches(&matches);

    // Step 2: Initialize Logger
    gloudapp_lib::logger::init(args.verbose);

    // Step 3: Runtime for network I/O; the main thread belongs to the tray
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("gloudapp-worker")
        .build()
        .unwrap_or_else(|e| handle_fatal(GloudError::Io(e)));

    // Step 4: Configuration (env first, then config.json)
    let env = SimplifiedConfig::get();
    let config_dir = args.config_dir.clone().unwrap_or_else(|| env.config_dir.clone());
    let config_manager = runtime
        .block_on(ConfigManager::initialize(&config_dir))
        .unwrap_or_else(|e| handle_fatal(e));
    let mut config = config_manager.get_config().clone();
    if let Some(api_base) = &env.api_base_override {
        tracing::info!(api_base = %api_base, "Using API endpoint from GLOUDAPP_API_BASE");
        config.api_base = api_base.clone();
    }
    tracing::debug!(
        path = %config_manager.config_path().display(),
        origin = ?config_manager.origin(),
        "Configuration loaded"
    );

    // Step 5: CloudApp client
    let http = HttpClient::new(&config).unwrap_or_else(|e| handle_fatal(e));
    let service: Arc<dyn DropService> = Arc::new(CloudAppClient::new(http, config.api_base.clone()));

    // Step 6: Log in before any tray exists
    let mut sessions = SessionManager::new(
        service,
        CredentialStore::new(env.credentials_file.clone()),
        Box::new(TerminalPrompt::new()),
    )
    .with_default_domain(config.default_domain.clone());

    let session = match runtime.block_on(sessions.bootstrap(&args.credentials)) {
        Ok(session) => session,
        Err(e) => {
            DialogReporter.report_error(&e);
            handle_fatal(e);
        }
    };
    gloudapp_lib::output::success(&format!(
        "Logged in to CloudApp as {} ({})",
        session.username(),
        session.domain()
    ));

    // Step 7: Tray
    let capture = Arc::new(CommandCaptureTool::new(config.capture_command.clone()));
    let pipeline = UploadPipeline::new(Arc::clone(session.client()), capture, &config);
    tray_app::run(runtime, session, pipeline)
}
