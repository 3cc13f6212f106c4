use std::path::PathBuf;

/// Creates the root clap Command.
///
/// `gloudapp [-v] [--config-dir DIR] [USERNAME PASSWORD]`. Any number of
/// positionals is accepted so that a wrong count falls back to the stored
/// or prompted credentials instead of aborting. Everything from the first
/// positional on is taken verbatim, so a password may start with `-`.
pub fn create_root_command() -> clap::Command {
    clap::Command::new("gloudapp")
        .about("Upload screenshots and files to CloudApp from the system tray")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            clap::Arg::new("credentials")
                .value_name("USERNAME PASSWORD")
                .num_args(0..)
                .trailing_var_arg(true)
                .allow_hyphen_values(true)
                .action(clap::ArgAction::Append)
                .help("CloudApp username and password"),
        )
        .arg(
            clap::Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(clap::ArgAction::SetTrue)
                .help("Enable debug logging"),
        )
        .arg(
            clap::Arg::new("config-dir")
                .long("config-dir")
                .value_name("DIR")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Directory holding config.json (default: ~/.gloudapp)"),
        )
}

/// Parsed command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    /// Raw positionals; only exactly two are used as credentials.
    pub credentials: Vec<String>,
    pub verbose: bool,
    pub config_dir: Option<PathBuf>,
}

impl CliArgs {
    pub fn from_matches(matches: &clap::ArgMatches) -> Self {
        Self {
            credentials: matches
                .get_many::<String>("credentials")
                .map(|values| values.cloned().collect())
                .unwrap_or_default(),
            verbose: matches.get_flag("verbose"),
            config_dir: matches.get_one::<PathBuf>("config-dir").cloned(),
        }
    }
}
