//! Platform detection and per-platform defaults.

/// Desktop platforms GloudApp runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOS,
    Linux,
    Windows,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::MacOS => write!(f, "macOS"),
            Platform::Linux => write!(f, "Linux"),
            Platform::Windows => write!(f, "Windows"),
        }
    }
}

/// Returns the platform detected at compile time.
pub fn current_platform() -> Platform {
    if cfg!(target_os = "macos") {
        Platform::MacOS
    } else if cfg!(target_os = "windows") {
        Platform::Windows
    } else {
        Platform::Linux
    }
}

/// Screenshot command for `platform`, without the target path.
pub fn capture_command_for(platform: Platform) -> Vec<String> {
    let argv: &[&str] = match platform {
        Platform::MacOS => &["screencapture", "-x"],
        // ImageMagick; also what most X11 desktops ship.
        Platform::Linux => &["import", "-window", "root"],
        Platform::Windows => &["magick", "screenshot:"],
    };
    argv.iter().map(|s| s.to_string()).collect()
}

/// Screenshot command for the running platform.
pub fn default_capture_command() -> Vec<String> {
    capture_command_for(current_platform())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_platform_matches_cfg() {
        let platform = current_platform();
        if cfg!(target_os = "linux") {
            assert_eq!(platform, Platform::Linux);
        }
        if cfg!(target_os = "macos") {
            assert_eq!(platform, Platform::MacOS);
        }
    }

    #[test]
    fn linux_uses_imagemagick_import() {
        assert_eq!(
            capture_command_for(Platform::Linux),
            vec!["import", "-window", "root"]
        );
    }

    #[test]
    fn macos_uses_silent_screencapture() {
        assert_eq!(capture_command_for(Platform::MacOS), vec!["screencapture", "-x"]);
    }

    #[test]
    fn platform_display() {
        assert_eq!(Platform::MacOS.to_string(), "macOS");
        assert_eq!(Platform::Linux.to_string(), "Linux");
        assert_eq!(Platform::Windows.to_string(), "Windows");
    }
}
