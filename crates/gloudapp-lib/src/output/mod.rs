//! Coloured console messages for the operator running GloudApp from a terminal.

use crossterm::style::{Color, Stylize};

/// Print a success message in green to stdout.
pub fn success(msg: &str) {
    println!("{}", msg.with(Color::Green));
}

/// Print an error message in red to stderr.
pub fn error(msg: &str) {
    eprintln!("{}", msg.with(Color::Red));
}

/// Print a warning message in yellow to stderr.
pub fn warning(msg: &str) {
    eprintln!("{}", msg.with(Color::Yellow));
}

/// Print an info message in cyan to stdout.
pub fn info(msg: &str) {
    println!("{}", msg.with(Color::Cyan));
}

/// Console line announcing a finished upload.
pub fn uploaded_line(url: &str) -> String {
    format!("URL (in clipboard, too): {url}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helpers_do_not_panic() {
        success("Uploaded");
        error("Something went wrong");
        warning("Careful now");
        info("FYI");
    }

    #[test]
    fn test_uploaded_line() {
        assert_eq!(
            uploaded_line("https://cl.ly/abc"),
            "URL (in clipboard, too): https://cl.ly/abc"
        );
    }
}
