//! Colored console output for human-readable verdict lines.
//!
//! Color is dropped when `NO_COLOR` is set.

const GREEN: &str = "\x1b[0;32m";
const RED: &str = "\x1b[0;31m";
const YELLOW: &str = "\x1b[1;33m";
const BLUE: &str = "\x1b[0;34m";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Good,
    Bad,
    Warn,
    Info,
}

fn colors_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

pub fn paint(text: &str, tone: Tone) -> String {
    if !colors_enabled() {
        return text.to_string();
    }
    let code = match tone {
        Tone::Good => GREEN,
        Tone::Bad => RED,
        Tone::Warn => YELLOW,
        Tone::Info => BLUE,
    };
    format!("{}{}{}", code, text, RESET)
}

/// `"  PostgreSQL ... RUNNING"` with the status colored, label padded to `width`.
pub fn status_line(label: &str, width: usize, status: &str, tone: Tone) -> String {
    format!("  {:<width$} {}", label, paint(status, tone), width = width)
}

pub fn heading(text: &str) -> String {
    paint(&format!("==> {}", text), Tone::Info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_line_contains_label_and_status() {
        let line = status_line("Redis", 10, "RUNNING", Tone::Good);
        assert!(line.starts_with("  Redis"));
        assert!(line.contains("RUNNING"));
    }

    #[test]
    fn test_status_column_starts_after_padded_label() {
        std::env::set_var("NO_COLOR", "1");
        let short = status_line("Redis", 40, "RUNNING", Tone::Good);
        let long = status_line("OCR Service (transport_ocr_ocr_service)", 40, "STOPPED", Tone::Bad);
        assert_eq!(short.find("RUNNING"), long.find("STOPPED"));
    }
}
