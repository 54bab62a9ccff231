//! ANSI styling toggle.

/// Controls whether rendered output carries ANSI escape sequences.
///
/// All renderers take a `Style` so callers can force plain output for
/// non-terminal destinations.
#[derive(Debug, Clone, Copy)]
pub struct Style {
    color: bool,
}

impl Style {
    /// Styling with ANSI escapes enabled.
    #[must_use]
    pub fn ansi() -> Self {
        Self { color: true }
    }

    /// Plain output, no escape sequences.
    #[must_use]
    pub fn plain() -> Self {
        Self { color: false }
    }

    /// Return `true` when ANSI escapes are enabled.
    #[must_use]
    pub fn is_color(&self) -> bool {
        self.color
    }

    /// Render a bold section heading.
    #[must_use]
    pub fn heading(&self, text: &str) -> String {
        if self.color {
            format!("\x1b[1m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    /// Paint text with 256-color background and foreground codes.
    pub(crate) fn paint(&self, text: &str, fg: u8, bg: u8) -> String {
        if self.color {
            format!("\x1b[38;5;{fg}m\x1b[48;5;{bg}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    /// Paint text with a 256-color foreground only.
    pub(crate) fn fg(&self, text: &str, fg: u8) -> String {
        if self.color {
            format!("\x1b[38;5;{fg}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Style;

    #[test]
    fn plain_heading_is_untouched() {
        assert_eq!(Style::plain().heading("Results"), "Results");
    }

    #[test]
    fn ansi_heading_is_bold_wrapped() {
        assert_eq!(Style::ansi().heading("Results"), "\x1b[1mResults\x1b[0m");
    }

    #[test]
    fn plain_paint_passes_through() {
        assert_eq!(Style::plain().paint(" 42 ", 231, 24), " 42 ");
        assert_eq!(Style::plain().fg("x", 196), "x");
    }

    #[test]
    fn ansi_paint_wraps_codes() {
        let painted = Style::ansi().paint(" 42 ", 231, 24);
        assert!(painted.contains("48;5;24"));
        assert!(painted.contains("38;5;231"));
        assert!(painted.ends_with("\x1b[0m"));
    }
}
