//! Styling helpers for terminal output.
//!
//! [`ReportStyle`] applies ANSI styling via the `colored` crate. It is implemented for `&str` and
//! `String` so names can be styled directly.

use colored::{ColoredString, Colorize};

/// Convenience trait for applying color and style to report output.
pub trait ReportStyle {
    fn title_style(&self) -> ColoredString;
    fn subheading_style(&self) -> ColoredString;
    fn class_style(&self) -> ColoredString;
    fn skill_style(&self) -> ColoredString;
    fn item_style(&self) -> ColoredString;
    fn location_style(&self) -> ColoredString;
    fn number_style(&self) -> ColoredString;
    fn description_style(&self) -> ColoredString;
    fn missing_style(&self) -> ColoredString;
    fn diagnostic_style(&self) -> ColoredString;
    fn error_style(&self) -> ColoredString;
}

impl ReportStyle for &str {
    fn title_style(&self) -> ColoredString {
        self.bold().truecolor(223, 77, 10).underline()
    }
    fn subheading_style(&self) -> ColoredString {
        self.underline()
    }
    fn class_style(&self) -> ColoredString {
        self.truecolor(13, 130, 60)
    }
    fn skill_style(&self) -> ColoredString {
        self.truecolor(75, 180, 255)
    }
    fn item_style(&self) -> ColoredString {
        self.truecolor(220, 180, 40)
    }
    fn location_style(&self) -> ColoredString {
        self.truecolor(223, 77, 10)
    }
    fn number_style(&self) -> ColoredString {
        self.bold()
    }
    fn description_style(&self) -> ColoredString {
        self.italic().truecolor(102, 208, 250)
    }
    fn missing_style(&self) -> ColoredString {
        self.italic().truecolor(200, 50, 50)
    }
    fn diagnostic_style(&self) -> ColoredString {
        self.dimmed().truecolor(230, 230, 30)
    }
    fn error_style(&self) -> ColoredString {
        self.truecolor(230, 30, 30)
    }
}

impl ReportStyle for String {
    fn title_style(&self) -> ColoredString {
        self.as_str().title_style()
    }
    fn subheading_style(&self) -> ColoredString {
        self.as_str().subheading_style()
    }
    fn class_style(&self) -> ColoredString {
        self.as_str().class_style()
    }
    fn skill_style(&self) -> ColoredString {
        self.as_str().skill_style()
    }
    fn item_style(&self) -> ColoredString {
        self.as_str().item_style()
    }
    fn location_style(&self) -> ColoredString {
        self.as_str().location_style()
    }
    fn number_style(&self) -> ColoredString {
        self.as_str().number_style()
    }
    fn description_style(&self) -> ColoredString {
        self.as_str().description_style()
    }
    fn missing_style(&self) -> ColoredString {
        self.as_str().missing_style()
    }
    fn diagnostic_style(&self) -> ColoredString {
        self.as_str().diagnostic_style()
    }
    fn error_style(&self) -> ColoredString {
        self.as_str().error_style()
    }
}
