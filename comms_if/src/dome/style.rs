//! Terminal styles for status labels

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use owo_colors::OwoColorize;

// -----------------------------------------------------------------------------------------------
// CONSTANTS
// -----------------------------------------------------------------------------------------------

/// Label given to any state this build does not recognise.
pub const UNKNOWN_LABEL: &str = "UNKNOWN";

// -----------------------------------------------------------------------------------------------
// ENUMS
// -----------------------------------------------------------------------------------------------

/// Colour applied to a status label. All styled labels are also bold.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Style {
    /// Bold only, in the terminal's default colour
    Default,
    Red,
    Green,
    Cyan,
    Yellow,
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl Style {
    /// Style used for unrecognised states.
    pub const ALARM: Style = Style::Red;

    /// Name of the colour as used in console markup tags.
    pub fn name(&self) -> &'static str {
        match self {
            Style::Default => "default",
            Style::Red => "red",
            Style::Green => "green",
            Style::Cyan => "cyan",
            Style::Yellow => "yellow",
        }
    }

    /// Wrap the text in ANSI escape sequences for this style.
    pub fn paint(&self, text: &str) -> String {
        match self {
            Style::Default => text.bold().to_string(),
            Style::Red => text.red().bold().to_string(),
            Style::Green => text.green().bold().to_string(),
            Style::Cyan => text.cyan().bold().to_string(),
            Style::Yellow => text.yellow().bold().to_string(),
        }
    }

    /// Wrap the text in console markup tags for this style.
    pub fn markup(&self, text: &str) -> String {
        format!("[b][{0}]{1}[/{0}][/b]", self.name(), text)
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
