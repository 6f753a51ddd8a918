//! # Dome Interface
//!
//! Status codes and states exchanged between the dome daemon and its clients.
//!
//! All values cross the process boundary as bare integers, so every lookup in this module is total:
//! a code or ordinal that this build does not know about is rendered as an `UNKNOWN` label (or an
//! "Unknown error code" message) rather than producing an error. This keeps older and newer
//! clients usable against a daemon of a different version.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

mod command;
mod heartbeat;
mod shutter;
mod style;

// -----------------------------------------------------------------------------------------------
// EXPORTS
// -----------------------------------------------------------------------------------------------

pub use command::*;
pub use heartbeat::*;
pub use shutter::*;
pub use style::*;

// -----------------------------------------------------------------------------------------------
// TRAITS
// -----------------------------------------------------------------------------------------------

/// A closed set of states which are reported as integer ordinals and have a presentation table.
pub trait StatusTable: Sized + Copy {
    /// Get the state for the given ordinal, or `None` if the ordinal is not recognised.
    fn from_ordinal(ordinal: i32) -> Option<Self>;

    /// The plain, human readable label for this state.
    fn label_text(&self) -> &'static str;

    /// The terminal style used when this state is rendered with formatting.
    fn style(&self) -> Style;
}

// -----------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Render the label for the state with the given ordinal.
///
/// If `formatted` is set the label is wrapped in ANSI terminal styling. Unrecognised ordinals are
/// rendered as `UNKNOWN`, which is always bold red when formatted.
pub fn label<T: StatusTable>(ordinal: i32, formatted: bool) -> String {
    match (T::from_ordinal(ordinal), formatted) {
        (Some(s), true) => s.style().paint(s.label_text()),
        (Some(s), false) => s.label_text().to_string(),
        (None, true) => Style::ALARM.paint(UNKNOWN_LABEL),
        (None, false) => UNKNOWN_LABEL.to_string(),
    }
}

/// Render the label for the state with the given ordinal using console markup tags, for example
/// `[b][green]OPEN[/green][/b]`.
pub fn markup_label<T: StatusTable>(ordinal: i32) -> String {
    match T::from_ordinal(ordinal) {
        Some(s) => s.style().markup(s.label_text()),
        None => Style::ALARM.markup(UNKNOWN_LABEL),
    }
}
