//! Dome shutter states

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use serde::Serialize;
use std::convert::TryFrom;

use super::{StatusTable, Style};

// -----------------------------------------------------------------------------------------------
// ENUMS
// -----------------------------------------------------------------------------------------------

/// Observed state of the dome shutters.
///
/// Serialised as the bare integer sent on the wire. There is no typed deserialisation, clients read
/// the integer and render it with the total lookup functions so unrecognised values never fail.
#[derive(Serialize, Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[serde(into = "i32")]
pub enum DomeShutterStatus {
    Closed,
    Open,
    PartiallyOpen,
    Opening,
    Closing,

    /// The shutters are being closed by the heartbeat monitor rather than by a user command
    HeartbeatMonitorForceClosing,
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl DomeShutterStatus {
    /// Every defined state, in ordinal order.
    pub const ALL: [DomeShutterStatus; 6] = [
        DomeShutterStatus::Closed,
        DomeShutterStatus::Open,
        DomeShutterStatus::PartiallyOpen,
        DomeShutterStatus::Opening,
        DomeShutterStatus::Closing,
        DomeShutterStatus::HeartbeatMonitorForceClosing,
    ];

    /// The ordinal sent on the wire.
    pub fn ordinal(&self) -> i32 {
        *self as i32
    }

    /// Render the label for a shutter ordinal, see [`super::label`].
    pub fn label(status: i32, formatted: bool) -> String {
        super::label::<Self>(status, formatted)
    }
}

impl StatusTable for DomeShutterStatus {
    fn from_ordinal(ordinal: i32) -> Option<Self> {
        usize::try_from(ordinal)
            .ok()
            .and_then(|i| Self::ALL.get(i))
            .copied()
    }

    fn label_text(&self) -> &'static str {
        match self {
            DomeShutterStatus::Closed => "CLOSED",
            DomeShutterStatus::Open => "OPEN",
            DomeShutterStatus::PartiallyOpen => "PARTIALLY OPEN",
            DomeShutterStatus::Opening => "OPENING",
            DomeShutterStatus::Closing => "CLOSING",
            DomeShutterStatus::HeartbeatMonitorForceClosing => "FORCE CLOSING",
        }
    }

    fn style(&self) -> Style {
        match self {
            DomeShutterStatus::Closed => Style::Red,
            DomeShutterStatus::Open => Style::Green,
            DomeShutterStatus::PartiallyOpen => Style::Cyan,
            DomeShutterStatus::Opening => Style::Yellow,
            DomeShutterStatus::Closing => Style::Yellow,
            DomeShutterStatus::HeartbeatMonitorForceClosing => Style::Red,
        }
    }
}

impl TryFrom<i32> for DomeShutterStatus {
    type Error = i32;

    fn try_from(ordinal: i32) -> Result<Self, Self::Error> {
        Self::from_ordinal(ordinal).ok_or(ordinal)
    }
}

impl From<DomeShutterStatus> for i32 {
    fn from(status: DomeShutterStatus) -> Self {
        status.ordinal()
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
