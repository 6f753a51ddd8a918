//! Dome heartbeat monitor states

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use serde::Serialize;
use std::convert::TryFrom;

use super::{StatusTable, Style};

// -----------------------------------------------------------------------------------------------
// ENUMS
// -----------------------------------------------------------------------------------------------

/// State of the heartbeat monitor which closes the dome if the daemon stops pinging it.
///
/// This is independent of the shutter position.
///
/// Serialised as the bare integer sent on the wire. There is no typed deserialisation, clients read
/// the integer and render it with the total lookup functions so unrecognised values never fail.
#[derive(Serialize, Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[serde(into = "i32")]
pub enum DomeHeartbeatStatus {
    /// Monitor is not running
    Disabled,

    /// Monitor is armed and waiting for pings
    Active,

    /// Monitor has tripped and is closing the dome
    TrippedClosing,

    /// Monitor has tripped and the dome has finished closing
    TrippedIdle,

    /// Monitor hardware cannot be reached
    Unavailable,
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl DomeHeartbeatStatus {
    /// Every defined state, in ordinal order.
    pub const ALL: [DomeHeartbeatStatus; 5] = [
        DomeHeartbeatStatus::Disabled,
        DomeHeartbeatStatus::Active,
        DomeHeartbeatStatus::TrippedClosing,
        DomeHeartbeatStatus::TrippedIdle,
        DomeHeartbeatStatus::Unavailable,
    ];

    /// The ordinal sent on the wire.
    pub fn ordinal(&self) -> i32 {
        *self as i32
    }

    /// Render the label for a heartbeat ordinal, see [`super::label`].
    pub fn label(status: i32, formatted: bool) -> String {
        super::label::<Self>(status, formatted)
    }
}

impl StatusTable for DomeHeartbeatStatus {
    fn from_ordinal(ordinal: i32) -> Option<Self> {
        usize::try_from(ordinal)
            .ok()
            .and_then(|i| Self::ALL.get(i))
            .copied()
    }

    fn label_text(&self) -> &'static str {
        match self {
            DomeHeartbeatStatus::Disabled => "DISABLED",
            DomeHeartbeatStatus::Active => "ACTIVE",
            DomeHeartbeatStatus::TrippedClosing => "CLOSING DOME",
            DomeHeartbeatStatus::TrippedIdle => "TRIPPED",
            DomeHeartbeatStatus::Unavailable => "UNAVAILABLE",
        }
    }

    fn style(&self) -> Style {
        match self {
            DomeHeartbeatStatus::Disabled => Style::Default,
            DomeHeartbeatStatus::Active => Style::Green,
            DomeHeartbeatStatus::TrippedClosing => Style::Red,
            DomeHeartbeatStatus::TrippedIdle => Style::Red,
            DomeHeartbeatStatus::Unavailable => Style::Yellow,
        }
    }
}

impl TryFrom<i32> for DomeHeartbeatStatus {
    type Error = i32;

    fn try_from(ordinal: i32) -> Result<Self, Self::Error> {
        Self::from_ordinal(ordinal).ok_or(ordinal)
    }
}

impl From<DomeHeartbeatStatus> for i32 {
    fn from(status: DomeHeartbeatStatus) -> Self {
        status.ordinal()
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
