//! Command result codes

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use serde::Serialize;
use std::{borrow::Cow, convert::TryFrom};

// -----------------------------------------------------------------------------------------------
// ENUMS
// -----------------------------------------------------------------------------------------------

/// Result of a command sent to the dome daemon.
///
/// Non-negative codes are returned by the daemon itself. Negative codes are never sent by the
/// daemon, they are synthesised by clients when the command could not be completed on their side.
///
/// Serialised as the bare integer sent on the wire. There is no typed deserialisation, clients read
/// the integer and render it with the total lookup functions so unrecognised values never fail.
#[derive(Serialize, Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[serde(into = "i32")]
pub enum CommandStatus {
    Succeeded,
    Failed,

    /// Another command is already running
    Blocked,

    // ---- HEARTBEAT / ENGINEERING MODE ----
    HeartbeatTimedOut,
    HeartbeatCloseInProgress,
    HeartbeatUnavailable,
    HeartbeatInvalidTimeout,
    EngineeringModeRequiresHeartbeatDisabled,
    EngineeringModeActive,

    /// The command came from an IP which is not on the control allow-list
    InvalidControlIP,

    // ---- CLIENT SIDE ----
    TerminatedByUser,
    CannotCommunicateWithDaemon,
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl CommandStatus {
    /// Every defined status.
    pub const ALL: [CommandStatus; 12] = [
        CommandStatus::Succeeded,
        CommandStatus::Failed,
        CommandStatus::Blocked,
        CommandStatus::HeartbeatTimedOut,
        CommandStatus::HeartbeatCloseInProgress,
        CommandStatus::HeartbeatUnavailable,
        CommandStatus::HeartbeatInvalidTimeout,
        CommandStatus::EngineeringModeRequiresHeartbeatDisabled,
        CommandStatus::EngineeringModeActive,
        CommandStatus::InvalidControlIP,
        CommandStatus::TerminatedByUser,
        CommandStatus::CannotCommunicateWithDaemon,
    ];

    /// Get the status for a numeric code, or `None` if the code is not recognised.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(CommandStatus::Succeeded),
            1 => Some(CommandStatus::Failed),
            2 => Some(CommandStatus::Blocked),
            3 => Some(CommandStatus::HeartbeatTimedOut),
            4 => Some(CommandStatus::HeartbeatCloseInProgress),
            5 => Some(CommandStatus::HeartbeatUnavailable),
            6 => Some(CommandStatus::HeartbeatInvalidTimeout),
            7 => Some(CommandStatus::EngineeringModeRequiresHeartbeatDisabled),
            8 => Some(CommandStatus::EngineeringModeActive),
            10 => Some(CommandStatus::InvalidControlIP),
            -100 => Some(CommandStatus::TerminatedByUser),
            -101 => Some(CommandStatus::CannotCommunicateWithDaemon),
            _ => None,
        }
    }

    /// The numeric code sent on the wire.
    pub fn code(&self) -> i32 {
        match self {
            CommandStatus::Succeeded => 0,
            CommandStatus::Failed => 1,
            CommandStatus::Blocked => 2,
            CommandStatus::HeartbeatTimedOut => 3,
            CommandStatus::HeartbeatCloseInProgress => 4,
            CommandStatus::HeartbeatUnavailable => 5,
            CommandStatus::HeartbeatInvalidTimeout => 6,
            CommandStatus::EngineeringModeRequiresHeartbeatDisabled => 7,
            CommandStatus::EngineeringModeActive => 8,
            CommandStatus::InvalidControlIP => 10,
            CommandStatus::TerminatedByUser => -100,
            CommandStatus::CannotCommunicateWithDaemon => -101,
        }
    }

    /// The fixed message for this status. `Succeeded` has no message.
    pub fn fixed_message(&self) -> Option<&'static str> {
        match self {
            CommandStatus::Succeeded => None,
            CommandStatus::Failed => Some("error: command failed"),
            CommandStatus::Blocked => Some("error: another command is already running"),
            CommandStatus::HeartbeatTimedOut => Some("error: heartbeat monitor has tripped"),
            CommandStatus::HeartbeatCloseInProgress => {
                Some("error: heartbeat monitor is closing the dome")
            }
            CommandStatus::HeartbeatUnavailable => {
                Some("error: heartbeat monitor is not available")
            }
            CommandStatus::HeartbeatInvalidTimeout => {
                Some("error: heartbeat timeout must be less than 120s")
            }
            CommandStatus::EngineeringModeRequiresHeartbeatDisabled => Some(
                "error: heartbeat monitor must be disabled before enabling engineering mode",
            ),
            CommandStatus::EngineeringModeActive => Some("error: dome is in engineering mode"),
            CommandStatus::InvalidControlIP => Some("error: command not accepted from this IP"),
            CommandStatus::TerminatedByUser => Some("error: terminated by user"),
            CommandStatus::CannotCommunicateWithDaemon => {
                Some("error: unable to communicate with dome daemon")
            }
        }
    }

    /// Human readable message for this status.
    pub fn message(&self) -> Cow<'static, str> {
        message(self.code())
    }
}

impl TryFrom<i32> for CommandStatus {
    type Error = i32;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        CommandStatus::from_code(code).ok_or(code)
    }
}

impl From<CommandStatus> for i32 {
    fn from(status: CommandStatus) -> Self {
        status.code()
    }
}

// -----------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Get a human readable message describing a command result code.
///
/// This never fails, codes without a fixed message produce an "Unknown error code" message which
/// includes the code.
pub fn message(code: i32) -> Cow<'static, str> {
    match CommandStatus::from_code(code).and_then(|s| s.fixed_message()) {
        Some(m) => Cow::Borrowed(m),
        None => Cow::Owned(format!("error: Unknown error code {}", code)),
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
