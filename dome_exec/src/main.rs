//! # Dome Executable
//!
//! Operator tool for the dome daemon:
//! - `check` validates a daemon configuration file against the name registry, logging a summary
//!   of the configuration into a new session.
//! - `status` describes a command result code, shutter state, or heartbeat state reported by the
//!   daemon.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Result};
use comms_if::dome::{self, DomeHeartbeatStatus, DomeShutterStatus, StatusTable};
use log::{error, info};
use std::path::{Path, PathBuf};
use structopt::{clap::AppSettings, StructOpt};

// Internal
use dome_lib::DomeConfig;
use util::{
    logger::{logger_init, LevelFilter},
    params,
    registry::StaticRegistry,
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Registry file used when none is given, relative to the params directory.
const DEFAULT_REGISTRY_FILE: &str = "registry.toml";

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "dome_exec", about = "Dome daemon configuration and status tool")]
enum Cmd {
    /// Validate a dome daemon configuration file
    Check {
        /// Path to the JSON configuration file
        #[structopt(parse(from_os_str))]
        config: PathBuf,

        /// Path to the registry TOML file, defaults to `params/registry.toml` in the software
        /// root
        #[structopt(short, long, parse(from_os_str))]
        registry: Option<PathBuf>,
    },

    /// Describe a status value reported by the dome daemon
    Status {
        /// Use terminal colours
        #[structopt(short, long)]
        formatted: bool,

        /// Use console markup tags instead of terminal colours
        #[structopt(short, long, conflicts_with = "formatted")]
        markup: bool,

        #[structopt(subcommand)]
        kind: StatusKind,
    },
}

#[derive(Debug, StructOpt)]
enum StatusKind {
    /// A command result code
    #[structopt(setting = AppSettings::AllowNegativeNumbers)]
    Command {
        code: i32,
    },

    /// A shutter state ordinal
    #[structopt(setting = AppSettings::AllowNegativeNumbers)]
    Shutter {
        ordinal: i32,
    },

    /// A heartbeat monitor state ordinal
    #[structopt(setting = AppSettings::AllowNegativeNumbers)]
    Heartbeat {
        ordinal: i32,
    },
}

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    match Cmd::from_args() {
        Cmd::Check { config, registry } => check(&config, registry),
        Cmd::Status {
            formatted,
            markup,
            kind,
        } => {
            println!("{}", describe(&kind, formatted, markup));
            Ok(())
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn check(config_path: &Path, registry_path: Option<PathBuf>) -> Result<()> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("dome_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    info!("Dome Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD REGISTRY ----

    let registry: StaticRegistry = match registry_path {
        Some(p) => params::load_file(p),
        None => params::load(DEFAULT_REGISTRY_FILE),
    }
    .wrap_err("Failed to load the registry")?;

    let (num_daemons, num_machines) = registry.counts();
    info!(
        "Registry loaded ({} daemons, {} machines)",
        num_daemons, num_machines
    );

    // ---- LOAD CONFIG ----

    let config = match DomeConfig::load(config_path, &registry) {
        Ok(c) => c,
        Err(e) => {
            error!("{}", e);
            return Err(e).wrap_err("Failed to load the configuration");
        }
    };

    info!("Configuration loaded from {:?}", config_path);
    info!("    Daemon: {} ({})", config.daemon.name, config.daemon.address());
    info!("    Log name: {}", config.log_name);
    info!("    Control IPs: {:?}", config.control_ips);
    info!(
        "    Shutter controller: {} @ {} baud, timeout {:?}",
        config.serial_port,
        config.serial_baud,
        config.serial_timeout()
    );
    info!(
        "    Heartbeat monitor: {} @ {} baud, timeout {:?}",
        config.heartbeat_port,
        config.heartbeat_baud,
        config.heartbeat_timeout()
    );
    info!(
        "    Sides: {:?} ({} / {})",
        config.sides, config.side_labels.a, config.side_labels.b
    );
    match config.domealert_daemon {
        Some(ref d) => info!(
            "    Domealert: {} ({}), belt sensors {:?}",
            d.name,
            d.address(),
            config.domealert_belt_sensors
        ),
        None => info!("    Domealert: not configured"),
    }

    info!("Configuration is valid");

    Ok(())
}

fn describe(kind: &StatusKind, formatted: bool, markup: bool) -> String {
    match kind {
        StatusKind::Command { code } => dome::message(*code).into_owned(),
        StatusKind::Shutter { ordinal } => {
            state_label::<DomeShutterStatus>(*ordinal, formatted, markup)
        }
        StatusKind::Heartbeat { ordinal } => {
            state_label::<DomeHeartbeatStatus>(*ordinal, formatted, markup)
        }
    }
}

fn state_label<T: StatusTable>(ordinal: i32, formatted: bool, markup: bool) -> String {
    if markup {
        dome::markup_label::<T>(ordinal)
    } else {
        dome::label::<T>(ordinal, formatted)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_describe() {
        assert_eq!(
            describe(&StatusKind::Command { code: -101 }, false, false),
            "error: unable to communicate with dome daemon"
        );
        assert_eq!(
            describe(&StatusKind::Command { code: 99 }, true, false),
            "error: Unknown error code 99"
        );
        assert_eq!(describe(&StatusKind::Shutter { ordinal: 3 }, false, false), "OPENING");
        assert_eq!(
            describe(&StatusKind::Heartbeat { ordinal: 1 }, false, true),
            "[b][green]ACTIVE[/green][/b]"
        );
        assert_eq!(
            describe(&StatusKind::Heartbeat { ordinal: 9 }, true, false),
            DomeHeartbeatStatus::label(9, true)
        );
    }

    #[test]
    fn test_args() {
        let cmd = Cmd::from_iter_safe(vec!["dome_exec", "status", "-f", "command", "-100"]).unwrap();

        match cmd {
            Cmd::Status {
                formatted: true,
                markup: false,
                kind: StatusKind::Command { code: -100 },
            } => (),
            c => panic!("Unexpected command {:?}", c),
        }
    }
}
