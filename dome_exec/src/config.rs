//! # Dome daemon configuration
//!
//! The configuration is a JSON document which is validated against [`CONFIG_SCHEMA`] before any
//! field is read. Daemon and machine names in the document are checked against, and then resolved
//! through, a [`Registry`]. Loading either produces a complete [`DomeConfig`] or fails, there is
//! no partially valid configuration.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use conquer_once::Lazy;
use log::debug;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::read_to_string;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use util::{
    registry::{DaemonHandle, Registry},
    schema::{Additional, ObjectSchema, Schema, SchemaError, Validators},
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Name of the validator which checks a string is a registered daemon.
pub const DAEMON_NAME_VALIDATOR: &str = "daemon_name";

/// Name of the validator which checks a string is a registered machine.
pub const MACHINE_NAME_VALIDATOR: &str = "machine_name";

/// Keys which must be present at the top level of the document.
pub const REQUIRED_KEYS: [&str; 18] = [
    "daemon",
    "log_name",
    "control_machines",
    "serial_port",
    "serial_baud",
    "serial_timeout",
    "command_delay",
    "step_command_delay",
    "shutter_timeout",
    "has_legacy_controller",
    "has_bumper_guard",
    "slow_open_steps",
    "heartbeat_port",
    "heartbeat_baud",
    "heartbeat_timeout",
    "sides",
    "side_labels",
    "invert_on_close",
];

// ---------------------------------------------------------------------------
// STATICS
// ---------------------------------------------------------------------------

/// Schema of the configuration document.
pub static CONFIG_SCHEMA: Lazy<Schema> = Lazy::new(config_schema);

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Configuration of the dome daemon.
#[derive(Debug, Clone, PartialEq)]
pub struct DomeConfig {
    /// The daemon this configuration is for
    pub daemon: DaemonHandle,

    pub log_name: String,

    /// IPs of the machines allowed to send control commands, in configuration order
    pub control_ips: Vec<IpAddr>,

    // ---- SHUTTER CONTROLLER ----

    pub serial_port: String,
    pub serial_baud: u64,

    /// Units: seconds
    pub serial_timeout_seconds: f64,

    /// Delay between commands sent to the shutter controller.
    ///
    /// Units: seconds
    pub command_delay_seconds: f64,

    /// Delay between the steps of a slow open.
    ///
    /// Units: seconds
    pub step_command_delay_seconds: f64,

    /// Maximum time a shutter may take to open or close.
    ///
    /// Units: seconds
    pub shutter_timeout_seconds: f64,

    pub legacy_controller: bool,
    pub has_bumper_guard: bool,
    pub slow_open_steps: u64,
    pub invert_on_close: bool,

    // ---- HEARTBEAT MONITOR ----

    pub heartbeat_port: String,
    pub heartbeat_baud: u64,

    /// Units: seconds
    pub heartbeat_timeout_seconds: f64,

    // ---- SIDES ----

    /// Controller identifier for each shutter side
    pub sides: BTreeMap<String, String>,

    pub side_labels: SideLabels,

    // ---- DOMEALERT ----

    /// The auxiliary sensor daemon, `None` if not configured
    pub domealert_daemon: Option<DaemonHandle>,

    /// Belt sensor for each side, only set if `domealert_daemon` is configured
    pub domealert_belt_sensors: BeltSensors,
}

/// Human readable names of the two shutter sides.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SideLabels {
    pub a: String,
    pub b: String,
}

/// Domealert belt sensor identifiers for each shutter side.
///
/// A side is `None` when no sensor is configured for it, which is distinct from a sensor with an
/// empty identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BeltSensors {
    pub a: Option<String>,
    pub b: Option<String>,
}

/// The document as it appears on disk, only deserialised after it has passed the schema.
#[derive(Deserialize)]
struct RawConfig {
    daemon: String,
    log_name: String,
    control_machines: Vec<String>,
    serial_port: String,
    serial_baud: u64,
    serial_timeout: f64,
    command_delay: f64,
    step_command_delay: f64,
    shutter_timeout: f64,
    has_legacy_controller: bool,
    has_bumper_guard: bool,
    slow_open_steps: u64,
    heartbeat_port: String,
    heartbeat_baud: u64,
    heartbeat_timeout: f64,
    sides: BTreeMap<String, String>,
    side_labels: SideLabels,
    invert_on_close: bool,
    domealert_daemon: Option<String>,
    domealert_belt_sensors: Option<BeltSensors>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An error that occurs while loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read the config file {0:?}: {1}")]
    IoError(PathBuf, std::io::Error),

    #[error("The config file is not valid JSON: {0}")]
    ParseError(serde_json::Error),

    #[error("The config file is invalid: {0}")]
    SchemaError(SchemaError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DomeConfig {
    /// Load and validate the configuration file at `path`.
    pub fn load<P, R>(path: P, registry: &R) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
        R: Registry + ?Sized,
    {
        let path = path.as_ref();

        debug!("Loading config from {:?}", path);

        let config_str =
            read_to_string(path).map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;

        Self::from_json(&config_str, registry)
    }

    /// Parse and validate a configuration document.
    pub fn from_json<R>(json_str: &str, registry: &R) -> Result<Self, ConfigError>
    where
        R: Registry + ?Sized,
    {
        let value: Value = serde_json::from_str(json_str).map_err(ConfigError::ParseError)?;

        Self::from_value(value, registry)
    }

    /// Validate an already parsed configuration document.
    pub fn from_value<R>(value: Value, registry: &R) -> Result<Self, ConfigError>
    where
        R: Registry + ?Sized,
    {
        let validators = Validators::new()
            .register(DAEMON_NAME_VALIDATOR, |name| registry.has_daemon(name))
            .register(MACHINE_NAME_VALIDATOR, |name| registry.has_machine(name));

        CONFIG_SCHEMA
            .validate(&value, &validators)
            .map_err(ConfigError::SchemaError)?;

        debug!("Config matches schema, resolving names");

        let raw: RawConfig = serde_json::from_value(value)
            .map_err(|e| ConfigError::SchemaError(SchemaError::single("<root>", e.to_string())))?;

        let daemon = resolve_daemon(registry, "daemon", &raw.daemon)?;

        let control_ips = raw
            .control_machines
            .iter()
            .enumerate()
            .map(|(i, machine)| {
                registry.machine_ip(machine).ok_or_else(|| {
                    unresolved(&format!("control_machines[{}]", i), "machine", machine)
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        // Belt sensors are only meaningful if there's a domealert daemon to read them from
        let (domealert_daemon, domealert_belt_sensors) = match raw.domealert_daemon {
            Some(ref name) => (
                Some(resolve_daemon(registry, "domealert_daemon", name)?),
                raw.domealert_belt_sensors.unwrap_or_default(),
            ),
            None => (None, BeltSensors::default()),
        };

        Ok(DomeConfig {
            daemon,
            log_name: raw.log_name,
            control_ips,
            serial_port: raw.serial_port,
            serial_baud: raw.serial_baud,
            serial_timeout_seconds: raw.serial_timeout,
            command_delay_seconds: raw.command_delay,
            step_command_delay_seconds: raw.step_command_delay,
            shutter_timeout_seconds: raw.shutter_timeout,
            legacy_controller: raw.has_legacy_controller,
            has_bumper_guard: raw.has_bumper_guard,
            slow_open_steps: raw.slow_open_steps,
            invert_on_close: raw.invert_on_close,
            heartbeat_port: raw.heartbeat_port,
            heartbeat_baud: raw.heartbeat_baud,
            heartbeat_timeout_seconds: raw.heartbeat_timeout,
            sides: raw.sides,
            side_labels: raw.side_labels,
            domealert_daemon,
            domealert_belt_sensors,
        })
    }

    /// Returns true if commands are accepted from the given IP.
    pub fn is_control_ip(&self, ip: &IpAddr) -> bool {
        self.control_ips.contains(ip)
    }

    pub fn serial_timeout(&self) -> Duration {
        seconds_to_duration(self.serial_timeout_seconds)
    }

    pub fn command_delay(&self) -> Duration {
        seconds_to_duration(self.command_delay_seconds)
    }

    pub fn step_command_delay(&self) -> Duration {
        seconds_to_duration(self.step_command_delay_seconds)
    }

    pub fn shutter_timeout(&self) -> Duration {
        seconds_to_duration(self.shutter_timeout_seconds)
    }

    pub fn heartbeat_timeout(&self) -> Duration {
        seconds_to_duration(self.heartbeat_timeout_seconds)
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn config_schema() -> Schema {
    let side_strings = || {
        ObjectSchema::new()
            .property("a", Schema::string())
            .property("b", Schema::string())
    };

    ObjectSchema::new()
        .required(&REQUIRED_KEYS)
        .property("daemon", Schema::validated_string(DAEMON_NAME_VALIDATOR))
        .property("log_name", Schema::non_empty_string())
        .property(
            "control_machines",
            Schema::array(Schema::validated_string(MACHINE_NAME_VALIDATOR)),
        )
        .property("serial_port", Schema::string())
        .property("serial_baud", Schema::integer_min(0))
        .property("serial_timeout", Schema::number_min(0.0))
        .property("command_delay", Schema::number_min(0.0))
        .property("step_command_delay", Schema::number_min(0.0))
        .property("shutter_timeout", Schema::number_min(0.0))
        .property("has_legacy_controller", Schema::Boolean)
        .property("has_bumper_guard", Schema::Boolean)
        .property("slow_open_steps", Schema::integer_min(0))
        .property("heartbeat_port", Schema::string())
        .property("heartbeat_baud", Schema::integer_min(0))
        .property("heartbeat_timeout", Schema::number_min(0.0))
        .property(
            "sides",
            ObjectSchema::new()
                .additional(Additional::Matching(Box::new(Schema::string())))
                .into(),
        )
        .property(
            "side_labels",
            side_strings().required(&["a", "b"]).closed().into(),
        )
        .property("invert_on_close", Schema::Boolean)
        .property(
            "domealert_daemon",
            Schema::validated_string(DAEMON_NAME_VALIDATOR),
        )
        .property("domealert_belt_sensors", side_strings().closed().into())
        .closed()
        .into()
}

fn resolve_daemon<R>(registry: &R, key: &str, name: &str) -> Result<DaemonHandle, ConfigError>
where
    R: Registry + ?Sized,
{
    registry
        .daemon(name)
        .ok_or_else(|| unresolved(key, "daemon", name))
}

fn unresolved(path: &str, kind: &str, name: &str) -> ConfigError {
    ConfigError::SchemaError(SchemaError::single(
        path,
        format!("'{}' is not a registered {} name", name, kind),
    ))
}

/// Saturates rather than panicking on values too large for a `Duration`.
fn seconds_to_duration(seconds: f64) -> Duration {
    Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;
    use std::net::Ipv4Addr;
    use util::registry::StaticRegistry;

    fn ip(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 2, 6, last))
    }

    fn registry() -> StaticRegistry {
        StaticRegistry::new()
            .with_daemon("onemetre_dome", ip(1), 9004)
            .with_daemon("onemetre_domealert", ip(2), 9034)
            .with_machine("OneMetreDome", ip(1))
            .with_machine("OneMetreTCS", ip(10))
            .with_machine("GOTOServer", ip(20))
    }

    fn valid_doc() -> Value {
        json!({
            "daemon": "onemetre_dome",
            "log_name": "domed@onemetre",
            "control_machines": ["OneMetreTCS", "OneMetreDome", "GOTOServer"],
            "serial_port": "/dev/dome",
            "serial_baud": 9600,
            "serial_timeout": 3,
            "command_delay": 0.5,
            "step_command_delay": 1.5,
            "shutter_timeout": 60,
            "has_legacy_controller": false,
            "has_bumper_guard": true,
            "slow_open_steps": 4,
            "heartbeat_port": "/dev/heartbeat",
            "heartbeat_baud": 9600,
            "heartbeat_timeout": 5,
            "sides": {"a": "east", "b": "west"},
            "side_labels": {"a": "East", "b": "West"},
            "invert_on_close": false,
            "domealert_daemon": "onemetre_domealert",
            "domealert_belt_sensors": {"a": "sensor1", "b": "sensor2"}
        })
    }

    /// Write the document to disk and load it back through the public entry point.
    fn load_doc(doc: &Value) -> Result<DomeConfig, ConfigError> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dome.json");
        std::fs::write(&path, serde_json::to_string_pretty(doc).unwrap()).unwrap();

        DomeConfig::load(&path, &registry())
    }

    fn schema_error(result: Result<DomeConfig, ConfigError>) -> SchemaError {
        match result {
            Err(ConfigError::SchemaError(e)) => e,
            Err(e) => panic!("Expected a schema error, got {}", e),
            Ok(_) => panic!("Expected a schema error, config loaded"),
        }
    }

    #[test]
    fn test_load_valid() {
        let config = load_doc(&valid_doc()).unwrap();

        assert_eq!(config.daemon.name, "onemetre_dome");
        assert_eq!(config.daemon.address(), "10.2.6.1:9004".parse::<std::net::SocketAddr>().unwrap());
        assert_eq!(config.log_name, "domed@onemetre");
        assert_eq!(config.control_ips, vec![ip(10), ip(1), ip(20)]);
        assert_eq!(config.serial_port, "/dev/dome");
        assert_eq!(config.serial_baud, 9600);
        assert_eq!(config.serial_timeout_seconds, 3.0);
        assert_eq!(config.command_delay_seconds, 0.5);
        assert_eq!(config.step_command_delay_seconds, 1.5);
        assert_eq!(config.shutter_timeout_seconds, 60.0);
        assert!(!config.legacy_controller);
        assert!(config.has_bumper_guard);
        assert_eq!(config.slow_open_steps, 4);
        assert_eq!(config.heartbeat_port, "/dev/heartbeat");
        assert_eq!(config.heartbeat_baud, 9600);
        assert_eq!(config.heartbeat_timeout_seconds, 5.0);
        assert_eq!(config.sides.get("a").map(String::as_str), Some("east"));
        assert_eq!(
            config.side_labels,
            SideLabels {
                a: "East".into(),
                b: "West".into()
            }
        );
        assert!(!config.invert_on_close);
        assert_eq!(
            config.domealert_daemon.as_ref().map(|d| d.name.as_str()),
            Some("onemetre_domealert")
        );
        assert_eq!(
            config.domealert_belt_sensors,
            BeltSensors {
                a: Some("sensor1".into()),
                b: Some("sensor2".into())
            }
        );
    }

    #[test]
    fn test_accessors() {
        let config = load_doc(&valid_doc()).unwrap();

        assert_eq!(config.command_delay(), Duration::from_millis(500));
        assert_eq!(config.step_command_delay(), Duration::from_millis(1500));
        assert_eq!(config.shutter_timeout(), Duration::from_secs(60));
        assert_eq!(config.heartbeat_timeout(), Duration::from_secs(5));
        assert_eq!(config.serial_timeout(), Duration::from_secs(3));

        assert!(config.is_control_ip(&ip(20)));
        assert!(!config.is_control_ip(&ip(2)));
    }

    #[test]
    fn test_missing_required_key() {
        for key in REQUIRED_KEYS.iter() {
            let mut doc = valid_doc();
            doc.as_object_mut().unwrap().remove(*key);

            let err = schema_error(load_doc(&doc));
            assert!(err.mentions(key), "Missing {} not reported: {}", key, err);
            assert!(err.to_string().contains(&format!("'{}'", key)));
        }
    }

    #[test]
    fn test_extra_key() {
        let mut doc = valid_doc();
        doc["dome_colour"] = json!("white");

        let err = schema_error(load_doc(&doc));
        assert_eq!(err.violations.len(), 1);
        assert!(err.mentions("dome_colour"));
    }

    #[test]
    fn test_unknown_names() {
        let mut doc = valid_doc();
        doc["control_machines"] = json!(["OneMetreTCS", "NotAMachine"]);
        let err = schema_error(load_doc(&doc));
        assert!(err.mentions("control_machines"));
        assert!(err.to_string().contains("NotAMachine"));

        let mut doc = valid_doc();
        doc["daemon"] = json!("not_a_daemon");
        assert!(schema_error(load_doc(&doc)).mentions("daemon"));

        let mut doc = valid_doc();
        doc["domealert_daemon"] = json!("OneMetreDome");
        assert!(schema_error(load_doc(&doc)).mentions("domealert_daemon"));
    }

    #[test]
    fn test_empty_control_machines() {
        let mut doc = valid_doc();
        doc["control_machines"] = json!([]);

        assert!(load_doc(&doc).unwrap().control_ips.is_empty());
    }

    #[test]
    fn test_domealert_not_configured() {
        let mut doc = valid_doc();
        doc.as_object_mut().unwrap().remove("domealert_daemon");

        // Belt sensors are ignored without a daemon
        let config = load_doc(&doc).unwrap();
        assert_eq!(config.domealert_daemon, None);
        assert_eq!(config.domealert_belt_sensors.a, None);
        assert_eq!(config.domealert_belt_sensors.b, None);

        doc.as_object_mut().unwrap().remove("domealert_belt_sensors");
        let config = load_doc(&doc).unwrap();
        assert_eq!(config.domealert_daemon, None);
        assert_eq!(config.domealert_belt_sensors, BeltSensors::default());
    }

    #[test]
    fn test_belt_sensor_defaults() {
        let mut doc = valid_doc();
        doc["domealert_belt_sensors"] = json!({"a": "sensor1"});
        let config = load_doc(&doc).unwrap();
        assert!(config.domealert_daemon.is_some());
        assert_eq!(config.domealert_belt_sensors.a.as_deref(), Some("sensor1"));
        assert_eq!(config.domealert_belt_sensors.b, None);

        doc.as_object_mut().unwrap().remove("domealert_belt_sensors");
        let config = load_doc(&doc).unwrap();
        assert!(config.domealert_daemon.is_some());
        assert_eq!(config.domealert_belt_sensors, BeltSensors::default());

        // An empty identifier is still a configured sensor
        doc["domealert_belt_sensors"] = json!({"b": ""});
        let config = load_doc(&doc).unwrap();
        assert_eq!(config.domealert_belt_sensors.a, None);
        assert_eq!(config.domealert_belt_sensors.b, Some(String::new()));

        doc["domealert_belt_sensors"] = json!({"c": "sensor3"});
        assert!(schema_error(load_doc(&doc)).mentions("c"));
    }

    #[test]
    fn test_numeric_ranges() {
        let mut doc = valid_doc();
        doc["heartbeat_timeout"] = json!(-1);
        let err = schema_error(load_doc(&doc));
        assert_eq!(err.violations.len(), 1);
        assert!(err.mentions("heartbeat_timeout"));

        let mut doc = valid_doc();
        doc["serial_baud"] = json!(-9600);
        assert!(schema_error(load_doc(&doc)).mentions("serial_baud"));

        let mut doc = valid_doc();
        doc["heartbeat_baud"] = json!(9600.5);
        assert!(schema_error(load_doc(&doc)).mentions("heartbeat_baud"));

        let mut doc = valid_doc();
        doc["command_delay"] = json!("0.5");
        assert!(schema_error(load_doc(&doc)).mentions("command_delay"));

        let mut doc = valid_doc();
        doc["slow_open_steps"] = json!(0);
        doc["shutter_timeout"] = json!(0.0);
        let config = load_doc(&doc).unwrap();
        assert_eq!(config.slow_open_steps, 0);
        assert_eq!(config.shutter_timeout(), Duration::from_secs(0));
    }

    #[test]
    fn test_integer_limits() {
        let mut doc = valid_doc();
        doc["serial_baud"] = json!(9600.0);
        let err = schema_error(load_doc(&doc));
        assert_eq!(err.violations.len(), 1);
        assert!(err.mentions("serial_baud"));

        // Integers beyond u64 are parsed as floats and rejected
        let doc_str = serde_json::to_string(&valid_doc())
            .unwrap()
            .replace("\"slow_open_steps\":4", "\"slow_open_steps\":18446744073709551616");
        let err = match DomeConfig::from_json(&doc_str, &registry()) {
            Err(ConfigError::SchemaError(e)) => e,
            r => panic!("Expected a schema error, got {:?}", r.map(|_| ())),
        };
        assert_eq!(err.violations.len(), 1);
        assert!(err.mentions("slow_open_steps"));

        let mut doc = valid_doc();
        doc["slow_open_steps"] = json!(u64::MAX);
        assert_eq!(load_doc(&doc).unwrap().slow_open_steps, u64::MAX);
    }

    #[test]
    fn test_sides() {
        let mut doc = valid_doc();
        doc["sides"] = json!({"a": "east", "b": "west", "c": "roof"});
        assert_eq!(load_doc(&doc).unwrap().sides.len(), 3);

        doc["sides"] = json!({"a": 1});
        assert!(schema_error(load_doc(&doc)).mentions("sides.a"));

        let mut doc = valid_doc();
        doc["side_labels"] = json!({"a": "East"});
        assert!(schema_error(load_doc(&doc)).mentions("b"));

        doc["side_labels"] = json!({"a": "East", "b": "West", "c": "Roof"});
        assert!(schema_error(load_doc(&doc)).mentions("c"));
    }

    #[test]
    fn test_log_name() {
        let mut doc = valid_doc();
        doc["log_name"] = json!("");

        assert!(schema_error(load_doc(&doc)).mentions("log_name"));
    }

    #[test]
    fn test_all_violations_reported() {
        let mut doc = valid_doc();
        doc["serial_timeout"] = json!(-1);
        doc["has_bumper_guard"] = json!("yes");
        doc.as_object_mut().unwrap().remove("sides");

        let err = schema_error(load_doc(&doc));
        assert_eq!(err.violations.len(), 3);
    }

    #[test]
    fn test_io_error() {
        let dir = tempfile::tempdir().unwrap();

        assert!(matches!(
            DomeConfig::load(dir.path().join("missing.json"), &registry()),
            Err(ConfigError::IoError(_, _))
        ));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            DomeConfig::from_json("{\"daemon\": ", &registry()),
            Err(ConfigError::ParseError(_))
        ));
        assert!(matches!(
            DomeConfig::from_json("[]", &registry()),
            Err(ConfigError::SchemaError(_))
        ));
    }
}
