//! Server configuration loading from file, in-process overrides, and
//! environment variables.

use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;
use thiserror::Error;

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "IVM_";

/// Separator between nested keys in an environment variable name.
const ENV_NESTING: &str = "__";

/// Environment variable naming the config file. Not a config key itself.
pub const CONFIG_PATH_ENV: &str = "IVM_CONFIG_PATH";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Voice-call provider credentials.
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Numbers the call is placed between.
    #[serde(default)]
    pub call: CallConfig,

    /// Voice profile names.
    #[serde(default)]
    pub voices: VoicesConfig,

    /// Values available to prompt templates as `$name`.
    #[serde(default)]
    pub variables: HashMap<String, String>,

    /// Public tunnel for local development.
    #[serde(default)]
    pub tunnel: TunnelConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host", deserialize_with = "native_or_str")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port", deserialize_with = "native_or_str")]
    pub port: u16,

    /// Address the provider can reach this server at. Defaults to
    /// `http://{host}:{port}`; replaced by the tunnel URL when a tunnel is
    /// enabled.
    #[serde(default)]
    pub public_url: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "ivm_server=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default, deserialize_with = "native_or_str")]
    pub json: bool,
}

#[derive(Clone, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub account_sid: String,

    #[serde(default)]
    pub auth_token: String,

    /// REST API root. Overridden in tests to point at a local mock.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallConfig {
    /// Caller ID, a number owned by the provider account.
    #[serde(default)]
    pub from_number: String,

    /// The number that gets called.
    #[serde(default)]
    pub to_number: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VoicesConfig {
    /// Voice for announcements and the menu.
    #[serde(default = "default_machine_voice")]
    pub machine: String,

    /// Voice for the sender's message.
    #[serde(default = "default_human_voice")]
    pub human: String,
}

#[derive(Clone, Deserialize)]
pub struct TunnelConfig {
    #[serde(default, deserialize_with = "native_or_str")]
    pub enabled: bool,

    #[serde(default)]
    pub auth_token: Option<String>,

    /// Tunnel agent executable.
    #[serde(default = "default_tunnel_binary")]
    pub binary: String,

    /// Local inspection API of the tunnel agent.
    #[serde(default = "default_inspect_url")]
    pub inspect_url: String,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_api_base_url() -> String {
    "https://api.twilio.com".to_string()
}

fn default_machine_voice() -> String {
    "Polly.Matthew-Neural".to_string()
}

fn default_human_voice() -> String {
    "Polly.Salli-Neural".to_string()
}

fn default_tunnel_binary() -> String {
    "ngrok".to_string()
}

fn default_inspect_url() -> String {
    "http://127.0.0.1:4040".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_url: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            account_sid: String::new(),
            auth_token: String::new(),
            api_base_url: default_api_base_url(),
        }
    }
}

impl Default for VoicesConfig {
    fn default() -> Self {
        Self {
            machine: default_machine_voice(),
            human: default_human_voice(),
        }
    }
}

impl Default for TunnelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            auth_token: None,
            binary: default_tunnel_binary(),
            inspect_url: default_inspect_url(),
        }
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"[REDACTED]")
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

impl fmt::Debug for TunnelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TunnelConfig")
            .field("enabled", &self.enabled)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .field("binary", &self.binary)
            .field("inspect_url", &self.inspect_url)
            .finish()
    }
}

impl ServerConfig {
    /// The base URL embedded in markup the provider fetches callbacks from.
    pub fn public_base_url(&self) -> String {
        match &self.public_url {
            Some(url) if !url.trim().is_empty() => url.clone(),
            _ => format!("http://{}:{}", self.host, self.port),
        }
    }
}

impl Config {
    /// Checks that every required field is present and non-empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("provider.account_sid", &self.provider.account_sid),
            ("provider.auth_token", &self.provider.auth_token),
            ("call.from_number", &self.call.from_number),
            ("call.to_number", &self.call.to_number),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingField(name));
            }
        }
        Ok(())
    }
}

/// Accepts either the native TOML type or its string form. Environment
/// overrides always arrive as strings.
fn native_or_str<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: fmt::Display,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NativeOrStr<T> {
        Native(T),
        Str(String),
    }

    match NativeOrStr::<T>::deserialize(deserializer)? {
        NativeOrStr::Native(value) => Ok(value),
        NativeOrStr::Str(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// The merged configuration has a value of the wrong type.
    #[error("invalid configuration: {0}")]
    Invalid(#[source] toml::de::Error),

    /// A required field is missing or empty.
    #[error("missing required configuration field: {0}")]
    MissingField(&'static str),
}

/// Loads configuration from a TOML file, explicit overrides, and the process
/// environment, in that order of increasing precedence. Defaults fill in
/// anything none of them set.
///
/// Environment variable overrides use the `IVM_` prefix with `__` between
/// nested keys, matched case-insensitively:
/// - `IVM_PROVIDER__ACCOUNT_SID` overrides `provider.account_sid`
/// - `IVM_CALL__TO_NUMBER` overrides `call.to_number`
/// - `IVM_SERVER__PORT` overrides `server.port`
/// - `IVM_VARIABLES__SUBJECT` sets the `subject` template variable
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed, if
/// a value has the wrong type, or if a required field is missing.
pub fn load_config(path: Option<&str>, overrides: Option<toml::Table>) -> Result<Config, ConfigError> {
    load_layers(path, overrides, std::env::vars())
}

/// [`load_config`] with an explicit environment.
pub fn load_layers<I>(
    path: Option<&str>,
    overrides: Option<toml::Table>,
    env: I,
) -> Result<Config, ConfigError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut table = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str::<toml::Table>(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                toml::Table::new()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => toml::Table::new(),
    };

    if let Some(overrides) = overrides {
        merge_tables(&mut table, overrides);
    }
    apply_env_overrides(&mut table, env);

    let config: Config = toml::Value::Table(table)
        .try_into()
        .map_err(ConfigError::Invalid)?;
    config.validate()?;
    Ok(config)
}

/// Recursively merges `overlay` into `base`. Tables merge key by key; any
/// other value replaces what was there.
pub fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match value {
            toml::Value::Table(incoming) => match base.get_mut(&key) {
                Some(toml::Value::Table(existing)) => merge_tables(existing, incoming),
                _ => {
                    base.insert(key, toml::Value::Table(incoming));
                }
            },
            other => {
                base.insert(key, other);
            }
        }
    }
}

fn apply_env_overrides<I>(table: &mut toml::Table, env: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    for (name, value) in env {
        if name == CONFIG_PATH_ENV {
            continue;
        }
        let Some(rest) = name.strip_prefix(ENV_PREFIX) else {
            continue;
        };
        let path: Vec<String> = rest
            .split(ENV_NESTING)
            .map(|segment| segment.to_ascii_lowercase())
            .collect();
        if path.iter().any(String::is_empty) {
            tracing::warn!(var = %name, "ignoring malformed config environment variable");
            continue;
        }
        set_path(table, &path, toml::Value::String(value));
    }
}

fn set_path(table: &mut toml::Table, path: &[String], value: toml::Value) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };
    let mut current = table;
    for key in parents {
        let entry = current
            .entry(key.clone())
            .or_insert(toml::Value::Table(toml::Table::new()));
        if !entry.is_table() {
            *entry = toml::Value::Table(toml::Table::new());
        }
        current = match entry {
            toml::Value::Table(t) => t,
            _ => unreachable!("entry was just replaced with a table"),
        };
    }
    current.insert(last.clone(), value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const REQUIRED: &str = r#"
        [provider]
        account_sid = "AC123"
        auth_token = "secret"

        [call]
        from_number = "+15550001111"
        to_number = "+15550002222"
    "#;

    fn env(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("should create temp file");
        file.write_all(contents.as_bytes())
            .expect("should write config");
        file
    }

    #[test]
    fn defaults_fill_optional_fields() {
        let file = write_config(REQUIRED);
        let config = load_layers(file.path().to_str(), None, env(&[])).unwrap();

        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.public_base_url(), "http://127.0.0.1:5000");
        assert_eq!(config.voices.machine, "Polly.Matthew-Neural");
        assert_eq!(config.voices.human, "Polly.Salli-Neural");
        assert_eq!(config.provider.api_base_url, "https://api.twilio.com");
        assert!(!config.tunnel.enabled);
        assert!(config.variables.is_empty());
    }

    #[test]
    fn later_layers_override_earlier_ones() {
        let file = write_config(&format!(
            "{REQUIRED}\n[variables]\nsubject = \"from file\"\nfrom_name = \"File\"\n"
        ));
        let overrides: toml::Table = toml::from_str(
            r#"
            [variables]
            subject = "from overrides"
            email = "o@example.com"
            "#,
        )
        .unwrap();

        let config = load_layers(
            file.path().to_str(),
            Some(overrides),
            env(&[
                ("IVM_VARIABLES__SUBJECT", "from env"),
                ("IVM_SERVER__PORT", "8080"),
                ("IVM_LOGGING__JSON", "true"),
                ("UNRELATED", "ignored"),
            ]),
        )
        .unwrap();

        assert_eq!(config.variables["subject"], "from env");
        assert_eq!(config.variables["from_name"], "File");
        assert_eq!(config.variables["email"], "o@example.com");
        assert_eq!(config.server.port, 8080);
        assert!(config.logging.json);
        assert_eq!(config.provider.account_sid, "AC123");
    }

    #[test]
    fn env_alone_can_supply_required_fields() {
        let config = load_layers(
            None,
            None,
            env(&[
                ("IVM_PROVIDER__ACCOUNT_SID", "AC1"),
                ("IVM_PROVIDER__AUTH_TOKEN", "tok"),
                ("IVM_CALL__FROM_NUMBER", "+1555"),
                ("IVM_CALL__TO_NUMBER", "+1666"),
                ("IVM_CONFIG_PATH", "/does/not/matter.toml"),
            ]),
        )
        .unwrap();

        assert_eq!(config.call.from_number, "+1555");
        assert_eq!(config.call.to_number, "+1666");
    }

    #[test]
    fn missing_required_field_is_fatal() {
        let err = load_layers(
            None,
            None,
            env(&[
                ("IVM_PROVIDER__ACCOUNT_SID", "AC1"),
                ("IVM_CALL__FROM_NUMBER", "+1555"),
                ("IVM_CALL__TO_NUMBER", "+1666"),
            ]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("provider.auth_token")));
    }

    #[test]
    fn blank_required_field_is_fatal() {
        let file = write_config(&REQUIRED.replace("\"+15550002222\"", "\"  \""));
        let err = load_layers(file.path().to_str(), None, env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("call.to_number")));
    }

    #[test]
    fn wrong_type_is_fatal() {
        let err = load_layers(
            None,
            None,
            env(&[
                ("IVM_PROVIDER__ACCOUNT_SID", "AC1"),
                ("IVM_PROVIDER__AUTH_TOKEN", "tok"),
                ("IVM_CALL__FROM_NUMBER", "+1555"),
                ("IVM_CALL__TO_NUMBER", "+1666"),
                ("IVM_SERVER__PORT", "not-a-port"),
            ]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{err}");

        let file = write_config(&format!("{REQUIRED}\n[variables]\nyear = 2024\n"));
        let err = load_layers(file.path().to_str(), None, env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{err}");
    }

    #[test]
    fn unparseable_file_is_fatal() {
        let file = write_config("[provider\naccount_sid = ");
        let err = load_layers(file.path().to_str(), None, env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_falls_back_to_other_layers() {
        let overrides: toml::Table = toml::from_str(REQUIRED).unwrap();
        let config = load_layers(
            Some("/nonexistent/ivm-config.toml"),
            Some(overrides),
            env(&[]),
        )
        .unwrap();
        assert_eq!(config.provider.account_sid, "AC123");
    }

    #[test]
    fn explicit_public_url_wins() {
        let file = write_config(&format!(
            "{REQUIRED}\n[server]\npublic_url = \"https://ivm.example.com\"\n"
        ));
        let config = load_layers(file.path().to_str(), None, env(&[])).unwrap();
        assert_eq!(config.server.public_base_url(), "https://ivm.example.com");
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let mut config = Config::default();
        config.provider.auth_token = "super-secret".to_string();
        config.tunnel.auth_token = Some("tunnel-secret".to_string());
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(!debug.contains("tunnel-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn merge_replaces_scalars_and_merges_tables() {
        let mut base: toml::Table = toml::from_str("a = 1\n[t]\nx = 1\ny = 2\n").unwrap();
        let overlay: toml::Table = toml::from_str("a = 2\n[t]\ny = 3\nz = 4\n").unwrap();
        merge_tables(&mut base, overlay);
        assert_eq!(base["a"].as_integer(), Some(2));
        assert_eq!(base["t"]["x"].as_integer(), Some(1));
        assert_eq!(base["t"]["y"].as_integer(), Some(3));
        assert_eq!(base["t"]["z"].as_integer(), Some(4));
    }
}
