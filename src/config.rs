use std::{env, fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};

/// Database connection settings, supplied by the operator through a YAML file
/// and/or `RELEVE_DB_*` environment variables. Credentials are never compiled
/// into the binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub dbname: String,
    pub user: String,
    #[serde(default)]
    pub password: String,
    /// Schema-qualified view holding the relevé records.
    #[serde(default = "default_view")]
    pub view: String,
}

fn default_port() -> u16 {
    5432
}

fn default_view() -> String {
    "geonature.v_releves_phytosocioceno".to_string()
}

impl DbConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening config file {path:?}"))?;
        let reader = BufReader::new(file);
        let mut config: DbConfig =
            serde_yaml::from_reader(reader).with_context(|| format!("Parsing {path:?}"))?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Builds a configuration from environment variables alone, for callers
    /// that do not pass `--config`.
    pub fn from_env() -> Result<Self> {
        let mut config = DbConfig {
            host: String::new(),
            port: default_port(),
            dbname: String::new(),
            user: String::new(),
            password: String::new(),
            view: default_view(),
        };
        config.apply_env_overrides();
        if config.host.is_empty() {
            bail!(
                "No database configuration: pass --config or set RELEVE_DB_HOST, \
                 RELEVE_DB_NAME and RELEVE_DB_USER"
            );
        }
        config.validate()?;
        Ok(config)
    }

    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::from_env(),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(host) = env::var("RELEVE_DB_HOST") {
            self.host = host;
        }
        if let Ok(port) = env::var("RELEVE_DB_PORT") {
            if let Ok(parsed) = port.parse() {
                self.port = parsed;
            }
        }
        if let Ok(dbname) = env::var("RELEVE_DB_NAME") {
            self.dbname = dbname;
        }
        if let Ok(user) = env::var("RELEVE_DB_USER") {
            self.user = user;
        }
        if let Ok(password) = env::var("RELEVE_DB_PASSWORD") {
            self.password = password;
        }
        if let Ok(view) = env::var("RELEVE_DB_VIEW") {
            self.view = view;
        }
    }

    fn validate(&self) -> Result<()> {
        if self.dbname.is_empty() || self.user.is_empty() {
            bail!("Database configuration requires dbname and user");
        }
        validate_view_name(&self.view)
    }

    /// libpq-style keyword/value connection string.
    pub fn connection_string(&self) -> String {
        let mut parts = vec![
            format!("host={}", self.host),
            format!("port={}", self.port),
            format!("dbname={}", self.dbname),
            format!("user={}", self.user),
        ];
        if !self.password.is_empty() {
            parts.push(format!("password={}", self.password));
        }
        parts.join(" ")
    }
}

/// The view name is operator configuration spliced into the SELECT text, so
/// restrict it to identifier characters. User filter values never take this
/// path; they are always bound parameters.
pub fn validate_view_name(view: &str) -> Result<()> {
    let valid = !view.is_empty()
        && view
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.'));
    if !valid {
        return Err(anyhow!("Invalid view name '{view}'"));
    }
    Ok(())
}
