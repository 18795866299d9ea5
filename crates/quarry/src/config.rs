//! Connection settings, one entry per symbolic database key.
//!
//! ```toml
//! [database.goradd]
//! driver = "mysql"
//! host = "127.0.0.1"
//! port = 3306
//! user = "root"
//! database = "goradd"
//! timezone = "UTC"
//!
//! [database.goradd.params]
//! sql_mode = "ANSI_QUOTES"
//! ```

use quarry_core::{
    driver::{Session, Tls},
    err,
    schema::Dialect,
    Error, Result,
};

use indexmap::IndexMap;
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: IndexMap<String, DatabaseConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub driver: DriverKind,

    #[serde(default = "default_host")]
    pub host: String,

    /// Defaults to the driver's standard port
    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub user: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    pub database: String,

    /// Fixed session time zone. `UTC` is recommended.
    #[serde(default)]
    pub timezone: Option<String>,

    /// Parse date and time columns in the driver. When false they are
    /// returned as text.
    #[serde(default = "default_parse_time")]
    pub parse_time: bool,

    #[serde(default)]
    pub tls: Tls,

    /// Runtime parameters set when a session starts
    #[serde(default)]
    pub params: IndexMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    Mysql,
    #[serde(alias = "postgres")]
    Postgresql,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_parse_time() -> bool {
    true
}

impl Config {
    pub fn from_toml_str(src: &str) -> Result<Config> {
        let config: Config = toml::from_str(src)?;
        for (key, db) in &config.database {
            db.validate()
                .map_err(|err| err.context(err!("invalid configuration for database `{key}`")))?;
        }
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path).map_err(|err| {
            Error::invalid_config(format!("failed to read `{}`: {err}", path.display()))
        })?;
        Config::from_toml_str(&src)
    }

    pub fn get(&self, key: &str) -> Result<&DatabaseConfig> {
        self.database
            .get(key)
            .ok_or_else(|| Error::invalid_config(format!("no database configured for key `{key}`")))
    }
}

impl DatabaseConfig {
    pub fn new(driver: DriverKind, database: impl Into<String>) -> Self {
        DatabaseConfig {
            driver,
            host: default_host(),
            port: None,
            user: None,
            password: None,
            database: database.into(),
            timezone: None,
            parse_time: true,
            tls: Tls::default(),
            params: IndexMap::new(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.database.is_empty() {
            return Err(Error::invalid_config("`database` must not be empty"));
        }
        if self.host.is_empty() {
            return Err(Error::invalid_config("`host` must not be empty"));
        }
        Ok(())
    }

    pub fn dialect(&self) -> Dialect {
        match self.driver {
            DriverKind::Mysql => Dialect::Mysql,
            DriverKind::Postgresql => Dialect::Postgresql,
        }
    }

    /// Renders the connection URL understood by the configured driver.
    /// Session settings are not part of the URL; see [`DatabaseConfig::session`].
    pub fn url(&self) -> Result<String> {
        self.validate()?;

        let scheme = match self.driver {
            DriverKind::Mysql => "mysql",
            DriverKind::Postgresql => "postgresql",
        };

        let mut url = Url::parse(&format!("{scheme}://{}", self.host))?;

        let invalid = |what: &str| Error::invalid_config(format!("invalid {what} for `{}`", self.host));

        if let Some(user) = &self.user {
            url.set_username(user).map_err(|_| invalid("user"))?;
        }
        if let Some(password) = &self.password {
            url.set_password(Some(password)).map_err(|_| invalid("password"))?;
        }
        if let Some(port) = self.port {
            url.set_port(Some(port)).map_err(|_| invalid("port"))?;
        }
        url.set_path(&self.database);

        Ok(url.to_string())
    }

    /// Parses a connection URL such as `mysql://root@127.0.0.1:3306/goradd`.
    /// Query parameters become session parameters, except `timezone`.
    pub fn from_url(url: &str) -> Result<DatabaseConfig> {
        let url = Url::parse(url)?;

        let driver = match url.scheme() {
            "mysql" => DriverKind::Mysql,
            "postgresql" | "postgres" => DriverKind::Postgresql,
            scheme => {
                return Err(Error::invalid_config(format!(
                    "unsupported database URL scheme `{scheme}`"
                )))
            }
        };

        let decode = |s: &str| -> Result<String> {
            percent_decode_str(s)
                .decode_utf8()
                .map(|s| s.into_owned())
                .map_err(|_| Error::invalid_config("database URL is not valid UTF-8"))
        };

        let mut config = DatabaseConfig::new(driver, decode(url.path().trim_start_matches('/'))?);
        if let Some(host) = url.host_str() {
            config.host = host.to_string();
        }
        config.port = url.port();
        if !url.username().is_empty() {
            config.user = Some(decode(url.username())?);
        }
        config.password = url.password().map(decode).transpose()?;

        for (name, value) in url.query_pairs() {
            match &*name {
                "timezone" => config.timezone = Some(value.into_owned()),
                _ => {
                    config.params.insert(name.into_owned(), value.into_owned());
                }
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn session(&self) -> Session {
        Session {
            timezone: self.timezone.clone(),
            params: self.params.clone(),
            parse_time: self.parse_time,
            tls: self.tls,
        }
    }
}
