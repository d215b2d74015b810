//! Connection parameters and connection-string construction.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;

/// Default communication protocol.
pub const DEFAULT_PROTOCOL: &str = "TCPIP";

/// Driver option naming the default library (schema) for unqualified names.
pub const OPTION_DEFAULT_LIBRARY: &str = "i5_lib";
/// Driver option switching on system naming (`LIB/TABLE`).
pub const OPTION_SYSTEM_NAMING: &str = "i5_naming";
/// Driver option requesting a persistent native session.
pub const OPTION_PERSISTENT: &str = "persistent";

/// Prefix marking driver-option keys in a driver-manager key/value mapping.
const DRIVER_OPTION_PREFIX: &str = "driverOptions.";

/// Object naming convention of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingMode {
    /// SQL naming: `SCHEMA.TABLE`.
    Sql,
    /// System naming: `LIBRARY/FILE`.
    System,
}

impl NamingMode {
    /// Value of the `NAMING=` connection-string segment.
    pub fn as_code(&self) -> &'static str {
        match self {
            NamingMode::Sql => "0",
            NamingMode::System => "1",
        }
    }

    /// Character separating schema and object names.
    pub fn separator(&self) -> char {
        match self {
            NamingMode::Sql => '.',
            NamingMode::System => '/',
        }
    }

    /// Parse `0`/`sql` or `1`/`system`.
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "0" | "sql" => Ok(NamingMode::Sql),
            "1" | "system" => Ok(NamingMode::System),
            other => Err(Error::invalid_configuration(
                "naming",
                format!("expected 0/sql or 1/system, got '{}'", other),
            )),
        }
    }
}

/// Driver specific options passed through to the native client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverOptions {
    /// Default library used to scope catalog queries (`i5_lib`).
    pub default_library: Option<String>,
    /// System naming override (`i5_naming`).
    pub system_naming: Option<bool>,
    /// Persistent native session.
    pub persistent: bool,
    /// Any other option, forwarded untouched.
    pub extra: BTreeMap<String, String>,
}

impl DriverOptions {
    /// Set an option by its driver-manager key.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            OPTION_DEFAULT_LIBRARY => {
                let value = value.trim();
                self.default_library = (!value.is_empty()).then(|| value.to_string());
            }
            OPTION_SYSTEM_NAMING => self.system_naming = Some(parse_flag(key, value)?),
            OPTION_PERSISTENT => self.persistent = parse_flag(key, value)?,
            _ => {
                self.extra.insert(key.to_string(), value.to_string());
            }
        }
        Ok(())
    }

    /// Look up a forwarded option.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.extra.get(key).map(String::as_str)
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(Error::invalid_configuration(
            key,
            format!("expected a boolean flag, got '{}'", other),
        )),
    }
}

/// Connection parameters supplied by the driver manager.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ConnectionParams {
    /// ODBC driver name (`DRIVER=`).
    pub driver: Option<String>,
    /// Host or system name (`SYSTEM=`).
    pub host: Option<String>,
    /// Port number.
    pub port: Option<u16>,
    /// Relational database name (`DATABASE=`).
    pub dbname: Option<String>,
    /// Communication protocol.
    pub protocol: Option<String>,
    /// Naming convention (`NAMING=`).
    pub naming: Option<NamingMode>,
    /// Client character set.
    pub charset: Option<String>,
    /// User profile.
    pub user: Option<String>,
    /// Password.
    pub password: Option<String>,
    /// Driver options.
    pub driver_options: DriverOptions,
}

impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("driver", &self.driver)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .field("protocol", &self.protocol)
            .field("naming", &self.naming)
            .field("charset", &self.charset)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("driver_options", &self.driver_options)
            .finish()
    }
}

impl ConnectionParams {
    /// Create parameters for a host.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: Some(host.into()),
            ..Self::default()
        }
    }

    /// Set the ODBC driver name.
    pub fn with_driver(mut self, driver: impl Into<String>) -> Self {
        self.driver = Some(driver.into());
        self
    }

    /// Set the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the relational database name.
    pub fn with_dbname(mut self, dbname: impl Into<String>) -> Self {
        self.dbname = Some(dbname.into());
        self
    }

    /// Set the communication protocol.
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = Some(protocol.into());
        self
    }

    /// Set the naming convention.
    pub fn with_naming(mut self, naming: NamingMode) -> Self {
        self.naming = Some(naming);
        self
    }

    /// Set the client character set.
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    /// Set user and password.
    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.password = Some(password.into());
        self
    }

    /// Set the default library used to scope catalog queries.
    pub fn with_default_library(mut self, library: impl Into<String>) -> Self {
        self.driver_options.default_library = Some(library.into());
        self
    }

    /// Set a driver option.
    pub fn with_option(mut self, key: &str, value: &str) -> Result<Self> {
        self.driver_options.set(key, value)?;
        Ok(self)
    }

    /// Build parameters from a driver-manager key/value mapping.
    ///
    /// Keys prefixed with `driverOptions.` feed [`DriverOptions`]; unknown
    /// top-level keys are rejected.
    ///
    /// # Example
    ///
    /// ```
    /// use ibmi_db2::ConnectionParams;
    ///
    /// let params = ConnectionParams::from_pairs([
    ///     ("host", "as400.example.com"),
    ///     ("port", "8471"),
    ///     ("driverOptions.i5_lib", "MYLIB"),
    /// ]).unwrap();
    /// assert_eq!(params.port, Some(8471));
    /// assert_eq!(params.default_library(), Some("MYLIB"));
    /// ```
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref());
            if let Some(option) = key.strip_prefix(DRIVER_OPTION_PREFIX) {
                params.driver_options.set(option, value)?;
                continue;
            }
            let owned = Some(value.to_string());
            match key {
                "driver" => params.driver = owned,
                "host" => params.host = owned,
                "port" => {
                    let port = value.trim().parse::<u16>().map_err(|_| {
                        Error::invalid_configuration("port", format!("invalid port '{}'", value))
                    })?;
                    params.port = Some(port);
                }
                "dbname" => params.dbname = owned,
                "protocol" => params.protocol = owned,
                "naming" => params.naming = Some(NamingMode::parse(value)?),
                "charset" => params.charset = owned,
                "user" => params.user = owned,
                "password" => params.password = owned,
                "persistent" => params.driver_options.persistent = parse_flag(key, value)?,
                _ => {
                    return Err(Error::invalid_configuration(key, "unknown connection parameter"));
                }
            }
        }
        Ok(params)
    }

    /// Default library from the driver options, if configured.
    pub fn default_library(&self) -> Option<&str> {
        self.driver_options.default_library.as_deref()
    }

    /// Effective naming convention.
    ///
    /// The `i5_naming` driver option takes precedence over the `naming`
    /// parameter; with neither set, SQL naming applies.
    pub fn naming_mode(&self) -> NamingMode {
        match self.driver_options.system_naming {
            Some(true) => NamingMode::System,
            Some(false) => NamingMode::Sql,
            None => self.naming.unwrap_or(NamingMode::Sql),
        }
    }

    /// Separator between schema and object names for this session.
    pub fn schema_separator(&self) -> char {
        self.naming_mode().separator()
    }

    /// Qualify an object name with a schema using the session separator.
    pub fn qualify(&self, schema: &str, name: &str) -> String {
        format!("{}{}{}", schema, self.schema_separator(), name)
    }

    /// Build the native connection string.
    ///
    /// Segments are emitted in a fixed order (driver, system, naming,
    /// database, port, character set); absent or empty values are skipped.
    /// `NAMING=` reflects [`naming_mode`](Self::naming_mode), so the
    /// `i5_naming` option alone is enough to select system naming.
    /// Credentials are never part of the string.
    pub fn build_connection_string(&self) -> String {
        let port = self.port.map(|p| p.to_string());
        // The session must use the same convention as `schema_separator`.
        let naming = (self.naming.is_some() || self.driver_options.system_naming.is_some())
            .then(|| self.naming_mode().as_code());
        let segments = [
            ("DRIVER", self.driver.as_deref()),
            ("SYSTEM", self.host.as_deref()),
            ("NAMING", naming),
            ("DATABASE", self.dbname.as_deref()),
            ("PORT", port.as_deref()),
            ("CHARSET", self.charset.as_deref()),
        ];

        segments
            .iter()
            .filter_map(|(key, value)| match value {
                Some(v) if !v.is_empty() => Some(format!("{}={};", key, v)),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_string_order() {
        let params = ConnectionParams::new("as400")
            .with_charset("UTF-8")
            .with_port(8471)
            .with_dbname("S1234567")
            .with_naming(NamingMode::System)
            .with_driver("{IBM i Access ODBC Driver}");
        assert_eq!(
            params.build_connection_string(),
            "DRIVER={IBM i Access ODBC Driver};SYSTEM=as400;NAMING=1;DATABASE=S1234567;PORT=8471;CHARSET=UTF-8;"
        );
    }

    #[test]
    fn test_connection_string_skips_empty() {
        let mut params = ConnectionParams::new("as400").with_dbname("");
        params.driver = Some(String::new());
        assert_eq!(params.build_connection_string(), "SYSTEM=as400;");
        assert_eq!(ConnectionParams::default().build_connection_string(), "");
    }

    #[test]
    fn test_connection_string_excludes_credentials() {
        let params = ConnectionParams::new("as400").with_credentials("QUSER", "secret");
        let cs = params.build_connection_string();
        assert!(!cs.contains("QUSER"));
        assert!(!cs.contains("secret"));
    }

    #[test]
    fn test_debug_redacts_password() {
        let params = ConnectionParams::new("as400").with_credentials("QUSER", "secret");
        let dbg = format!("{:?}", params);
        assert!(dbg.contains("<redacted>"));
        assert!(!dbg.contains("secret"));
    }

    #[test]
    fn test_separator_follows_naming() {
        let sql = ConnectionParams::new("h").with_naming(NamingMode::Sql);
        assert_eq!(sql.qualify("QSYS2", "QSQPTABL"), "QSYS2.QSQPTABL");

        let system = ConnectionParams::new("h").with_naming(NamingMode::System);
        assert_eq!(system.qualify("QSYS2", "QSQPTABL"), "QSYS2/QSQPTABL");

        assert_eq!(ConnectionParams::new("h").schema_separator(), '.');
    }

    #[test]
    fn test_naming_option_overrides_param() {
        let params = ConnectionParams::new("h")
            .with_naming(NamingMode::Sql)
            .with_option(OPTION_SYSTEM_NAMING, "1")
            .unwrap();
        assert_eq!(params.schema_separator(), '/');
    }

    #[test]
    fn test_connection_string_naming_from_option() {
        let params = ConnectionParams::new("as400")
            .with_option(OPTION_SYSTEM_NAMING, "1")
            .unwrap();
        assert_eq!(params.build_connection_string(), "SYSTEM=as400;NAMING=1;");
        assert_eq!(params.qualify("QSYS2", "QSQPTABL"), "QSYS2/QSQPTABL");

        let params = ConnectionParams::new("as400")
            .with_naming(NamingMode::System)
            .with_option(OPTION_SYSTEM_NAMING, "0")
            .unwrap();
        assert_eq!(params.build_connection_string(), "SYSTEM=as400;NAMING=0;");

        let params = ConnectionParams::new("as400");
        assert_eq!(params.build_connection_string(), "SYSTEM=as400;");
    }

    #[test]
    fn test_from_pairs() {
        let params = ConnectionParams::from_pairs([
            ("host", "as400"),
            ("port", "446"),
            ("naming", "system"),
            ("user", "QUSER"),
            ("persistent", "true"),
            ("driverOptions.i5_lib", "MYLIB"),
            ("driverOptions.CommitMode", "2"),
        ])
        .unwrap();
        assert_eq!(params.host.as_deref(), Some("as400"));
        assert_eq!(params.port, Some(446));
        assert_eq!(params.naming, Some(NamingMode::System));
        assert!(params.driver_options.persistent);
        assert_eq!(params.default_library(), Some("MYLIB"));
        assert_eq!(params.driver_options.get("CommitMode"), Some("2"));
    }

    #[test]
    fn test_from_pairs_rejects_bad_values() {
        let err = ConnectionParams::from_pairs([("port", "eighty")]).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration { ref key, .. } if key == "port"));

        let err = ConnectionParams::from_pairs([("hots", "typo")]).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration { ref key, .. } if key == "hots"));

        assert!(ConnectionParams::from_pairs([("naming", "2")]).is_err());
    }

    #[test]
    fn test_blank_default_library_is_unscoped() {
        let params = ConnectionParams::new("h").with_option(OPTION_DEFAULT_LIBRARY, "  ").unwrap();
        assert_eq!(params.default_library(), None);
    }
}
