use std::path::{Path, PathBuf};

use clap::{Args, Parser};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no secret provided, use --secret or TANMATSU_SECRET")]
    MissingSecret,

    #[error("--tlscert and --tlskey must be used together")]
    IncompleteTls,

    #[error("invalid listen address: {0}")]
    InvalidListenAddr(String),

    #[error("invalid database url: {0}")]
    InvalidDatabaseUrl(String),

    #[error("--max-limit must be positive, got {0}")]
    InvalidMaxLimit(i64),
}

/// Server configuration, read from flags with environment fallbacks
#[derive(Debug, Clone, Parser)]
#[command(name = "tanmatsu")]
#[command(about = "Serve image records behind bearer-token authentication")]
#[command(version)]
pub struct Config {
    /// HTTP listen address, e.g. ":8080" or "127.0.0.1:8080"
    #[arg(long = "http", env = "TANMATSU_HTTP", default_value = ":8080")]
    pub http_addr: String,

    #[command(flatten)]
    pub database: DatabaseConfig,

    #[command(flatten)]
    pub security: SecurityConfig,

    #[command(flatten)]
    pub tls: TlsConfig,

    #[command(flatten)]
    pub api: ApiConfig,

    /// Print the version banner and exit
    #[arg(short = 'v', long = "print-version")]
    pub print_version: bool,
}

#[derive(Debug, Clone, Args)]
pub struct DatabaseConfig {
    /// Full connection URL; overrides the individual connection flags
    #[arg(long = "database-url", env = "DATABASE_URL")]
    pub url: Option<String>,

    /// Username to use to connect to MySQL
    #[arg(long, env = "TANMATSU_DB_USER", default_value = "eribo")]
    pub user: String,

    /// Password to use to connect to MySQL
    #[arg(long, env = "TANMATSU_DB_PASS", default_value = "", hide_env_values = true)]
    pub pass: String,

    /// Host for connecting to MySQL
    #[arg(long, env = "TANMATSU_DB_HOST", default_value = "localhost")]
    pub host: String,

    /// Port for connecting to MySQL
    #[arg(long, env = "TANMATSU_DB_PORT", default_value_t = 3306)]
    pub port: u16,

    /// Database to use
    #[arg(long, env = "TANMATSU_DB_NAME", default_value = "eribo")]
    pub dbname: String,

    #[arg(long = "db-max-connections", env = "TANMATSU_DB_MAX_CONNECTIONS", default_value_t = 10)]
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn connection_url(&self) -> Result<Url, ConfigError> {
        if let Some(url) = &self.url {
            return Url::parse(url).map_err(|e| ConfigError::InvalidDatabaseUrl(e.to_string()));
        }

        let invalid = |what: &str| ConfigError::InvalidDatabaseUrl(format!("bad {}", what));

        let mut url = Url::parse("mysql://localhost/")
            .map_err(|e| ConfigError::InvalidDatabaseUrl(e.to_string()))?;
        url.set_host(Some(&self.host))
            .map_err(|e| ConfigError::InvalidDatabaseUrl(e.to_string()))?;
        url.set_port(Some(self.port)).map_err(|_| invalid("port"))?;
        url.set_username(&self.user).map_err(|_| invalid("user"))?;
        if !self.pass.is_empty() {
            url.set_password(Some(&self.pass)).map_err(|_| invalid("password"))?;
        }
        url.set_path(&format!("/{}", self.dbname));
        Ok(url)
    }
}

#[derive(Debug, Clone, Args)]
pub struct SecurityConfig {
    /// Secret to verify bearer tokens with
    #[arg(long, env = "TANMATSU_SECRET", default_value = "", hide_env_values = true)]
    pub secret: String,

    /// Accept tokens from this issuer only
    #[arg(long, env = "TANMATSU_ISSUER", default_value = "monban")]
    pub issuer: String,
}

#[derive(Debug, Clone, Default, Args)]
pub struct TlsConfig {
    /// TLS certificate in PEM format. Must be used together with --tlskey
    #[arg(long = "tlscert", env = "TANMATSU_TLS_CERT")]
    pub cert: Option<PathBuf>,

    /// TLS private key in PEM format. Must be used together with --tlscert
    #[arg(long = "tlskey", env = "TANMATSU_TLS_KEY")]
    pub key: Option<PathBuf>,
}

impl TlsConfig {
    /// Certificate and key when HTTPS is enabled
    pub fn pair(&self) -> Option<(&Path, &Path)> {
        match (&self.cert, &self.key) {
            (Some(cert), Some(key)) => Some((cert.as_path(), key.as_path())),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct ApiConfig {
    /// Largest page a client may request from /images
    #[arg(long = "max-limit", env = "TANMATSU_MAX_LIMIT", default_value_t = 100)]
    pub max_limit: i64,

    /// Echo internal error causes in response bodies (development only)
    #[arg(long, env = "TANMATSU_EXPOSE_INTERNAL_ERRORS")]
    pub expose_internal_errors: bool,
}

impl ApiConfig {
    pub fn paging(&self) -> PagingConfig {
        PagingConfig {
            max_limit: self.max_limit,
            ..PagingConfig::default()
        }
    }
}

/// Page size policy for the listing endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingConfig {
    pub default_limit: i64,
    pub max_limit: i64,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
        }
    }
}

impl Config {
    /// Refuse to start on settings the server cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.secret.is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        if self.tls.cert.is_some() != self.tls.key.is_some() {
            return Err(ConfigError::IncompleteTls);
        }
        if self.api.max_limit <= 0 {
            return Err(ConfigError::InvalidMaxLimit(self.api.max_limit));
        }
        self.listen_addr()?;
        Ok(())
    }

    /// `host:port` to bind. The host may be a name, resolved at bind time.
    /// `:8080` listens on every interface, like `0.0.0.0:8080`.
    pub fn listen_addr(&self) -> Result<String, ConfigError> {
        let invalid = || ConfigError::InvalidListenAddr(self.http_addr.clone());

        let addr = match self.http_addr.strip_prefix(':') {
            Some(port) => format!("0.0.0.0:{}", port),
            None => self.http_addr.clone(),
        };
        let (host, port) = addr.rsplit_once(':').ok_or_else(invalid)?;
        if host.is_empty() || host.contains(char::is_whitespace) {
            return Err(invalid());
        }
        port.parse::<u16>().map_err(|_| invalid())?;
        Ok(addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["tanmatsu"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap()
    }

    #[test]
    fn requires_secret() {
        let config = parse(&["--secret", ""]);
        assert!(matches!(config.validate(), Err(ConfigError::MissingSecret)));

        let config = parse(&["--secret", "s3cr3t"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn tls_needs_both_files() {
        let config = parse(&["--secret", "s", "--tlscert", "cert.pem"]);
        assert!(matches!(config.validate(), Err(ConfigError::IncompleteTls)));

        let config = parse(&["--secret", "s", "--tlscert", "cert.pem", "--tlskey", "key.pem"]);
        assert!(config.validate().is_ok());
        assert!(config.tls.pair().is_some());
    }

    #[test]
    fn listen_addr_accepts_port_only_form() {
        let config = parse(&["--secret", "s", "--http", ":9090"]);
        assert_eq!(config.listen_addr().unwrap(), "0.0.0.0:9090");

        let config = parse(&["--secret", "s", "--http", "not an address"]);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidListenAddr(_))));

        let config = parse(&["--secret", "s", "--http", "localhost:http"]);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidListenAddr(_))));
    }

    #[test]
    fn listen_addr_accepts_host_names() {
        let config = parse(&["--secret", "s", "--http", "localhost:8080"]);
        assert!(config.validate().is_ok());
        assert_eq!(config.listen_addr().unwrap(), "localhost:8080");

        let config = parse(&["--secret", "s", "--http", "[::1]:8080"]);
        assert_eq!(config.listen_addr().unwrap(), "[::1]:8080");
    }

    #[test]
    fn builds_mysql_url_from_parts() {
        let database = DatabaseConfig {
            url: None,
            user: "eribo".into(),
            pass: "p@ss".into(),
            host: "db.local".into(),
            port: 3307,
            dbname: "eribo_test".into(),
            max_connections: 5,
        };
        let url = database.connection_url().unwrap();
        assert_eq!(url.scheme(), "mysql");
        assert_eq!(url.host_str(), Some("db.local"));
        assert_eq!(url.port(), Some(3307));
        assert_eq!(url.username(), "eribo");
        assert_eq!(url.password(), Some("p%40ss"));
        assert_eq!(url.path(), "/eribo_test");
    }

    #[test]
    fn max_limit_feeds_paging() {
        let config = parse(&["--secret", "s", "--max-limit", "25"]);
        assert_eq!(config.api.paging(), PagingConfig { default_limit: 10, max_limit: 25 });

        let config = parse(&["--secret", "s", "--max-limit", "0"]);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidMaxLimit(0))));
    }
}
