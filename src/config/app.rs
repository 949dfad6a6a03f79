use std::fmt;
use std::str::FromStr;

use harbor_core::config::{ConfigBuilder, EnvSource};

use super::ConfigError;

pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Process-wide configuration, read once at startup.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// `NODE_ENV`, the deployment environment name.
    pub environment: String,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub gcs: GcsConfig,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    /// Configured listen port (`SERVER_PORT`). `PORT` still takes priority.
    pub port: Option<u16>,
    /// `CORS_ENABLED`. Reported at startup; the CORS policy itself is fixed.
    pub cors: bool,
    /// `APP_SNAPSHOT`: log the route table while booting.
    pub snapshot: bool,
    /// `DEPLOY_DEBUG`: raise the deployment report from debug to info.
    pub deploy_debug: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub name: Option<String>,
}

#[derive(Clone, Default, PartialEq, Eq)]
pub struct JwtConfig {
    pub secret: Option<String>,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GcsConfig {
    pub project_id: Option<String>,
    pub bucket_name: Option<String>,
    pub key_file: Option<String>,
    /// `GOOGLE_APPLICATION_CREDENTIALS`
    pub application_credentials: Option<String>,
}

impl ConfigBuilder for AppConfig {
    type Error = ConfigError;

    fn build<E: EnvSource + ?Sized>(env: &E) -> Result<Self, ConfigError> {
        let environment = env.non_empty("NODE_ENV").unwrap_or_else(|| {
            tracing::warn!("cannot read `NODE_ENV` defaulting to `{}`", DEFAULT_ENVIRONMENT);

            DEFAULT_ENVIRONMENT.into()
        });

        let server = ServerConfig {
            port: number(env, "SERVER_PORT")?,
            cors: flag(env, "CORS_ENABLED", true)?,
            snapshot: flag(env, "APP_SNAPSHOT", false)?,
            deploy_debug: flag(env, "DEPLOY_DEBUG", false)?,
        };

        let database = DatabaseConfig {
            host: env.non_empty("DATABASE_HOST"),
            port: number(env, "DATABASE_PORT")?,
            user: env.non_empty("DATABASE_USER"),
            name: env.non_empty("DATABASE_NAME"),
        };

        let jwt = JwtConfig {
            secret: env.non_empty("JWT_SECRET"),
        };

        let gcs = GcsConfig {
            project_id: env.non_empty("GCS_PROJECT_ID"),
            bucket_name: env.non_empty("GCS_BUCKET_NAME"),
            key_file: env.non_empty("GCS_KEY_FILE"),
            application_credentials: env.non_empty("GOOGLE_APPLICATION_CREDENTIALS"),
        };

        Ok(AppConfig {
            environment,
            server,
            database,
            jwt,
            gcs,
        })
    }
}

fn number<E, T>(env: &E, key: &'static str) -> Result<Option<T>, ConfigError>
where
    E: EnvSource + ?Sized,
    T: FromStr,
{
    let Some(raw) = env.non_empty(key) else {
        return Ok(None);
    };

    raw.trim()
        .parse()
        .map(Some)
        .map_err(|_| ConfigError::InvalidNumber { key, value: raw })
}

fn flag<E>(env: &E, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    E: EnvSource + ?Sized,
{
    let Some(raw) = env.non_empty(key) else {
        return Ok(default);
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag { key, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_VARS: [(&str, &str); 0] = [];

    #[test]
    fn defaults_for_an_empty_environment() {
        let config = AppConfig::build(&NO_VARS).unwrap();

        assert_eq!(config.environment, "development");
        assert_eq!(
            config.server,
            ServerConfig {
                port: None,
                cors: true,
                snapshot: false,
                deploy_debug: false,
            }
        );
        assert_eq!(config.database, DatabaseConfig::default());
        assert_eq!(config.jwt, JwtConfig::default());
        assert_eq!(config.gcs, GcsConfig::default());
    }

    #[test]
    fn reads_every_section() {
        let env = [
            ("NODE_ENV", "production"),
            ("SERVER_PORT", "8080"),
            ("CORS_ENABLED", "off"),
            ("APP_SNAPSHOT", "Yes"),
            ("DATABASE_HOST", "db.internal"),
            ("DATABASE_PORT", " 5432 "),
            ("DATABASE_USER", "harbor"),
            ("DATABASE_NAME", "harbor_prod"),
            ("JWT_SECRET", "s3cr3t"),
            ("GCS_PROJECT_ID", "harbor-1234"),
            ("GCS_BUCKET_NAME", "harbor-uploads"),
            ("GCS_KEY_FILE", "/etc/gcs/key.json"),
        ];

        let config = AppConfig::build(&env).unwrap();

        assert_eq!(config.environment, "production");
        assert_eq!(config.server.port, Some(8080));
        assert!(!config.server.cors);
        assert!(config.server.snapshot);
        assert_eq!(config.database.host.as_deref(), Some("db.internal"));
        assert_eq!(config.database.port, Some(5432));
        assert_eq!(config.database.user.as_deref(), Some("harbor"));
        assert_eq!(config.database.name.as_deref(), Some("harbor_prod"));
        assert_eq!(config.jwt.secret.as_deref(), Some("s3cr3t"));
        assert_eq!(config.gcs.project_id.as_deref(), Some("harbor-1234"));
        assert_eq!(config.gcs.bucket_name.as_deref(), Some("harbor-uploads"));
        assert_eq!(config.gcs.key_file.as_deref(), Some("/etc/gcs/key.json"));
        assert_eq!(config.gcs.application_credentials, None);
    }

    #[test]
    fn empty_values_count_as_unset() {
        let env = [("SERVER_PORT", ""), ("DATABASE_HOST", "  "), ("NODE_ENV", "")];

        let config = AppConfig::build(&env).unwrap();

        assert_eq!(config.server.port, None);
        assert_eq!(config.database.host, None);
        assert_eq!(config.environment, "development");
    }

    #[test]
    fn malformed_values_fail_fast() {
        assert_eq!(
            AppConfig::build(&[("SERVER_PORT", "eighty")]).unwrap_err(),
            ConfigError::InvalidNumber {
                key: "SERVER_PORT",
                value: "eighty".into()
            }
        );
        assert_eq!(
            AppConfig::build(&[("DATABASE_PORT", "70000")]).unwrap_err(),
            ConfigError::InvalidNumber {
                key: "DATABASE_PORT",
                value: "70000".into()
            }
        );
        assert_eq!(
            AppConfig::build(&[("CORS_ENABLED", "sometimes")]).unwrap_err(),
            ConfigError::InvalidFlag {
                key: "CORS_ENABLED",
                value: "sometimes".into()
            }
        );
    }

    #[test]
    fn jwt_secret_is_redacted_in_debug_output() {
        let config = AppConfig::build(&[("JWT_SECRET", "s3cr3t")]).unwrap();

        let debug = format!("{:?}", config);

        assert!(!debug.contains("s3cr3t"));
        assert!(debug.contains("<redacted>"));
    }
}
