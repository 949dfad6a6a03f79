//! Deployment report logged once at startup.
//!
//! Values that identify infrastructure (hosts, users, bucket names, key
//! paths) are reduced to `set`/`unset`; only the environment name, ports and
//! flags are logged verbatim.

use std::fmt;

use harbor_core::config::EnvSource;

use super::port::ListenPort;
use crate::config::AppConfig;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeploymentReport {
    entries: Vec<(&'static str, String)>,
}

fn presence(value: Option<&str>) -> String {
    match value {
        Some(_) => "set".to_owned(),
        None => "unset".to_owned(),
    }
}

fn port(value: Option<u16>) -> String {
    value.map_or_else(|| "unset".to_owned(), |port| port.to_string())
}

impl DeploymentReport {
    pub fn collect<E: EnvSource + ?Sized>(config: &AppConfig, env: &E, listen: ListenPort) -> Self {
        let entries = vec![
            ("environment", config.environment.clone()),
            ("port", listen.port.to_string()),
            ("port_source", listen.source.to_string()),
            ("port_env", presence(env.non_empty("PORT").as_deref())),
            ("database_host", presence(config.database.host.as_deref())),
            ("database_port", port(config.database.port)),
            ("database_user", presence(config.database.user.as_deref())),
            ("database_name", presence(config.database.name.as_deref())),
            ("jwt_secret", presence(config.jwt.secret.as_deref())),
            ("cors", config.server.cors.to_string()),
            ("gcs_project_id", presence(config.gcs.project_id.as_deref())),
            ("gcs_bucket_name", presence(config.gcs.bucket_name.as_deref())),
            ("gcs_key_file", presence(config.gcs.key_file.as_deref())),
            (
                "google_application_credentials",
                presence(config.gcs.application_credentials.as_deref()),
            ),
        ];

        DeploymentReport { entries }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn entries(&self) -> &[(&'static str, String)] {
        &self.entries
    }

    /// Logs the report, at `info` when `verbose` and `debug` otherwise.
    pub fn emit(&self, verbose: bool) {
        if verbose {
            tracing::info!(report = %self, "deployment configuration");
        } else {
            tracing::debug!(report = %self, "deployment configuration");
        }
    }
}

impl fmt::Display for DeploymentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (name, value)) in self.entries.iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use harbor_core::config::ConfigBuilder;

    use super::*;
    use crate::bootstrap::port::{PortSource, resolve_port};

    const ENV: [(&str, &str); 11] = [
        ("NODE_ENV", "production"),
        ("PORT", "8080"),
        ("DATABASE_HOST", "db.internal.example"),
        ("DATABASE_PORT", "5432"),
        ("DATABASE_USER", "harbor_admin"),
        ("DATABASE_NAME", "harbor_prod"),
        ("JWT_SECRET", "0123456789abcdef"),
        ("GCS_PROJECT_ID", "harbor-project-77"),
        ("GCS_BUCKET_NAME", "harbor-private-uploads"),
        ("GCS_KEY_FILE", "/var/secrets/gcs.json"),
        ("GOOGLE_APPLICATION_CREDENTIALS", "/var/secrets/adc.json"),
    ];

    fn report() -> DeploymentReport {
        let config = AppConfig::build(&ENV).unwrap();
        let listen = resolve_port(ENV.non_empty("PORT").as_deref(), config.server.port).unwrap();
        DeploymentReport::collect(&config, &ENV, listen)
    }

    #[test]
    fn no_value_of_an_identifying_variable_is_reported() {
        let rendered = report().to_string();

        for secret in [
            "db.internal.example",
            "harbor_admin",
            "harbor_prod",
            "0123456789abcdef",
            "harbor-project-77",
            "harbor-private-uploads",
            "/var/secrets/gcs.json",
            "/var/secrets/adc.json",
        ] {
            assert!(!rendered.contains(secret), "{secret} leaked into {rendered}");
        }
    }

    #[test]
    fn operational_values_are_reported_in_clear() {
        let report = report();

        assert_eq!(report.get("environment"), Some("production"));
        assert_eq!(report.get("port"), Some("8080"));
        assert_eq!(report.get("port_source"), Some("env"));
        assert_eq!(report.get("database_port"), Some("5432"));
        assert_eq!(report.get("database_host"), Some("set"));
        assert_eq!(report.get("jwt_secret"), Some("set"));
        assert_eq!(report.get("cors"), Some("true"));
    }

    #[test]
    fn missing_values_are_unset() {
        let env = [("NODE_ENV", "staging")];
        let config = AppConfig::build(&env).unwrap();
        let listen = ListenPort {
            port: 3000,
            source: PortSource::Default,
        };

        let report = DeploymentReport::collect(&config, &env, listen);

        assert_eq!(report.get("port_source"), Some("default"));
        assert_eq!(report.get("port_env"), Some("unset"));
        assert_eq!(report.get("jwt_secret"), Some("unset"));
        assert_eq!(report.get("database_port"), Some("unset"));
        assert_eq!(report.get("gcs_bucket_name"), Some("unset"));
        assert_eq!(report.entries().len(), 14);
    }
}
