use std::fmt;

use crate::config::ConfigError;

pub const DEFAULT_PORT: u16 = 3000;

/// Where the listen port came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PortSource {
    /// The `PORT` variable set by the hosting platform.
    Environment,
    /// `SERVER_PORT` from the application configuration.
    Config,
    Default,
}

impl fmt::Display for PortSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PortSource::Environment => "env",
            PortSource::Config => "config",
            PortSource::Default => "default",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListenPort {
    pub port: u16,
    pub source: PortSource,
}

/// Resolves the listen port: `PORT` if set and non-empty, then the
/// configured port, then [`DEFAULT_PORT`].
///
/// A configured port of `0` counts as unset. A `PORT` of `0` is honoured and
/// binds an ephemeral port.
pub fn resolve_port(env_port: Option<&str>, configured: Option<u16>) -> Result<ListenPort, ConfigError> {
    if let Some(raw) = env_port.map(str::trim).filter(|raw| !raw.is_empty()) {
        let port = raw.parse().map_err(|_| ConfigError::InvalidPort {
            key: "PORT",
            value: raw.to_owned(),
        })?;

        return Ok(ListenPort {
            port,
            source: PortSource::Environment,
        });
    }

    match configured.filter(|port| *port != 0) {
        Some(port) => Ok(ListenPort {
            port,
            source: PortSource::Config,
        }),
        None => Ok(ListenPort {
            port: DEFAULT_PORT,
            source: PortSource::Default,
        }),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Some("8080"), None, 8080)]
    #[case(Some("8080"), Some(4000), 8080)]
    #[case(Some(" 9000 "), Some(4000), 9000)]
    #[case(Some("0"), Some(4000), 0)]
    fn env_port_wins(#[case] env: Option<&str>, #[case] configured: Option<u16>, #[case] expected: u16) {
        let resolved = resolve_port(env, configured).unwrap();

        assert_eq!(resolved.port, expected);
        assert_eq!(resolved.source, PortSource::Environment);
    }

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    #[case(Some("   "))]
    fn config_port_when_env_is_unset_or_empty(#[case] env: Option<&str>) {
        let resolved = resolve_port(env, Some(4000)).unwrap();

        assert_eq!(
            resolved,
            ListenPort {
                port: 4000,
                source: PortSource::Config
            }
        );
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some(""), None)]
    #[case(None, Some(0))]
    fn falls_back_to_3000(#[case] env: Option<&str>, #[case] configured: Option<u16>) {
        let resolved = resolve_port(env, configured).unwrap();

        assert_eq!(
            resolved,
            ListenPort {
                port: 3000,
                source: PortSource::Default
            }
        );
    }

    #[rstest]
    #[case("http")]
    #[case("65536")]
    #[case("-1")]
    fn invalid_env_port_is_an_error(#[case] env: &str) {
        let err = resolve_port(Some(env), Some(4000)).unwrap_err();

        assert_eq!(
            err,
            ConfigError::InvalidPort {
                key: "PORT",
                value: env.to_owned()
            }
        );
    }
}
