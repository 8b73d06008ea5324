// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment exactly once, in `main`, and
//! handed to the components that need it. Nothing below reads the
//! environment after start-up.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATA_DIR` | Root directory for JSON storage | `./data` |
//! | `JWT_SECRET` | HMAC secret used to sign session tokens | Required |
//! | `SESSION_TTL` | Lifetime of issued session tokens (`15m`, `1h`, `900`) | `15m` |
//! | `PUBLIC_PATHS` | Comma separated path prefixes exempt from the gate | `/api/auth/create,/api/auth/register` |
//! | `TLS_CERT_PATH` | PEM certificate chain (enables HTTPS with `TLS_KEY_PATH`) | Optional |
//! | `TLS_KEY_PATH` | PEM private key | Optional |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::{env, net::SocketAddr, path::PathBuf};

use crate::auth::TimeToLive;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const SESSION_TTL_ENV: &str = "SESSION_TTL";
pub const PUBLIC_PATHS_ENV: &str = "PUBLIC_PATHS";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Lifetime of tokens issued by the login endpoint.
pub const DEFAULT_SESSION_TTL: &str = "15m";

/// Path prefixes reachable without a session token.
pub const DEFAULT_PUBLIC_PATHS: &[&str] = &["/api/auth/create", "/api/auth/register"];

/// HS256 keys shorter than the hash output weaken the MAC.
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Token signing settings.
#[derive(Clone)]
pub struct AuthConfig {
    /// Shared HMAC secret. Never logged.
    pub secret: Vec<u8>,
    /// TTL for tokens issued by `POST /api/auth/create`.
    pub session_ttl: TimeToLive,
    /// Prefixes that bypass the authorization gate.
    pub public_paths: Vec<String>,
}

impl AuthConfig {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
            session_ttl: TimeToLive::Human(DEFAULT_SESSION_TTL.to_string()),
            public_paths: DEFAULT_PUBLIC_PATHS.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn with_session_ttl(mut self, ttl: TimeToLive) -> Self {
        self.session_ttl = ttl;
        self
    }

    pub fn with_public_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.public_paths = paths.into_iter().map(Into::into).collect();
        self
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"<redacted>")
            .field("session_ttl", &self.session_ttl)
            .field("public_paths", &self.public_paths)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub auth: AuthConfig,
    pub tls: Option<TlsPaths>,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup(PORT_ENV) {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: PORT_ENV,
                reason: format!("'{raw}' is not a port number"),
            })?,
            None => DEFAULT_PORT,
        };

        let data_dir = PathBuf::from(
            lookup(DATA_DIR_ENV).unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()),
        );

        let secret = lookup(JWT_SECRET_ENV).ok_or(ConfigError::Missing(JWT_SECRET_ENV))?;
        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Invalid {
                name: JWT_SECRET_ENV,
                reason: format!("must be at least {MIN_SECRET_LEN} bytes"),
            });
        }

        let mut auth = AuthConfig::new(secret.into_bytes());

        if let Some(raw) = lookup(SESSION_TTL_ENV) {
            let ttl = TimeToLive::from(raw.as_str());
            let secs = ttl.as_secs().map_err(|e| ConfigError::Invalid {
                name: SESSION_TTL_ENV,
                reason: e.to_string(),
            })?;
            // Tokens with exp == iat are expired on arrival.
            if secs <= 0 {
                return Err(ConfigError::Invalid {
                    name: SESSION_TTL_ENV,
                    reason: "must be at least one second".to_string(),
                });
            }
            auth = auth.with_session_ttl(ttl);
        }

        if let Some(raw) = lookup(PUBLIC_PATHS_ENV) {
            auth = auth.with_public_paths(
                raw.split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string),
            );
        }

        let tls = match (lookup(TLS_CERT_PATH_ENV), lookup(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            _ => {
                return Err(ConfigError::Invalid {
                    name: TLS_CERT_PATH_ENV,
                    reason: format!("{TLS_CERT_PATH_ENV} and {TLS_KEY_PATH_ENV} must be set together"),
                })
            }
        };

        let log_format = match lookup(LOG_FORMAT_ENV).as_deref() {
            Some("json") => LogFormat::Json,
            Some("pretty") | None => LogFormat::Pretty,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: LOG_FORMAT_ENV,
                    reason: format!("unknown format '{other}'"),
                })
            }
        };

        Ok(Self {
            host,
            port,
            data_dir,
            auth,
            tls,
            log_format,
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::Invalid {
                name: HOST_ENV,
                reason: format!("'{}' is not a bind address", self.host),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let config = AppConfig::from_lookup(lookup(&[(JWT_SECRET_ENV, SECRET)])).unwrap();

        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.data_dir, PathBuf::from(DEFAULT_DATA_DIR));
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(config.tls.is_none());
        assert_eq!(
            config.auth.public_paths,
            vec!["/api/auth/create", "/api/auth/register"]
        );
        assert_eq!(config.auth.session_ttl.duration().unwrap().as_secs(), 900);
    }

    #[test]
    fn missing_secret_is_rejected() {
        let err = AppConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(JWT_SECRET_ENV)));
    }

    #[test]
    fn short_secret_is_rejected() {
        let err = AppConfig::from_lookup(lookup(&[(JWT_SECRET_ENV, "short")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: JWT_SECRET_ENV, .. }));
    }

    #[test]
    fn overrides_are_parsed() {
        let config = AppConfig::from_lookup(lookup(&[
            (JWT_SECRET_ENV, SECRET),
            (PORT_ENV, "9000"),
            (SESSION_TTL_ENV, "1h"),
            (PUBLIC_PATHS_ENV, "/api/auth/create, /api/status ,"),
            (LOG_FORMAT_ENV, "json"),
        ]))
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.auth.session_ttl.duration().unwrap().as_secs(), 3600);
        assert_eq!(config.auth.public_paths, vec!["/api/auth/create", "/api/status"]);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(AppConfig::from_lookup(lookup(&[(JWT_SECRET_ENV, SECRET), (PORT_ENV, "http")])).is_err());
        assert!(
            AppConfig::from_lookup(lookup(&[(JWT_SECRET_ENV, SECRET), (SESSION_TTL_ENV, "soon")]))
                .is_err()
        );
        assert!(
            AppConfig::from_lookup(lookup(&[(JWT_SECRET_ENV, SECRET), (TLS_CERT_PATH_ENV, "c.pem")]))
                .is_err()
        );
    }

    #[test]
    fn session_ttl_must_be_a_positive_signable_duration() {
        for raw in ["0", "0s", "500ms", "18446744073709551615"] {
            let err = AppConfig::from_lookup(lookup(&[(JWT_SECRET_ENV, SECRET), (SESSION_TTL_ENV, raw)]))
                .unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { name: SESSION_TTL_ENV, .. }),
                "{raw} should be rejected"
            );
        }

        let config =
            AppConfig::from_lookup(lookup(&[(JWT_SECRET_ENV, SECRET), (SESSION_TTL_ENV, "1")])).unwrap();
        assert_eq!(config.auth.session_ttl.as_secs().unwrap(), 1);
    }

    #[test]
    fn debug_output_redacts_secret() {
        let auth = AuthConfig::new(SECRET.as_bytes().to_vec());
        let rendered = format!("{auth:?}");
        assert!(!rendered.contains(SECRET));
        assert!(rendered.contains("<redacted>"));
    }
}
