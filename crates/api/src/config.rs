//! Process configuration read from the environment.

use std::net::SocketAddr;

use thiserror::Error;

use courseadmin_auth::{KeyError, SigningKey};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEV_SECRET: &str = "dev-secret-change-me-dev-secret-change-me";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid BIND_ADDR '{0}'")]
    BindAddr(String),

    #[error("invalid signing key: {0}")]
    Key(#[from] KeyError),

    #[error("BOOTSTRAP_ADMIN_USERNAME and BOOTSTRAP_ADMIN_PASSWORD must be set together")]
    PartialBootstrapAdmin,
}

/// Administrator created at startup when missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapAdmin {
    pub username: String,
    pub password: String,
    pub email: String,
}

/// Allowed CORS origins. `Any` when the variable is unset or `*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigins {
    Any,
    List(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub signing_key: SigningKey,
    pub bootstrap_admin: Option<BootstrapAdmin>,
    pub cors_origins: CorsOrigins,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    ///
    /// `JWT_SECRET_BASE64` wins over `JWT_SECRET`. With neither set an insecure
    /// development key is used and a warning is logged.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_raw = var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .parse()
            .map_err(|_| ConfigError::BindAddr(bind_raw.clone()))?;

        let signing_key = match (var("JWT_SECRET_BASE64"), var("JWT_SECRET")) {
            (Some(encoded), _) => SigningKey::from_base64(&encoded)?,
            (None, Some(secret)) => SigningKey::from_bytes(secret.into_bytes())?,
            (None, None) => {
                tracing::warn!("JWT_SECRET not set; using insecure dev default");
                SigningKey::from_bytes(DEV_SECRET)?
            }
        };

        let bootstrap_admin = match (var("BOOTSTRAP_ADMIN_USERNAME"), var("BOOTSTRAP_ADMIN_PASSWORD")) {
            (Some(username), Some(password)) => {
                let email = var("BOOTSTRAP_ADMIN_EMAIL")
                    .unwrap_or_else(|| format!("{username}@localhost.localdomain"));
                Some(BootstrapAdmin { username, password, email })
            }
            (None, None) => None,
            _ => return Err(ConfigError::PartialBootstrapAdmin),
        };

        let cors_origins = match var("CORS_ALLOWED_ORIGINS") {
            None => CorsOrigins::Any,
            Some(raw) if raw == "*" => CorsOrigins::Any,
            Some(raw) => CorsOrigins::List(
                raw.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
        };

        Ok(Self { bind_addr, signing_key, bootstrap_admin, cors_origins })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = ApiConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080".parse().unwrap());
        assert!(!config.signing_key.is_empty());
        assert!(config.bootstrap_admin.is_none());
        assert_eq!(config.cors_origins, CorsOrigins::Any);
    }

    #[test]
    fn base64_secret_takes_precedence() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("JWT_SECRET_BASE64", "AAECAwQFBgc="),
            ("JWT_SECRET", "ignored"),
        ]))
        .unwrap();
        assert_eq!(config.signing_key.len(), 8);
    }

    #[test]
    fn broken_base64_secret_is_an_error() {
        let err = ApiConfig::from_lookup(lookup(&[("JWT_SECRET_BASE64", "%%%")])).unwrap_err();
        assert!(matches!(err, ConfigError::Key(KeyError::Base64(_))));
    }

    #[test]
    fn bind_addr_must_parse() {
        let err = ApiConfig::from_lookup(lookup(&[("BIND_ADDR", "localhost")])).unwrap_err();
        assert!(matches!(err, ConfigError::BindAddr(addr) if addr == "localhost"));
    }

    #[test]
    fn bootstrap_admin_needs_both_credentials() {
        let err = ApiConfig::from_lookup(lookup(&[("BOOTSTRAP_ADMIN_USERNAME", "root")])).unwrap_err();
        assert!(matches!(err, ConfigError::PartialBootstrapAdmin));

        let config = ApiConfig::from_lookup(lookup(&[
            ("BOOTSTRAP_ADMIN_USERNAME", "root"),
            ("BOOTSTRAP_ADMIN_PASSWORD", "s3cret"),
        ]))
        .unwrap();
        let admin = config.bootstrap_admin.unwrap();
        assert_eq!(admin.username, "root");
        assert_eq!(admin.email, "root@localhost.localdomain");
    }

    #[test]
    fn cors_origins_are_split_on_commas() {
        let config = ApiConfig::from_lookup(lookup(&[(
            "CORS_ALLOWED_ORIGINS",
            "http://localhost:3000, https://app.example.com,",
        )]))
        .unwrap();
        assert_eq!(
            config.cors_origins,
            CorsOrigins::List(vec![
                "http://localhost:3000".into(),
                "https://app.example.com".into()
            ])
        );
    }
}
