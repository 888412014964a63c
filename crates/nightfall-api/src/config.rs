//! Server configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use nightfall_timer::domain::countdown::DEFAULT_NIGHT_SECONDS;

use crate::error::AppError;

/// Settings the server needs at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// JSON file listing the seated players.
    pub roster_file: PathBuf,
    /// Default night length in seconds.
    pub night_seconds: u32,
}

impl ServerConfig {
    /// Reads `HOST`, `PORT`, `ROSTER_FILE` and `NIGHT_DURATION_SECS`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is missing or invalid.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?;
        let roster_file = lookup("ROSTER_FILE")
            .map(PathBuf::from)
            .ok_or_else(|| {
                AppError::Config("ROSTER_FILE environment variable must be set".to_string())
            })?;
        let night_seconds = match lookup("NIGHT_DURATION_SECS") {
            Some(raw) => raw.parse().map_err(|e| {
                AppError::Config(format!("NIGHT_DURATION_SECS must be a valid u32: {e}"))
            })?,
            None => DEFAULT_NIGHT_SECONDS,
        };
        if night_seconds == 0 {
            return Err(AppError::Config(
                "NIGHT_DURATION_SECS must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            host,
            port,
            roster_file,
            night_seconds,
        })
    }

    /// The address to listen on.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `HOST:PORT` does not parse.
    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_apply_when_only_roster_is_set() {
        let config = ServerConfig::from_lookup(lookup_from(&[("ROSTER_FILE", "roster.json")]))
            .unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.roster_file, PathBuf::from("roster.json"));
        assert_eq!(config.night_seconds, DEFAULT_NIGHT_SECONDS);
        assert_eq!(config.socket_addr().unwrap().port(), 3000);
    }

    #[test]
    fn test_missing_roster_file_is_a_config_error() {
        let result = ServerConfig::from_lookup(lookup_from(&[]));

        assert!(matches!(result, Err(AppError::Config(msg)) if msg.contains("ROSTER_FILE")));
    }

    #[test]
    fn test_invalid_port_is_a_config_error() {
        let result = ServerConfig::from_lookup(lookup_from(&[
            ("ROSTER_FILE", "roster.json"),
            ("PORT", "eighty"),
        ]));

        assert!(matches!(result, Err(AppError::Config(msg)) if msg.contains("PORT")));
    }

    #[test]
    fn test_zero_night_duration_is_rejected() {
        let result = ServerConfig::from_lookup(lookup_from(&[
            ("ROSTER_FILE", "roster.json"),
            ("NIGHT_DURATION_SECS", "0"),
        ]));

        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_custom_night_duration_is_read() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("ROSTER_FILE", "roster.json"),
            ("NIGHT_DURATION_SECS", "900"),
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
        ]))
        .unwrap();

        assert_eq!(config.night_seconds, 900);
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:8080");
    }
}
