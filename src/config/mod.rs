use std::env;
use std::time::Duration;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub database_max_connections: u32,
    pub operation_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. Required keys missing from the
    /// lookup yield `VarError::NotPresent`; unparseable optional values (and a
    /// zero timeout) fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, env::VarError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).ok_or(env::VarError::NotPresent);

        // zero counts as unparseable
        let operation_timeout = lookup("OPERATION_TIMEOUT")
            .and_then(|v| v.trim_end_matches('s').parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(5);

        Ok(Config {
            database_url: required("DATABASE_URL")?,
            redis_url: required("REDIS_URL")?,
            database_max_connections: lookup("DATABASE_MAX_CONNECTIONS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            operation_timeout_secs: operation_timeout,
        })
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_optional_keys_are_absent() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/notes"),
            ("REDIS_URL", "redis://127.0.0.1/"),
        ]))
        .unwrap();

        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.operation_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn timeout_accepts_seconds_suffix() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/notes"),
            ("REDIS_URL", "redis://127.0.0.1/"),
            ("OPERATION_TIMEOUT", "12s"),
            ("DATABASE_MAX_CONNECTIONS", "3"),
        ]))
        .unwrap();

        assert_eq!(config.operation_timeout_secs, 12);
        assert_eq!(config.database_max_connections, 3);
    }

    #[test]
    fn zero_or_garbage_timeout_falls_back_to_default() {
        for raw in ["0", "0s", "soon"] {
            let config = Config::from_lookup(lookup(&[
                ("DATABASE_URL", "postgres://localhost/notes"),
                ("REDIS_URL", "redis://127.0.0.1/"),
                ("OPERATION_TIMEOUT", raw),
            ]))
            .unwrap();

            assert_eq!(config.operation_timeout(), Duration::from_secs(5), "{raw}");
        }
    }

    #[test]
    fn missing_redis_url_is_an_error() {
        let err = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/notes")]))
            .unwrap_err();
        assert_eq!(err, env::VarError::NotPresent);
    }
}
