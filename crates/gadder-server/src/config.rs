use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;

/// Process configuration, read from the environment after `.env` is loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let db_path = lookup("GADDER_DB_PATH").unwrap_or_else(|| "gadder.db".into());
        let host = lookup("GADDER_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = match lookup("GADDER_PORT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("GADDER_PORT must be a port number, got {:?}", raw))?,
            None => 3000,
        };

        Ok(Self {
            db_path: PathBuf::from(db_path),
            host,
            port,
        })
    }

    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.db_path, PathBuf::from("gadder.db"));
        assert_eq!(config.addr().unwrap(), "0.0.0.0:3000".parse().unwrap());
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("GADDER_DB_PATH", "/tmp/test.db"),
            ("GADDER_HOST", "127.0.0.1"),
            ("GADDER_PORT", "8080"),
        ]))
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/tmp/test.db"));
        assert_eq!(config.addr().unwrap(), "127.0.0.1:8080".parse().unwrap());
    }

    #[test]
    fn rejects_bad_port() {
        assert!(Config::from_lookup(lookup(&[("GADDER_PORT", "http")])).is_err());
        assert!(Config::from_lookup(lookup(&[("GADDER_PORT", "70000")])).is_err());
    }
}
