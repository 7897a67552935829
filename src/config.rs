// src/config.rs

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing_subscriber::{filter::LevelFilter, EnvFilter};
use std::{
    env, fs,
    net::{IpAddr, SocketAddr},
    path::{Path, PathBuf},
};

/// Names the YAML file layered over the defaults.
pub const CONFIG_PATH_VAR: &str = "ROVISTA_CONFIG";

/// Runtime settings: defaults, then an optional YAML file, then env overrides.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub bind_address: IpAddr,
    pub port: u16,
    /// Directory holding one `{dataset}.csv` per dataset.
    pub data_dir: PathBuf,
    pub overview_file: PathBuf,
    pub sync_list_file: PathBuf,
    /// Origin of the web UI, allowed through CORS.
    pub cors_origin: String,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::from([0, 0, 0, 0]),
            port: 5000,
            data_dir: PathBuf::from("./src/data/asn"),
            overview_file: PathBuf::from("./src/data/new_overview.csv"),
            sync_list_file: PathBuf::from("./src/data/sync_ases.txt"),
            cors_origin: "http://localhost:3000".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load from the process environment.
    pub fn load() -> Result<Self> {
        let mut cfg = match env::var(CONFIG_PATH_VAR) {
            Ok(path) => Self::from_yaml_file(&path)?,
            Err(_) => Self::default(),
        };
        cfg.apply_env(|key| env::var(key).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// The CORS origin must be a bare `scheme://host[:port]`. The log level is a
    /// bare level (`info`) or a filter directive list (`rovista=debug,warp=info`).
    pub fn validate(&self) -> Result<()> {
        self.log_filter()?;

        let origin = self.cors_origin.as_str();
        let rest = origin
            .strip_prefix("http://")
            .or_else(|| origin.strip_prefix("https://"))
            .with_context(|| format!("cors_origin {origin:?} must start with http:// or https://"))?;
        if rest.is_empty() || rest.contains(['/', ' ', '?', '#']) {
            bail!("cors_origin {origin:?} must be scheme://host[:port]");
        }
        Ok(())
    }

    /// Build the tracing filter described by `log_level`.
    pub fn log_filter(&self) -> Result<EnvFilter> {
        let level = self.log_level.trim();
        // a bare word would otherwise parse as a target name
        if !level.contains(['=', ',']) {
            let level: LevelFilter = level
                .parse()
                .with_context(|| format!("log_level {level:?} is not a log level"))?;
            return Ok(EnvFilter::default().add_directive(level.into()));
        }
        EnvFilter::try_new(level)
            .with_context(|| format!("log_level {level:?} is not a valid filter"))
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_yaml_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Override fields from `lookup` (normally `std::env::var`).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.port = port
                .trim()
                .parse()
                .with_context(|| format!("PORT={port:?} is not a valid port"))?;
        }
        if let Some(addr) = lookup("ROVISTA_BIND_ADDRESS") {
            self.bind_address = addr
                .trim()
                .parse()
                .with_context(|| format!("ROVISTA_BIND_ADDRESS={addr:?} is not an IP address"))?;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.log_level = level;
        }
        if let Some(dir) = lookup("ROVISTA_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(file) = lookup("ROVISTA_OVERVIEW_FILE") {
            self.overview_file = PathBuf::from(file);
        }
        if let Some(file) = lookup("ROVISTA_SYNC_LIST_FILE") {
            self.sync_list_file = PathBuf::from(file);
        }
        if let Some(origin) = lookup("ROVISTA_CORS_ORIGIN") {
            self.cors_origin = origin;
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.cors_origin, "http://localhost:3000");
        assert_eq!(cfg.socket_addr().to_string(), "0.0.0.0:5000");
    }

    #[test]
    fn test_yaml_partial_keeps_defaults() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        writeln!(tmp, "port: 8080\ndata_dir: /srv/asn")?;

        let cfg = Config::from_yaml_file(tmp.path())?;
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.data_dir, PathBuf::from("/srv/asn"));
        assert_eq!(cfg.log_level, "info");
        Ok(())
    }

    #[test]
    fn test_env_overrides_yaml() -> Result<()> {
        let mut cfg = Config::from_yaml_str("port: 8080\ncors_origin: http://a.example")?;
        let vars: HashMap<&str, &str> = [
            ("PORT", "9000"),
            ("ROVISTA_CORS_ORIGIN", "https://rovista.example"),
        ]
        .into_iter()
        .collect();

        cfg.apply_env(|k| vars.get(k).map(|v| v.to_string()))?;
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.cors_origin, "https://rovista.example");
        Ok(())
    }

    #[test]
    fn test_origin_validation() {
        let mut cfg = Config::default();
        assert!(cfg.validate().is_ok());
        cfg.cors_origin = "https://rovista.netsecurelab.org".into();
        assert!(cfg.validate().is_ok());
        for bad in ["localhost:3000", "http://", "http://a.example/path", "*"] {
            cfg.cors_origin = bad.into();
            assert!(cfg.validate().is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_log_level_validation() -> Result<()> {
        let mut cfg = Config::default();
        for good in ["info", "DEBUG", "off", "rovista=debug,warp=info"] {
            cfg.log_level = good.into();
            cfg.validate()?;
        }
        for bad in ["verbose", "not=a=level", "rovista=loud"] {
            cfg.log_level = bad.into();
            assert!(cfg.validate().is_err(), "{bad:?} should be rejected");
        }
        Ok(())
    }

    #[test]
    fn test_bad_log_level_from_env_fails_load() -> Result<()> {
        let mut cfg = Config::default();
        cfg.apply_env(|k| (k == "LOG_LEVEL").then(|| "loud".to_string()))?;
        assert!(cfg.validate().is_err());
        Ok(())
    }

    #[test]
    fn test_bad_port_is_an_error() {
        let mut cfg = Config::default();
        let res = cfg.apply_env(|k| (k == "PORT").then(|| "eighty".to_string()));
        assert!(res.is_err());
    }
}
