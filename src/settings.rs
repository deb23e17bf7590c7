use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    net::{IpAddr, SocketAddr},
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use crate::sensing::{HyprlandProbe, NullProbe, WindowProbe};

pub const SETTINGS_FILE: &str = "settings.json";
pub const DATABASE_FILE: &str = "studytrack.db";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProbeKind {
    Hyprland,
    None,
}

impl std::str::FromStr for ProbeKind {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_lowercase().as_str() {
            "hyprland" => Ok(ProbeKind::Hyprland),
            "none" | "off" => Ok(ProbeKind::None),
            other => Err(anyhow!("unknown window probe '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub sample_interval_secs: u64,
    pub probe: ProbeKind,
    pub debug: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            host: "127.0.0.1".into(),
            port: 8080,
            sample_interval_secs: 1,
            probe: ProbeKind::Hyprland,
            debug: false,
        }
    }
}

fn default_data_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".studytrack")
}

fn parse_flag(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

impl Settings {
    /// Defaults, then `settings.json` from the data directory, then
    /// `STUDYTRACK_*` environment variables.
    pub fn load() -> Result<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// [`Settings::load`] with an injectable environment.
    pub fn load_with(env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let data_dir = env("STUDYTRACK_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        let mut settings = Self::from_file(&data_dir.join(SETTINGS_FILE))?;
        settings.data_dir = data_dir;
        settings.apply_env(env)?;
        settings.validate()?;
        Ok(settings)
    }

    fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings in {}", path.display()))
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(host) = env("STUDYTRACK_HOST") {
            self.host = host;
        }
        if let Some(port) = env("STUDYTRACK_PORT") {
            self.port = port
                .trim()
                .parse()
                .with_context(|| format!("STUDYTRACK_PORT '{port}' is not a port number"))?;
        }
        if let Some(interval) = env("STUDYTRACK_SAMPLE_INTERVAL") {
            self.sample_interval_secs = interval.trim().parse().with_context(|| {
                format!("STUDYTRACK_SAMPLE_INTERVAL '{interval}' is not a number of seconds")
            })?;
        }
        if let Some(probe) = env("STUDYTRACK_PROBE") {
            self.probe = probe.parse()?;
        }
        if let Some(debug) = env("STUDYTRACK_DEBUG") {
            self.debug = parse_flag(&debug);
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.sample_interval_secs == 0 {
            bail!("sample interval must be at least one second");
        }
        Ok(())
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }
        let ip: IpAddr = self
            .host
            .parse()
            .with_context(|| format!("invalid listen host '{}'", self.host))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    pub fn sample_interval(&self) -> Duration {
        Duration::from_secs(self.sample_interval_secs)
    }

    pub fn build_probe(&self) -> Arc<dyn WindowProbe> {
        match self.probe {
            ProbeKind::Hyprland => Arc::new(HyprlandProbe::new()),
            ProbeKind::None => Arc::new(NullProbe),
        }
    }
}
