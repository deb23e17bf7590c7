//! Foreground-window probes.
//!
//! The sampler only needs "which application and which window title has
//! focus right now". How that is answered is platform specific, so it sits
//! behind [`WindowProbe`] and the concrete probe is picked at startup.

use std::{
    collections::HashMap,
    ffi::OsStr,
    io::ErrorKind,
    process::Command,
    sync::Mutex,
};

use serde::{Deserialize, Serialize};
use sysinfo::{Pid, ProcessesToUpdate, System};
use thiserror::Error;

pub const DESKTOP_APP_NAME: &str = "Desktop";
pub const DESKTOP_WINDOW_TITLE: &str = "No window focused";

/// Terminal emulators whose own class says nothing about what the user is
/// doing; the newest child process is reported instead.
const GENERIC_TERMINALS: &[&str] = &["foot", "kitty", "alacritty", "wezterm"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowInfo {
    pub app_name: String,
    pub window_title: String,
}

impl WindowInfo {
    pub fn new(app_name: impl Into<String>, window_title: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            window_title: window_title.into(),
        }
    }

    /// Sentinel recorded when nothing can be probed.
    pub fn desktop() -> Self {
        Self::new(DESKTOP_APP_NAME, DESKTOP_WINDOW_TITLE)
    }
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("window probe unavailable: {0}")]
    Unavailable(String),

    #[error("no focused window")]
    NoFocusedWindow,

    #[error("window probe command failed: {0}")]
    Command(String),

    #[error("failed to parse window probe output: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Answers which window currently has focus. Calls are synchronous and
/// expected to return well under a second.
pub trait WindowProbe: Send + Sync {
    fn query(&self) -> Result<WindowInfo, ProbeError>;
}

/// Probe for hosts without a supported window manager. Every query fails,
/// so every sample becomes the desktop sentinel.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProbe;

impl WindowProbe for NullProbe {
    fn query(&self) -> Result<WindowInfo, ProbeError> {
        Err(ProbeError::Unavailable("no window probe configured".into()))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HyprlandWindow {
    #[serde(default)]
    class: String,
    #[serde(default)]
    initial_class: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    pid: Option<i64>,
}

/// Parses `hyprctl activewindow -j`. Returns the window and, when known, the
/// owning process id.
pub fn parse_active_window(raw: &str) -> Result<(WindowInfo, Option<u32>), ProbeError> {
    let window: HyprlandWindow = serde_json::from_str(raw)?;
    let pid = window
        .pid
        .filter(|pid| *pid > 0)
        .and_then(|pid| u32::try_from(pid).ok());

    if window.class.is_empty() && window.initial_class.is_empty() && window.title.is_empty() && pid.is_none() {
        return Err(ProbeError::NoFocusedWindow);
    }

    let app_name = [window.initial_class, window.class]
        .into_iter()
        .find(|name| !name.is_empty())
        .unwrap_or_else(|| "Unknown".to_string());

    Ok((WindowInfo::new(app_name, window.title), pid))
}

/// Hyprland probe with a process-table fallback for terminal emulators.
pub struct HyprlandProbe {
    system: Mutex<System>,
    app_names: Mutex<HashMap<u32, String>>,
}

impl HyprlandProbe {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
            app_names: Mutex::new(HashMap::new()),
        }
    }

    fn run_hyprctl(&self) -> Result<String, ProbeError> {
        let output = Command::new("hyprctl")
            .args(["activewindow", "-j"])
            .output()
            .map_err(|err| match err.kind() {
                ErrorKind::NotFound => ProbeError::Unavailable("hyprctl not found".into()),
                _ => ProbeError::Command(err.to_string()),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ProbeError::Command(format!("{} {}", output.status, stderr)));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Resolves the name to report for a window owned by `pid`. Results are
    /// cached per pid for the lifetime of the probe.
    fn resolve_app_name(&self, pid: u32, class_name: &str) -> String {
        if let Ok(cache) = self.app_names.lock() {
            if let Some(name) = cache.get(&pid) {
                return name.clone();
            }
        }

        let mut resolved = class_name.to_string();
        if GENERIC_TERMINALS.contains(&class_name.to_lowercase().as_str()) {
            if let Some(child) = self.newest_child_name(pid) {
                resolved = child;
            }
        }

        if let Ok(mut cache) = self.app_names.lock() {
            cache.insert(pid, resolved.clone());
        }
        resolved
    }

    fn newest_child_name(&self, pid: u32) -> Option<String> {
        let mut system = self.system.lock().ok()?;
        system.refresh_processes(ProcessesToUpdate::All);

        let parent = Pid::from_u32(pid);
        system
            .processes()
            .values()
            .filter(|process| process.parent() == Some(parent))
            .max_by_key(|process| process.start_time())
            .map(|process| OsStr::new(process.name()).to_string_lossy().into_owned())
    }
}

impl Default for HyprlandProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowProbe for HyprlandProbe {
    fn query(&self) -> Result<WindowInfo, ProbeError> {
        let raw = self.run_hyprctl()?;
        let (mut info, pid) = parse_active_window(&raw)?;
        if let Some(pid) = pid {
            info.app_name = self.resolve_app_name(pid, &info.app_name);
        }
        Ok(info)
    }
}
