use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub service: Option<ServiceConfig>,
    pub display: Option<DisplayConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub url: Option<String>,
    pub email: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub theme: Option<String>,
}

/// Platform config directory path: `<config_dir>/synthdesk/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("synthdesk").join("config.toml"))
}

/// Load config by cascading CWD `.synthdesk.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(&PathBuf::from(".synthdesk.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

fn load_from_path(path: &PathBuf) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

/// Merge two configs: `overlay` values take precedence over `base`.
fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        service: Some(ServiceConfig {
            url: overlay
                .service
                .as_ref()
                .and_then(|s| s.url.clone())
                .or_else(|| base.service.as_ref().and_then(|s| s.url.clone())),
            email: overlay
                .service
                .as_ref()
                .and_then(|s| s.email.clone())
                .or_else(|| base.service.as_ref().and_then(|s| s.email.clone())),
            timeout_secs: overlay
                .service
                .as_ref()
                .and_then(|s| s.timeout_secs)
                .or_else(|| base.service.as_ref().and_then(|s| s.timeout_secs)),
        }),
        display: Some(DisplayConfig {
            theme: overlay
                .display
                .as_ref()
                .and_then(|d| d.theme.clone())
                .or_else(|| base.display.as_ref().and_then(|d| d.theme.clone())),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_wins_where_set() {
        let base = ConfigFile {
            service: Some(ServiceConfig {
                url: Some("https://lab.example.org".into()),
                email: Some("ada@example.org".into()),
                timeout_secs: Some(30),
            }),
            display: None,
        };
        let overlay = ConfigFile {
            service: Some(ServiceConfig {
                url: Some("http://localhost:8000".into()),
                email: None,
                timeout_secs: None,
            }),
            display: Some(DisplayConfig {
                theme: Some("hacker".into()),
            }),
        };
        let merged = merge(base, overlay);
        let service = merged.service.unwrap();
        assert_eq!(service.url.as_deref(), Some("http://localhost:8000"));
        assert_eq!(service.email.as_deref(), Some("ada@example.org"));
        assert_eq!(service.timeout_secs, Some(30));
        assert_eq!(merged.display.unwrap().theme.as_deref(), Some("hacker"));
    }
}
