use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "ORBIT_DATA_DIR";

/// Environment variable overriding the output mode.
pub const FORMAT_ENV: &str = "ORBIT_FORMAT";

const DEFAULT_DATA_DIR: &str = ".orbit";
const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_LIST_TIMEOUT_MS: u64 = 5_000;

/// Optional `[store]` keys. Unset keys fall through to the next layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreOverrides {
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub durable: Option<bool>,
    #[serde(default)]
    pub lock_timeout_ms: Option<u64>,
    #[serde(default)]
    pub list_timeout_ms: Option<u64>,
}

impl StoreOverrides {
    /// Keys set in `self` win over `fallback`.
    #[must_use]
    pub fn or(self, fallback: Self) -> Self {
        Self {
            data_dir: self.data_dir.or(fallback.data_dir),
            durable: self.durable.or(fallback.durable),
            lock_timeout_ms: self.lock_timeout_ms.or(fallback.lock_timeout_ms),
            list_timeout_ms: self.list_timeout_ms.or(fallback.list_timeout_ms),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub store: StoreOverrides,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub store: StoreOverrides,
}

/// Store settings after merging every layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    pub data_dir: PathBuf,
    pub durable: bool,
    pub lock_timeout: Duration,
    pub list_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct EffectiveConfig {
    pub project: ProjectConfig,
    pub user: UserConfig,
    pub store: StoreSettings,
    pub resolved_output: String,
}

pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = project_root.join(".orbit/config.toml");
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    load_user_config_from(&config_dir.join("orbit/config.toml"))
}

pub fn load_user_config_from(path: &Path) -> Result<UserConfig> {
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn resolve_config(project_root: &Path, cli_json: bool) -> Result<EffectiveConfig> {
    let project = load_project_config(project_root)?;
    let user = load_user_config()?;

    let env_data_dir = env::var_os(DATA_DIR_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from);
    let store = merge_layers(project_root, &project, &user, env_data_dir);

    let env_format = env::var(FORMAT_ENV).ok();
    let resolved_output = resolve_output(cli_json, user.output.clone(), env_format);

    Ok(EffectiveConfig {
        project,
        user,
        store,
        resolved_output,
    })
}

/// Merge store settings: environment, then project file, then user file,
/// then defaults. Relative data directories resolve against `project_root`.
#[must_use]
pub fn merge_layers(
    project_root: &Path,
    project: &ProjectConfig,
    user: &UserConfig,
    env_data_dir: Option<PathBuf>,
) -> StoreSettings {
    let env_layer = StoreOverrides {
        data_dir: env_data_dir,
        ..StoreOverrides::default()
    };
    let merged = env_layer
        .or(project.store.clone())
        .or(user.store.clone());

    let data_dir = merged
        .data_dir
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
    let data_dir = if data_dir.is_absolute() {
        data_dir
    } else {
        project_root.join(data_dir)
    };

    StoreSettings {
        data_dir,
        durable: merged.durable.unwrap_or(true),
        lock_timeout: Duration::from_millis(
            merged.lock_timeout_ms.unwrap_or(DEFAULT_LOCK_TIMEOUT_MS),
        ),
        list_timeout: Duration::from_millis(
            merged.list_timeout_ms.unwrap_or(DEFAULT_LIST_TIMEOUT_MS),
        ),
    }
}

/// Canonical mode name for a configured value; unknown values are ignored.
fn canonical_mode(raw: &str) -> Option<&'static str> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "pretty" | "human" => Some("pretty"),
        "text" | "table" => Some("text"),
        "json" => Some("json"),
        _ => None,
    }
}

fn resolve_output(cli_json: bool, user_output: Option<String>, env_format: Option<String>) -> String {
    let configured = env_format
        .as_deref()
        .and_then(canonical_mode)
        .or_else(|| user_output.as_deref().and_then(canonical_mode));
    let mode = match configured {
        _ if cli_json => "json",
        Some(mode) => mode,
        None if std::io::stdout().is_terminal() => "pretty",
        None => "text",
    };
    mode.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn absent_project_file_yields_empty_overrides() {
        let root = TempDir::new().expect("tempdir");
        let cfg = load_project_config(root.path()).expect("load should succeed");
        assert_eq!(cfg.store, StoreOverrides::default());

        let store = merge_layers(root.path(), &cfg, &UserConfig::default(), None);
        assert_eq!(store.data_dir, root.path().join(".orbit"));
        assert!(store.durable);
        assert_eq!(store.lock_timeout, Duration::from_secs(5));
        assert_eq!(store.list_timeout, Duration::from_secs(5));
    }

    #[test]
    fn project_file_is_parsed() {
        let root = TempDir::new().expect("tempdir");
        std::fs::create_dir_all(root.path().join(".orbit")).expect("mkdir");
        std::fs::write(
            root.path().join(".orbit/config.toml"),
            "[store]\ndata_dir = \"state\"\ndurable = false\nlist_timeout_ms = 250\n",
        )
        .expect("write config");

        let cfg = load_project_config(root.path()).expect("load should succeed");
        let store = merge_layers(root.path(), &cfg, &UserConfig::default(), None);
        assert_eq!(store.data_dir, root.path().join("state"));
        assert!(!store.durable);
        assert_eq!(store.list_timeout, Duration::from_millis(250));
        assert_eq!(store.lock_timeout, Duration::from_secs(5));
    }

    #[test]
    fn malformed_project_file_reports_path() {
        let root = TempDir::new().expect("tempdir");
        std::fs::create_dir_all(root.path().join(".orbit")).expect("mkdir");
        std::fs::write(root.path().join(".orbit/config.toml"), "[store\n").expect("write");

        let err = load_project_config(root.path()).unwrap_err();
        assert!(format!("{err:#}").contains("config.toml"));
    }

    #[test]
    fn project_wins_over_user_and_env_wins_over_both() {
        let root = Path::new("/work/repo");
        let project = ProjectConfig {
            store: StoreOverrides {
                data_dir: Some("project-data".into()),
                lock_timeout_ms: Some(100),
                ..StoreOverrides::default()
            },
        };
        let user = UserConfig {
            output: None,
            store: StoreOverrides {
                data_dir: Some("/home/me/orbit".into()),
                durable: Some(false),
                lock_timeout_ms: Some(900),
                list_timeout_ms: Some(50),
            },
        };

        let store = merge_layers(root, &project, &user, None);
        assert_eq!(store.data_dir, PathBuf::from("/work/repo/project-data"));
        assert_eq!(store.lock_timeout, Duration::from_millis(100));
        assert!(!store.durable);
        assert_eq!(store.list_timeout, Duration::from_millis(50));

        let store = merge_layers(root, &project, &user, Some("/tmp/override".into()));
        assert_eq!(store.data_dir, PathBuf::from("/tmp/override"));
    }

    #[test]
    fn user_config_parses_output_and_store() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "output = \"json\"\n\n[store]\ndurable = false\n").expect("write");

        let cfg = load_user_config_from(&path).expect("load should succeed");
        assert_eq!(cfg.output.as_deref(), Some("json"));
        assert_eq!(cfg.store.durable, Some(false));
    }

    #[test]
    fn json_flag_beats_env_and_user_file() {
        let output = resolve_output(true, Some("pretty".to_string()), Some("text".to_string()));
        assert_eq!(output, "json");
    }

    #[test]
    fn output_aliases_map_to_canonical_modes() {
        let pretty = resolve_output(false, Some("table".to_string()), Some("human".to_string()));
        assert_eq!(pretty, "pretty");

        let text = resolve_output(false, Some("human".to_string()), Some("table".to_string()));
        assert_eq!(text, "text");
    }
}
