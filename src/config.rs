//! Optional config file loading. Search order: ./naroudl.toml, then
//! $XDG_CONFIG_HOME/naroudl/config.toml (or ~/.config/naroudl/config.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file contents. All fields optional; only present keys override defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct Config {
    /// Directory for the output file when -o is not set. Paths are relative to CWD.
    pub output_dir: Option<PathBuf>,
    /// Novel host base URL (default https://ncode.syosetu.com).
    pub base_url: Option<String>,
    /// Delay in seconds before every request (default 1).
    pub request_delay_secs: Option<u64>,
    /// Request timeout in seconds (default 30).
    pub timeout_secs: Option<u64>,
    /// Number of HTTP attempts per episode (default 3).
    pub retry_count: Option<u32>,
}

const LOCAL_FILE: &str = "naroudl.toml";
const APP_DIR: &str = "naroudl";

/// Candidate config files, most specific first.
fn search_paths() -> Result<Vec<PathBuf>, String> {
    let cwd = std::env::current_dir()
        .map_err(|e| format!("Cannot determine current directory: {}", e))?;
    let user = dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"));
    Ok(std::iter::once(cwd.join(LOCAL_FILE)).chain(user).collect())
}

/// Parse one config file. A present but unreadable or malformed file is an error.
fn read_config(path: &Path) -> Result<Config, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Cannot read config {}: {}", path.display(), e))?;
    toml::from_str(&text).map_err(|e| format!("Invalid config {}: {}", path.display(), e))
}

/// First existing file among [search_paths], parsed. No file at all is Ok(None).
pub fn load_config() -> Result<Option<Config>, String> {
    search_paths()?
        .into_iter()
        .find(|p| p.is_file())
        .map(|p| read_config(&p))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_config() {
        let c: Config = toml::from_str("").unwrap();
        assert!(c.output_dir.is_none());
        assert!(c.base_url.is_none());
        assert!(c.request_delay_secs.is_none());
        assert!(c.timeout_secs.is_none());
        assert!(c.retry_count.is_none());
    }

    #[test]
    fn parse_full_config() {
        let s = r#"
            output_dir = "novels"
            base_url = "http://localhost:8080"
            request_delay_secs = 3
            timeout_secs = 60
            retry_count = 5
        "#;
        let c: Config = toml::from_str(s).unwrap();
        assert_eq!(
            c.output_dir.as_deref(),
            Some(std::path::Path::new("novels"))
        );
        assert_eq!(c.base_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(c.request_delay_secs, Some(3));
        assert_eq!(c.timeout_secs, Some(60));
        assert_eq!(c.retry_count, Some(5));
    }

    #[test]
    fn parse_partial_config() {
        let c: Config = toml::from_str("request_delay_secs = 2").unwrap();
        assert!(c.output_dir.is_none());
        assert_eq!(c.request_delay_secs, Some(2));
        assert!(c.retry_count.is_none());
    }

    #[test]
    fn search_starts_with_local_file() -> Result<(), String> {
        let paths = search_paths()?;
        assert_eq!(
            paths.first().and_then(|p| p.file_name()),
            Some(std::ffi::OsStr::new("naroudl.toml"))
        );
        Ok(())
    }

    #[test]
    fn read_config_from_file() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("naroudl.toml");
        std::fs::write(&path, "retry_count = 4\nbase_url = \"http://mirror\"")?;
        let c = read_config(&path)?;
        assert_eq!(c.retry_count, Some(4));
        assert_eq!(c.base_url.as_deref(), Some("http://mirror"));
        Ok(())
    }

    #[test]
    fn read_config_names_the_bad_file() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("naroudl.toml");
        std::fs::write(&path, "timeout_secs = [")?;
        let err = read_config(&path).unwrap_err();
        assert!(err.starts_with("Invalid config "));
        assert!(err.contains("naroudl.toml"));
        Ok(())
    }

    #[test]
    fn invalid_toml_errors() {
        assert!(toml::from_str::<Config>("output_dir = [").is_err());
        assert!(toml::from_str::<Config>("retry_count = \"three\"").is_err());
    }
}
