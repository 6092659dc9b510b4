//! Persisted user settings: `~/.result-evaluator.conf`, one `key=value`
//! per line. Unknown keys and unparsable values are ignored.

use crate::ranking::TopN;
use crate::scoring::Category;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub default_category: Category,
    pub default_top: TopN,
    /// Directory the last upload was picked from
    pub last_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            default_category: Category::Overall,
            default_top: TopN::default(),
            last_dir: None,
        }
    }
}

/// Get the config file path: ~/.result-evaluator.conf
pub fn config_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".result-evaluator.conf"))
}

impl Settings {
    /// Load from the default location, falling back to defaults.
    pub fn load() -> Self {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(_) => Self::default(),
        }
    }

    pub fn parse(content: &str) -> Self {
        let mut settings = Self::default();

        for line in content.lines() {
            let line = line.trim();
            if line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                let value = value.trim();
                match key.trim() {
                    "default_category" => match value.parse() {
                        Ok(c) => settings.default_category = c,
                        Err(e) => log::warn!("Ignoring config value: {}", e),
                    },
                    "default_top" => match value.parse() {
                        Ok(t) => settings.default_top = t,
                        Err(e) => log::warn!("Ignoring config value: {}", e),
                    },
                    "last_dir" if !value.is_empty() => {
                        settings.last_dir = Some(PathBuf::from(value));
                    }
                    _ => {}
                }
            }
        }

        settings
    }

    pub fn to_conf_string(&self) -> String {
        let mut out = format!(
            "default_category={}\ndefault_top={}\n",
            self.default_category.key(),
            self.default_top
        );
        if let Some(dir) = &self.last_dir {
            out.push_str(&format!("last_dir={}\n", dir.display()));
        }
        out
    }

    /// Save to the default location. Failures are logged, not fatal.
    pub fn save(&self) {
        if let Some(path) = config_path() {
            self.save_to(&path);
        }
    }

    pub fn save_to(&self, path: &Path) {
        if let Err(e) = std::fs::write(path, self.to_conf_string()) {
            log::warn!("Failed to save settings to {}: {}", path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reads_known_keys() {
        let settings = Settings::parse(
            "# saved by evaluator-ui\ndefault_category=fsd-db\ndefault_top = all\nlast_dir=/data/exams\ncolor=blue\n",
        );
        assert_eq!(settings.default_category, Category::FsdDb);
        assert_eq!(settings.default_top, TopN::All);
        assert_eq!(settings.last_dir, Some(PathBuf::from("/data/exams")));
    }

    #[test]
    fn test_parse_bad_values_fall_back() {
        let settings = Settings::parse("default_category=history\ndefault_top=many\n");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("evaluator.conf");
        let settings = Settings {
            default_category: Category::AiMlDs,
            default_top: TopN::Count(30),
            last_dir: Some(dir.path().to_path_buf()),
        };
        settings.save_to(&path);
        assert_eq!(Settings::load_from(&path), settings);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            Settings::load_from(&dir.path().join("absent.conf")),
            Settings::default()
        );
    }
}
