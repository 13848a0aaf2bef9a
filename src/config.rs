use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::keywords::{CaseMode, DEFAULT_PLURAL_SUFFIXES, DEFAULT_SYMBOLS, KeywordRules};

/// Name of the config file looked up in the working directory.
pub const CONFIG_FILE: &str = ".lorelink.toml";

/// Project configuration loaded from `.lorelink.toml`.
/// Relative root paths are resolved against the directory holding the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory of campaign notes.
    pub campaign_dir: Option<PathBuf>,
    /// Compare keywords with exact case.
    pub case_sensitive: bool,
    /// Directory of world notes.
    pub world_dir: Option<PathBuf>,
    // Tables serialize after plain keys in TOML, so this stays last.
    /// Symbol and suffix table.
    pub keywords: KeywordTable,
}

impl Default for Config {
    fn default() -> Self {
        return Self {
            campaign_dir: None,
            case_sensitive: false,
            world_dir: None,
            keywords: KeywordTable::default(),
        };
    }
}

/// `[keywords]` table: which header markup produces keywords.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeywordTable {
    /// Suffixes accepted after `/` as plural markers.
    pub plural_suffixes: Vec<String>,
    /// Emit each `/`-separated part of a header as its own keyword.
    pub split_synonyms: bool,
    /// Characters that make a header a keyword entry.
    pub symbols: Vec<char>,
}

impl Default for KeywordTable {
    fn default() -> Self {
        return Self {
            plural_suffixes: DEFAULT_PLURAL_SUFFIXES.iter().map(ToString::to_string).collect(),
            split_synonyms: false,
            symbols: DEFAULT_SYMBOLS.to_vec(),
        };
    }
}

impl Config {
    /// Load config from `path`.
    /// Returns defaults if the file doesn't exist. Returns an error if the file
    /// exists but is malformed; a config the user wrote is never silently
    /// replaced by defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            },
            Err(e) => return Err(Error::Io(e)),
        };

        let mut config = Self::parse(&content)?;
        config.anchor_roots(path.parent().unwrap_or(Path::new("")));
        return Ok(config);
    }

    /// Load a config file the user named explicitly.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigNotFound` if the file is missing, otherwise as `load`.
    pub fn load_required(path: &Path) -> Result<Self, Error> {
        if !path.exists() {
            return Err(Error::ConfigNotFound { path: path.to_path_buf() });
        }
        return Self::load(path);
    }

    /// Parse config from TOML content.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlDe` if the content is not valid config TOML.
    pub fn parse(content: &str) -> Result<Self, Error> {
        return Ok(toml::from_str(content)?);
    }

    /// Case mode selected by `case_sensitive`.
    pub const fn case_mode(&self) -> CaseMode {
        return CaseMode::from_flag(self.case_sensitive);
    }

    /// Compile the `[keywords]` table.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidRule` if the table is unusable.
    pub fn rules(&self) -> Result<KeywordRules, Error> {
        let table = &self.keywords;
        return KeywordRules::new(table.symbols.clone(), &table.plural_suffixes, table.split_synonyms);
    }

    /// Write the config to disk as pretty TOML, creating the parent directory.
    /// Roots are stored relative to the file's directory when they lie under it.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlSer` if serialization fails,
    /// or `Error::Io` if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let base = path.parent().unwrap_or(Path::new(""));
        let mut stored = self.clone();
        stored.unanchor_roots(base)?;
        let content = toml::to_string_pretty(&stored)?;
        if !base.as_os_str().is_empty() {
            std::fs::create_dir_all(base)?;
        }
        std::fs::write(path, content)?;
        return Ok(());
    }

    /// Make relative root paths relative to the config file's directory.
    fn anchor_roots(&mut self, base: &Path) {
        for dir in [&mut self.world_dir, &mut self.campaign_dir].into_iter().flatten() {
            if dir.is_relative() && !base.as_os_str().is_empty() {
                *dir = base.join(&*dir);
            }
        }
    }

    /// Inverse of `anchor_roots`: roots under `base` become relative to it so a
    /// later `load` lands on the same directory. Other relative roots are made
    /// absolute.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the working directory cannot be determined.
    fn unanchor_roots(&mut self, base: &Path) -> Result<(), Error> {
        if base.as_os_str().is_empty() {
            return Ok(());
        }
        for dir in [&mut self.world_dir, &mut self.campaign_dir].into_iter().flatten() {
            if let Ok(inside) = dir.strip_prefix(base) {
                *dir = inside.to_path_buf();
            } else if dir.is_relative() {
                *dir = std::path::absolute(&*dir)?;
            }
        }
        return Ok(());
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "test code")]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::load(&tmp.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.case_mode(), CaseMode::Insensitive);
        assert_eq!(config.keywords.symbols, vec!['!', '*', '/']);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = Config::load_required(&tmp.path().join("custom.toml")).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound { .. }));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        std::fs::write(&path, "case_sensitive = \"maybe\"\n").unwrap();
        assert!(matches!(Config::load(&path), Err(Error::TomlDe(_))));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::parse("wrold_dir = \"world\"\n").is_err());
    }

    #[test]
    fn partial_keyword_table_keeps_other_defaults() {
        let config = Config::parse("case_sensitive = true\n[keywords]\nsymbols = [\"!\"]\n").unwrap();
        assert_eq!(config.case_mode(), CaseMode::Sensitive);
        assert_eq!(config.keywords.symbols, vec!['!']);
        assert_eq!(config.keywords.plural_suffixes, vec!["s", "es"]);
        assert!(config.rules().is_ok());
    }

    #[test]
    fn relative_roots_resolve_against_config_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        std::fs::write(&path, "world_dir = \"world\"\ncampaign_dir = \"/abs/campaign\"\n").unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.world_dir, Some(tmp.path().join("world")));
        assert_eq!(config.campaign_dir, Some(PathBuf::from("/abs/campaign")));
    }

    #[test]
    fn save_then_load_keeps_settings() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        let config = Config {
            campaign_dir: Some(tmp.path().join("campaign")),
            case_sensitive: true,
            ..Config::default()
        };
        config.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn relative_roots_survive_a_save_in_a_subdirectory() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("notes/lore.toml");
        std::fs::create_dir_all(tmp.path().join("notes")).unwrap();
        std::fs::write(&path, "world_dir = \"world\"\n").unwrap();

        let loaded = Config::load(&path).unwrap();
        loaded.save(&path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("world_dir = \"world\""), "{written}");

        let reloaded = Config::load(&path).unwrap();
        assert_eq!(reloaded.world_dir, Some(tmp.path().join("notes/world")));
    }

    #[test]
    fn save_creates_missing_parent_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("fresh/lore.toml");
        Config::default().save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), Config::default());
    }

    #[test]
    fn bad_keyword_table_fails_to_compile() {
        let config = Config::parse("[keywords]\nsymbols = [\"x\"]\n").unwrap();
        assert!(matches!(config.rules(), Err(Error::InvalidRule { .. })));
    }
}
