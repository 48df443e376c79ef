//! Configuration loader and path helpers.
//!
//! Uses Figment to merge built-in defaults, `config.toml`, `config.<env>.toml`
//! and `APP_*` env vars (nested keys separated by `__`, e.g.
//! `APP_LEXICAL__K1=1.2`). Provides helpers to expand `~` and `${VAR}` and to
//! resolve relative paths against a known base directory.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub catalog: CatalogSettings,
    pub lexical: LexicalSettings,
    pub search: SearchSettings,
    pub embedding: EmbeddingSettings,
}

/// Locations of the prebuilt artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    pub mapping_path: String,
    pub index_path: String,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            mapping_path: "data/processed/catalog_mapping.json".to_string(),
            index_path: "data/processed/catalog_index.json".to_string(),
        }
    }
}

/// BM25 Okapi parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexicalSettings {
    pub k1: f32,
    pub b: f32,
    /// Fraction of the average IDF assigned to terms whose IDF is negative.
    pub epsilon: f32,
}

impl Default for LexicalSettings {
    fn default() -> Self {
        Self { k1: 1.5, b: 0.75, epsilon: 0.25 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub default_top_k: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { default_top_k: 5 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Directory holding `config.json`, `tokenizer.json` and the weights.
    pub model_dir: Option<String>,
    pub max_len: usize,
    /// Use the hash-based fake embedder instead of loading a model.
    pub fake: bool,
    pub fake_dim: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self { model_dir: None, max_len: 256, fake: false, fake_dim: 384 }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        let lex = &self.lexical;
        if !(lex.k1.is_finite() && lex.k1 >= 0.0) {
            return Err(Error::InvalidConfig(format!("lexical.k1 must be >= 0, got {}", lex.k1)));
        }
        if !(0.0..=1.0).contains(&lex.b) {
            return Err(Error::InvalidConfig(format!("lexical.b must be within [0, 1], got {}", lex.b)));
        }
        if !lex.epsilon.is_finite() {
            return Err(Error::InvalidConfig("lexical.epsilon must be finite".to_string()));
        }
        if self.search.default_top_k == 0 {
            return Err(Error::InvalidConfig("search.default_top_k must be at least 1".to_string()));
        }
        if self.embedding.max_len == 0 {
            return Err(Error::InvalidConfig("embedding.max_len must be at least 1".to_string()));
        }
        Ok(())
    }
}

pub struct Config {
    figment: Figment,
    base_dir: PathBuf,
}

impl Config {
    /// Load from the current working directory.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("."))
    }

    /// Load `config.toml` and the environment overlay found in `dir`.
    pub fn load_from(dir: &Path) -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(dir.join("config.toml")));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file(dir.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(dir.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(dir.join("config.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment, base_dir: dir.to_path_buf() };
        config.settings()?.validate()?;
        Ok(config)
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| Error::InvalidConfig(format!("Failed to get '{key}': {e}")))
    }

    pub fn settings(&self) -> Result<Settings> {
        self.figment
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    /// Resolve a configured path relative to the directory the config was loaded from.
    pub fn resolve<S: AsRef<str>>(&self, p: S) -> PathBuf {
        resolve_with_base(&self.base_dir, p)
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_without_any_file() {
        Jail::expect_with(|jail| {
            let config = Config::load_from(jail.directory()).expect("load");
            let settings = config.settings().expect("settings");
            assert_eq!(settings, Settings::default());
            assert_eq!(settings.search.default_top_k, 5);
            assert!((settings.lexical.k1 - 1.5).abs() < f32::EPSILON);
            assert!((settings.lexical.b - 0.75).abs() < f32::EPSILON);
            Ok(())
        });
    }

    #[test]
    fn env_overlay_and_env_file() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[search]\ndefault_top_k = 8\n[lexical]\nk1 = 1.2\n")?;
            jail.create_file("config.test.toml", "[search]\ndefault_top_k = 3\n")?;
            jail.set_env("RUST_ENV", "test");
            jail.set_env("APP_LEXICAL__B", "0.5");
            let settings = Config::load_from(jail.directory()).expect("load").settings().expect("settings");
            assert_eq!(settings.search.default_top_k, 3);
            assert!((settings.lexical.k1 - 1.2).abs() < 1e-6);
            assert!((settings.lexical.b - 0.5).abs() < 1e-6);
            Ok(())
        });
    }

    #[test]
    fn rejects_out_of_range_b() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[lexical]\nb = 1.5\n")?;
            let err = Config::load_from(jail.directory()).err().expect("should fail");
            assert!(matches!(err, Error::InvalidConfig(_)), "got {err}");
            Ok(())
        });
    }

    #[test]
    fn relative_paths_resolve_against_base() {
        let base = Path::new("/srv/catalog");
        assert_eq!(resolve_with_base(base, "data/a.json"), PathBuf::from("/srv/catalog/data/a.json"));
        assert_eq!(resolve_with_base(base, "/abs/b.json"), PathBuf::from("/abs/b.json"));
    }
}
