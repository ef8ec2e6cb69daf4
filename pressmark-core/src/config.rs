//! Configuration parsing and management.

use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Default config file name looked up by the CLI
pub const CONFIG_FILENAME: &str = "pressmark.yml";

pub const PAGE_TEMPLATE_FILE: &str = "articles.template.html";
pub const INDEX_TEMPLATE_FILE: &str = "index.template.html";
pub const SITE_CSS_FILE: &str = "index.css";
pub const ARTICLE_CSS_FILE: &str = "article.css";
pub const PROGRAMS_FILE: &str = "programs.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),
}

/// Main configuration struct matching the pressmark.yml schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,

    /// Output sub-directory for article pages
    #[serde(default = "default_posts_dir")]
    pub posts_dir: String,

    /// Aggregate index file name, written into the output directory
    #[serde(default = "default_index_json")]
    pub index_json: String,

    #[serde(default = "default_highlight_theme")]
    pub highlight_theme: String,

    /// Static files copied into the output root
    #[serde(default = "default_assets")]
    pub assets: Vec<PathBuf>,

    #[serde(default)]
    pub server: ServerConfig,

    // Internal: path to config file (for relative path resolution)
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

fn default_posts_dir() -> String {
    String::from("writes")
}

fn default_index_json() -> String {
    String::from("writes.json")
}

fn default_highlight_theme() -> String {
    String::from(crate::markdown::highlight::DEFAULT_THEME)
}

fn default_assets() -> Vec<PathBuf> {
    vec![PathBuf::from("pitaya.svg")]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_source")]
    pub source: PathBuf,

    #[serde(default = "default_templates")]
    pub templates: PathBuf,

    #[serde(default = "default_output")]
    pub output: PathBuf,
}

fn default_source() -> PathBuf {
    PathBuf::from("writes")
}

fn default_templates() -> PathBuf {
    PathBuf::from("src")
}

fn default_output() -> PathBuf {
    PathBuf::from("dist")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            templates: default_templates(),
            output: default_output(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            posts_dir: default_posts_dir(),
            index_json: default_index_json(),
            highlight_theme: default_highlight_theme(),
            assets: default_assets(),
            server: ServerConfig::default(),
            config_path: None,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&contents)?;

        // Store config file path for relative path resolution
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Load the config file, or fall back to defaults rooted next to it
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            return Self::from_file(path);
        }

        tracing::info!("No config at {:?}, using defaults", path);
        Ok(Self::rooted_at(path))
    }

    /// Default configuration resolving paths as if read from `config_path`
    pub fn rooted_at<P: AsRef<Path>>(config_path: P) -> Self {
        Self {
            config_path: Some(config_path.as_ref().to_path_buf()),
            ..Self::default()
        }
    }

    /// Directory relative paths resolve against
    pub fn site_root(&self) -> PathBuf {
        self.config_path
            .as_ref()
            .and_then(|p| p.parent())
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    /// Markdown source tree
    pub fn source_dir(&self) -> PathBuf {
        self.resolve_path(&self.paths.source)
    }

    /// Templates, stylesheets and programs.json
    pub fn templates_dir(&self) -> PathBuf {
        self.resolve_path(&self.paths.templates)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.resolve_path(&self.paths.output)
    }

    /// Where article pages are written
    pub fn posts_output_dir(&self) -> PathBuf {
        self.output_dir().join(&self.posts_dir)
    }

    pub fn index_json_path(&self) -> PathBuf {
        self.output_dir().join(&self.index_json)
    }

    pub fn template_file(&self, name: &str) -> PathBuf {
        self.templates_dir().join(name)
    }

    /// Vendored highlighting stylesheet, preferred over generated CSS
    pub fn vendor_highlight_css(&self) -> PathBuf {
        self.templates_dir()
            .join("vendor")
            .join("highlight")
            .join("styles")
            .join("github.min.css")
    }

    /// Web prefix of the source tree, used for `originPath`
    pub fn source_web_prefix(&self) -> String {
        let source = &self.paths.source;
        let relative = if source.is_absolute() {
            source
                .strip_prefix(self.site_root())
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| source.file_name().map(PathBuf::from).unwrap_or_default())
        } else {
            source.clone()
        };

        relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Resolve a path relative to the config file location
    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.site_root().join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.posts_dir, "writes");
        assert_eq!(config.index_json, "writes.json");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.paths.source, PathBuf::from("writes"));
        assert_eq!(config.assets, vec![PathBuf::from("pitaya.svg")]);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config: Config = serde_yaml::from_str("paths:\n  output: public\nserver:\n  port: 9000\n").unwrap();
        assert_eq!(config.paths.output, PathBuf::from("public"));
        assert_eq!(config.paths.templates, PathBuf::from("src"));
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.highlight_theme, "InspiredGitHub");
    }

    #[test]
    fn test_paths_resolve_against_config_dir() {
        let config = Config::rooted_at("/site/pressmark.yml");
        assert_eq!(config.source_dir(), PathBuf::from("/site/writes"));
        assert_eq!(config.output_dir(), PathBuf::from("/site/dist"));
        assert_eq!(config.posts_output_dir(), PathBuf::from("/site/dist/writes"));
        assert_eq!(config.index_json_path(), PathBuf::from("/site/dist/writes.json"));
        assert_eq!(
            config.template_file(PAGE_TEMPLATE_FILE),
            PathBuf::from("/site/src/articles.template.html")
        );
    }

    #[test]
    fn test_source_web_prefix() {
        let mut config = Config::rooted_at("/site/pressmark.yml");
        assert_eq!(config.source_web_prefix(), "writes");

        config.paths.source = PathBuf::from("./content/posts");
        assert_eq!(config.source_web_prefix(), "content/posts");

        config.paths.source = PathBuf::from("/site/notes");
        assert_eq!(config.source_web_prefix(), "notes");

        config.paths.source = PathBuf::from("/elsewhere/drafts");
        assert_eq!(config.source_web_prefix(), "drafts");
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path().join(CONFIG_FILENAME)).unwrap();
        assert_eq!(config.output_dir(), dir.path().join("dist"));
    }

    #[test]
    fn test_load_invalid_yaml_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "paths: [unclosed").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::ParseError(_))));
    }
}
