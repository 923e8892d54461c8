use crate::error::{MediaTreeError, Result};
use crate::remote::DEFAULT_API_BASE;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level shape of the emitted document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    /// `{ "tree": ... }`
    Tree,
    /// `{ "tree": ..., "flatList": [...] }`
    #[default]
    TreeWithFlatList,
    /// A bare array of image file names from the root directory.
    Images,
}

/// Which fields each tree node carries in the output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeStyle {
    /// name/ext/filename/type/path/size/url/resolution/lastModified/children
    #[default]
    Detailed,
    /// name/type/path/children, with `name` being the full file name
    Compact,
}

/// GitHub repository coordinates for the remote lister.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteSource {
    pub owner: String,
    pub repo: String,
    #[serde(default)]
    pub git_ref: Option<String>,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl RemoteSource {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            git_ref: None,
            api_base: default_api_base(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_user_agent() -> String {
    concat!("mediatree/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Where directory listings come from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Source {
    #[default]
    Local,
    Remote(RemoteSource),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaTreeOptions {
    pub root: String,
    pub output: Option<PathBuf>,
    pub source: Source,
    pub public_base_url: Option<String>,
    pub layout: Layout,
    pub style: NodeStyle,
    pub pretty: bool,
    pub exclude: Vec<String>,
    pub include_hidden: bool,
    pub respect_gitignore: bool,
    pub follow_links: bool,
    pub sort_entries: bool,
}

impl Default for MediaTreeOptions {
    fn default() -> Self {
        Self {
            root: "imgs".to_string(),
            output: None,
            source: Source::Local,
            public_base_url: None,
            layout: Layout::TreeWithFlatList,
            style: NodeStyle::Detailed,
            pretty: true,
            exclude: Vec::new(),
            include_hidden: true,
            respect_gitignore: false,
            follow_links: true,
            sort_entries: true,
        }
    }
}

impl MediaTreeOptions {
    /// Loads options from a TOML file. Missing keys take their default values.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| MediaTreeError::io(path, e))?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| MediaTreeError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.root.trim().is_empty() {
            return Err(MediaTreeError::Config("root path must not be empty".into()));
        }
        if let Source::Remote(remote) = &self.source {
            if remote.owner.is_empty() || remote.repo.is_empty() {
                return Err(MediaTreeError::Config(
                    "remote source needs both owner and repo".into(),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MediaTreeBuilder {
    options: MediaTreeOptions,
}

impl MediaTreeBuilder {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            options: MediaTreeOptions {
                root: root.into(),
                ..Default::default()
            },
        }
    }
    pub fn from_options(options: MediaTreeOptions) -> Self {
        Self { options }
    }
    pub fn root(mut self, root: impl Into<String>) -> Self {
        self.options.root = root.into();
        self
    }
    pub fn output(mut self, path: Option<PathBuf>) -> Self {
        self.options.output = path;
        self
    }
    pub fn local(mut self) -> Self {
        self.options.source = Source::Local;
        self
    }
    pub fn remote(mut self, source: RemoteSource) -> Self {
        self.options.source = Source::Remote(source);
        self
    }
    pub fn public_base_url(mut self, url: Option<String>) -> Self {
        self.options.public_base_url = url;
        self
    }
    pub fn layout(mut self, layout: Layout) -> Self {
        self.options.layout = layout;
        self
    }
    pub fn style(mut self, style: NodeStyle) -> Self {
        self.options.style = style;
        self
    }
    pub fn pretty(mut self, yes: bool) -> Self {
        self.options.pretty = yes;
        self
    }
    pub fn exclude(mut self, patterns: Vec<String>) -> Self {
        self.options.exclude = patterns;
        self
    }
    pub fn include_hidden(mut self, yes: bool) -> Self {
        self.options.include_hidden = yes;
        self
    }
    pub fn respect_gitignore(mut self, yes: bool) -> Self {
        self.options.respect_gitignore = yes;
        self
    }
    pub fn follow_links(mut self, yes: bool) -> Self {
        self.options.follow_links = yes;
        self
    }
    pub fn sort_entries(mut self, yes: bool) -> Self {
        self.options.sort_entries = yes;
        self
    }
    pub fn build(self) -> MediaTreeOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let options = MediaTreeOptions::from_toml_str("").unwrap();
        assert_eq!(options, MediaTreeOptions::default());
    }

    #[test]
    fn parses_remote_source() {
        let text = r#"
            root = "imgs"
            output = "media-list.json"
            layout = "images"
            style = "compact"

            [source]
            kind = "remote"
            owner = "xtx9"
            repo = "xtx9-media-storage"
            git_ref = "main"
        "#;
        let options = MediaTreeOptions::from_toml_str(text).unwrap();
        assert_eq!(options.layout, Layout::Images);
        assert_eq!(options.style, NodeStyle::Compact);
        assert_eq!(options.output, Some(PathBuf::from("media-list.json")));
        match options.source {
            Source::Remote(remote) => {
                assert_eq!(remote.owner, "xtx9");
                assert_eq!(remote.git_ref.as_deref(), Some("main"));
                assert_eq!(remote.api_base, DEFAULT_API_BASE);
                assert!(remote.user_agent.starts_with("mediatree/"));
            }
            Source::Local => panic!("expected remote source"),
        }
    }

    #[test]
    fn unknown_layout_is_a_config_error() {
        let err = MediaTreeOptions::from_toml_str(r#"layout = "xml""#).unwrap_err();
        assert!(matches!(err, MediaTreeError::Config(_)));
    }

    #[test]
    fn validate_rejects_empty_root_and_incomplete_remote() {
        let options = MediaTreeBuilder::new("  ").build();
        assert!(options.validate().is_err());

        let options = MediaTreeBuilder::new("imgs")
            .remote(RemoteSource::new("", "repo"))
            .build();
        assert!(options.validate().is_err());

        assert!(MediaTreeBuilder::new("imgs").build().validate().is_ok());
    }
}
