//! Directory listing through the GitHub repository contents API.

use crate::error::{MediaTreeError, Result};
use crate::lister::{ExcludeFilter, Lister};
use crate::options::RemoteSource;
use crate::types::{Entry, EntryKind};
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;
#[cfg(feature = "logging")]
use tracing;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";

/// One element of a contents API directory response. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct ContentItem {
    name: String,
    path: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    download_url: Option<String>,
}

/// Lists repository directories, one blocking GET per call.
#[derive(Debug, Clone)]
pub struct RemoteLister {
    client: Client,
    api_base: Url,
    owner: String,
    repo: String,
    git_ref: Option<String>,
    exclude: ExcludeFilter,
}

impl RemoteLister {
    pub fn new(source: &RemoteSource, exclude: &[String]) -> Result<Self> {
        let client = Client::builder().user_agent(&source.user_agent).build()?;
        Self::with_client(client, source, exclude)
    }

    /// Uses a caller-built client. The client is expected to carry its own user agent.
    pub fn with_client(client: Client, source: &RemoteSource, exclude: &[String]) -> Result<Self> {
        let api_base = Url::parse(&source.api_base).map_err(|e| {
            MediaTreeError::Config(format!("invalid API base '{}': {}", source.api_base, e))
        })?;
        if api_base.cannot_be_a_base() {
            return Err(MediaTreeError::Config(format!(
                "API base '{}' cannot carry a path",
                source.api_base
            )));
        }
        Ok(Self {
            client,
            api_base,
            owner: source.owner.clone(),
            repo: source.repo.clone(),
            git_ref: source.git_ref.clone(),
            exclude: ExcludeFilter::new(exclude)?,
        })
    }

    /// `<api_base>/repos/<owner>/<repo>/contents/<path>[?ref=<git_ref>]`
    pub(crate) fn contents_url(&self, path: &str) -> Url {
        let mut url = self.api_base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["repos", self.owner.as_str(), self.repo.as_str(), "contents"])
                .extend(path.split('/').filter(|s| !s.is_empty()));
        }
        if let Some(git_ref) = &self.git_ref {
            url.query_pairs_mut().append_pair("ref", git_ref);
        }
        url
    }
}

impl Lister for RemoteLister {
    fn list(&self, path: &str) -> Result<Vec<Entry>> {
        let url = self.contents_url(path);
        #[cfg(feature = "logging")]
        tracing::debug!("Fetching listing: {}", url);

        let response = self
            .client
            .get(url)
            .header(ACCEPT, GITHUB_MEDIA_TYPE)
            .send()?;
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(MediaTreeError::Transport {
                status: status.as_u16(),
                body,
            });
        }
        let entries = parse_listing(path, &body)?;
        Ok(entries
            .into_iter()
            .filter(|entry| !self.exclude.is_excluded(entry))
            .collect())
    }
}

/// Decodes a contents API directory response. `dir` entries become directories;
/// every other type (`file`, `symlink`, `submodule`) is treated as a file.
pub(crate) fn parse_listing(path: &str, body: &str) -> Result<Vec<Entry>> {
    let items: Vec<ContentItem> =
        serde_json::from_str(body).map_err(|e| MediaTreeError::Decode {
            path: path.to_string(),
            message: e.to_string(),
        })?;
    Ok(items
        .into_iter()
        .map(|item| {
            let kind = if item.kind == "dir" {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            Entry {
                name: item.name,
                kind,
                size: if kind == EntryKind::File { item.size } else { 0 },
                path: item.path,
                modified: None,
                download_url: item.download_url,
            }
        })
        .collect())
}
