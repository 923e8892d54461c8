//! Recursive manifest construction over a [`Lister`].

use crate::classify::{classify, is_image_name, split_name};
use crate::error::Result;
use crate::lister::{Lister, base_name, normalize_separators};
use crate::types::{Children, Entry, FlatRecord, Node, NodeKind};
#[cfg(feature = "logging")]
use tracing;

/// Walks a directory through a [`Lister`], producing the folder tree and the flat file list.
///
/// The walk is depth-first and issues one `list` call per folder visited. Children keep
/// the order the lister returned them in.
pub struct TreeBuilder<L> {
    lister: L,
    public_base_url: Option<String>,
}

impl<L: Lister> TreeBuilder<L> {
    pub fn new(lister: L) -> Self {
        Self {
            lister,
            public_base_url: None,
        }
    }

    /// Base used to derive a leaf's `url` as `<base>/<path>` when the lister gives none.
    pub fn public_base_url(mut self, base: Option<String>) -> Self {
        self.public_base_url = base;
        self
    }

    /// Builds the subtree rooted at `path`.
    ///
    /// # Errors
    ///
    /// Fails only when listing `path` itself fails. A folder below it that cannot be
    /// listed is kept with [`Children::Unavailable`] and contributes no flat records.
    pub fn build(&self, path: &str) -> Result<(Node, Vec<FlatRecord>)> {
        let entries = self.lister.list(path)?;
        #[cfg(feature = "logging")]
        tracing::debug!("Listed {} entries under {}", entries.len(), path);

        let mut children = Vec::with_capacity(entries.len());
        let mut flat_list = Vec::new();
        for entry in entries {
            match classify(&entry) {
                NodeKind::Folder => match self.build(&entry.path) {
                    Ok((subtree, records)) => {
                        children.push(subtree);
                        flat_list.extend(records);
                    }
                    Err(err) => {
                        #[cfg(feature = "logging")]
                        tracing::warn!("Skipping contents of {}: {}", entry.path, err);
                        children.push(Node::folder(
                            base_name(&entry.path),
                            normalize_separators(&entry.path),
                            Children::Unavailable {
                                reason: err.to_string(),
                            },
                        ));
                    }
                },
                kind => {
                    flat_list.push(FlatRecord::from(&entry));
                    children.push(self.leaf(entry, kind));
                }
            }
        }

        let root = Node::folder(
            base_name(path),
            normalize_separators(path),
            Children::Listed(children),
        );
        Ok((root, flat_list))
    }

    fn leaf(&self, entry: Entry, kind: NodeKind) -> Node {
        let (stem, ext) = split_name(&entry.name);
        let url = entry.download_url.clone().or_else(|| {
            self.public_base_url.as_deref().map(|base| {
                format!(
                    "{}/{}",
                    base.trim_end_matches('/'),
                    entry.path.trim_start_matches('/')
                )
            })
        });
        Node {
            name: stem.to_string(),
            ext: Some(ext),
            kind,
            size: Some(entry.size),
            url,
            resolution: None,
            last_modified: None,
            children: None,
            path: entry.path,
            filename: Some(entry.name),
        }
    }
}

/// File names of the image files directly under `path`, in listed order.
///
/// Only one `list` call is made; subdirectories are not visited.
pub fn image_names<L: Lister>(lister: &L, path: &str) -> Result<Vec<String>> {
    Ok(lister
        .list(path)?
        .into_iter()
        .filter(|entry| !entry.is_dir() && is_image_name(&entry.name))
        .map(|entry| entry.name)
        .collect())
}
