use serde::{Deserialize, Serialize, Serializer};

/// Whether a listed entry is a leaf or something that can be listed in turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// A single child reported by a [`Lister`](crate::Lister) for one directory query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The entry's own name, including any extension.
    pub name: String,
    pub kind: EntryKind,
    /// Size in bytes. Always zero for directories.
    pub size: u64,
    /// The path the lister reports for this entry, with `/` separators.
    pub path: String,
    /// Last modification time as an RFC 3339 UTC timestamp, when the lister knows it.
    pub modified: Option<String>,
    /// A public download URL, when the lister knows one.
    pub download_url: Option<String>,
}

impl Entry {
    pub fn file(name: impl Into<String>, path: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
            size,
            path: path.into(),
            modified: None,
            download_url: None,
        }
    }

    pub fn directory(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Directory,
            size: 0,
            path: path.into(),
            modified: None,
            download_url: None,
        }
    }

    pub fn with_modified(mut self, modified: impl Into<String>) -> Self {
        self.modified = Some(modified.into());
        self
    }

    pub fn with_download_url(mut self, url: impl Into<String>) -> Self {
        self.download_url = Some(url.into());
        self
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Classification of a node in the manifest tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Folder,
    Img,
    File,
}

/// The children of a folder node.
///
/// A folder whose listing failed is kept in the tree as [`Children::Unavailable`] so it
/// can be told apart from a folder that was listed and turned out empty. Both
/// serialize differently: an array for `Listed`, `null` for `Unavailable`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Children {
    Listed(Vec<Node>),
    Unavailable { reason: String },
}

impl Children {
    pub fn nodes(&self) -> &[Node] {
        match self {
            Children::Listed(nodes) => nodes,
            Children::Unavailable { .. } => &[],
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Children::Unavailable { .. })
    }
}

impl Serialize for Children {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Children::Listed(nodes) => nodes.serialize(serializer),
            Children::Unavailable { .. } => serializer.serialize_none(),
        }
    }
}

/// One element of the manifest tree.
///
/// `children` is `Some` exactly when `kind` is [`NodeKind::Folder`]. `resolution` and
/// `last_modified` are reserved and always serialized as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// File stem for leaves, full directory name for folders.
    pub name: String,
    /// Lowercased extension (possibly empty). Leaves only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext: Option<String>,
    /// The original file name. Leaves only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    pub url: Option<String>,
    pub resolution: Option<String>,
    pub last_modified: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Children>,
}

impl Node {
    pub fn folder(name: impl Into<String>, path: impl Into<String>, children: Children) -> Self {
        Self {
            name: name.into(),
            ext: None,
            filename: None,
            kind: NodeKind::Folder,
            path: path.into(),
            size: None,
            url: None,
            resolution: None,
            last_modified: None,
            children: Some(children),
        }
    }

    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }

    /// The name as it appears on disk: `filename` for leaves, `name` for folders.
    pub fn file_name(&self) -> &str {
        self.filename.as_deref().unwrap_or(&self.name)
    }

    /// Direct children, empty for leaves and for folders that could not be listed.
    pub fn child_nodes(&self) -> &[Node] {
        self.children.as_ref().map(Children::nodes).unwrap_or(&[])
    }

    /// All non-folder descendants in document order.
    pub fn leaves(&self) -> Vec<&Node> {
        let mut out = Vec::new();
        collect_leaves(self, &mut out);
        out
    }

    /// Number of folder nodes in this subtree, including `self` when it is one.
    pub fn folder_count(&self) -> usize {
        let own = usize::from(self.is_folder());
        own + self.child_nodes().iter().map(Node::folder_count).sum::<usize>()
    }
}

fn collect_leaves<'a>(node: &'a Node, out: &mut Vec<&'a Node>) {
    for child in node.child_nodes() {
        if child.is_folder() {
            collect_leaves(child, out);
        } else {
            out.push(child);
        }
    }
}

/// Flat-list record, one per leaf entry encountered during traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatRecord {
    /// Full file name, extension included.
    pub name: String,
    pub path: String,
    pub size: u64,
    pub last_modified: Option<String>,
}

impl From<&Entry> for FlatRecord {
    fn from(entry: &Entry) -> Self {
        Self {
            name: entry.name.clone(),
            path: entry.path.clone(),
            size: entry.size,
            last_modified: entry.modified.clone(),
        }
    }
}

/// The result of a manifest generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Manifest {
    /// A recursive walk: the root folder node and every leaf in depth-first order.
    Tree {
        tree: Node,
        flat_list: Vec<FlatRecord>,
    },
    /// Image file names from the root directory only.
    Images(Vec<String>),
}

impl Manifest {
    pub fn file_count(&self) -> usize {
        match self {
            Manifest::Tree { flat_list, .. } => flat_list.len(),
            Manifest::Images(names) => names.len(),
        }
    }

    pub fn folder_count(&self) -> usize {
        match self {
            Manifest::Tree { tree, .. } => tree.folder_count(),
            Manifest::Images(_) => 0,
        }
    }
}
