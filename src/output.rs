//! JSON rendering of a [`Manifest`].
//!
//! The layout picks the document shape and the node style picks the per-node fields.
//! Slashes are never escaped.

use crate::error::{MediaTreeError, Result};
use crate::options::{Layout, NodeStyle};
use crate::types::{Children, FlatRecord, Manifest, Node, NodeKind};
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Serialize)]
struct CompactNode<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    kind: NodeKind,
    path: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    children: Option<Option<Vec<CompactNode<'a>>>>,
}

impl<'a> From<&'a Node> for CompactNode<'a> {
    fn from(node: &'a Node) -> Self {
        let children = node.children.as_ref().map(|children| match children {
            Children::Listed(nodes) => Some(nodes.iter().map(CompactNode::from).collect()),
            Children::Unavailable { .. } => None,
        });
        Self {
            name: node.file_name(),
            kind: node.kind,
            path: &node.path,
            children,
        }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum TreeView<'a> {
    Detailed(&'a Node),
    Compact(CompactNode<'a>),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Document<'a> {
    tree: TreeView<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    flat_list: Option<&'a [FlatRecord]>,
}

/// Renders the manifest as a JSON string.
///
/// A [`Manifest::Images`] always renders as a bare array. A tree manifest rendered with
/// [`Layout::Images`] yields the image names among the root's direct children.
pub fn render(
    manifest: &Manifest,
    layout: Layout,
    style: NodeStyle,
    pretty: bool,
) -> Result<String> {
    match manifest {
        Manifest::Images(names) => to_json(names, pretty),
        Manifest::Tree { tree, flat_list } => match layout {
            Layout::Images => {
                let names: Vec<&str> = tree
                    .child_nodes()
                    .iter()
                    .filter(|node| node.kind == NodeKind::Img)
                    .map(Node::file_name)
                    .collect();
                to_json(&names, pretty)
            }
            Layout::Tree | Layout::TreeWithFlatList => {
                let tree = match style {
                    NodeStyle::Detailed => TreeView::Detailed(tree),
                    NodeStyle::Compact => TreeView::Compact(CompactNode::from(tree)),
                };
                let document = Document {
                    tree,
                    flat_list: (layout == Layout::TreeWithFlatList).then_some(flat_list.as_slice()),
                };
                to_json(&document, pretty)
            }
        },
    }
}

/// Renders the manifest and writes it to `path`, replacing any existing file.
/// Missing parent directories are created.
pub fn write_manifest(
    manifest: &Manifest,
    layout: Layout,
    style: NodeStyle,
    pretty: bool,
    path: impl AsRef<Path>,
) -> Result<()> {
    let path = path.as_ref();
    let content = render(manifest, layout, style, pretty)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| MediaTreeError::io(parent, e))?;
    }
    fs::write(path, content).map_err(|e| MediaTreeError::io(path, e))?;
    Ok(())
}

fn to_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}
