//! # mediatree
//!
//! `mediatree` builds a JSON manifest of a media directory: a nested folder tree and a
//! flat list of every file, with per-file size, timestamps and derived URLs. Listings
//! come from the local filesystem ([`LocalLister`]) or from the GitHub repository
//! contents API ([`RemoteLister`]); anything else can plug in through [`Lister`].
//!
//! A folder that cannot be listed mid-walk does not abort the run. It stays in the tree
//! with [`Children::Unavailable`] and renders as `"children": null`. Only a failure to
//! list the root is an error.
//!
//! # Features
//!
//! - `logging` (default): emits `tracing` events for listings, skipped folders and the
//!   run summary.
//!
//! # Example
//!
//! ```no_run
//! use mediatree::{Layout, MediaTreeBuilder, NodeStyle, generate, output};
//!
//! let options = MediaTreeBuilder::new("imgs")
//!     .layout(Layout::TreeWithFlatList)
//!     .exclude(vec!["*.DS_Store".into()])
//!     .build();
//!
//! let manifest = generate(&options).expect("Failed to scan directory");
//! output::write_manifest(&manifest, options.layout, NodeStyle::Detailed, true, "public/list.json")
//!     .expect("Failed to write manifest");
//! ```

pub mod classify;
mod engine;
mod error;
mod lister;
mod local;
mod options;
pub mod output;
mod remote;
mod tree;
mod types;

pub use classify::{IMAGE_EXTENSIONS, classify, split_name};
pub use engine::{generate, generate_with};
pub use error::{MediaTreeError, Result};
pub use lister::Lister;
pub use local::LocalLister;
pub use options::{Layout, MediaTreeBuilder, MediaTreeOptions, NodeStyle, RemoteSource, Source};
pub use remote::{DEFAULT_API_BASE, RemoteLister};
pub use tree::{TreeBuilder, image_names};
pub use types::{Children, Entry, EntryKind, FlatRecord, Manifest, Node, NodeKind};
