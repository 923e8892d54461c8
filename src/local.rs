use crate::error::{MediaTreeError, Result};
use crate::lister::{ExcludeFilter, Lister, normalize_separators};
use crate::options::MediaTreeOptions;
use crate::types::{Entry, EntryKind};
use chrono::{DateTime, SecondsFormat, Utc};
use ignore::WalkBuilder;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
#[cfg(feature = "logging")]
use tracing;

/// Lists directories on the local filesystem.
///
/// Each call reads exactly one directory level. Paths in the returned entries keep the
/// prefix the caller passed in, with `/` separators on every platform. Symlinks are
/// resolved to their targets unless `follow_links` is off, in which case they are
/// left out.
#[derive(Debug, Clone)]
pub struct LocalLister {
    root: PathBuf,
    include_hidden: bool,
    respect_gitignore: bool,
    follow_links: bool,
    sort_entries: bool,
    exclude: ExcludeFilter,
    gitignores: RefCell<HashMap<PathBuf, Option<Gitignore>>>,
}

/// The `.gitignore` matchers that apply to one directory, deepest first.
struct IgnoreRules {
    dir: PathBuf,
    matchers: Vec<Gitignore>,
}

impl IgnoreRules {
    fn is_ignored(&self, name: &OsStr, is_dir: bool) -> bool {
        let path = self.dir.join(name);
        for matcher in &self.matchers {
            let matched = matcher.matched(&path, is_dir);
            if matched.is_ignore() {
                return true;
            }
            if matched.is_whitelist() {
                return false;
            }
        }
        false
    }
}

impl LocalLister {
    pub fn new(options: &MediaTreeOptions) -> Result<Self> {
        Ok(Self {
            root: PathBuf::from(&options.root),
            include_hidden: options.include_hidden,
            respect_gitignore: options.respect_gitignore,
            follow_links: options.follow_links,
            sort_entries: options.sort_entries,
            exclude: ExcludeFilter::new(&options.exclude)?,
            gitignores: RefCell::new(HashMap::new()),
        })
    }

    fn walk_builder(&self, dir: &Path) -> WalkBuilder {
        let mut builder = WalkBuilder::new(dir);
        builder
            .standard_filters(false)
            .hidden(!self.include_hidden)
            .max_depth(Some(1))
            .follow_links(false);
        if self.sort_entries {
            builder.sort_by_file_name(|a, b| a.cmp(b));
        }
        builder
    }

    /// Collects `.gitignore` files from `dir` upward. The search stops at the enclosing
    /// repository root, or at the scan root when `dir` is not inside a repository.
    fn ignore_rules(&self, dir: &Path) -> Option<IgnoreRules> {
        let canonical = fs::canonicalize(dir).ok()?;
        let chain: Vec<&Path> = canonical.ancestors().collect();
        let last = chain
            .iter()
            .position(|d| d.join(".git").exists())
            .or_else(|| {
                let scan_root = fs::canonicalize(&self.root).ok()?;
                chain.iter().position(|d| *d == scan_root)
            })
            .unwrap_or(0);
        let matchers = chain[..=last]
            .iter()
            .filter_map(|d| self.gitignore_for(d))
            .collect();
        Some(IgnoreRules {
            dir: canonical,
            matchers,
        })
    }

    fn gitignore_for(&self, dir: &Path) -> Option<Gitignore> {
        if let Some(cached) = self.gitignores.borrow().get(dir) {
            return cached.clone();
        }
        let file = dir.join(".gitignore");
        let matcher = if file.is_file() {
            let mut builder = GitignoreBuilder::new(dir);
            if let Some(_err) = builder.add(&file) {
                #[cfg(feature = "logging")]
                tracing::warn!("Problem reading {}: {}", file.display(), _err);
            }
            builder.build().ok()
        } else {
            None
        };
        self.gitignores
            .borrow_mut()
            .insert(dir.to_path_buf(), matcher.clone());
        matcher
    }
}

/// Canonical forms of every prefix of `dir`: the folders the walk is currently inside.
fn open_folders(dir: &Path) -> Vec<PathBuf> {
    dir.ancestors()
        .filter(|p| !p.as_os_str().is_empty())
        .filter_map(|p| fs::canonicalize(p).ok())
        .collect()
}

impl Lister for LocalLister {
    fn list(&self, path: &str) -> Result<Vec<Entry>> {
        let dir = Path::new(path);
        let metadata = fs::metadata(dir).map_err(|_| MediaTreeError::not_found(path))?;
        if !metadata.is_dir() {
            return Err(MediaTreeError::not_found(path));
        }
        #[cfg(feature = "logging")]
        tracing::debug!("Listing local directory: {}", dir.display());

        let rules = if self.respect_gitignore {
            self.ignore_rules(dir)
        } else {
            None
        };
        let mut ancestors: Option<Vec<PathBuf>> = None;
        let mut entries = Vec::new();
        for result in self.walk_builder(dir).build() {
            let dent = result.map_err(|_e| {
                #[cfg(feature = "logging")]
                tracing::debug!("Cannot enumerate {}: {}", dir.display(), _e);
                MediaTreeError::not_found(path)
            })?;
            if dent.depth() == 0 {
                continue;
            }
            let is_link = dent.path_is_symlink();
            if is_link && !self.follow_links {
                continue;
            }
            let meta = match fs::metadata(dent.path()) {
                Ok(meta) => meta,
                Err(_e) if is_link => {
                    #[cfg(feature = "logging")]
                    tracing::warn!("Skipping broken symlink {}: {}", dent.path().display(), _e);
                    continue;
                }
                Err(e) => return Err(MediaTreeError::io(dent.path(), e)),
            };
            if is_link && meta.is_dir() {
                let target = fs::canonicalize(dent.path())
                    .map_err(|e| MediaTreeError::io(dent.path(), e))?;
                if ancestors.get_or_insert_with(|| open_folders(dir)).contains(&target) {
                    #[cfg(feature = "logging")]
                    tracing::warn!("Skipping symlink loop {}", dent.path().display());
                    continue;
                }
            }
            if let Some(rules) = &rules {
                if dent.file_name() == ".git"
                    || rules.is_ignored(dent.file_name(), meta.is_dir())
                {
                    continue;
                }
            }
            let kind = if meta.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            let entry = Entry {
                name: dent.file_name().to_string_lossy().into_owned(),
                kind,
                size: if kind == EntryKind::File { meta.len() } else { 0 },
                path: normalize_separators(&dent.path().to_string_lossy()),
                modified: meta.modified().ok().map(format_timestamp),
                download_url: None,
            };
            if self.exclude.is_excluded(&entry) {
                continue;
            }
            entries.push(entry);
        }
        Ok(entries)
    }
}

/// RFC 3339 in UTC with millisecond precision, e.g. `2024-05-01T09:30:00.000Z`.
pub(crate) fn format_timestamp(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TreeBuilder;
    use std::time::{Duration, UNIX_EPOCH};
    use tempfile::tempdir;

    fn lister() -> LocalLister {
        LocalLister::new(&MediaTreeOptions::default()).unwrap()
    }

    fn lister_with(root: &Path, edit: impl FnOnce(&mut MediaTreeOptions)) -> LocalLister {
        let mut options = MediaTreeOptions {
            root: root.to_string_lossy().into_owned(),
            ..MediaTreeOptions::default()
        };
        edit(&mut options);
        LocalLister::new(&options).unwrap()
    }

    fn names(lister: &LocalLister, dir: &Path) -> Vec<String> {
        lister
            .list(&dir.to_string_lossy())
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect()
    }

    #[test]
    fn timestamps_use_millisecond_utc() {
        let time = UNIX_EPOCH + Duration::from_millis(1_714_555_800_123);
        assert_eq!(format_timestamp(time), "2024-05-01T09:30:00.123Z");
    }

    #[test]
    fn lists_one_level_sorted() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), "bb").unwrap();
        fs::write(dir.path().join("a.png"), "a").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/deep.txt"), "x").unwrap();

        let root = dir.path().to_string_lossy().into_owned();
        let entries = lister().list(&root).unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["a.png", "b.txt", "sub"]);
        assert_eq!(entries[0].size, 1);
        assert_eq!(entries[1].size, 2);
        assert!(entries[2].is_dir());
        assert_eq!(entries[2].size, 0);
        assert!(entries[0].modified.is_some());
        assert!(entries[0].path.ends_with("/a.png"));
    }

    #[test]
    fn missing_directory_is_not_found() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope").to_string_lossy().into_owned();
        let err = lister().list(&missing).unwrap_err();
        assert!(matches!(err, MediaTreeError::NotFound { .. }));
    }

    #[test]
    fn hidden_entries_follow_option() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".hidden.png"), "h").unwrap();
        fs::write(dir.path().join("shown.png"), "s").unwrap();
        let root = dir.path().to_string_lossy().into_owned();

        assert_eq!(lister().list(&root).unwrap().len(), 2);

        let options = MediaTreeOptions {
            include_hidden: false,
            ..MediaTreeOptions::default()
        };
        let entries = LocalLister::new(&options).unwrap().list(&root).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "shown.png");
    }

    #[test]
    fn path_below_a_file_is_not_found() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("plain.txt"), "x").unwrap();
        let inside = dir.path().join("plain.txt/sub").to_string_lossy().into_owned();
        let err = lister().list(&inside).unwrap_err();
        assert!(matches!(err, MediaTreeError::NotFound { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_directory_is_not_found() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let locked = dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("a.png"), "a").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        let readable = fs::read_dir(&locked).is_ok();
        let result = lister().list(&locked.to_string_lossy());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        // Privileged users can read the directory regardless of its mode.
        if readable {
            return;
        }
        assert!(matches!(result, Err(MediaTreeError::NotFound { .. })));
    }

    #[test]
    fn gitignore_of_enclosing_repository_applies_at_every_depth() {
        let dir = tempdir().unwrap();
        let repo = dir.path().join("repo");
        let imgs = repo.join("imgs");
        fs::create_dir_all(repo.join(".git")).unwrap();
        fs::create_dir_all(imgs.join("sub")).unwrap();
        fs::write(repo.join(".gitignore"), "*.tmp\n").unwrap();
        fs::write(imgs.join("a.png"), "a").unwrap();
        fs::write(imgs.join("junk.tmp"), "j").unwrap();
        fs::write(imgs.join("sub/b.png"), "b").unwrap();
        fs::write(imgs.join("sub/y.tmp"), "y").unwrap();

        let ignoring = lister_with(&imgs, |o| o.respect_gitignore = true);
        assert_eq!(names(&ignoring, &imgs), ["a.png", "sub"]);
        assert_eq!(names(&ignoring, &imgs.join("sub")), ["b.png"]);

        let plain = lister_with(&imgs, |_| {});
        assert_eq!(names(&plain, &imgs), ["a.png", "junk.tmp", "sub"]);
    }

    #[test]
    fn scan_root_gitignore_reaches_nested_folders() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("media");
        fs::create_dir_all(root.join("sub/keep")).unwrap();
        fs::write(root.join(".gitignore"), "*.tmp\n").unwrap();
        fs::write(root.join("top.tmp"), "t").unwrap();
        fs::write(root.join("sub/deep.tmp"), "d").unwrap();
        fs::write(root.join("sub/keep/.gitignore"), "!wanted.tmp\n").unwrap();
        fs::write(root.join("sub/keep/wanted.tmp"), "w").unwrap();
        fs::write(root.join("sub/keep/other.tmp"), "o").unwrap();

        let lister = lister_with(&root, |o| o.respect_gitignore = true);
        let (_, flat) = TreeBuilder::new(&lister)
            .build(&root.to_string_lossy())
            .unwrap();
        let found: Vec<_> = flat.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(found, [".gitignore", ".gitignore", "wanted.tmp"]);
    }

    #[test]
    fn unsorted_listing_keeps_directory_order() {
        let dir = tempdir().unwrap();
        for name in ["delta.png", "alpha.png", "charlie.png", "bravo.png", "echo.png"] {
            fs::write(dir.path().join(name), name).unwrap();
        }
        let expected: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();

        let unsorted = lister_with(dir.path(), |o| o.sort_entries = false);
        assert_eq!(names(&unsorted, dir.path()), expected);

        let mut sorted = expected.clone();
        sorted.sort();
        assert_eq!(names(&lister(), dir.path()), sorted);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directory_is_listed_as_directory() {
        use std::os::unix::fs::symlink;

        let dir = tempdir().unwrap();
        let real = dir.path().join("real");
        let imgs = dir.path().join("imgs");
        fs::create_dir_all(&real).unwrap();
        fs::create_dir_all(&imgs).unwrap();
        fs::write(real.join("inner.png"), "inner").unwrap();
        symlink(&real, imgs.join("alias")).unwrap();
        symlink(real.join("inner.png"), imgs.join("pic.png")).unwrap();

        let entries = lister().list(&imgs.to_string_lossy()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "alias");
        assert!(entries[0].is_dir());
        assert_eq!(entries[0].size, 0);
        assert_eq!(entries[1].name, "pic.png");
        assert_eq!(entries[1].size, 5);

        let (_, flat) = TreeBuilder::new(lister())
            .build(&imgs.to_string_lossy())
            .unwrap();
        let found: Vec<_> = flat.iter().map(|r| r.path.clone()).collect();
        let base = normalize_separators(&imgs.to_string_lossy());
        assert_eq!(
            found,
            [format!("{base}/alias/inner.png"), format!("{base}/pic.png")]
        );

        let unfollowed = lister_with(&imgs, |o| o.follow_links = false);
        assert!(unfollowed.list(&imgs.to_string_lossy()).unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn symlink_loops_and_broken_links_are_skipped() {
        use std::os::unix::fs::symlink;

        let dir = tempdir().unwrap();
        let imgs = dir.path().join("imgs");
        fs::create_dir_all(imgs.join("sub")).unwrap();
        fs::write(imgs.join("a.png"), "a").unwrap();
        symlink(&imgs, imgs.join("sub/back")).unwrap();
        symlink(dir.path().join("missing"), imgs.join("dangling")).unwrap();

        let lister = lister();
        assert_eq!(names(&lister, &imgs), ["a.png", "sub"]);
        assert!(names(&lister, &imgs.join("sub")).is_empty());

        let (tree, flat) = TreeBuilder::new(&lister)
            .build(&imgs.to_string_lossy())
            .unwrap();
        assert_eq!(flat.len(), 1);
        assert_eq!(tree.folder_count(), 2);
    }
}
