//! The listing seam that the tree builder walks through.

use crate::error::{MediaTreeError, Result};
use crate::types::Entry;
use globset::{Glob, GlobSet, GlobSetBuilder};

/// Enumerates the direct children of one directory.
///
/// Implementations return entries in a stable order; the tree builder keeps that order
/// as-is. A path that does not exist or cannot be enumerated is an error.
pub trait Lister {
    fn list(&self, path: &str) -> Result<Vec<Entry>>;
}

impl<L: Lister + ?Sized> Lister for &L {
    fn list(&self, path: &str) -> Result<Vec<Entry>> {
        (**self).list(path)
    }
}

impl<L: Lister + ?Sized> Lister for Box<L> {
    fn list(&self, path: &str) -> Result<Vec<Entry>> {
        (**self).list(path)
    }
}

/// Drops entries whose name or path matches any configured glob.
#[derive(Debug, Clone, Default)]
pub(crate) struct ExcludeFilter {
    matcher: Option<GlobSet>,
}

impl ExcludeFilter {
    pub(crate) fn new(patterns: &[String]) -> Result<Self> {
        if patterns.is_empty() {
            return Ok(Self::default());
        }
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = Glob::new(pattern)
                .map_err(|e| MediaTreeError::Pattern(format!("'{}': {}", pattern, e)))?;
            builder.add(glob);
        }
        let matcher = builder
            .build()
            .map_err(|e| MediaTreeError::Pattern(format!("failed to build glob set: {}", e)))?;
        Ok(Self {
            matcher: Some(matcher),
        })
    }

    pub(crate) fn is_excluded(&self, entry: &Entry) -> bool {
        match &self.matcher {
            Some(matcher) => matcher.is_match(&entry.name) || matcher.is_match(&entry.path),
            None => false,
        }
    }
}

pub(crate) fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

/// Last `/`-separated component of a path, or the path itself when it has none.
pub(crate) fn base_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rsplit_once('/') {
        Some((_, last)) if !last.is_empty() => last,
        _ if trimmed.is_empty() => path,
        _ => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_name_takes_last_component() {
        assert_eq!(base_name("imgs"), "imgs");
        assert_eq!(base_name("imgs/2024/"), "2024");
        assert_eq!(base_name("media/imgs/sub"), "sub");
        assert_eq!(base_name("/"), "/");
    }

    #[test]
    fn exclude_matches_name_or_path() {
        let filter = ExcludeFilter::new(&["*.DS_Store".into(), "imgs/private/**".into()]).unwrap();
        assert!(filter.is_excluded(&Entry::file(".DS_Store", "imgs/.DS_Store", 0)));
        assert!(filter.is_excluded(&Entry::file("a.png", "imgs/private/a.png", 1)));
        assert!(!filter.is_excluded(&Entry::file("a.png", "imgs/a.png", 1)));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let err = ExcludeFilter::new(&["[".into()]).unwrap_err();
        assert!(matches!(err, MediaTreeError::Pattern(_)));
    }
}
