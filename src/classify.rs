//! Name splitting and entry classification.

use crate::types::{Entry, NodeKind};

/// Extensions, lowercased, that mark a file as an image.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "avif"];

/// Splits a file name on its last `.` into a stem and a lowercased extension.
///
/// A name without a dot has an empty extension and is returned whole as the stem.
pub fn split_name(name: &str) -> (&str, String) {
    match name.rsplit_once('.') {
        Some((stem, ext)) => (stem, ext.to_lowercase()),
        None => (name, String::new()),
    }
}

pub fn is_image_name(name: &str) -> bool {
    let (_, ext) = split_name(name);
    IMAGE_EXTENSIONS.contains(&ext.as_str())
}

/// Directories are folders regardless of their name; files are images or plain files
/// by extension, compared case-insensitively.
pub fn classify(entry: &Entry) -> NodeKind {
    if entry.is_dir() {
        NodeKind::Folder
    } else if is_image_name(&entry.name) {
        NodeKind::Img
    } else {
        NodeKind::File
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_last_dot() {
        assert_eq!(split_name("photo.final.JPG"), ("photo.final", "jpg".to_string()));
        assert_eq!(split_name("README"), ("README", String::new()));
        assert_eq!(split_name("archive."), ("archive", String::new()));
        assert_eq!(split_name(".gitkeep"), ("", "gitkeep".to_string()));
    }

    #[test]
    fn image_extensions_are_case_insensitive() {
        for name in ["a.jpg", "a.JPEG", "a.Png", "a.gif", "a.WEBP", "a.avif"] {
            assert_eq!(classify(&Entry::file(name, name, 1)), NodeKind::Img, "{name}");
        }
    }

    #[test]
    fn other_files_are_plain() {
        for name in ["notes.txt", "clip.mp4", "noext", "image.png.bak", "svg.svg"] {
            assert_eq!(classify(&Entry::file(name, name, 1)), NodeKind::File, "{name}");
        }
    }

    #[test]
    fn directories_win_over_extension() {
        let entry = Entry::directory("album.png", "imgs/album.png");
        assert_eq!(classify(&entry), NodeKind::Folder);
    }
}
