//! Content classification by file extension.

use crate::config::MediaConfig;
use crate::naming::extension_of;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Image,
    Video,
    Markdown,
    Unsupported,
}

/// Classify `path` by its lower-cased extension. Image extensions win over
/// video ones if a type appears in both sets.
pub fn classify(path: &str, media: &MediaConfig) -> ContentKind {
    let ext = extension_of(path);
    if media.image_extensions.contains(&ext) {
        ContentKind::Image
    } else if media.video_extensions.contains(&ext) {
        ContentKind::Video
    } else if ext == "md" {
        ContentKind::Markdown
    } else {
        ContentKind::Unsupported
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(path: &str) -> ContentKind {
        classify(path, &MediaConfig::default())
    }

    #[test]
    fn classifies_by_extension() {
        assert_eq!(kind("a/photo.jpg"), ContentKind::Image);
        assert_eq!(kind("diagram.svg"), ContentKind::Image);
        assert_eq!(kind("clip.mov"), ContentKind::Video);
        assert_eq!(kind("notes/1. Intro.md"), ContentKind::Markdown);
        assert_eq!(kind("paper.pdf"), ContentKind::Unsupported);
        assert_eq!(kind("Makefile"), ContentKind::Unsupported);
    }

    #[test]
    fn extension_case_is_ignored() {
        assert_eq!(kind("PHOTO.JPEG"), ContentKind::Image);
        assert_eq!(kind("Clip.WebM"), ContentKind::Video);
        assert_eq!(kind("README.MD"), ContentKind::Markdown);
    }

    #[test]
    fn image_set_takes_precedence() {
        let media = MediaConfig {
            image_extensions: vec!["gif".to_string()],
            video_extensions: vec!["gif".to_string()],
        };
        assert_eq!(classify("a.gif", &media), ContentKind::Image);
    }

    #[test]
    fn custom_video_set() {
        let media = MediaConfig {
            video_extensions: vec!["mkv".to_string()],
            ..MediaConfig::default()
        };
        assert_eq!(classify("film.mkv", &media), ContentKind::Video);
        assert_eq!(classify("film.mp4", &media), ContentKind::Unsupported);
    }
}
