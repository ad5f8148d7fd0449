//! Extension-based media classification.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MediaKind {
    Video,
    Image,
}

/// Consulted top to bottom; the first row whose extension set matches wins.
const MEDIA_KINDS: &[(MediaKind, &[&str])] = &[
    (MediaKind::Video, &["mp4", "webm", "ogg"]),
    (MediaKind::Image, &["jpeg", "jpg", "png", "gif", "svg"]),
];

pub fn classify(resource_uri: &str) -> Option<MediaKind> {
    let extension = extension_of(resource_uri)?;

    MEDIA_KINDS
        .iter()
        .find(|(_, extensions)| {
            extensions
                .iter()
                .any(|candidate| candidate.eq_ignore_ascii_case(extension))
        })
        .map(|(kind, _)| *kind)
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
pub fn unsupported_message(resource_uri: &str) -> String {
    format!("Unsupported media type: {resource_uri}")
}

fn extension_of(resource_uri: &str) -> Option<&str> {
    let path = resource_uri
        .split(['?', '#'])
        .next()
        .unwrap_or(resource_uri);
    let file_name = path.rsplit('/').next().unwrap_or(path);
    let (stem, extension) = file_name.rsplit_once('.')?;

    if stem.is_empty() || extension.is_empty() {
        return None;
    }

    Some(extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_extensions_classify_as_video() {
        for uri in ["/media/BatSwinging.mp4", "clip.WEBM", "/a/b/intro.ogg"] {
            assert_eq!(classify(uri), Some(MediaKind::Video), "{uri}");
        }
    }

    #[test]
    fn image_extensions_classify_as_image() {
        for uri in ["/media/DungeonGeneration.png", "a.JPG", "b.jpeg", "c.gif", "logo.Svg"] {
            assert_eq!(classify(uri), Some(MediaKind::Image), "{uri}");
        }
    }

    #[test]
    fn unknown_extension_is_unsupported_with_visible_message() {
        assert_eq!(classify("photo.bmp"), None);
        assert_eq!(unsupported_message("photo.bmp"), "Unsupported media type: photo.bmp");
    }

    #[test]
    fn query_and_fragment_do_not_hide_the_extension() {
        assert_eq!(classify("/media/clip.mp4?v=2"), Some(MediaKind::Video));
        assert_eq!(classify("/media/still.png#frame"), Some(MediaKind::Image));
    }

    #[test]
    fn missing_extension_or_dotfile_is_unsupported() {
        assert_eq!(classify("/media/clip"), None);
        assert_eq!(classify("/media/.png"), None);
        assert_eq!(classify("/media.dir/clip"), None);
        assert_eq!(classify("clip."), None);
    }
}
