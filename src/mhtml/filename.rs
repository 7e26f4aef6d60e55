//! Local filename derivation for extracted resources.
//!
//! A resource keeps the last segment of its URI path when that segment
//! already ends in an extension matching its content type. Otherwise the
//! subtype is appended, except for Blink's inline style sheet fragments
//! (`<name>@mhtml.blink`), which always become `<name>.css`.

use std::path::Path;

use url::Url;

use crate::error::{Error, Result};

use super::structures::{ContentType, UriParts};

/// Suffix Chromium gives to style sheets it serialized from inline CSS.
pub const BLINK_STYLE_SENTINEL: &str = "mhtml.blink";

/// Folder name used when the document has no usable location.
pub const DEFAULT_FOLDER: &str = "data";

/// Candidate used when the URI path has no final segment.
const EMPTY_CANDIDATE: &str = "resource";

/// Split a URI into its components.
///
/// Relative references are accepted and split by hand on `#` and `?`.
pub fn parse_uri(uri: &str) -> Result<UriParts> {
    match Url::parse(uri) {
        Ok(url) => Ok(UriParts {
            scheme: Some(url.scheme().to_string()),
            host: url.host_str().map(str::to_string),
            path: url.path().to_string(),
            query: url.query().map(str::to_string),
            fragment: url.fragment().map(str::to_string),
        }),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let (rest, fragment) = match uri.split_once('#') {
                Some((rest, fragment)) => (rest, Some(fragment.to_string())),
                None => (uri, None),
            };
            let (path, query) = match rest.split_once('?') {
                Some((path, query)) => (path, Some(query.to_string())),
                None => (rest, None),
            };
            Ok(UriParts {
                path: path.to_string(),
                query,
                fragment,
                ..UriParts::default()
            })
        }
        Err(source) => Err(Error::InvalidUri {
            uri: uri.to_string(),
            source,
        }),
    }
}

/// Final segment of a URI path, trailing `/` ignored.
pub fn candidate_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| EMPTY_CANDIDATE.to_string())
}

/// Extension of a file name without the dot, empty if there is none.
pub fn extension_of(name: &str) -> String {
    Path::new(name)
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Derive the local filename for a resource whose URI path is `path`.
pub fn derive_filename(path: &str, content_type: &ContentType) -> String {
    let candidate = candidate_name(path);
    let extension = extension_of(&candidate);
    let tokens = content_type.extension_tokens();

    if tokens.contains(&extension.as_str()) {
        return candidate;
    }

    let segments: Vec<&str> = candidate.split('@').collect();
    if segments.last() == Some(&BLINK_STYLE_SENTINEL) {
        return format!("{}.css", segments[0]);
    }

    // the last token is the subtype, or `svg` for `svg+xml`
    let suffix = tokens.last().copied().unwrap_or(content_type.subtype.as_str());
    format!("{candidate}.{suffix}")
}

/// Name of the output folder for a document saved from `location`.
///
/// The whole location is treated as a path, so a bare origin such as
/// `https://example.com/` yields `example.com`.
pub fn folder_name(location: Option<&str>) -> String {
    let name = location
        .and_then(|location| Path::new(location).file_name())
        .map(|name| sanitize_filename::sanitize(name.to_string_lossy()))
        .unwrap_or_default();
    if name.is_empty() {
        DEFAULT_FOLDER.to_string()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn derive(uri: &str, mimetype: &str) -> String {
        let parts = parse_uri(uri).unwrap();
        derive_filename(&parts.path, &ContentType::parse(mimetype))
    }

    #[test]
    fn matching_extension_is_kept() {
        assert_eq!(derive("http://x/img.png", "image/png"), "img.png");
        assert_eq!(derive("http://x/a/b/site.css?v=3", "text/css"), "site.css");
        assert_eq!(derive("https://cdn.x/lib/app.js", "text/js"), "app.js");
    }

    #[test]
    fn extension_match_is_case_sensitive() {
        assert_eq!(derive("http://x/IMG.PNG", "image/png"), "IMG.PNG.png");
    }

    #[test]
    fn subtype_is_appended_without_match() {
        assert_eq!(derive("http://x/avatar", "image/png"), "avatar.png");
        assert_eq!(derive("http://x/photo.jpg", "image/jpeg"), "photo.jpg.jpeg");
        assert_eq!(derive("http://x/app.js", "application/javascript"), "app.js.javascript");
    }

    #[test]
    fn blink_sentinel_becomes_css() {
        assert_eq!(derive("http://x/foo@mhtml.blink", "text/css"), "foo.css");
        assert_eq!(
            derive("cid:css-3f2a1b@mhtml.blink", "text/css"),
            "css-3f2a1b.css"
        );
    }

    #[test]
    fn svg_xml_accepts_svg_extension() {
        assert_eq!(derive("http://x/icon", "image/svg+xml"), "icon.svg");
        assert_eq!(derive("http://x/icon.svg", "image/svg+xml"), "icon.svg");
    }

    #[test]
    fn empty_path_uses_placeholder() {
        assert_eq!(derive("http://x/", "image/gif"), "resource.gif");
        assert_eq!(derive("http://x/dir/", "text/css"), "dir.css");
    }

    #[test]
    fn relative_references_are_split() {
        let parts = parse_uri("images/logo.png?size=2#top").unwrap();
        assert_eq!(parts.scheme, None);
        assert_eq!(parts.path, "images/logo.png");
        assert_eq!(parts.query.as_deref(), Some("size=2"));
        assert_eq!(parts.fragment.as_deref(), Some("top"));
    }

    #[test]
    fn absolute_references_are_split() {
        let parts = parse_uri("https://example.com/a/b.png?x=1").unwrap();
        assert_eq!(parts.scheme.as_deref(), Some("https"));
        assert_eq!(parts.host.as_deref(), Some("example.com"));
        assert_eq!(parts.path, "/a/b.png");
        assert_eq!(parts.query.as_deref(), Some("x=1"));
    }

    #[test]
    fn invalid_uri_is_reported() {
        let err = parse_uri("http://[::1").unwrap_err();
        assert!(matches!(err, Error::InvalidUri { .. }));
    }

    #[test]
    fn folder_name_from_location() {
        assert_eq!(folder_name(Some("http://x/articles/page.html")), "page.html");
        assert_eq!(folder_name(Some("https://example.com/")), "example.com");
        assert_eq!(folder_name(None), DEFAULT_FOLDER);
        assert_eq!(folder_name(Some("/")), DEFAULT_FOLDER);
    }
}
