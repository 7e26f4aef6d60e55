//! The HTML document of an archive and its link index.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

use kuchiki::NodeRef;
use kuchiki::traits::TendrilSink;

use crate::error::{Error, Result};

use super::filename::folder_name;
use super::structures::ContentType;

/// Attributes holding the location of a resource an element refers to.
pub const REFERENCE_ATTRIBUTES: [&str; 2] = ["href", "src"];

/// An element attribute that currently carries a given URI.
struct LinkTarget {
    node: NodeRef,
    attribute: &'static str,
}

/// Parsed HTML document together with an index from reference attribute
/// values to the elements carrying them.
///
/// The index is built once when the document is parsed. Rewriting a URI
/// consumes its index entries, so a URI referenced by several elements can be
/// rewritten one element at a time in document order.
pub struct Document {
    tree: NodeRef,
    content_type: ContentType,
    folder_name: String,
    index: HashMap<String, VecDeque<LinkTarget>>,
}

impl Document {
    pub fn parse(html: &str, content_type: ContentType, location: Option<String>) -> Self {
        let tree = kuchiki::parse_html().one(html);
        let index = build_index(&tree);
        let folder_name = folder_name(location.as_deref());
        Self {
            tree,
            content_type,
            folder_name,
            index,
        }
    }

    pub fn folder_name(&self) -> &str {
        &self.folder_name
    }

    /// Number of not yet rewritten references to `uri`.
    pub fn references(&self, uri: &str) -> usize {
        self.index.get(uri).map_or(0, VecDeque::len)
    }

    /// Point references to `uri` at `./<filename>`.
    ///
    /// Only the first remaining reference is rewritten unless `all` is set.
    /// Returns the number of attributes changed; zero means the document
    /// does not reference `uri`.
    pub fn rewrite(&mut self, uri: &str, filename: &str, all: bool) -> usize {
        let Some(targets) = self.index.get_mut(uri) else {
            return 0;
        };

        let selected: Vec<LinkTarget> = if all {
            targets.drain(..).collect()
        } else {
            targets.pop_front().into_iter().collect()
        };
        if targets.is_empty() {
            self.index.remove(uri);
        }

        let local = format!("./{filename}");
        let mut rewritten = 0;
        for target in selected {
            if let Some(element) = target.node.as_element() {
                element
                    .attributes
                    .borrow_mut()
                    .insert(target.attribute, local.clone());
                rewritten += 1;
            }
        }
        rewritten
    }

    /// Serialize the current state of the tree.
    pub fn to_html(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.tree.serialize(&mut out).map_err(Error::Serialize)?;
        Ok(out)
    }

    /// Write the current tree to `out-<type>-<subtype>-<timestamp>.html`
    /// inside `dir` for inspection.
    pub async fn write_snapshot(&self, dir: &Path) -> Result<PathBuf> {
        let timestamp = chrono::Utc::now().timestamp_micros();
        let path = dir.join(format!(
            "out-{}-{}-{}.html",
            self.content_type.kind, self.content_type.subtype, timestamp
        ));
        let html = self.to_html()?;
        tokio::fs::write(&path, html)
            .await
            .map_err(|source| Error::Write {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }
}

fn build_index(tree: &NodeRef) -> HashMap<String, VecDeque<LinkTarget>> {
    let mut index: HashMap<String, VecDeque<LinkTarget>> = HashMap::new();
    for node in tree.descendants() {
        let Some(element) = node.as_element() else {
            continue;
        };
        let attributes = element.attributes.borrow();
        for attribute in REFERENCE_ATTRIBUTES {
            if let Some(value) = attributes.get(attribute) {
                index
                    .entry(value.to_string())
                    .or_default()
                    .push_back(LinkTarget {
                        node: node.clone(),
                        attribute,
                    });
            }
        }
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><link rel="stylesheet" href="http://x/style@mhtml.blink"></head>
<body>
<img src="http://x/img.png">
<a href="http://x/img.png">full size</a>
<script src="http://x/app.js"></script>
</body>
</html>"#;

    fn document() -> Document {
        Document::parse(
            PAGE,
            ContentType::parse("text/html"),
            Some("http://x/articles/page.html".to_string()),
        )
    }

    fn html(doc: &Document) -> String {
        String::from_utf8(doc.to_html().unwrap()).unwrap()
    }

    #[test]
    fn indexes_href_and_src() {
        let doc = document();
        assert_eq!(doc.references("http://x/img.png"), 2);
        assert_eq!(doc.references("http://x/style@mhtml.blink"), 1);
        assert_eq!(doc.references("http://x/app.js"), 1);
        assert_eq!(doc.references("http://x/missing.png"), 0);
        assert_eq!(doc.folder_name(), "page.html");
    }

    #[test]
    fn rewrites_first_reference_only() {
        let mut doc = document();
        assert_eq!(doc.rewrite("http://x/img.png", "img.png", false), 1);

        let out = html(&doc);
        assert!(out.contains(r#"<img src="./img.png">"#));
        assert!(out.contains(r#"<a href="http://x/img.png">"#));
        assert_eq!(doc.references("http://x/img.png"), 1);

        // the next rewrite of the same URI picks up the following element
        assert_eq!(doc.rewrite("http://x/img.png", "img.png", false), 1);
        assert!(html(&doc).contains(r#"<a href="./img.png">"#));
        assert_eq!(doc.references("http://x/img.png"), 0);
    }

    #[test]
    fn rewrites_all_references() {
        let mut doc = document();
        assert_eq!(doc.rewrite("http://x/img.png", "img.png", true), 2);
        let out = html(&doc);
        assert!(!out.contains("http://x/img.png"));
        assert_eq!(out.matches("./img.png").count(), 2);
    }

    #[test]
    fn missing_reference_changes_nothing() {
        let mut doc = document();
        let before = html(&doc);
        assert_eq!(doc.rewrite("http://x/missing.png", "missing.png", false), 0);
        assert_eq!(html(&doc), before);
    }

    #[tokio::test]
    async fn snapshot_is_named_after_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = document().write_snapshot(dir.path()).await.unwrap();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("out-text-html-"));
        assert!(name.ends_with(".html"));
        assert!(std::fs::read_to_string(&path).unwrap().contains("<img"));
    }
}
