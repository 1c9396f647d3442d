//! Extension-only response processors.

use courier_core::{APPLICATION_XML, ExtensionMapping, ResponseProcessor};
use mime::Mime;
use std::borrow::Cow;

/// A response processor defined purely by its extension mappings.
///
/// # Example
///
/// ```rust,ignore
/// let processors: Vec<Arc<dyn ResponseProcessor>> = vec![
///     Arc::new(ExtensionMap::json()),
///     Arc::new(ExtensionMap::new().with("csv", "text/csv".parse().unwrap())),
/// ];
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExtensionMap {
    mappings: Vec<ExtensionMapping>,
}

impl ExtensionMap {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mapping. The extension is given without the leading dot.
    #[must_use]
    pub fn with(mut self, extension: impl Into<Cow<'static, str>>, media_type: Mime) -> Self {
        self.mappings.push(ExtensionMapping::new(extension, media_type));
        self
    }

    /// `json` → `application/json`.
    pub fn json() -> Self {
        Self::new().with("json", mime::APPLICATION_JSON)
    }

    /// `xml` → `application/xml`.
    pub fn xml() -> Self {
        Self::new().with("xml", APPLICATION_XML.clone())
    }

    /// `html` and `htm` → `text/html`.
    pub fn html() -> Self {
        Self::new()
            .with("html", mime::TEXT_HTML)
            .with("htm", mime::TEXT_HTML)
    }
}

impl ResponseProcessor for ExtensionMap {
    fn extension_mappings(&self) -> &[ExtensionMapping] {
        &self.mappings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let json = ExtensionMap::json();
        assert_eq!(json.extension_mappings().len(), 1);
        assert_eq!(json.extension_mappings()[0].extension(), "json");

        let xml = ExtensionMap::xml();
        assert!(xml.extension_mappings()[0].applies_to("XML"));
        assert_eq!(
            xml.extension_mappings()[0].media_type().essence_str(),
            "application/xml"
        );

        let html = ExtensionMap::html();
        assert!(
            html.extension_mappings()
                .iter()
                .all(|m| m.media_type() == &mime::TEXT_HTML)
        );
    }
}
