//! Read-only rendering models derived from items.

use serde::Serialize;

/// Item type reported by error models.
pub const ERROR_TYPE: &str = "error";

/// Tag as exposed to templates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TagModel {
    /// Normalized tag name.
    pub name: String,
}

/// Rendering projection of an item and its subtree.
///
/// Owns its children; built fresh by the view mapper and never shares
/// structure with the source item tree.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewModel {
    /// Depth in the item tree (root is 0).
    pub level: usize,
    /// Route without leading slash.
    pub relative_route: String,
    /// Route with leading slash.
    pub absolute_route: String,
    /// Display title.
    pub title: String,
    /// Short description.
    pub description: String,
    /// Rendered body.
    pub content: String,
    /// Two-letter language code.
    pub language_tag: String,
    /// Publication date (`YYYY-MM-DD`), empty when unknown.
    pub date: String,
    /// Item type name.
    #[serde(rename = "type")]
    pub item_type: String,
    /// Item tags.
    pub tags: Vec<TagModel>,
    /// Child models in item order.
    pub childs: Vec<ViewModel>,
}

impl ViewModel {
    /// Create an error model standing in for an item that could not be mapped.
    #[must_use]
    pub fn error(
        title: impl Into<String>,
        description: impl Into<String>,
        relative_route: impl Into<String>,
        absolute_route: impl Into<String>,
    ) -> Self {
        let description = description.into();
        Self {
            relative_route: relative_route.into(),
            absolute_route: absolute_route.into(),
            title: title.into(),
            content: description.clone(),
            description,
            item_type: ERROR_TYPE.to_owned(),
            ..Self::default()
        }
    }

    /// Whether this is an error model.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.item_type == ERROR_TYPE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_model() {
        let model = ViewModel::error("Broken", "No mapper", "a/b", "/a/b");

        assert!(model.is_error());
        assert_eq!(model.title, "Broken");
        assert_eq!(model.content, "No mapper");
        assert_eq!(model.relative_route, "a/b");
        assert_eq!(model.absolute_route, "/a/b");
        assert!(model.childs.is_empty());
    }

    #[test]
    fn test_serialization_uses_camel_case() {
        let model = ViewModel {
            relative_route: "guide".to_owned(),
            language_tag: "en".to_owned(),
            item_type: "document".to_owned(),
            ..ViewModel::default()
        };

        let json = serde_json::to_value(&model).unwrap();

        assert_eq!(json["relativeRoute"], "guide");
        assert_eq!(json["languageTag"], "en");
        assert_eq!(json["type"], "document");
        assert!(json["childs"].as_array().unwrap().is_empty());
    }
}
