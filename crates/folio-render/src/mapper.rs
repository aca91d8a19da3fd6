//! Item to view model projection.

use std::sync::Arc;

use chrono::NaiveDate;

use folio_repo::{Item, ItemType, TagModel, ViewModel};

/// Language reported when an item declares none.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Map an item and its subtree into a view model.
///
/// `content` renders the body of each mapped item. Items of an unknown type
/// become error models; their siblings and ancestors map normally. The
/// returned model is attached to `item` as a cache.
pub fn map<F>(item: &Item, content: &F) -> Arc<ViewModel>
where
    F: Fn(&Item) -> String,
{
    let model = Arc::new(map_tree(item, content));
    item.attach_model(Arc::clone(&model));
    model
}

fn map_tree<F>(item: &Item, content: &F) -> ViewModel
where
    F: Fn(&Item) -> String,
{
    match &item.meta.item_type {
        ItemType::Document | ItemType::Presentation | ItemType::Message | ItemType::Repository => {
            let mut model = populated(item, content(item));
            model.childs = item.children.iter().map(|child| map_tree(child, content)).collect();
            model
        }
        ItemType::Unknown(name) => {
            tracing::warn!(route = %item.route, item_type = %name, "No mapper for item type");
            ViewModel {
                level: item.level,
                ..ViewModel::error(
                    "Item type not recognized",
                    format!("There is no mapper available for items of type {name:?}"),
                    item.route.value(),
                    item.route.url(),
                )
            }
        }
    }
}

fn populated(item: &Item, content: String) -> ViewModel {
    ViewModel {
        level: item.level,
        relative_route: item.route.value(),
        absolute_route: item.route.url(),
        title: item.title.clone(),
        description: item.description.clone(),
        content,
        language_tag: language_tag(item.meta.language.as_deref()),
        date: format_date(item.meta.date),
        item_type: item.meta.item_type.as_str().to_owned(),
        tags: item
            .meta
            .tags
            .iter()
            .map(|tag| TagModel {
                name: tag.name().to_owned(),
            })
            .collect(),
        childs: Vec::new(),
    }
}

/// Two-letter language code (`en-US` → `en`).
#[must_use]
pub fn language_tag(language: Option<&str>) -> String {
    let code: String = language
        .and_then(|l| l.split(['-', '_']).next())
        .map(str::trim)
        .unwrap_or_default()
        .chars()
        .take(2)
        .collect();

    if code.len() == 2 {
        code.to_lowercase()
    } else {
        DEFAULT_LANGUAGE.to_owned()
    }
}

/// `YYYY-MM-DD`, empty when unknown.
#[must_use]
pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}
