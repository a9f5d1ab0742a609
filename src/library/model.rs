use serde::{Deserialize, Serialize};

/// Fixed classification used to group snippets in the sidebar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Calculation,
    Modification,
    Text,
    Layers,
    Blocks,
    #[default]
    #[serde(other)]
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Calculation,
        Category::Modification,
        Category::Text,
        Category::Layers,
        Category::Blocks,
        Category::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Calculation => "Hesaplama",
            Category::Modification => "Düzenleme",
            Category::Text => "Yazı & Not",
            Category::Layers => "Layerlar",
            Category::Blocks => "Bloklar",
            Category::Other => "Diğer Araçlar",
        }
    }
}

/// A reusable AutoLISP routine in the library.
///
/// `id` is unique across the active collection and immutable once created.
/// The download/like counters are display-only and never enforced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snippet {
    pub id: String,
    pub title: String,
    pub description: String,
    pub code: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downloads: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<u32>,
}
