//! Raw hierarchical category payload as delivered by the catalog service.

use serde::Deserialize;

/// One category node of the raw payload.
///
/// ```json
/// { "identifier": "haz", "name": "Hazard products", "children": [], "items": [] }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CategoryPayload<T = serde_json::Value> {
    pub identifier: String,
    pub name: String,
    #[serde(default = "Vec::new")]
    pub children: Vec<CategoryPayload<T>>,
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

impl<T> CategoryPayload<T> {
    pub fn new(identifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            name: name.into(),
            children: Vec::new(),
            items: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<CategoryPayload<T>>) -> Self {
        self.children = children;
        self
    }

    pub fn with_items(mut self, items: Vec<T>) -> Self {
        self.items = items;
        self
    }
}

/// A payload document holds either a single root or a list of roots.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PayloadDocument<T = serde_json::Value> {
    Many(Vec<CategoryPayload<T>>),
    One(CategoryPayload<T>),
}

impl<T> PayloadDocument<T> {
    pub fn into_roots(self) -> Vec<CategoryPayload<T>> {
        match self {
            PayloadDocument::Many(roots) => roots,
            PayloadDocument::One(root) => vec![root],
        }
    }
}
