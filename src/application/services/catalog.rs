//! Catalog service
//!
//! Loads category payloads and turns them into fresh catalogs. A changed
//! payload is always rebuilt into a new catalog rather than patched in place.

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{
    select_subtree, selected_count, selection_state, BuildOptions, Catalog, CategoryPayload,
    FacetTreeBuilder, PayloadDocument, SelectionState,
};
use crate::infrastructure::traits::FileSystem;

/// Selection summary of one parent item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionRow {
    pub id: String,
    pub label: String,
    pub depth: usize,
    pub leaf_count: usize,
    pub selected: usize,
    pub state: SelectionState,
}

/// Outcome of a selection, as shown by the category filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionReport {
    /// Selected leaves across all roots (the badge)
    pub selected_count: usize,
    /// Every parent item in pre-order
    pub rows: Vec<SelectionRow>,
}

/// Service for loading payloads and building catalogs.
pub struct CatalogService {
    fs: Arc<dyn FileSystem>,
    builder: FacetTreeBuilder,
}

impl CatalogService {
    /// Create a new catalog service.
    pub fn new(fs: Arc<dyn FileSystem>, options: BuildOptions) -> Self {
        Self {
            fs,
            builder: FacetTreeBuilder::new(options),
        }
    }

    pub fn options(&self) -> &BuildOptions {
        self.builder.options()
    }

    /// Read and parse a payload file (single root object or list of roots).
    #[instrument(level = "debug", skip(self))]
    pub fn load_payload(&self, path: &Path) -> ApplicationResult<Vec<CategoryPayload>> {
        if !self.fs.exists(path) {
            return Err(ApplicationError::PayloadNotFound(path.to_path_buf()));
        }
        if !self.fs.is_file(path) {
            return Err(ApplicationError::Payload {
                path: path.to_path_buf(),
                message: "not a regular file".to_string(),
            });
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read payload", path)?;
        Self::parse_payload(&content, path)
    }

    /// Parse payload JSON; `path` is used for error context only.
    pub fn parse_payload(content: &str, path: &Path) -> ApplicationResult<Vec<CategoryPayload>> {
        let document: PayloadDocument =
            serde_json::from_str(content).map_err(|e| ApplicationError::Payload {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        let roots = document.into_roots();
        debug!("parsed {} payload roots from {}", roots.len(), path.display());
        Ok(roots)
    }

    /// Load a payload file and build a new catalog from it.
    pub fn open(&self, path: &Path) -> ApplicationResult<Catalog<Value>> {
        let roots = self.load_payload(path)?;
        Ok(self.builder.build(roots)?)
    }

    /// Items of the given categories, or of the whole catalog when `nodes` is empty.
    ///
    /// # Errors
    /// `UnknownCategory` when any identifier is not in the catalog.
    pub fn flat_items<'a>(
        &self,
        catalog: &'a Catalog<Value>,
        nodes: &[String],
    ) -> ApplicationResult<Vec<&'a Value>> {
        if nodes.is_empty() {
            return Ok(catalog.facets.flat_data_all());
        }
        let mut items = Vec::new();
        for node in nodes {
            let id = catalog
                .facets
                .find(node)
                .ok_or_else(|| ApplicationError::UnknownCategory(node.clone()))?;
            items.extend(catalog.facets.flat_data(id));
        }
        Ok(items)
    }

    /// Selects every leaf below the given categories and summarises the result.
    #[instrument(level = "debug", skip(self, catalog))]
    pub fn select(
        &self,
        catalog: &mut Catalog<Value>,
        nodes: &[String],
    ) -> ApplicationResult<SelectionReport> {
        for node in nodes {
            let item = catalog
                .display
                .find(node)
                .ok_or_else(|| ApplicationError::UnknownCategory(node.clone()))?;
            select_subtree(&mut catalog.display, item, true)?;
        }
        Ok(Self::report(catalog))
    }

    /// Selection summary of the current display state.
    pub fn report(catalog: &Catalog<Value>) -> SelectionReport {
        let display = &catalog.display;
        let selected = display
            .roots()
            .iter()
            .map(|&root| selected_count(display, root))
            .sum();
        let rows = display
            .iter()
            .filter_map(|(idx, item)| {
                item.leaf_count().map(|leaf_count| SelectionRow {
                    id: item.id().to_string(),
                    label: item.label().to_string(),
                    depth: item.depth(),
                    leaf_count,
                    selected: selected_count(display, idx),
                    state: selection_state(display, idx),
                })
            })
            .collect();
        SelectionReport {
            selected_count: selected,
            rows,
        }
    }
}
