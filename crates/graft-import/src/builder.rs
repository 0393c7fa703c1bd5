//! Scene tree construction: pages, frame roots and child recursion.

use std::sync::Arc;

use graft_core::{
    authored_size, Diagnostic, Document, ImportError, ImportResult, Node, NodeId, Page,
    Placement, UiNode,
};
use graft_layout::{apply_child_sizing, constrained_placement};
use graft_render_2d::VectorImage;
use indexmap::IndexMap;
use thiserror::Error;

use crate::cache::{AssetTables, DependencyAsset, GeneratedNode};
use crate::context::ConversionContext;
use crate::options::ImportOptions;
use crate::registry::ConverterRegistry;

impl ConversionContext<'_> {
    /// Convert the children of `node` into `parent`, in source order.
    ///
    /// Each child is placed from its constraints relative to `node`'s size.
    /// When `parent` carries a layout group, the child also gets a layout
    /// element derived from its stretch and grow settings.
    pub fn build_children(&mut self, node: &Node, parent: &mut UiNode) -> ImportResult<()> {
        let parent_size = authored_size(node);
        let child_sizing = self.options().layout.child_sizing;

        for child in node.children() {
            let Some(mut ui) = self.convert_node(child)? else {
                continue;
            };

            match (child.transform(), child.constraints()) {
                (Some(transform), Some(constraints)) => {
                    ui.placement = constrained_placement(transform, parent_size, constraints);
                }
                (Some(transform), None) => ui.placement = Placement::fixed(transform),
                (None, _) => {}
            }

            if child_sizing {
                if let Some(group) = parent.layout_group_mut() {
                    let layout_child = child.layout_child().copied().unwrap_or_default();
                    let element = apply_child_sizing(group, &layout_child, authored_size(child));
                    ui.set_layout_element(element);
                }
            }

            parent.add_child(ui);
        }
        Ok(())
    }
}

/// One converted page.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedPage {
    pub id: NodeId,
    pub name: String,
    /// Root node; its children are the page's top-level frames
    pub root: UiNode,
    /// Every diagnostic raised while converting this page, in order
    pub logs: Vec<Diagnostic>,
}

impl ImportedPage {
    /// Dump the output tree as pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.root)
    }

    pub fn has_errors(&self) -> bool {
        self.logs.iter().any(Diagnostic::is_error)
    }
}

/// Result of a successful pass.
#[derive(Debug, Clone, Default)]
pub struct ImportedDesign {
    pub pages: Vec<ImportedPage>,
    /// Generated images keyed by source node id
    pub assets: IndexMap<String, Arc<VectorImage>>,
    /// External assets the pages refer to
    pub dependencies: Vec<DependencyAsset>,
}

impl ImportedDesign {
    pub fn page(&self, id: &NodeId) -> Option<&ImportedPage> {
        self.pages.iter().find(|p| &p.id == id)
    }

    pub fn logs(&self) -> impl Iterator<Item = &Diagnostic> {
        self.pages.iter().flat_map(|p| p.logs.iter())
    }
}

/// A pass that was aborted and rolled back.
#[derive(Debug, Error)]
#[error("import aborted: {error}")]
pub struct ImportFailure {
    #[source]
    pub error: ImportError,
    /// Diagnostics gathered before the abort
    pub diagnostics: Vec<Diagnostic>,
}

/// Runs import passes with one registry and one set of asset tables.
///
/// An importer must not run two passes at once; use one importer per
/// concurrent pass.
#[derive(Debug, Default)]
pub struct Importer {
    registry: ConverterRegistry,
    tables: AssetTables,
}

impl Importer {
    /// An importer whose registry gets the default structural converters on
    /// first use if it has none.
    pub fn new(registry: ConverterRegistry) -> Self {
        Self {
            registry,
            tables: AssetTables::new(),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(ConverterRegistry::with_defaults())
    }

    pub fn registry(&self) -> &ConverterRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ConverterRegistry {
        &mut self.registry
    }

    /// Tables of the last pass. Empty after a failed pass.
    pub fn tables(&self) -> &AssetTables {
        &self.tables
    }

    /// Convert the selected pages of `document`.
    ///
    /// On failure every generated node and image is released and all tables
    /// are emptied before the error is returned.
    #[tracing::instrument(skip_all, fields(document = %document.name))]
    pub fn import(
        &mut self,
        document: &Document,
        options: &ImportOptions,
    ) -> Result<ImportedDesign, ImportFailure> {
        self.tables.clear();
        self.registry.ensure_seeded();

        let mut ctx = ConversionContext::new(&self.registry, document, options, &mut self.tables);
        let mut pages = Vec::new();
        let mut diagnostics = Vec::new();
        let mut failure = None;

        for page in document.pages.iter().filter(|p| options.includes_page(&p.id)) {
            let result = import_page(&mut ctx, page);
            let logs = ctx.take_logs();
            diagnostics.extend(logs.iter().cloned());
            match result {
                Ok(mut root) => {
                    attach_logs(&mut root, &logs);
                    tracing::debug!(
                        page = %page.id,
                        nodes = root.node_count(),
                        logs = logs.len(),
                        "page done"
                    );
                    pages.push(ImportedPage {
                        id: page.id.clone(),
                        name: page.name.clone(),
                        root,
                        logs,
                    });
                }
                Err(err) => {
                    tracing::error!(page = %page.id, error = %err, "import aborted");
                    failure = Some(err);
                    break;
                }
            }
        }
        drop(ctx);

        if let Some(error) = failure {
            self.tables.rollback();
            return Err(ImportFailure { error, diagnostics });
        }

        Ok(ImportedDesign {
            pages,
            assets: self
                .tables
                .assets
                .iter()
                .map(|(key, image)| (key.to_string(), Arc::clone(image)))
                .collect(),
            dependencies: self.tables.dependencies.iter().map(|(_, d)| d.clone()).collect(),
        })
    }
}

/// Build the root of one page. Only frame-like top-level nodes are kept.
fn import_page(ctx: &mut ConversionContext<'_>, page: &Page) -> ImportResult<UiNode> {
    let mut root =
        UiNode::new(page.id.clone(), page.name.clone()).with_placement(Placement::stretch());
    ctx.tables_mut().nodes.add(
        page.id.as_str(),
        GeneratedNode {
            id: page.id.clone(),
            name: page.name.clone(),
            converter: "page".to_string(),
        },
    )?;

    for node in &page.children {
        if !node.is_frame_like() {
            tracing::trace!(
                page = %page.id,
                node = %node.id,
                kind = node.type_name(),
                "skipping top-level non-frame"
            );
            continue;
        }
        if let Some(mut frame) = ctx.convert_node(node)? {
            frame.placement = Placement::stretch();
            root.add_child(frame);
        }
    }
    Ok(root)
}

/// Copy each diagnostic onto the node it refers to.
fn attach_logs(root: &mut UiNode, logs: &[Diagnostic]) {
    for log in logs {
        let Some(id) = &log.node else {
            continue;
        };
        if let Some(target) = root.find_mut(id) {
            target.logs.push(log.clone());
        }
    }
}
