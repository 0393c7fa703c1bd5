//! Design document import for Graft.
//!
//! An [`Importer`] walks a [`Document`](graft_core::Document) page by page and
//! asks its [`ConverterRegistry`] for a converter per node. Converters build
//! [`UiNode`](graft_core::UiNode)s, translate auto-layout through
//! `graft-layout` and rasterize paint through `graft-render-2d`. Everything a
//! pass generates is tracked in [`AssetTables`] so a failed pass can be
//! rolled back completely.
//!
//! # Example
//!
//! ```ignore
//! use graft_import::{Importer, ImportOptions};
//!
//! let mut importer = Importer::with_defaults();
//! let design = importer.import(&document, &ImportOptions::new().collect_errors())?;
//!
//! for page in &design.pages {
//!     for log in &page.logs {
//!         println!("{}: {}", page.name, log);
//!     }
//! }
//! ```

pub mod builder;
pub mod cache;
pub mod context;
pub mod converters;
pub mod fonts;
pub mod hooks;
pub mod options;
pub mod registry;

pub use builder::{ImportFailure, ImportedDesign, ImportedPage, Importer};
pub use cache::{
    AssetCache, AssetTables, DependencyAsset, DependencyKind, GeneratedNode, TablesMark,
};
pub use context::ConversionContext;
pub use converters::{
    BindingConverter, EllipseConverter, FrameConverter, GroupConverter, InstanceConverter,
    LineConverter, PolygonConverter, RectangleConverter, StarConverter, TextConverter,
    UnknownConverter, VectorConverter,
};
pub use fonts::{FontAsset, FontResolution, FontTable};
pub use hooks::{EffectConverter, LocalizationConverter, ShadowEffectConverter};
pub use options::{ErrorMode, ImportOptions, ImportSettings};
pub use registry::{ConverterKind, ConverterRegistry, NodeConverter, RegistryBuilder};
