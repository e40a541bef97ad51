//! # lgx-catalog: Milestone Definitions and Message Tables
//!
//! The upstream collaborators of the tracker. A [`MilestoneCatalog`] turns a
//! `(direction, transport mode)` pair into the ordered definition list a
//! sequence is built from; a [`Localizer`] turns the opaque name keys on
//! those definitions into display text.
//!
//! - [`catalog`]: the `MilestoneCatalog` trait and `YamlCatalog`.
//! - [`builtin`]: `BuiltinCatalog`, the four compiled-in templates.
//! - [`locale`]: `Localizer`, `Locale`, `MessageTable` with `en` and `es`.
//!
//! Neither catalogs nor message tables hold global state: callers construct
//! one and pass it where it is needed.

pub mod builtin;
pub mod catalog;
pub mod error;
pub mod locale;

pub use builtin::BuiltinCatalog;
pub use catalog::{MilestoneCatalog, YamlCatalog};
pub use error::CatalogError;
pub use locale::{category_key, department_key, status_key, Locale, Localizer, MessageTable};
