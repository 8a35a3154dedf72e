//! `genealogy-snippets` - keeps genealogy records captured by a browser
//! extension and shows them grouped into immediate families.
//!
//! Records arrive from the extension through the native-messaging
//! [`bridge`], are deduplicated by page URL into the [`catalog`], and are
//! displayed through [`view::CatalogView`] using the [`family`] grouping
//! engine.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod bridge;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod family;
pub mod gedcomx;
pub mod logging;
pub mod message;
pub mod record;
pub mod render;
pub mod storage;
pub mod view;

pub use catalog::{Catalog, IngestOutcome};
pub use config::Config;
pub use error::{Error, Result};
pub use family::{group_persons, PageGroups, PersonGroup};
pub use logging::init_logging;
pub use message::{Acknowledgment, ExtensionMessage};
pub use record::{Page, PageRecord};
pub use storage::{KeyValueStore, MemoryStore, SqliteStore};
pub use view::{CatalogView, ExtensionEndpoint};
