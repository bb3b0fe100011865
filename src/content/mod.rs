//! Multilingual content: data model, translation fallback resolution and the
//! localized read layer used by the content endpoints.

pub mod memory;
pub mod model;
pub mod query;
pub mod resolver;

pub use memory::MemoryContentStore;
pub use model::{
    Content, ContentDraft, ContentRecord, ContentTranslation, ContentType, LocalizedContent,
};
pub use query::{ContentError, ContentQuery, ContentSource, ContentWriter, ListFilter};
pub use resolver::{resolve, resolve_with_outcome, Localized, Resolution};
