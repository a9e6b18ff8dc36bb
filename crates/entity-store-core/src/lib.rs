//! The storage and orchestration layer of the versioned entity store: the
//! ID Registry and Metadata Index (§4.A/§4.C), the Blob Store (§4.B), the
//! Protection Policy Engine (§4.D), the Revision Pipeline (§4.E), and the
//! Redirect & Delete Controller (§4.F), plus the ambient config/logging/
//! migration scaffolding described in SPEC_FULL.md §10.

pub mod blob;
pub mod config;
pub mod ids_registry;
pub mod logging;
pub mod migrations;
pub mod pipeline;
pub mod protection;
pub mod redirects;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

pub use blob::{BlobStore, S3BlobStore};
pub use ids_registry::IdRegistry;
pub use store::{EntityStatus, HistoryEntry, MetadataIndex, PostgresMetadataIndex};
