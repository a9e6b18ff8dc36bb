//! Shared data model for the versioned entity store: identifiers, the
//! entity/value/statement shapes, revision and row records, the edit-type
//! and error taxonomies, and the canonical-JSON/content-hash primitives
//! the revision pipeline builds its idempotency check on.

pub mod canonical;
pub mod document;
pub mod edit_type;
pub mod error;
pub mod ids;
pub mod property_shape;
pub mod revision;
pub mod rows;
pub mod value;

pub use canonical::{canonical_json_string, canonicalize, content_hash};
pub use document::{EntityDocument, EntityKind, SiteLink};
pub use edit_type::EditType;
pub use error::{
    BlobStoreError, EntityStoreError, MetadataIndexError, PipelineError, RegistryError,
    SerializerError,
};
pub use ids::{EntityId, InternalId};
pub use property_shape::{Datatype, PropertyShape};
pub use revision::{PublicationState, RevisionRecord, CURRENT_SCHEMA_VERSION};
pub use rows::{HeadRow, ProtectionFlags, RedirectEdgeRow, RevisionListRow};
pub use value::{Qualifier, Rank, Reference, ReferenceSnak, Statement, Value};
