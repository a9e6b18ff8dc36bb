//! Turtle/RDF serialization for the versioned entity store (spec §4.G).
//!
//! Grounded on the Python reference serializer's module split: URI
//! construction, value-node MD5 hashing, a lossy deduplication cache for
//! value nodes, the fixed prefix table, and the ordered Turtle emitter
//! itself.

pub mod dedupe;
pub mod prefixes;
pub mod serializer;
pub mod uri;
pub mod value_hash;

pub use dedupe::{DedupeStats, HashDedupeBag};
pub use prefixes::{prefix_table, write_prefixes};
pub use serializer::{serialize_entity_to_turtle, ReferencedEntityMeta, SerializerConfig};
pub use uri::UriGenerator;
