//! HTTP surface for the versioned entity store (spec §6), grounded on the
//! teacher's `apps/hash-graph/libs/api` layering: a pure `Router` builder
//! plus the `Extension<Arc<AppState>>` wiring, with no process/runtime
//! concerns of its own — that lives in `entity-store-cli`.

pub mod error;
pub mod openapi;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use openapi::ApiDoc;
pub use routes::router;
pub use state::{AppState, PropertyShapeCatalogue};
