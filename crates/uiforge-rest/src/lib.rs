//! uiforge REST endpoint factory.
//!
//! Given a model schema and its consolidated `ModelAccess` policy,
//! this crate produces the five CRUD handlers (list, get, create,
//! patch, delete) that enforce the policy uniformly across arbitrary
//! models and fields. Handlers are stateless per request and talk to
//! the persistence layer through the `DataStore` trait only.

pub mod endpoints;
pub mod error;
pub mod memory;
pub mod query;
pub mod store;

pub use endpoints::{CallerRoles, RestEndpointFactory};
pub use error::{RestError, RestErrorKind};
pub use memory::MemoryStore;
pub use query::{ListParams, ListQuery, SortDir, parse_list_params, parse_projection};
pub use store::{DataStore, Record, RecordPage, StoreError};
