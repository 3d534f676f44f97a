//! Postgres adapter: turns a live database into a model schema
//! snapshot via information_schema and pg_enum.

pub mod introspect;

pub use introspect::{field_type_for, introspect_models};
