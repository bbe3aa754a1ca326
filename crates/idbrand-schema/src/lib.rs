//! Schema description and model registry for idbrand.
//!
//! The schema description is the JSON data model document that a client
//! generator receives from its host pipeline. The [`ModelRegistry`] is derived
//! from it once per run and answers every question the rewrite engine asks
//! about models: which field is the identifier, what the nominal identifier
//! type is called, and which scalar columns are foreign keys to which model.
//!
//! # Types
//!
//! ## Schema description
//!
//! - [`SchemaDescription`] - Ordered list of models
//! - [`Model`] - A model with its ordered fields
//! - [`Field`] - A single field, scalar or relation
//!
//! ## Registry
//!
//! - [`ModelRegistry`] - Per-run lookup tables built from a [`SchemaDescription`]
//! - [`NominalType`] - The generated identifier type of a model
//! - [`FieldRole`] - Classification of a field for rewriting purposes

mod description;
mod error;
mod registry;

pub use description::*;
pub use error::SchemaError;
pub use registry::*;
