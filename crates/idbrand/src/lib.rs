//! Nominal identifier types for generated client declarations.
//!
//! Given a schema description and the pre-generated declarations of a client,
//! this crate gives every model with a single string identifier its own
//! nominal type (`UserId`, `PostId`, ...) and retypes the identifier and every
//! foreign key referencing it, without changing runtime representation.
//!
//! # Types
//!
//! ## Engine
//!
//! - [`brand_declarations`] - Pure text-to-text rewrite
//! - [`BrandConfig`] - Lenient or strict brands, standard or extended coverage
//! - [`BrandReport`] - What a run inserted and retyped
//!
//! ## Generator boundary
//!
//! - [`GeneratorOptions`] - Options handed over by the host pipeline
//! - [`generate`] - Read, rewrite and overwrite the declarations file
//! - [`manifest`] - Registration handshake

mod brand;
mod config;
mod engine;
mod error;
mod generator;
mod report;

pub use config::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use report::*;

pub use idbrand_decl as decl;
pub use idbrand_schema as schema;
