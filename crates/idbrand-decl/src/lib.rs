//! Declaration-block scanning and field retyping.
//!
//! Generated client declarations are machine-written and delimiter-balanced,
//! so instead of a full grammar this crate treats them as a sequence of named
//! declaration blocks whose bodies are found by balanced delimiter scanning.
//!
//! # Types
//!
//! - [`Region`] / [`locate`] - Balanced span of one declaration, found from a header pattern;
//!   [`DeclarationBuffer::parse`] locates every bodied block this way
//! - [`DeclarationBuffer`] - The text split into ordered, named [`Block`]s and opaque text
//! - [`FieldRewrite`] - Retypes a named field from `string` to a nominal type
//!
//! # Precondition
//!
//! Delimiters inside string literals or comments are not distinguished from
//! structural ones. Input must be delimiter-balanced outside of its bodies'
//! literals, which holds for generated declarations.

mod buffer;
mod region;
mod substitute;

pub use buffer::*;
pub use region::*;
pub use substitute::*;
