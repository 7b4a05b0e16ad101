//! Generate plain-old-object data classes from a JSON Schema.
//!
//! The pipeline is a batch transformation: parse the document
//! ([`schema::SchemaDoc`]), lower it into a flat, ordered, fully-resolved
//! IR of named types ([`lower::build_ir`], [`ir::Ir`]), then render the IR
//! once per requested target language ([`emit::render`]). Back-ends exist
//! for JavaScript, Python, and Go; each emits positional constructors with
//! per-field validation plus `fromMap`/`asMap` round-trip conversions.

pub mod cli;
pub mod emit;
pub mod error;
pub mod ir;
pub mod lower;
pub mod names;
pub mod path_de;
pub mod resolve;
pub mod schema;

pub use emit::{render, EmitOptions, Target};
pub use error::GenError;
pub use ir::Ir;
pub use lower::{build_ir, BuildOptions};
pub use schema::SchemaDoc;
