//! Core of fwpipe: a registry of named visitors, a parser that turns a flat
//! token list into an ordered pipeline of constructed visitors, and an
//! executor that applies that pipeline to a firmware document.
//!
//! ```no_run
//! use fwpipe_core::{execute_cli, parse_cli, Firmware, VisitorRegistry};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = VisitorRegistry::new();
//! let mut firmware = Firmware::load("bios.rom")?;
//! let mut pipeline = parse_cli(&registry, &std::env::args().skip(2).collect::<Vec<_>>())?;
//! execute_cli(&mut firmware, &mut pipeline)?;
//! # Ok(())
//! # }
//! ```

pub mod document;
pub mod error;
pub mod executor;
pub mod parser;
pub mod pipeline;
pub mod registry;
pub mod visitor;

pub use document::{Document, Firmware, Node, NodeKind};
pub use error::{
    DocumentError, DocumentResult, ErrorSeverity, ExecutionError, ExecutionResult, ParseError,
    ParseResult, RegistryError, RegistryResult, VisitResult, VisitorError,
};
pub use executor::{execute_cli, ExecutionReport, StageTiming};
pub use parser::parse_cli;
pub use pipeline::{Pipeline, Stage};
pub use registry::{VisitorConstructor, VisitorEntry, VisitorInfo, VisitorRegistry};
pub use visitor::Visitor;
