//! Target descriptor registry for cross-compiled runtimes.
//!
//! A build system asks for a target by name and gets back the compiler
//! switches, linker scripts, and source files needed to build for it:
//!
//! - **Descriptor:** declarative build parameters for one hardware variant,
//!   optionally specializing a parent descriptor
//! - **Registry:** all known descriptors, registered explicitly
//! - **Resolver:** flattens a descriptor's parent chain into a recipe
//!
//! Descriptors come from the built-in catalogue or from `.target.toml` files.

pub mod builtin;
pub mod descriptor;
pub mod error;
pub mod parse;
pub mod registry;
pub mod resolve;
pub mod source_set;
pub mod validate;

pub use descriptor::{LinkerScript, TargetDescriptor};
pub use error::{Result, TargetError};
pub use registry::{SharedRegistry, TargetRegistry};
pub use resolve::{resolve, ResolvedRecipe};
pub use source_set::{SourceEntry, SourceSet, SourceSpec};
pub use validate::{validate_registry, ValidationIssue};
