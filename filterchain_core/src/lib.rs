//! `filterchain_core` transforms text while it streams from a source to a
//! destination. Small filters (tab expansion, character and string
//! replacement, token replacement and property expansion) are chained
//! together from declarative configuration, and each one pulls characters
//! from the filter before it.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Consumer
//!   ← last filter      (read / peek, one character at a time)
//!   ← ...
//!   ← first filter
//!   ← PhysicalTextReader (file or in-memory text)
//! ```
//!
//! Nothing is buffered beyond what a filter needs to decide whether a match
//! is complete. Filters that resolve multi-character matches
//! ([`ReplaceString`], [`ReplaceTokens`]) or carry state between reads
//! ([`TabsToSpaces`]) don't support `peek`; see
//! [`FilterKind::supports_peek`].
//!
//! ## Modules
//!
//! - [`config`]: Chain configuration loading from `filterchain.toml`.
//! - [`filters`]: The concrete filters.
//!
//! ## Key Types
//!
//! - [`CharStream`]: The read / peek / close contract.
//! - [`Filter`]: A chainable, configurable transformation stage.
//! - [`FilterSpec`]: A declared filter: order, kind and parameters.
//! - [`FilterChain`]: Assembles specs into a [`ChainOutput`].
//! - [`PropertyExpander`]: Resolves `${...}` expressions for
//!   [`ExpandProperties`].
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use filterchain_core::FilterSpec;
//! use filterchain_core::PropertyExpander;
//! use filterchain_core::PropertyMap;
//! use filterchain_core::TokenEntry;
//! use filterchain_core::filter_text;
//!
//! let specs = [
//! 	FilterSpec::new(1, "replacetokens").with_token(TokenEntry::new("NAME", "World")),
//! 	FilterSpec::new(2, "tabstospaces").with_param("tablength", "4"),
//! ];
//! let expander: Arc<dyn PropertyExpander> = Arc::new(PropertyMap::new());
//!
//! let output = filter_text("Hello\t@NAME@!", &specs, &expander).unwrap();
//! assert_eq!(output, "Hello    World!");
//! ```

pub use chain::*;
pub use config::*;
pub use error::*;
pub use expander::*;
pub use filters::*;
pub use location::*;
pub use params::*;
pub use physical::*;
pub use stream::*;

mod chain;
pub mod config;
#[allow(unused_assignments)]
mod error;
mod expander;
pub mod filters;
mod location;
mod params;
mod physical;
mod stream;

#[cfg(test)]
mod __fixtures;
