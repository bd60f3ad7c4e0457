use miette::Diagnostic;
use thiserror::Error;

use crate::FilterKind;
use crate::Location;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum FilterError {
	#[error(transparent)]
	#[diagnostic(code(filterchain::io_error))]
	Io(#[from] std::io::Error),

	/// Every configuration and chain-assembly failure: missing or invalid
	/// parameters, duplicate orders, unknown filter kinds, empty token tables
	/// and failed property expansion.
	#[error("{}{message}", .location.prefix())]
	#[diagnostic(code(filterchain::build))]
	Build { message: String, location: Location },

	#[error("peek is not supported by the `{0}` filter")]
	#[diagnostic(
		code(filterchain::peek_not_supported),
		help("check `FilterKind::supports_peek` before peeking, or use `read` instead")
	)]
	PeekNotSupported(FilterKind),

	#[error("failed to parse filter chain config: {0}")]
	#[diagnostic(
		code(filterchain::config_parse),
		help("check that the config is valid TOML with `[properties]` and `[[filters]]` sections")
	)]
	ConfigParse(String),
}

impl FilterError {
	pub fn build(message: impl Into<String>, location: &Location) -> Self {
		Self::Build {
			message: message.into(),
			location: location.clone(),
		}
	}
}

pub type FilterResult<T> = Result<T, FilterError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
