use std::collections::BTreeMap;
use std::fmt::Debug;

use derive_more::Deref;
use derive_more::DerefMut;
use serde::Deserialize;

use crate::FilterError;
use crate::FilterResult;
use crate::Location;
use crate::ParamValue;

/// Opens a property expression.
pub const EXPRESSION_OPEN: &str = "${";
/// Closes a property expression.
pub const EXPRESSION_CLOSE: char = '}';

/// Resolves `${...}` expressions inside a run of text. Supplied by whoever owns
/// the build state; the [`ExpandProperties`](crate::ExpandProperties) filter
/// only decides which runs of text are handed over.
pub trait PropertyExpander: Debug {
	fn expand(&self, text: &str, location: &Location) -> FilterResult<String>;
}

/// A property table that expands `${name}` by plain lookup.
///
/// Whitespace around the name is ignored. An unterminated `${` is left as
/// literal text and unknown names are an error.
#[derive(Debug, Clone, Default, Deref, DerefMut, PartialEq, Eq, Deserialize)]
#[serde(from = "BTreeMap<String, ParamValue>")]
pub struct PropertyMap(BTreeMap<String, String>);

impl From<BTreeMap<String, ParamValue>> for PropertyMap {
	fn from(raw: BTreeMap<String, ParamValue>) -> Self {
		Self(
			raw.into_iter()
				.map(|(name, value)| (name, value.to_string()))
				.collect(),
		)
	}
}

impl<K, V> FromIterator<(K, V)> for PropertyMap
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
		Self(
			iter.into_iter()
				.map(|(name, value)| (name.into(), value.into()))
				.collect(),
		)
	}
}

impl PropertyMap {
	pub fn new() -> Self {
		Self::default()
	}
}

impl PropertyExpander for PropertyMap {
	fn expand(&self, text: &str, location: &Location) -> FilterResult<String> {
		let mut expanded = String::with_capacity(text.len());
		let mut rest = text;

		while let Some(start) = rest.find(EXPRESSION_OPEN) {
			expanded.push_str(&rest[..start]);
			let after_open = &rest[start + EXPRESSION_OPEN.len()..];

			let Some(end) = after_open.find(EXPRESSION_CLOSE) else {
				rest = &rest[start..];
				break;
			};

			let name = after_open[..end].trim();
			let value = self.get(name).ok_or_else(|| {
				FilterError::build(format!("Property '{name}' has not been set."), location)
			})?;

			expanded.push_str(value);
			rest = &after_open[end + 1..];
		}

		expanded.push_str(rest);
		Ok(expanded)
	}
}
