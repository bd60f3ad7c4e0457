use std::collections::BTreeMap;
use std::fmt::Display;
use std::ops::RangeInclusive;

use derive_more::Deref;
use serde::Deserialize;

use crate::FilterError;
use crate::FilterResult;
use crate::Location;

/// A raw parameter value as written in a config file. Numbers and booleans are
/// accepted so `tablength = 4` reads as naturally as `tablength = "4"`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
#[non_exhaustive]
pub enum ParamValue {
	Text(String),
	Integer(i64),
	Boolean(bool),
}

impl Display for ParamValue {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Text(text) => write!(f, "{text}"),
			Self::Integer(number) => write!(f, "{number}"),
			Self::Boolean(value) => write!(f, "{value}"),
		}
	}
}

/// The name to value parameter bag handed to a filter before it is
/// initialized. Names are case-insensitive and unique.
#[derive(Debug, Clone, Default, Deref, PartialEq, Eq, Deserialize)]
#[serde(try_from = "BTreeMap<String, ParamValue>")]
pub struct FilterParameters(BTreeMap<String, String>);

impl TryFrom<BTreeMap<String, ParamValue>> for FilterParameters {
	type Error = String;

	/// Names that only differ by case collide.
	fn try_from(raw: BTreeMap<String, ParamValue>) -> Result<Self, Self::Error> {
		let mut params = Self::default();

		for (name, value) in raw {
			if params.value(&name).is_some() {
				return Err(format!("parameter `{name}` is declared more than once"));
			}
			params.insert(name, value.to_string());
		}

		Ok(params)
	}
}

impl<K, V> FromIterator<(K, V)> for FilterParameters
where
	K: AsRef<str>,
	V: Into<String>,
{
	fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
		let mut params = Self::default();
		for (name, value) in iter {
			params.insert(name, value);
		}
		params
	}
}

impl FilterParameters {
	pub fn new() -> Self {
		Self::default()
	}

	/// Set a parameter, replacing any previous value with the same name.
	pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
		self.0
			.insert(name.as_ref().to_ascii_lowercase(), value.into());
	}

	/// Look up a parameter by case-insensitive name.
	pub fn value(&self, name: &str) -> Option<&str> {
		self.0
			.get(&name.to_ascii_lowercase())
			.map(String::as_str)
	}

	/// Look up a parameter that must be present.
	pub fn required(&self, name: &str, location: &Location) -> FilterResult<&str> {
		self.value(name).ok_or_else(|| {
			FilterError::build(format!("required parameter `{name}` is missing"), location)
		})
	}

	/// Parse a boolean parameter, falling back to `default` when absent.
	pub fn bool_or(&self, name: &str, default: bool, location: &Location) -> FilterResult<bool> {
		let Some(value) = self.value(name) else {
			return Ok(default);
		};

		match value.trim().to_ascii_lowercase().as_str() {
			"true" | "yes" | "on" | "1" => Ok(true),
			"false" | "no" | "off" | "0" => Ok(false),
			_ => Err(FilterError::build(
				format!("parameter `{name}` must be a boolean, got `{value}`"),
				location,
			)),
		}
	}

	/// Parse an integer parameter that must fall within `range`, falling back to
	/// `default` when absent.
	pub fn usize_in(
		&self,
		name: &str,
		default: usize,
		range: RangeInclusive<usize>,
		location: &Location,
	) -> FilterResult<usize> {
		let Some(value) = self.value(name) else {
			return Ok(default);
		};

		match value.trim().parse::<usize>() {
			Ok(number) if range.contains(&number) => Ok(number),
			_ => Err(FilterError::build(
				format!(
					"parameter `{name}` must be an integer between {} and {}, got `{value}`",
					range.start(),
					range.end()
				),
				location,
			)),
		}
	}

	/// Parse a parameter that must be exactly one character, falling back to
	/// `default` when absent.
	pub fn char_or(&self, name: &str, default: char, location: &Location) -> FilterResult<char> {
		let Some(value) = self.value(name) else {
			return Ok(default);
		};

		let mut chars = value.chars();
		match (chars.next(), chars.next()) {
			(Some(ch), None) => Ok(ch),
			_ => Err(FilterError::build(
				format!("parameter `{name}` must be a single character, got `{value}`"),
				location,
			)),
		}
	}
}
