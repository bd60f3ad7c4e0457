use std::fmt::Display;
use std::io::Write;
use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::CharStream;
use crate::ExpandProperties;
use crate::Filter;
use crate::FilterError;
use crate::FilterParameters;
use crate::FilterResult;
use crate::Location;
use crate::PhysicalTextReader;
use crate::PropertyExpander;
use crate::ReplaceCharacter;
use crate::ReplaceString;
use crate::ReplaceTokens;
use crate::TabsToSpaces;
use crate::TokenEntry;

/// The closed set of filters a chain can be assembled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterKind {
	TabsToSpaces,
	ReplaceCharacter,
	ReplaceString,
	ReplaceTokens,
	ExpandProperties,
}

impl FilterKind {
	pub const ALL: [FilterKind; 5] = [
		Self::TabsToSpaces,
		Self::ReplaceCharacter,
		Self::ReplaceString,
		Self::ReplaceTokens,
		Self::ExpandProperties,
	];

	/// The name used for this filter in chain configuration.
	pub fn name(self) -> &'static str {
		match self {
			Self::TabsToSpaces => "tabstospaces",
			Self::ReplaceCharacter => "replacecharacter",
			Self::ReplaceString => "replacestring",
			Self::ReplaceTokens => "replacetokens",
			Self::ExpandProperties => "expandproperties",
		}
	}

	/// Filters that resolve multi-character matches can't preview their next
	/// character without committing to it.
	pub fn supports_peek(self) -> bool {
		matches!(self, Self::ReplaceCharacter | Self::ExpandProperties)
	}

	/// The parameter names this filter reads during initialization.
	pub fn parameters(self) -> &'static [&'static str] {
		match self {
			Self::TabsToSpaces => &["tablength"],
			Self::ReplaceCharacter => &["chartoreplace", "replacechar"],
			Self::ReplaceString => &["from", "to", "ignorecase"],
			Self::ReplaceTokens => &["begintoken", "endtoken", "ignorecase"],
			Self::ExpandProperties => &[],
		}
	}

	/// Construct an unchained, uninitialized filter of this kind.
	pub fn create(self, expander: &Arc<dyn PropertyExpander>) -> Box<dyn Filter> {
		match self {
			Self::TabsToSpaces => Box::new(TabsToSpaces::new()),
			Self::ReplaceCharacter => Box::new(ReplaceCharacter::default()),
			Self::ReplaceString => Box::new(ReplaceString::default()),
			Self::ReplaceTokens => Box::new(ReplaceTokens::default()),
			Self::ExpandProperties => Box::new(ExpandProperties::new(Arc::clone(expander))),
		}
	}
}

impl Display for FilterKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.name())
	}
}

impl FromStr for FilterKind {
	type Err = String;

	/// Case-insensitive, and `-`/`_` separators are ignored so
	/// `replace-tokens` and `ReplaceTokens` both resolve.
	fn from_str(value: &str) -> Result<Self, Self::Err> {
		let normalized: String = value
			.chars()
			.filter(|ch| !matches!(ch, '-' | '_'))
			.collect::<String>()
			.to_ascii_lowercase();

		Self::ALL
			.into_iter()
			.find(|kind| kind.name() == normalized)
			.ok_or_else(|| value.to_string())
	}
}

/// A declared filter: where it sits in the chain, which filter it is, and the
/// parameters it is initialized with.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterSpec {
	/// Position in the chain. Filters are applied in ascending order and no two
	/// may share a value.
	pub order: u32,
	/// The filter name, resolved against [`FilterKind`] when the chain is
	/// built.
	pub kind: String,
	#[serde(default)]
	pub params: FilterParameters,
	/// Token table entries, only read by `replacetokens`.
	#[serde(default)]
	pub tokens: Vec<TokenEntry>,
	#[serde(skip)]
	pub location: Location,
}

impl FilterSpec {
	pub fn new(order: u32, kind: impl Into<String>) -> Self {
		Self {
			order,
			kind: kind.into(),
			..Self::default()
		}
	}

	#[must_use]
	pub fn with_param(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
		self.params.insert(name, value);
		self
	}

	#[must_use]
	pub fn with_token(mut self, token: TokenEntry) -> Self {
		self.tokens.push(token);
		self
	}

	#[must_use]
	pub fn with_location(mut self, location: Location) -> Self {
		self.location = location;
		self
	}
}

/// Assembles [`FilterSpec`]s into a working chain on top of a physical source.
#[derive(Debug, Clone, Default)]
pub struct FilterChain {
	specs: Vec<FilterSpec>,
	location: Location,
}

impl FilterChain {
	pub fn new(specs: Vec<FilterSpec>) -> Self {
		Self {
			specs,
			location: Location::default(),
		}
	}

	/// The location reported for filters that don't carry their own.
	#[must_use]
	pub fn with_location(mut self, location: Location) -> Self {
		self.location = location;
		self
	}

	pub fn specs(&self) -> &[FilterSpec] {
		&self.specs
	}

	fn location_of<'a>(&'a self, spec: &'a FilterSpec) -> &'a Location {
		if spec.location.is_unknown() {
			&self.location
		} else {
			&spec.location
		}
	}

	/// The specs in ascending order. Duplicate orders are rejected before any
	/// filter is created.
	fn ordered(&self) -> FilterResult<Vec<&FilterSpec>> {
		let mut ordered: Vec<&FilterSpec> = self.specs.iter().collect();
		ordered.sort_by_key(|spec| spec.order);

		for pair in ordered.windows(2) {
			let [first, second] = pair else {
				continue;
			};

			if first.order == second.order {
				return Err(FilterError::build(
					format!(
						"filters `{}` and `{}` both declare order {}",
						first.kind, second.kind, second.order
					),
					self.location_of(second),
				));
			}
		}

		Ok(ordered)
	}

	/// Create, chain and initialize each filter in ascending order with `base`
	/// at the bottom of the chain. An empty chain reads `base` unchanged.
	pub fn build(
		&self,
		base: PhysicalTextReader,
		expander: &Arc<dyn PropertyExpander>,
	) -> FilterResult<ChainOutput> {
		let ordered = self.ordered()?;
		let mut current: Box<dyn CharStream> = Box::new(base);

		for spec in ordered {
			let location = self.location_of(spec);
			let kind: FilterKind = spec.kind.parse().map_err(|name| {
				FilterError::build(format!("unknown filter kind `{name}`"), location)
			})?;

			let mut filter = kind.create(expander);
			filter.chain(current)?;
			filter.initialize(spec, location)?;
			debug!(kind = %kind, order = spec.order, "added filter to chain");

			current = filter;
		}

		Ok(ChainOutput { stream: current })
	}
}

/// The end of an assembled chain, read by the consumer.
#[derive(Debug)]
pub struct ChainOutput {
	stream: Box<dyn CharStream>,
}

impl ChainOutput {
	/// Drain the chain into a string and close it.
	pub fn read_to_string(mut self) -> FilterResult<String> {
		let mut output = String::new();
		while let Some(ch) = self.stream.read()? {
			output.push(ch);
		}
		self.stream.close()?;

		Ok(output)
	}

	/// Drain the chain into `writer` as UTF-8 and close it. Returns the number
	/// of characters written.
	pub fn copy_to(mut self, writer: &mut impl Write) -> FilterResult<usize> {
		let mut encoded = [0u8; 4];
		let mut written = 0;

		while let Some(ch) = self.stream.read()? {
			writer.write_all(ch.encode_utf8(&mut encoded).as_bytes())?;
			written += 1;
		}
		writer.flush()?;
		self.stream.close()?;

		Ok(written)
	}
}

impl CharStream for ChainOutput {
	fn read(&mut self) -> FilterResult<Option<char>> {
		self.stream.read()
	}

	fn peek(&mut self) -> FilterResult<Option<char>> {
		self.stream.peek()
	}

	fn close(&mut self) -> FilterResult<()> {
		self.stream.close()
	}

	fn supports_peek(&self) -> bool {
		self.stream.supports_peek()
	}

	fn is_physical(&self) -> bool {
		self.stream.is_physical()
	}
}

impl Iterator for ChainOutput {
	type Item = FilterResult<char>;

	fn next(&mut self) -> Option<Self::Item> {
		self.stream.read().transpose()
	}
}

/// Run `text` through a chain built from `specs`.
pub fn filter_text(
	text: &str,
	specs: &[FilterSpec],
	expander: &Arc<dyn PropertyExpander>,
) -> FilterResult<String> {
	FilterChain::new(specs.to_vec())
		.build(PhysicalTextReader::from_text(text), expander)?
		.read_to_string()
}
