use tracing::warn;

use crate::ChainableReader;
use crate::CharStream;
use crate::Filter;
use crate::FilterError;
use crate::FilterKind;
use crate::FilterResult;
use crate::FilterSpec;
use crate::Location;

/// Substitutes one character for another. Stateless, so `peek` is supported.
#[derive(Debug, Default)]
pub struct ReplaceCharacter {
	upstream: ChainableReader,
	/// `(from, to)`; `None` until configured, which passes text through.
	mapping: Option<(char, char)>,
}

impl ReplaceCharacter {
	pub fn new(from: char, to: char) -> Self {
		Self {
			upstream: ChainableReader::default(),
			mapping: Some((from, to)),
		}
	}

	fn fetch(&mut self, advance: bool) -> FilterResult<Option<char>> {
		let ch = self.upstream.fetch(advance)?;

		Ok(match (ch, self.mapping) {
			(Some(ch), Some((from, to))) if ch == from => Some(to),
			(ch, _) => ch,
		})
	}
}

impl CharStream for ReplaceCharacter {
	fn read(&mut self) -> FilterResult<Option<char>> {
		self.fetch(true)
	}

	fn peek(&mut self) -> FilterResult<Option<char>> {
		self.fetch(false)
	}

	fn close(&mut self) -> FilterResult<()> {
		self.upstream.close()
	}

	fn supports_peek(&self) -> bool {
		self.upstream.supports_peek()
	}
}

impl Filter for ReplaceCharacter {
	fn kind(&self) -> FilterKind {
		FilterKind::ReplaceCharacter
	}

	fn upstream_mut(&mut self) -> &mut ChainableReader {
		&mut self.upstream
	}

	fn initialize(&mut self, spec: &FilterSpec, location: &Location) -> FilterResult<()> {
		let from = first_char(spec, "chartoreplace", location)?;
		let to = first_char(spec, "replacechar", location)?;
		self.mapping = Some((from, to));

		Ok(())
	}
}

/// Lenient on length: anything after the first character is ignored with a
/// warning.
fn first_char(spec: &FilterSpec, name: &str, location: &Location) -> FilterResult<char> {
	let value = spec.params.required(name, location)?;
	let mut chars = value.chars();

	let Some(ch) = chars.next() else {
		return Err(FilterError::build(
			format!("parameter `{name}` must not be empty"),
			location,
		));
	};

	if chars.next().is_some() {
		warn!(
			parameter = name,
			value,
			"only the first character of `{value}` is used by the replacecharacter filter"
		);
	}

	Ok(ch)
}
