use std::collections::HashMap;

use serde::Deserialize;
use tracing::trace;

use super::OutputBuffer;
use super::Step;
use crate::ChainableReader;
use crate::CharStream;
use crate::Filter;
use crate::FilterError;
use crate::FilterKind;
use crate::FilterResult;
use crate::FilterSpec;
use crate::Location;

pub const DEFAULT_TOKEN_DELIMITER: char = '@';

/// One `key = value` pair declared for the `replacetokens` filter.
///
/// ```toml
/// tokens = [
///   { key = "NAME", value = "World" },
///   { key = "DEBUG", value = "true", if = false },
/// ]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenEntry {
	pub key: String,
	#[serde(default)]
	pub value: String,
	/// The entry is only used when this is true.
	#[serde(rename = "if", default = "default_true")]
	pub condition: bool,
	/// The entry is dropped when this is true.
	#[serde(default)]
	pub unless: bool,
}

fn default_true() -> bool {
	true
}

impl TokenEntry {
	pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
		Self {
			key: key.into(),
			value: value.into(),
			condition: true,
			unless: false,
		}
	}

	#[must_use]
	pub fn with_condition(mut self, condition: bool) -> Self {
		self.condition = condition;
		self
	}

	#[must_use]
	pub fn with_unless(mut self, unless: bool) -> Self {
		self.unless = unless;
		self
	}

	pub fn is_included(&self) -> bool {
		self.condition && !self.unless
	}
}

/// Token keys mapped to their replacement values.
#[derive(Debug, Clone, Default)]
pub struct TokenTable {
	values: HashMap<String, String>,
	ignore_case: bool,
	/// Longest key, in characters.
	max_key_length: usize,
}

impl TokenTable {
	/// Build the table from the included entries. Fails when no entry
	/// survives, when a key is empty, or when two keys collide.
	pub fn from_entries(
		entries: &[TokenEntry],
		ignore_case: bool,
		location: &Location,
	) -> FilterResult<Self> {
		let mut table = Self {
			values: HashMap::new(),
			ignore_case,
			max_key_length: 0,
		};

		for entry in entries.iter().filter(|entry| entry.is_included()) {
			if entry.key.is_empty() {
				return Err(FilterError::build("token keys must not be empty", location));
			}

			let key = table.fold(&entry.key);
			if table.values.insert(key, entry.value.clone()).is_some() {
				return Err(FilterError::build(
					format!("token `{}` is defined more than once", entry.key),
					location,
				));
			}

			table.max_key_length = table.max_key_length.max(entry.key.chars().count());
		}

		if table.values.is_empty() {
			return Err(FilterError::build(
				"the replacetokens filter requires at least one token",
				location,
			));
		}

		Ok(table)
	}

	fn fold(&self, key: &str) -> String {
		if self.ignore_case {
			key.to_uppercase()
		} else {
			key.to_string()
		}
	}

	pub fn get(&self, key: &str) -> Option<&str> {
		self.values.get(&self.fold(key)).map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	pub fn max_key_length(&self) -> usize {
		self.max_key_length
	}
}

/// The result of scanning for the contents of a token after its begin marker.
#[derive(Debug)]
enum TokenSearch {
	/// The contents named a known token.
	Replaced(Vec<char>),
	/// There is no token here. `text` is everything scanned after the begin
	/// marker and is emitted verbatim. `unknown` is set when a structural end
	/// was reached (an unknown key or the end of the stream) rather than the
	/// length limit or a second begin marker.
	NotFound { text: Vec<char>, unknown: bool },
}

/// Replaces `@KEY@` style tokens with values from a [`TokenTable`].
///
/// Anything that is not a known token passes through unchanged: unknown keys,
/// runs longer than the longest key, unterminated tokens and adjacent
/// markers (`@@`), which are never an empty token. After such a run, its last
/// character is examined again as a possible begin marker.
///
/// `peek` is not supported.
#[derive(Debug)]
pub struct ReplaceTokens {
	upstream: ChainableReader,
	begin_token: char,
	end_token: char,
	tokens: TokenTable,
	buffer: OutputBuffer,
	stream_ended: bool,
}

impl Default for ReplaceTokens {
	fn default() -> Self {
		Self {
			upstream: ChainableReader::default(),
			begin_token: DEFAULT_TOKEN_DELIMITER,
			end_token: DEFAULT_TOKEN_DELIMITER,
			tokens: TokenTable::default(),
			buffer: OutputBuffer::default(),
			stream_ended: false,
		}
	}
}

impl ReplaceTokens {
	pub fn new(begin_token: char, end_token: char, tokens: TokenTable) -> Self {
		Self {
			begin_token,
			end_token,
			tokens,
			..Self::default()
		}
	}

	pub fn tokens(&self) -> &TokenTable {
		&self.tokens
	}

	fn next_step(&mut self) -> FilterResult<Step> {
		if let Some(step) = self.buffer.next() {
			return Ok(step);
		}

		Ok(self.read_upstream()?.map_or(Step::End, Step::Candidate))
	}

	/// Read from upstream until it first reports the end of the stream, and
	/// never again after that.
	fn read_upstream(&mut self) -> FilterResult<Option<char>> {
		if self.stream_ended {
			return Ok(None);
		}

		let next = self.upstream.read()?;
		self.stream_ended = next.is_none();
		Ok(next)
	}

	/// Scan at most `max_key_length + 1` characters after a begin marker
	/// looking for the end marker.
	fn find_token_contents(&mut self) -> FilterResult<TokenSearch> {
		let mut contents = Vec::new();

		while contents.len() <= self.tokens.max_key_length() {
			let Some(ch) = self.read_upstream()? else {
				return Ok(TokenSearch::NotFound {
					text: contents,
					unknown: true,
				});
			};

			if ch == self.end_token {
				if contents.is_empty() {
					return Ok(TokenSearch::NotFound {
						text: vec![ch],
						unknown: false,
					});
				}

				let key: String = contents.iter().collect();
				if let Some(value) = self.tokens.get(&key) {
					return Ok(TokenSearch::Replaced(value.chars().collect()));
				}

				contents.push(ch);
				return Ok(TokenSearch::NotFound {
					text: contents,
					unknown: true,
				});
			}

			contents.push(ch);

			if ch == self.begin_token {
				return Ok(TokenSearch::NotFound {
					text: contents,
					unknown: false,
				});
			}
		}

		Ok(TokenSearch::NotFound {
			text: contents,
			unknown: false,
		})
	}
}

impl CharStream for ReplaceTokens {
	fn read(&mut self) -> FilterResult<Option<char>> {
		loop {
			let ch = match self.next_step()? {
				Step::Emit(ch) => return Ok(Some(ch)),
				Step::End => return Ok(None),
				Step::Candidate(ch) => ch,
			};

			if ch != self.begin_token {
				return Ok(Some(ch));
			}

			match self.find_token_contents()? {
				TokenSearch::NotFound { text, unknown } => {
					trace!(
						scanned = text.len(),
						unknown,
						"passing through text that is not a token"
					);
					if !text.is_empty() {
						self.buffer.fill(text, true);
					}
					return Ok(Some(self.begin_token));
				}
				TokenSearch::Replaced(value) => {
					if let Some((&head, tail)) = value.split_first() {
						if !tail.is_empty() {
							self.buffer.fill(tail.to_vec(), false);
						}
						return Ok(Some(head));
					}
					// Empty value: the token is dropped.
				}
			}
		}
	}

	fn peek(&mut self) -> FilterResult<Option<char>> {
		Err(FilterError::PeekNotSupported(self.kind()))
	}

	fn close(&mut self) -> FilterResult<()> {
		self.upstream.close()
	}

	fn supports_peek(&self) -> bool {
		self.kind().supports_peek()
	}
}

impl Filter for ReplaceTokens {
	fn kind(&self) -> FilterKind {
		FilterKind::ReplaceTokens
	}

	fn upstream_mut(&mut self) -> &mut ChainableReader {
		&mut self.upstream
	}

	fn initialize(&mut self, spec: &FilterSpec, location: &Location) -> FilterResult<()> {
		self.begin_token = spec
			.params
			.char_or("begintoken", DEFAULT_TOKEN_DELIMITER, location)?;
		self.end_token = spec
			.params
			.char_or("endtoken", DEFAULT_TOKEN_DELIMITER, location)?;
		let ignore_case = spec.params.bool_or("ignorecase", false, location)?;
		self.tokens = TokenTable::from_entries(&spec.tokens, ignore_case, location)?;

		Ok(())
	}
}
