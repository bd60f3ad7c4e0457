use crate::ChainableReader;
use crate::CharStream;
use crate::Filter;
use crate::FilterError;
use crate::FilterKind;
use crate::FilterResult;
use crate::FilterSpec;
use crate::Location;

pub const DEFAULT_TAB_LENGTH: usize = 8;
pub const MAX_TAB_LENGTH: usize = 100;

/// Replaces every tab with `tablength` spaces. There is no column tracking: a
/// tab always becomes the same number of spaces.
#[derive(Debug)]
pub struct TabsToSpaces {
	upstream: ChainableReader,
	tab_length: usize,
	spaces_remaining: usize,
}

impl Default for TabsToSpaces {
	fn default() -> Self {
		Self::with_tab_length(DEFAULT_TAB_LENGTH)
	}
}

impl TabsToSpaces {
	pub fn new() -> Self {
		Self::default()
	}

	/// `tab_length` is clamped to at least one space.
	pub fn with_tab_length(tab_length: usize) -> Self {
		Self {
			upstream: ChainableReader::default(),
			tab_length: tab_length.max(1),
			spaces_remaining: 0,
		}
	}

	pub fn tab_length(&self) -> usize {
		self.tab_length
	}
}

impl CharStream for TabsToSpaces {
	fn read(&mut self) -> FilterResult<Option<char>> {
		if self.spaces_remaining > 0 {
			self.spaces_remaining -= 1;
			return Ok(Some(' '));
		}

		match self.upstream.read()? {
			Some('\t') => {
				self.spaces_remaining = self.tab_length - 1;
				Ok(Some(' '))
			}
			other => Ok(other),
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

impl Filter for TabsToSpaces {
	fn kind(&self) -> FilterKind {
		FilterKind::TabsToSpaces
	}

	fn upstream_mut(&mut self) -> &mut ChainableReader {
		&mut self.upstream
	}

	fn initialize(&mut self, spec: &FilterSpec, location: &Location) -> FilterResult<()> {
		self.tab_length = spec.params.usize_in(
			"tablength",
			DEFAULT_TAB_LENGTH,
			1..=MAX_TAB_LENGTH,
			location,
		)?;
		self.spaces_remaining = 0;

		Ok(())
	}
}
