use std::collections::VecDeque;
use std::sync::Arc;

use tracing::trace;

use crate::ChainableReader;
use crate::CharStream;
use crate::Filter;
use crate::FilterKind;
use crate::FilterResult;
use crate::FilterSpec;
use crate::Location;
use crate::PropertyExpander;
use crate::expander::EXPRESSION_CLOSE;
use crate::expander::EXPRESSION_OPEN;

/// The longest expression that is guaranteed to be expanded in one piece.
pub const MAX_EXPRESSION_LENGTH: usize = 2048;

/// Characters pulled from upstream per expansion window. Any expression of up
/// to [`MAX_EXPRESSION_LENGTH`] characters that starts in the back half of one
/// window is carried whole into the next.
const WINDOW_CAPACITY: usize = 2 * MAX_EXPRESSION_LENGTH - 1;

/// The first character of [`EXPRESSION_OPEN`].
const EXPRESSION_MARKER: char = '$';

/// Expands `${...}` expressions through a [`PropertyExpander`].
///
/// Upstream text is read in windows of up to [`WINDOW_CAPACITY`] characters.
/// When a window ends inside an expression (the last `${` has no `}` after it,
/// or the window ends on a lone `$`) the expression is held back and prefixed
/// to the next window so it is never split across two expansion calls.
/// Expressions longer than [`MAX_EXPRESSION_LENGTH`] are not guaranteed to
/// expand correctly.
#[derive(Debug)]
pub struct ExpandProperties {
	upstream: ChainableReader,
	expander: Arc<dyn PropertyExpander>,
	location: Location,
	/// Expanded text waiting to be read.
	buffer: VecDeque<char>,
	/// An unexpanded suffix starting at a dangling `${`.
	held: String,
	upstream_ended: bool,
}

impl ExpandProperties {
	pub fn new(expander: Arc<dyn PropertyExpander>) -> Self {
		Self {
			upstream: ChainableReader::default(),
			expander,
			location: Location::default(),
			buffer: VecDeque::new(),
			held: String::new(),
			upstream_ended: false,
		}
	}

	fn is_exhausted(&self) -> bool {
		self.upstream_ended && self.held.is_empty()
	}

	fn fetch(&mut self, advance: bool) -> FilterResult<Option<char>> {
		while self.buffer.is_empty() && !self.is_exhausted() {
			self.replenish()?;
		}

		if advance {
			Ok(self.buffer.pop_front())
		} else {
			Ok(self.buffer.front().copied())
		}
	}

	fn replenish(&mut self) -> FilterResult<()> {
		let mut window = std::mem::take(&mut self.held);
		let mut length = window.chars().count();

		while length < WINDOW_CAPACITY {
			let Some(ch) = self.upstream.read()? else {
				self.upstream_ended = true;
				break;
			};
			window.push(ch);
			length += 1;
		}

		let split = match dangling_expression(&window) {
			Some(open)
				if !self.upstream_ended
					&& window[open..].chars().count() < MAX_EXPRESSION_LENGTH =>
			{
				open
			}
			_ => window.len(),
		};

		if split > 0 {
			let expanded = self.expander.expand(&window[..split], &self.location)?;
			self.buffer.extend(expanded.chars());
		}
		self.held = window[split..].to_string();

		trace!(
			window = length,
			held = self.held.len(),
			upstream_ended = self.upstream_ended,
			"replenished property expansion buffer"
		);

		Ok(())
	}
}

/// Byte offset of the last `${` when no `}` follows it, or of a trailing `$`
/// that may open an expression in the next window.
fn dangling_expression(window: &str) -> Option<usize> {
	let open = window
		.rfind(EXPRESSION_OPEN)
		.filter(|&open| !window[open..].contains(EXPRESSION_CLOSE));

	open.or_else(|| window.strip_suffix(EXPRESSION_MARKER).map(str::len))
}

impl CharStream for ExpandProperties {
	fn read(&mut self) -> FilterResult<Option<char>> {
		self.fetch(true)
	}

	fn peek(&mut self) -> FilterResult<Option<char>> {
		self.fetch(false)
	}

	fn close(&mut self) -> FilterResult<()> {
		self.buffer.clear();
		self.held.clear();
		self.upstream_ended = true;
		self.upstream.close()
	}
}

impl Filter for ExpandProperties {
	fn kind(&self) -> FilterKind {
		FilterKind::ExpandProperties
	}

	fn upstream_mut(&mut self) -> &mut ChainableReader {
		&mut self.upstream
	}

	fn initialize(&mut self, _spec: &FilterSpec, location: &Location) -> FilterResult<()> {
		self.location = location.clone();
		Ok(())
	}
}
