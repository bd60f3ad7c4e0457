use std::fmt::Debug;

use crate::FilterError;
use crate::FilterKind;
use crate::FilterResult;
use crate::FilterSpec;
use crate::Location;

/// The pull-based, single character contract shared by physical sources,
/// filters and the assembled chain.
///
/// `Ok(None)` marks the end of the stream. Every call synchronously drives the
/// upstream chain down to the physical source.
pub trait CharStream: Debug {
	/// Return the next character and advance past it.
	fn read(&mut self) -> FilterResult<Option<char>>;

	/// Return the next character without advancing. Streams that would need
	/// unbounded lookahead to answer this fail with
	/// [`FilterError::PeekNotSupported`] instead.
	fn peek(&mut self) -> FilterResult<Option<char>>;

	/// Release this stream and everything upstream of it.
	fn close(&mut self) -> FilterResult<()>;

	/// Whether [`CharStream::peek`] can be called on this stream.
	fn supports_peek(&self) -> bool {
		true
	}

	/// True only for streams backed directly by a file or in-memory text.
	fn is_physical(&self) -> bool {
		false
	}
}

/// A single transformation stage in a chain.
///
/// The lifecycle is: construct, [`Filter::chain`] to an upstream,
/// [`Filter::initialize`] with parameters, drive through [`CharStream::read`]
/// until the end of the stream, then [`CharStream::close`].
pub trait Filter: CharStream {
	fn kind(&self) -> FilterKind;

	/// The reader holding this filter's upstream.
	fn upstream_mut(&mut self) -> &mut ChainableReader;

	/// Bind this filter to the stream it pulls characters from.
	fn chain(&mut self, upstream: Box<dyn CharStream>) -> FilterResult<()> {
		let kind = self.kind();
		self.upstream_mut().chain(upstream, kind)
	}

	/// Validate and consume the parameters declared for this filter. Errors
	/// carry `location`.
	fn initialize(&mut self, spec: &FilterSpec, location: &Location) -> FilterResult<()>;
}

/// Holds the exclusively owned upstream of a filter and forwards
/// reads, peeks and closes to it.
#[derive(Debug, Default)]
pub struct ChainableReader {
	upstream: Option<Box<dyn CharStream>>,
	is_base: bool,
	closed: bool,
}

impl ChainableReader {
	/// Attach `upstream`. A reader can only be chained once.
	pub fn chain(&mut self, upstream: Box<dyn CharStream>, kind: FilterKind) -> FilterResult<()> {
		if self.closed {
			return Err(FilterError::build(
				format!("the `{kind}` filter has already been closed"),
				&Location::default(),
			));
		}

		if self.upstream.is_some() {
			return Err(FilterError::build(
				format!("the `{kind}` filter is already chained to an upstream stream"),
				&Location::default(),
			));
		}

		self.is_base = upstream.is_physical();
		self.upstream = Some(upstream);

		Ok(())
	}

	/// Returns true when the upstream is a physical source rather than
	/// another filter.
	pub fn is_base(&self) -> bool {
		self.is_base
	}

	/// Whether peeking through this reader can succeed.
	pub fn supports_peek(&self) -> bool {
		self.upstream
			.as_ref()
			.is_none_or(|upstream| upstream.supports_peek())
	}

	pub fn is_chained(&self) -> bool {
		self.upstream.is_some()
	}

	pub fn read(&mut self) -> FilterResult<Option<char>> {
		self.fetch(true)
	}

	pub fn peek(&mut self) -> FilterResult<Option<char>> {
		self.fetch(false)
	}

	/// Shared body of `read` and `peek`. A closed reader is at the end of its
	/// stream.
	pub fn fetch(&mut self, advance: bool) -> FilterResult<Option<char>> {
		if self.closed {
			return Ok(None);
		}

		let Some(upstream) = self.upstream.as_mut() else {
			return Err(FilterError::build(
				"attempted to read from a filter that is not chained to an upstream stream",
				&Location::default(),
			));
		};

		if advance {
			upstream.read()
		} else {
			upstream.peek()
		}
	}

	/// Close and release the upstream. Closing an unchained or already closed
	/// reader does nothing.
	pub fn close(&mut self) -> FilterResult<()> {
		self.closed = true;
		match self.upstream.take() {
			Some(mut upstream) => upstream.close(),
			None => Ok(()),
		}
	}
}
