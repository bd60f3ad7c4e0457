//! The concrete filters. Each one owns its upstream through a
//! [`ChainableReader`](crate::ChainableReader) and keeps all of its state
//! private.

pub use expand_properties::*;
pub use replace_character::*;
pub use replace_string::*;
pub use replace_tokens::*;
pub use tabs_to_spaces::*;

mod expand_properties;
mod replace_character;
mod replace_string;
mod replace_tokens;
mod tabs_to_spaces;

/// What the matching filters do with the next character they obtain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
	/// Hand the character downstream as is.
	Emit(char),
	/// Check whether the character starts a new match.
	Candidate(char),
	End,
}

/// Characters that have already been resolved (a replacement, or text that
/// turned out not to match) and are drained downstream one at a time before
/// the upstream is touched again.
#[derive(Debug, Default)]
pub(crate) struct OutputBuffer {
	chars: Vec<char>,
	position: usize,
	/// The final character is handed back as a [`Step::Candidate`] because it
	/// may begin the next match.
	reprocess_last: bool,
}

impl OutputBuffer {
	/// Start draining `chars`. Any previous content must already be drained.
	pub(crate) fn fill(&mut self, chars: Vec<char>, reprocess_last: bool) {
		debug_assert!(!self.is_active(), "output buffer replaced before it was drained");
		self.chars = chars;
		self.position = 0;
		self.reprocess_last = reprocess_last;
	}

	pub(crate) fn is_active(&self) -> bool {
		self.position < self.chars.len()
	}

	/// Take the next buffered character, releasing the buffer once the last one
	/// has been taken.
	pub(crate) fn next(&mut self) -> Option<Step> {
		let ch = *self.chars.get(self.position)?;
		self.position += 1;

		if self.position < self.chars.len() {
			return Some(Step::Emit(ch));
		}

		self.chars.clear();
		self.position = 0;

		if self.reprocess_last {
			Some(Step::Candidate(ch))
		} else {
			Some(Step::Emit(ch))
		}
	}
}
