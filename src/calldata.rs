//! A cursor over raw ABI-encoded calldata.

use crate::{
    error::{Error, Result},
    primitive::{Word, WORD_SIZE},
    queue::Queue,
    selector::Selector,
};
use ethnum::U256;

/// A decoding cursor over an immutable byte buffer.
///
/// All offsets are relative to the start of the payload, i.e. after the
/// selector when the calldata was created with one. A stack of scopes tracks
/// the start of each nested head so that pointer offsets, which are relative
/// to the head that contains them, can be resolved to absolute positions.
#[derive(Clone, Debug)]
pub struct RawCalldata<'a> {
    data: &'a [u8],
    selector: Option<Selector>,
    offset: usize,
    scopes: Queue<usize>,
    consumed: usize,
}

impl<'a> RawCalldata<'a> {
    /// Creates a new cursor around the specified buffer. If `has_selector` is
    /// set, the first 4 bytes are sliced off and exposed separately.
    pub fn new(data: &'a [u8], has_selector: bool) -> Result<Self> {
        let (selector, data) = if has_selector {
            let selector = Selector::from_calldata(data)?;
            (Some(selector), &data[4..])
        } else {
            (None, data)
        };

        Ok(Self {
            data,
            selector,
            offset: 0,
            scopes: Queue::new(),
            consumed: 0,
        })
    }

    /// Returns the selector that was stripped from the calldata.
    pub fn selector(&self) -> Option<Selector> {
        self.selector
    }

    /// Returns the payload length, excluding any selector.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the current absolute offset.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Moves the cursor to an absolute offset.
    pub fn set_offset(&mut self, offset: usize) -> Result<()> {
        if offset > self.data.len() {
            return Err(Error::MalformedOffset {
                offset: U256::new(offset as u128),
                len: self.data.len(),
            });
        }
        self.offset = offset;
        Ok(())
    }

    /// Returns the furthest byte position that was read so far.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Pops `len` bytes from the cursor.
    pub fn pop_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let bytes = self
            .offset
            .checked_add(len)
            .and_then(|end| self.data.get(self.offset..end))
            .ok_or(Error::OutOfBounds {
                offset: self.offset,
                len,
                available: self.data.len(),
            })?;
        self.offset += len;
        self.consumed = self.consumed.max(self.offset);
        Ok(bytes)
    }

    /// Pops a single word from the cursor.
    pub fn pop_word(&mut self) -> Result<Word> {
        let mut word = Word::default();
        word.copy_from_slice(self.pop_bytes(WORD_SIZE)?);
        Ok(word)
    }

    /// Pops `count` words from the cursor.
    pub fn pop_words(&mut self, count: usize) -> Result<&'a [u8]> {
        let len = count.checked_mul(WORD_SIZE).ok_or(Error::OutOfBounds {
            offset: self.offset,
            len: usize::MAX,
            available: self.data.len(),
        })?;
        self.pop_bytes(len)
    }

    /// Starts a new scope at the current offset.
    pub fn start_scope(&mut self) {
        self.scopes.push_back(self.offset);
    }

    /// Ends the innermost scope, returning its start offset.
    pub fn end_scope(&mut self) -> Option<usize> {
        self.scopes.pop_back()
    }

    /// Returns the start of the innermost scope, the start of the payload
    /// when no scope was started.
    pub fn scope_start(&self) -> usize {
        self.scopes.peek_back().copied().unwrap_or(0)
    }

    /// Resolves an offset relative to the innermost scope into an absolute
    /// offset in the payload.
    pub fn to_absolute_offset(&self, relative: U256) -> Result<usize> {
        let malformed = || Error::MalformedOffset {
            offset: relative,
            len: self.data.len(),
        };

        let (hi, lo) = relative.into_words();
        if hi != 0 {
            return Err(malformed());
        }
        let absolute = usize::try_from(lo)
            .ok()
            .and_then(|relative| self.scope_start().checked_add(relative))
            .ok_or_else(malformed)?;
        if absolute > self.data.len() {
            return Err(malformed());
        }
        Ok(absolute)
    }
}
