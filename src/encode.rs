//! Module implementing ABI encoding layout.
//!
//! Encoding a value against a type tree produces a tree of immutable
//! [`Block`]s. Sizes of blocks are known up front, so a single linear pass
//! can compute every tail offset and write the final bytes without ever
//! patching previously written output.

use crate::{
    fmt::Hex,
    primitive::{pad32, usize_to_word, Word, WORD_SIZE},
    rules::EncodingRules,
    selector::Selector,
};
use std::fmt::Write as _;

/// Encoded calldata, with an optional annotated listing of its words.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Encoded {
    /// The encoded bytes.
    pub data: Vec<u8>,
    /// A human-readable listing of the encoded words, present when encoding
    /// with [`EncodingRules::annotate`].
    pub annotation: Option<String>,
}

/// An encoded block.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Block {
    label: String,
    kind: BlockKind,
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum BlockKind {
    Word(Word),
    /// Length-prefixed and right-padded bytes.
    Blob(Vec<u8>),
    /// A head of members followed by the tail of the pointer members, with a
    /// length prefix for dynamic arrays.
    Set {
        length: Option<usize>,
        members: Vec<Member>,
    },
}

/// A member of a set block.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Member {
    /// A static member, written in place in the head.
    Inline(Block),
    /// A dynamic member, with an offset in the head and contents in the tail.
    Pointer(Block),
    /// A dynamic member sharing the tail contents of an earlier pointer
    /// member of the same set.
    Alias { label: String, target: usize },
}

impl Block {
    /// Creates a single word block.
    pub fn word(label: impl Into<String>, word: Word) -> Self {
        Self {
            label: label.into(),
            kind: BlockKind::Word(word),
        }
    }

    /// Creates a length-prefixed blob block.
    pub fn blob(label: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            label: label.into(),
            kind: BlockKind::Blob(bytes),
        }
    }

    /// Creates a set block, with a length prefix for dynamic arrays.
    pub fn set(label: impl Into<String>, length: Option<usize>, members: Vec<Member>) -> Self {
        Self {
            label: label.into(),
            kind: BlockKind::Set { length, members },
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the encoded length of the block in bytes.
    pub fn byte_len(&self) -> usize {
        match &self.kind {
            BlockKind::Word(_) => WORD_SIZE,
            BlockKind::Blob(bytes) => WORD_SIZE + pad32(bytes.len()),
            BlockKind::Set { length, members } => {
                let prefix = if length.is_some() { WORD_SIZE } else { 0 };
                prefix + head_len(members) + tail_len(members)
            }
        }
    }

    /// Deduplicates byte-identical pointer members of every set in the
    /// block, so that they share a single copy in the tail.
    pub fn optimize(self) -> Self {
        let kind = match self.kind {
            BlockKind::Set { length, members } => {
                let mut seen = Vec::<(usize, Vec<u8>)>::new();
                let mut optimized = Vec::with_capacity(members.len());
                for (i, member) in members.into_iter().enumerate() {
                    let member = match member {
                        Member::Inline(block) => Member::Inline(block.optimize()),
                        Member::Pointer(block) => {
                            let block = block.optimize();
                            let bytes = block.to_bytes();
                            match seen.iter().find(|(_, other)| *other == bytes) {
                                Some((target, _)) => Member::Alias {
                                    label: block.label,
                                    target: *target,
                                },
                                None => {
                                    seen.push((i, bytes));
                                    Member::Pointer(block)
                                }
                            }
                        }
                        alias => alias,
                    };
                    optimized.push(member);
                }
                BlockKind::Set {
                    length,
                    members: optimized,
                }
            }
            kind => kind,
        };
        Self {
            label: self.label,
            kind,
        }
    }

    /// Lays out the block into bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = Writer::new(self.byte_len(), false);
        self.write(&mut writer);
        writer.data
    }

    /// Lays out the block with an optional selector prefix, applying the
    /// specified encoding rules.
    pub fn finish(self, selector: Option<Selector>, rules: &EncodingRules) -> Encoded {
        let block = if rules.optimize { self.optimize() } else { self };

        let prefix = selector.map(|s| s.0.len()).unwrap_or_default();
        let mut writer = Writer::new(prefix + block.byte_len(), rules.annotate);
        if let Some(selector) = selector {
            writer.data.extend_from_slice(selector.as_ref());
        }
        block.write(&mut writer);

        let annotation = writer.notes.map(|notes| {
            let mut annotation = String::new();
            if let Some(selector) = selector {
                let _ = writeln!(annotation, "{selector}  selector");
            }
            let words = writer.data[prefix..].chunks(WORD_SIZE);
            for (i, (word, note)) in words.zip(notes).enumerate() {
                let _ = writeln!(
                    annotation,
                    "0x{:04x}  {}  {}",
                    i * WORD_SIZE,
                    Hex(word),
                    note
                );
            }
            annotation
        });

        Encoded {
            data: writer.data,
            annotation,
        }
    }

    fn write(&self, writer: &mut Writer) {
        match &self.kind {
            BlockKind::Word(word) => writer.word(word, || self.label.clone()),
            BlockKind::Blob(bytes) => {
                writer.word(&usize_to_word(bytes.len()), || format!("{} length", self.label));
                for chunk in bytes.chunks(WORD_SIZE) {
                    let mut word = Word::default();
                    word[..chunk.len()].copy_from_slice(chunk);
                    writer.word(&word, || self.label.clone());
                }
            }
            BlockKind::Set { length, members } => {
                if let Some(length) = length {
                    writer.word(&usize_to_word(*length), || format!("{} length", self.label));
                }

                let mut offsets = Vec::with_capacity(members.len());
                let mut tail = head_len(members);
                for member in members {
                    match member {
                        Member::Inline(_) => offsets.push(0),
                        Member::Pointer(block) => {
                            offsets.push(tail);
                            tail += block.byte_len();
                        }
                        Member::Alias { target, .. } => offsets.push(offsets[*target]),
                    }
                }

                for (member, offset) in members.iter().zip(&offsets) {
                    match member {
                        Member::Inline(block) => block.write(writer),
                        Member::Pointer(Block { label, .. }) | Member::Alias { label, .. } => {
                            writer.word(&usize_to_word(*offset), || format!("{label} offset"))
                        }
                    }
                }
                for member in members {
                    if let Member::Pointer(block) = member {
                        block.write(writer);
                    }
                }
            }
        }
    }
}

fn head_len(members: &[Member]) -> usize {
    members
        .iter()
        .map(|member| match member {
            Member::Inline(block) => block.byte_len(),
            Member::Pointer(_) | Member::Alias { .. } => WORD_SIZE,
        })
        .sum()
}

fn tail_len(members: &[Member]) -> usize {
    members
        .iter()
        .map(|member| match member {
            Member::Pointer(block) => block.byte_len(),
            _ => 0,
        })
        .sum()
}

/// Output buffer, optionally recording one note per written word.
struct Writer {
    data: Vec<u8>,
    notes: Option<Vec<String>>,
}

impl Writer {
    fn new(capacity: usize, annotate: bool) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            notes: annotate.then(Vec::new),
        }
    }

    fn word(&mut self, word: &Word, note: impl FnOnce() -> String) {
        self.data.extend_from_slice(word);
        if let Some(notes) = &mut self.notes {
            notes.push(note());
        }
    }
}
