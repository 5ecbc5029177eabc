//! Encoding and decoding configuration.

/// Rules applied when encoding values.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct EncodingRules {
    /// Share a single tail copy between byte-identical dynamic children of
    /// the same tuple or array.
    pub optimize: bool,
    /// Render a human-readable word listing alongside the encoded bytes.
    pub annotate: bool,
}

impl EncodingRules {
    /// Creates the default encoding rules.
    pub const fn new() -> Self {
        Self {
            optimize: false,
            annotate: false,
        }
    }

    pub const fn with_optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }

    pub const fn with_annotate(mut self, annotate: bool) -> Self {
        self.annotate = annotate;
        self
    }
}

/// Rules applied when decoding calldata.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DecodingRules {
    /// Decode nested tuples into [`crate::Value::Struct`] values keyed by
    /// field name.
    pub convert_structs: bool,
    /// Reject non-canonical encodings: dirty padding, misaligned offsets,
    /// invalid UTF-8 strings and trailing bytes.
    pub strict: bool,
}

impl DecodingRules {
    /// Creates the default decoding rules.
    pub const fn new() -> Self {
        Self {
            convert_structs: false,
            strict: false,
        }
    }

    pub const fn with_convert_structs(mut self, convert_structs: bool) -> Self {
        self.convert_structs = convert_structs;
        self
    }

    pub const fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}
