//! Splitting a line into fields.

/// The field separator.
pub const DELIMITER: char = ';';

/// The most fields a client line is split into. Anything past the last
/// field is ignored.
pub const MAX_CLIENT_TOKENS: usize = 8;

/// An ordered list of at most [`MAX_CLIENT_TOKENS`] fields.
///
/// Fields are trimmed. An empty field reads as absent, so `;get_games`
/// has no sender and `1;nick;` has no third field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tokens<'a> {
    fields: Vec<&'a str>,
}

impl<'a> Tokens<'a> {
    /// Splits `line` on [`DELIMITER`].
    pub fn split(line: &'a str) -> Self {
        let fields = line
            .split(DELIMITER)
            .take(MAX_CLIENT_TOKENS)
            .map(str::trim)
            .collect();
        Self { fields }
    }

    /// Returns field `index`, or `None` if it is missing or empty.
    pub fn get(&self, index: usize) -> Option<&'a str> {
        self.fields.get(index).copied().filter(|f| !f.is_empty())
    }

    /// Number of fields, empty ones included.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if there are no fields at all.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
