//! Script lexing: whole-script minification and single-fragment validation.
//!
//! `minify` follows the JSMin rules (strip comments, collapse whitespace,
//! copy string and regular expression literals untouched). `check_fragment`
//! is the stricter test applied to each option value before it is embedded
//! into the bootstrap script.

mod fragment;
mod jsmin;

pub use fragment::check_fragment;
pub use jsmin::minify;

/// Lexing failure for a script or fragment. Offsets count characters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScriptError {
    #[error("unterminated string literal (at offset {offset})")]
    UnterminatedString { offset: usize },

    #[error("unterminated regular expression literal (at offset {offset})")]
    UnterminatedRegExp { offset: usize },

    #[error("unterminated comment (at offset {offset})")]
    UnterminatedComment { offset: usize },

    #[error("empty script fragment")]
    Empty,

    #[error("unbalanced {found:?} (at offset {offset})")]
    Unbalanced { found: char, offset: usize },

    #[error("dangling operator {op:?}")]
    DanglingOperator { op: String },

    /// A `//` comment runs to the end of the fragment and would swallow
    /// whatever is embedded after it.
    #[error("line comment at end of fragment (at offset {offset})")]
    TrailingLineComment { offset: usize },

    #[error("missing operator between operands (at offset {offset})")]
    MissingOperator { offset: usize },
}

/// Characters that may appear inside identifiers and numbers.
pub(crate) fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$' || c == '\\' || (c as u32) > 126
}
