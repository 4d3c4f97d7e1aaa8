//! Validation of a single script expression before it is embedded verbatim.
//!
//! This is a tokenizer, not a parser: it rejects fragments that cannot be a
//! complete expression on lexical grounds (open literals or comments,
//! unbalanced brackets, a leading binary operator, a trailing operator).
//! Two operands in a row at the top level are rejected too, as is a line
//! comment that reaches the end of the fragment.

use super::{is_word_char, ScriptError};

/// Longest operators first so tokenization is maximal munch.
const OPERATORS: &[&str] = &[
    ">>>=", "...", "===", "!==", "**=", "<<=", ">>=", ">>>", "&&=", "||=", "??=", "=>", "==",
    "!=", "<=", ">=", "&&", "||", "??", "?.", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=",
    "|=", "^=", "**", "<<", ">>", "+", "-", "*", "/", "%", "<", ">", "=", "!", "~", "?", ":",
    "&", "|", "^", ",", ";", ".",
];

/// Operators that may open an expression.
const PREFIX_OPERATORS: &[&str] = &["!", "~", "+", "-", "++", "--"];

/// Operators that may close an expression.
const POSTFIX_OPERATORS: &[&str] = &["++", "--"];

/// Keywords after which a `/` starts a regular expression.
const REGEX_KEYWORDS: &[&str] = &[
    "return", "typeof", "instanceof", "in", "of", "new", "delete", "void", "throw", "case", "do",
    "else", "yield", "await",
];

/// Words that may sit next to an operand without an operator in between.
const JOINING_KEYWORDS: &[&str] = &[
    "async", "await", "class", "delete", "extends", "function", "in", "instanceof", "new", "of",
    "typeof", "void", "yield",
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    /// Identifier, keyword or number.
    Word(String),
    /// String or regular expression literal.
    Literal,
    /// Template literal; directly after an operand it is a tagged template.
    Template,
    Operator(&'static str),
    Open(char),
    Close(char),
}

impl Token {
    /// True when a following `/` must be division.
    fn ends_operand(&self) -> bool {
        match self {
            Token::Word(w) => !REGEX_KEYWORDS.contains(&w.as_str()),
            Token::Literal | Token::Template | Token::Close(_) => true,
            Token::Operator(op) => POSTFIX_OPERATORS.contains(op),
            Token::Open(_) => false,
        }
    }
}

/// Checks that `fragment` is a lexically complete expression.
pub fn check_fragment(fragment: &str) -> Result<(), ScriptError> {
    let tokens = Lexer::new(fragment).tokenize()?;

    let (first, last) = match (tokens.first(), tokens.last()) {
        (Some((_, first)), Some((_, last))) => (first, last),
        _ => return Err(ScriptError::Empty),
    };
    if let Token::Operator(op) = first {
        if !PREFIX_OPERATORS.contains(op) {
            return Err(ScriptError::DanglingOperator { op: op.to_string() });
        }
    }
    if let Token::Operator(op) = last {
        if !POSTFIX_OPERATORS.contains(op) {
            return Err(ScriptError::DanglingOperator { op: op.to_string() });
        }
    }
    check_adjacent_operands(&tokens)
}

/// Rejects `1 2`, `a b`, `(a) b` and the like outside any brackets.
///
/// Inside brackets newlines may separate statements of a function body, so
/// only the top level is checked.
fn check_adjacent_operands(tokens: &[(usize, Token)]) -> Result<(), ScriptError> {
    let mut depth = 0usize;
    let mut prev: Option<&Token> = None;
    for (offset, token) in tokens {
        if depth == 0 {
            if let Some(prev) = prev {
                if ends_bare_operand(prev) && starts_bare_operand(token) {
                    return Err(ScriptError::MissingOperator { offset: *offset });
                }
            }
        }
        match token {
            Token::Open(_) => depth += 1,
            Token::Close(_) => depth = depth.saturating_sub(1),
            _ => {}
        }
        prev = Some(token);
    }
    Ok(())
}

fn is_joining_keyword(token: &Token) -> bool {
    matches!(token, Token::Word(w) if JOINING_KEYWORDS.contains(&w.as_str()))
}

fn ends_bare_operand(token: &Token) -> bool {
    match token {
        Token::Word(_) => !is_joining_keyword(token),
        Token::Literal | Token::Template | Token::Close(_) => true,
        Token::Operator(_) | Token::Open(_) => false,
    }
}

/// Brackets are excluded: calls, indexing and function bodies follow operands.
fn starts_bare_operand(token: &Token) -> bool {
    match token {
        Token::Word(_) => !is_joining_keyword(token),
        Token::Literal => true,
        Token::Template | Token::Operator(_) | Token::Open(_) | Token::Close(_) => false,
    }
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    fn tokenize(mut self) -> Result<Vec<(usize, Token)>, ScriptError> {
        let mut tokens: Vec<(usize, Token)> = Vec::new();
        let mut open: Vec<(char, usize)> = Vec::new();

        while let Some(c) = self.peek_at(0) {
            let start = self.pos;
            if c.is_whitespace() {
                self.pos += 1;
                continue;
            }
            if c == '/' && self.peek_at(1) == Some('/') {
                self.skip_line_comment();
                if self.peek_at(0).is_none() {
                    return Err(ScriptError::TrailingLineComment { offset: start });
                }
                continue;
            }
            if c == '/' && self.peek_at(1) == Some('*') {
                self.skip_block_comment()?;
                continue;
            }
            let token = match c {
                '`' => {
                    self.string_literal(c)?;
                    Token::Template
                }
                '\'' | '"' => {
                    self.string_literal(c)?;
                    Token::Literal
                }
                '/' if !tokens.last().is_some_and(|(_, t)| t.ends_operand()) => {
                    self.regexp_literal()?;
                    Token::Literal
                }
                '(' | '[' | '{' => {
                    self.pos += 1;
                    open.push((c, start));
                    Token::Open(c)
                }
                ')' | ']' | '}' => {
                    self.pos += 1;
                    match open.pop() {
                        Some((o, _)) if closer_for(o) == c => {}
                        _ => return Err(ScriptError::Unbalanced { found: c, offset: start }),
                    }
                    Token::Close(c)
                }
                c if is_word_char(c) => Token::Word(self.word()),
                _ => Token::Operator(self.operator(c)?),
            };
            tokens.push((start, token));
        }

        if let Some((found, offset)) = open.pop() {
            return Err(ScriptError::Unbalanced { found, offset });
        }
        Ok(tokens)
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.peek_at(0) {
            if c == '\n' {
                break;
            }
            self.pos += 1;
        }
    }

    fn skip_block_comment(&mut self) -> Result<(), ScriptError> {
        let offset = self.pos;
        self.pos += 2;
        loop {
            match (self.peek_at(0), self.peek_at(1)) {
                (Some('*'), Some('/')) => {
                    self.pos += 2;
                    return Ok(());
                }
                (Some(_), _) => self.pos += 1,
                (None, _) => return Err(ScriptError::UnterminatedComment { offset }),
            }
        }
    }

    fn string_literal(&mut self, quote: char) -> Result<(), ScriptError> {
        let offset = self.pos;
        self.pos += 1;
        loop {
            match self.peek_at(0) {
                Some('\\') => self.pos += 2,
                Some(c) if c == quote => {
                    self.pos += 1;
                    return Ok(());
                }
                Some('\n') if quote != '`' => {
                    return Err(ScriptError::UnterminatedString { offset })
                }
                Some(_) => self.pos += 1,
                None => return Err(ScriptError::UnterminatedString { offset }),
            }
        }
    }

    fn regexp_literal(&mut self) -> Result<(), ScriptError> {
        let offset = self.pos;
        self.pos += 1;
        let mut in_class = false;
        loop {
            match self.peek_at(0) {
                Some('\\') => self.pos += 2,
                Some('[') => {
                    in_class = true;
                    self.pos += 1;
                }
                Some(']') => {
                    in_class = false;
                    self.pos += 1;
                }
                Some('/') if !in_class => {
                    self.pos += 1;
                    break;
                }
                Some('\n') | None => return Err(ScriptError::UnterminatedRegExp { offset }),
                Some(_) => self.pos += 1,
            }
        }
        while self.peek_at(0).is_some_and(|c| c.is_ascii_alphabetic()) {
            self.pos += 1;
        }
        Ok(())
    }

    fn word(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek_at(0) {
            // Decimal points and exponent signs stay inside numbers.
            let in_number = self.chars[start].is_ascii_digit()
                && (c == '.'
                    || ((c == '+' || c == '-')
                        && matches!(self.chars[self.pos - 1], 'e' | 'E')));
            if !is_word_char(c) && !in_number {
                break;
            }
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn operator(&mut self, c: char) -> Result<&'static str, ScriptError> {
        let rest: String = self.chars[self.pos..].iter().take(4).collect();
        match OPERATORS.iter().find(|op| rest.starts_with(*op)) {
            Some(op) => {
                self.pos += op.chars().count();
                Ok(*op)
            }
            None => Err(ScriptError::DanglingOperator { op: c.to_string() }),
        }
    }
}

fn closer_for(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}
