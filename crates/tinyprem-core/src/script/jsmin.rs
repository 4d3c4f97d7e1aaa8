//! JSMin: character-level minifier.
//!
//! Keeps two characters of state (`a` is the character being emitted, `b`
//! the one after it) and decides per pair whether the whitespace between
//! them can go. `None` stands for end of input.

use super::{is_word_char, ScriptError};

/// Minifies `source`, failing on unterminated strings, regular expressions
/// or block comments.
pub fn minify(source: &str) -> Result<String, ScriptError> {
    let mut m = Minifier::new(source);
    m.run()?;
    Ok(m.out.trim_start_matches('\n').to_string())
}

struct Minifier {
    input: Vec<char>,
    pos: usize,
    lookahead: Option<Option<char>>,
    a: Option<char>,
    b: Option<char>,
    x: Option<char>,
    y: Option<char>,
    out: String,
}

/// What `action` should do: emit `a` and advance, drop `a`, or drop `b`.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Step {
    Output,
    Copy,
    Skip,
}

fn alnum(c: Option<char>) -> bool {
    c.is_some_and(is_word_char)
}

fn is_one_of(c: Option<char>, set: &str) -> bool {
    c.is_some_and(|c| set.contains(c))
}

impl Minifier {
    fn new(source: &str) -> Self {
        let mut input: Vec<char> = source.chars().collect();
        if input.first() == Some(&'\u{feff}') {
            input.remove(0);
        }
        Self {
            input,
            pos: 0,
            lookahead: None,
            a: None,
            b: None,
            x: None,
            y: None,
            out: String::with_capacity(source.len()),
        }
    }

    /// Next character with control characters folded: `\r` becomes `\n`,
    /// anything else below space becomes a space.
    fn get(&mut self) -> Option<char> {
        let c = match self.lookahead.take() {
            Some(c) => c,
            None => {
                let c = self.input.get(self.pos).copied();
                if c.is_some() {
                    self.pos += 1;
                }
                c
            }
        };
        match c {
            None => None,
            Some('\n') => Some('\n'),
            Some('\r') => Some('\n'),
            Some(c) if c < ' ' => Some(' '),
            Some(c) => Some(c),
        }
    }

    fn peek(&mut self) -> Option<char> {
        let c = self.get();
        self.lookahead = Some(c);
        c
    }

    /// Next character with comments removed. A line comment yields its
    /// terminating newline, a block comment yields a single space.
    fn next(&mut self) -> Result<Option<char>, ScriptError> {
        let mut c = self.get();
        if c == Some('/') {
            match self.peek() {
                Some('/') => loop {
                    c = self.get();
                    if matches!(c, None | Some('\n')) {
                        break;
                    }
                },
                Some('*') => {
                    let offset = self.pos.saturating_sub(2);
                    self.get();
                    loop {
                        match self.get() {
                            Some('*') => {
                                if self.peek() == Some('/') {
                                    self.get();
                                    c = Some(' ');
                                    break;
                                }
                            }
                            None => return Err(ScriptError::UnterminatedComment { offset }),
                            _ => {}
                        }
                    }
                }
                _ => {}
            }
        }
        self.y = self.x;
        self.x = c;
        Ok(c)
    }

    fn put(&mut self, c: Option<char>) {
        if let Some(c) = c {
            self.out.push(c);
        }
    }

    fn action(&mut self, step: Step) -> Result<(), ScriptError> {
        if step == Step::Output {
            self.put(self.a);
            if is_one_of(self.y, "\n ")
                && is_one_of(self.a, "+-*/")
                && is_one_of(self.b, "+-*/")
            {
                self.put(self.y);
            }
        }
        if step != Step::Skip {
            self.a = self.b;
            if let Some(quote @ ('\'' | '"' | '`')) = self.a {
                self.copy_string(quote)?;
            }
        }
        self.b = self.next()?;
        if self.b == Some('/') && is_one_of(self.a, "(,=:[!&|?+-~*/{};") {
            self.copy_regexp()?;
            self.b = self.next()?;
        }
        Ok(())
    }

    fn copy_string(&mut self, quote: char) -> Result<(), ScriptError> {
        let offset = self.pos.saturating_sub(1);
        loop {
            self.put(self.a);
            self.a = self.get();
            if self.a == Some(quote) {
                return Ok(());
            }
            if self.a == Some('\\') {
                self.put(self.a);
                self.a = self.get();
            }
            let line_break = quote != '`' && self.a == Some('\n');
            if self.a.is_none() || line_break {
                return Err(ScriptError::UnterminatedString { offset });
            }
        }
    }

    fn copy_regexp(&mut self) -> Result<(), ScriptError> {
        let offset = self.pos.saturating_sub(1);
        self.put(self.a);
        if is_one_of(self.a, "/*") {
            self.out.push(' ');
        }
        self.put(self.b);
        loop {
            self.a = self.get();
            match self.a {
                Some('[') => loop {
                    self.put(self.a);
                    self.a = self.get();
                    if self.a == Some(']') {
                        break;
                    }
                    if self.a == Some('\\') {
                        self.put(self.a);
                        self.a = self.get();
                    }
                    if matches!(self.a, None | Some('\n')) {
                        return Err(ScriptError::UnterminatedRegExp { offset });
                    }
                },
                Some('/') => {
                    if matches!(self.peek(), Some('/') | Some('*')) {
                        return Err(ScriptError::UnterminatedRegExp { offset });
                    }
                    return Ok(());
                }
                Some('\\') => {
                    self.put(self.a);
                    self.a = self.get();
                }
                _ => {}
            }
            if matches!(self.a, None | Some('\n')) {
                return Err(ScriptError::UnterminatedRegExp { offset });
            }
            self.put(self.a);
        }
    }

    fn run(&mut self) -> Result<(), ScriptError> {
        self.a = Some('\n');
        self.action(Step::Skip)?;
        while self.a.is_some() {
            let step = match self.a {
                Some(' ') => {
                    if alnum(self.b) {
                        Step::Output
                    } else {
                        Step::Copy
                    }
                }
                Some('\n') => match self.b {
                    Some('{' | '[' | '(' | '+' | '-' | '!' | '~') => Step::Output,
                    Some(' ') => Step::Skip,
                    _ if alnum(self.b) => Step::Output,
                    _ => Step::Copy,
                },
                _ => match self.b {
                    Some(' ') => {
                        if alnum(self.a) {
                            Step::Output
                        } else {
                            Step::Skip
                        }
                    }
                    Some('\n') => match self.a {
                        Some('}' | ']' | ')' | '+' | '-' | '"' | '\'' | '`') => Step::Output,
                        _ if alnum(self.a) => Step::Output,
                        _ => Step::Skip,
                    },
                    _ => Step::Output,
                },
            };
            self.action(step)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_comments_and_whitespace() {
        let src = "// header\nvar a = 1; /* block */\nvar b  =  a + 2;\n";
        assert_eq!(minify(src).unwrap(), "var a=1;var b=a+2;");
    }

    #[test]
    fn keeps_space_between_words() {
        assert_eq!(
            minify("function  f ( x ) {\n  return  typeof x;\n}").unwrap(),
            "function f(x){return typeof x;}"
        );
    }

    #[test]
    fn keeps_string_contents() {
        assert_eq!(
            minify("console.log( 'a  //  b' , \"c /* d */\" );").unwrap(),
            "console.log('a  //  b',\"c /* d */\");"
        );
    }

    #[test]
    fn keeps_regexp_literal() {
        assert_eq!(
            minify("var re = /a [/]  b/g;").unwrap(),
            "var re=/a [/]  b/g;"
        );
    }

    #[test]
    fn separates_plus_plus() {
        assert_eq!(minify("a + ++b").unwrap(), "a+ ++b");
    }

    #[test]
    fn unterminated_string_is_error() {
        assert!(matches!(
            minify("var s = 'abc;"),
            Err(ScriptError::UnterminatedString { .. })
        ));
        assert!(matches!(
            minify("var s = \"abc\nd\";"),
            Err(ScriptError::UnterminatedString { .. })
        ));
    }

    #[test]
    fn template_literal_may_span_lines() {
        assert_eq!(minify("var t = `a\nb`;").unwrap(), "var t=`a\nb`;");
    }

    #[test]
    fn unterminated_regexp_is_error() {
        assert!(matches!(
            minify("var re = (/abc"),
            Err(ScriptError::UnterminatedRegExp { .. })
        ));
    }

    #[test]
    fn unterminated_comment_is_error() {
        assert!(matches!(
            minify("var a = 1; /* never closed"),
            Err(ScriptError::UnterminatedComment { .. })
        ));
    }

    #[test]
    fn empty_input() {
        assert_eq!(minify("").unwrap(), "");
    }
}
