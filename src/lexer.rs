use crate::error::{CompileError, FormatError};
use miette::SourceSpan;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Text,
    Expression,          // {{ ... }}
    UnescapedExpression, // {{{ ... }}}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Literal text, or the raw (untrimmed) body between the braces.
    pub value: String,
    /// Byte range in the source, braces included.
    pub span: SourceSpan,
}

/// Single forward pass over the template characters.
///
/// Yields tokens lazily; the first error ends the stream.
pub struct Tokenizer<I: Iterator<Item = char>> {
    chars: I,
    current: Option<char>,
    offset: usize,
    text: String,
    text_start: usize,
    pending: Option<Token>,
    failed: bool,
}

impl<'a> Tokenizer<std::str::Chars<'a>> {
    pub fn new(input: &'a str) -> Self {
        Self::from_chars(input.chars())
    }
}

impl<I: Iterator<Item = char>> Tokenizer<I> {
    pub fn from_chars(mut chars: I) -> Self {
        let current = chars.next();
        Self {
            chars,
            current,
            offset: 0,
            text: String::new(),
            text_start: 0,
            pending: None,
            failed: false,
        }
    }

    fn bump(&mut self) {
        if let Some(c) = self.current {
            self.offset += c.len_utf8();
            self.current = self.chars.next();
        }
    }

    fn push_text(&mut self, c: char) {
        if self.text.is_empty() {
            self.text_start = self.offset;
        }
        self.text.push(c);
    }

    fn take_text(&mut self) -> Option<Token> {
        if self.text.is_empty() {
            return None;
        }
        let value = std::mem::take(&mut self.text);
        Some(Token {
            kind: TokenKind::Text,
            span: (self.text_start, value.len()).into(),
            value,
        })
    }

    pub fn next_token(&mut self) -> Result<Option<Token>, CompileError> {
        if let Some(token) = self.pending.take() {
            return Ok(Some(token));
        }

        while let Some(c) = self.current {
            if c != '{' {
                self.push_text(c);
                self.bump();
                continue;
            }

            let start = self.offset;
            let mut run = 0;
            while self.current == Some('{') && run < 3 {
                self.bump();
                run += 1;
            }

            if run == 1 {
                if self.text.is_empty() {
                    self.text_start = start;
                }
                self.text.push('{');
                continue;
            }

            if self.current == Some('{') {
                return Err(FormatError::TooManyBraces {
                    span: (self.offset, 1).into(),
                }
                .into());
            }

            let Some(expression) = self.read_expression(start, run)? else {
                // Opening braces right before end of input stay literal.
                if self.text.is_empty() {
                    self.text_start = start;
                }
                self.text.extend(std::iter::repeat('{').take(run));
                break;
            };

            return Ok(match self.take_text() {
                Some(text) => {
                    self.pending = Some(expression);
                    Some(text)
                }
                None => Some(expression),
            });
        }

        Ok(self.take_text())
    }

    /// Reads an expression body after `run` opening braces.
    ///
    /// Returns `None` when the input ends before any body was captured.
    fn read_expression(&mut self, start: usize, run: usize) -> Result<Option<Token>, CompileError> {
        let mut body = String::new();

        loop {
            match self.current {
                None if body.is_empty() => return Ok(None),
                None => {
                    return Err(FormatError::UnclosedExpression {
                        span: (start, self.offset - start).into(),
                    }
                    .into())
                }
                Some('}') => {
                    let mut closing = 0;
                    while self.current == Some('}') && closing < run {
                        self.bump();
                        closing += 1;
                    }

                    if closing < run {
                        body.extend(std::iter::repeat('}').take(closing));
                        continue;
                    }

                    let span = (start, self.offset - start).into();
                    if body.is_empty() {
                        return Err(FormatError::EmptyExpression { span }.into());
                    }

                    let kind = if run == 3 {
                        TokenKind::UnescapedExpression
                    } else {
                        TokenKind::Expression
                    };
                    return Ok(Some(Token { kind, value: body, span }));
                }
                Some(c) => {
                    body.push(c);
                    self.bump();
                }
            }
        }
    }
}

impl<I: Iterator<Item = char>> Iterator for Tokenizer<I> {
    type Item = Result<Token, CompileError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_token() {
            Ok(token) => token.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(input: &str) -> Result<Vec<(TokenKind, String)>, CompileError> {
        Tokenizer::new(input)
            .map(|t| t.map(|t| (t.kind, t.value)))
            .collect()
    }

    fn text(s: &str) -> (TokenKind, String) {
        (TokenKind::Text, s.to_string())
    }

    #[test]
    fn plain_text_is_one_token() {
        assert_eq!(scan("hello world").unwrap(), vec![text("hello world")]);
        assert_eq!(scan("").unwrap(), vec![]);
    }

    #[test]
    fn escaped_and_unescaped_expressions() {
        let tokens = scan("a{{ name }}b{{{raw}}}c").unwrap();
        assert_eq!(
            tokens,
            vec![
                text("a"),
                (TokenKind::Expression, " name ".to_string()),
                text("b"),
                (TokenKind::UnescapedExpression, "raw".to_string()),
                text("c"),
            ]
        );
    }

    #[test]
    fn lone_braces_are_literal() {
        assert_eq!(scan("{").unwrap(), vec![text("{")]);
        assert_eq!(scan("}").unwrap(), vec![text("}")]);
        assert_eq!(scan("{{").unwrap(), vec![text("{{")]);
        assert_eq!(scan("{{{").unwrap(), vec![text("{{{")]);
        assert_eq!(scan("}}}}").unwrap(), vec![text("}}}}")]);
        assert_eq!(scan("a { b } c").unwrap(), vec![text("a { b } c")]);
        assert_eq!(scan("x{{").unwrap(), vec![text("x{{")]);
    }

    #[test]
    fn excess_closing_braces_become_text() {
        assert_eq!(
            scan("{{a}}}").unwrap(),
            vec![(TokenKind::Expression, "a".to_string()), text("}")]
        );
    }

    #[test]
    fn short_closing_run_stays_in_body() {
        assert_eq!(
            scan("{{{a}}b}}}").unwrap(),
            vec![(TokenKind::UnescapedExpression, "a}}b".to_string())]
        );
    }

    #[test]
    fn four_opening_braces_fail() {
        let err = scan("{{{{").unwrap_err();
        assert!(matches!(
            err,
            CompileError::Format(FormatError::TooManyBraces { .. })
        ));
    }

    #[test]
    fn unclosed_expression_fails() {
        for input in ["{{a", "{{{a", "x {{a}"] {
            let err = scan(input).unwrap_err();
            assert!(
                matches!(err, CompileError::Format(FormatError::UnclosedExpression { .. })),
                "{input}: {err:?}"
            );
        }
    }

    #[test]
    fn empty_expression_fails() {
        for input in ["{{}}", "{{{}}}"] {
            let err = scan(input).unwrap_err();
            assert!(matches!(
                err,
                CompileError::Format(FormatError::EmptyExpression { .. })
            ));
        }
    }

    #[test]
    fn stream_stops_after_error() {
        let mut tokens = Tokenizer::new("ok {{}} {{more}}");
        assert!(matches!(tokens.next(), Some(Err(_))));
        assert!(tokens.next().is_none());
    }

    #[test]
    fn spans_cover_braces() {
        let tokens: Vec<Token> = Tokenizer::new("ab{{ x }}é")
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(tokens[0].span, SourceSpan::from((0, 2)));
        assert_eq!(tokens[1].span, SourceSpan::from((2, 7)));
        assert_eq!(tokens[2].span, SourceSpan::from((9, 2)));
    }
}
