//! CST-aware lexer that preserves all trivia (whitespace, comments)
//!
//! Every byte of the input ends up in exactly one token, so concatenating
//! token texts reproduces the source: `lex(source).join() == source`.

use super::SyntaxKind;
use std::ops::Range;

/// Byte span in the source
pub type CstSpan = Range<usize>;

/// A lexer error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerError {
    pub message: String,
    pub span: CstSpan,
}

impl LexerError {
    pub fn new(message: impl Into<String>, span: CstSpan) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// A token with its syntax kind and span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CstToken {
    pub kind: SyntaxKind,
    pub text: String,
    pub span: CstSpan,
}

impl CstToken {
    pub fn new(kind: SyntaxKind, text: impl Into<String>, span: CstSpan) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }
}

/// Result returned by the CST lexer
pub type CstLexResult = (Vec<CstToken>, Vec<LexerError>);

/// Lex input preserving all trivia for CST construction
pub fn lex_with_trivia(input: &str) -> CstLexResult {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let mut i = 0usize;

    while let Some(current) = input[i..].chars().next() {
        let start = i;
        let rest = &input[i..];

        let (kind, end) = match current {
            '\n' => (SyntaxKind::Newline, start + 1),
            '\r' if rest.starts_with("\r\n") => (SyntaxKind::Newline, start + 2),
            c if c.is_whitespace() => {
                let len = rest
                    .find(|c: char| !c.is_whitespace() || c == '\n' || c == '\r')
                    .unwrap_or(rest.len());
                (SyntaxKind::Whitespace, start + len.max(c.len_utf8()))
            }
            '/' if rest.starts_with("//") => {
                let len = rest.find(['\r', '\n']).unwrap_or(rest.len());
                (SyntaxKind::CommentLine, start + len)
            }
            '/' if rest.starts_with("/*") => match rest[2..].find("*/") {
                Some(close) => (SyntaxKind::CommentBlock, start + close + 4),
                None => {
                    errors.push(LexerError::new(
                        "Unterminated block comment",
                        start..input.len(),
                    ));
                    (SyntaxKind::CommentBlock, input.len())
                }
            },
            '"' => {
                let (end, error) = lex_string(input, start);
                if let Some(err) = error {
                    errors.push(err);
                }
                (SyntaxKind::String, end)
            }
            c if c.is_ascii_digit() => {
                let len = rest
                    .find(|c: char| !c.is_ascii_digit())
                    .unwrap_or(rest.len());
                (SyntaxKind::IntNumber, start + len)
            }
            c if c == '_' || c.is_alphabetic() => {
                let len = rest
                    .find(|c: char| !(c == '_' || c.is_alphanumeric()))
                    .unwrap_or(rest.len());
                let word = &rest[..len];
                let kind = SyntaxKind::from_keyword(word).unwrap_or(SyntaxKind::Ident);
                (kind, start + len)
            }
            _ => match lex_punct(rest) {
                Some((kind, len)) => (kind, start + len),
                None => {
                    let len = current.len_utf8();
                    errors.push(LexerError::new(
                        format!("Unexpected character '{current}'"),
                        start..start + len,
                    ));
                    (SyntaxKind::Error, start + len)
                }
            },
        };

        tokens.push(CstToken::new(kind, &input[start..end], start..end));
        i = end;
    }

    (tokens, errors)
}

fn lex_punct(rest: &str) -> Option<(SyntaxKind, usize)> {
    const TWO_CHAR: [(&str, SyntaxKind); 7] = [
        ("..", SyntaxKind::DotDot),
        ("==", SyntaxKind::EqEq),
        ("!=", SyntaxKind::NotEq),
        ("||", SyntaxKind::PipePipe),
        ("&&", SyntaxKind::AmpAmp),
        ("<=", SyntaxKind::LtEq),
        (">=", SyntaxKind::GtEq),
    ];

    for (text, kind) in TWO_CHAR {
        if rest.starts_with(text) {
            return Some((kind, 2));
        }
    }

    let kind = match rest.as_bytes().first()? {
        b'(' => SyntaxKind::LParen,
        b')' => SyntaxKind::RParen,
        b'{' => SyntaxKind::LBrace,
        b'}' => SyntaxKind::RBrace,
        b',' => SyntaxKind::Comma,
        b';' => SyntaxKind::Semicolon,
        b':' => SyntaxKind::Colon,
        b'.' => SyntaxKind::Dot,
        b'=' => SyntaxKind::Eq,
        b'+' => SyntaxKind::Plus,
        b'-' => SyntaxKind::Minus,
        b'*' => SyntaxKind::Star,
        b'/' => SyntaxKind::Slash,
        b'<' => SyntaxKind::Lt,
        b'>' => SyntaxKind::Gt,
        b'!' => SyntaxKind::Bang,
        _ => return None,
    };
    Some((kind, 1))
}

fn lex_string(input: &str, start: usize) -> (usize, Option<LexerError>) {
    let mut escaped = false;
    for (offset, ch) in input[start + 1..].char_indices() {
        match ch {
            '\\' if !escaped => escaped = true,
            '"' if !escaped => return (start + 1 + offset + 1, None),
            '\n' => {
                let end = start + 1 + offset;
                return (
                    end,
                    Some(LexerError::new("Unterminated string literal", start..end)),
                );
            }
            _ => escaped = false,
        }
    }
    (
        input.len(),
        Some(LexerError::new(
            "Unterminated string literal",
            start..input.len(),
        )),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<SyntaxKind> {
        lex_with_trivia(input).0.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_preserves_whitespace_and_newlines() {
        let (tokens, errors) = lex_with_trivia("if  (x)\r\n  y;");
        assert!(errors.is_empty());
        assert_eq!(tokens[1].kind, SyntaxKind::Whitespace);
        assert_eq!(tokens[1].text, "  ");
        let newline = tokens.iter().find(|t| t.kind == SyntaxKind::Newline).unwrap();
        assert_eq!(newline.text, "\r\n");
    }

    #[test]
    fn test_lossless_reconstruction() {
        let source = "switch (x) { case 1: /* one */ f(); break; } // done\n";
        let (tokens, _) = lex_with_trivia(source);
        let rebuilt: String = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(rebuilt, source);
    }

    #[test]
    fn test_operators_prefer_longest_match() {
        assert_eq!(
            kinds("a==b||c..d"),
            vec![
                SyntaxKind::Ident,
                SyntaxKind::EqEq,
                SyntaxKind::Ident,
                SyntaxKind::PipePipe,
                SyntaxKind::Ident,
                SyntaxKind::DotDot,
                SyntaxKind::Ident,
            ]
        );
    }

    #[test]
    fn test_keywords_and_modifiers() {
        assert_eq!(
            kinds("async await ConfigureAwait"),
            vec![
                SyntaxKind::ModifierKw,
                SyntaxKind::Whitespace,
                SyntaxKind::AwaitKw,
                SyntaxKind::Whitespace,
                SyntaxKind::Ident,
            ]
        );
    }

    #[test]
    fn test_string_with_escape() {
        let (tokens, errors) = lex_with_trivia(r#""a\"b" x"#);
        assert!(errors.is_empty());
        assert_eq!(tokens[0].kind, SyntaxKind::String);
        assert_eq!(tokens[0].text, r#""a\"b""#);
    }

    #[test]
    fn test_unexpected_character_is_reported() {
        let (tokens, errors) = lex_with_trivia("a # b");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].span, 2..3);
        assert_eq!(tokens[2].kind, SyntaxKind::Error);
    }
}
