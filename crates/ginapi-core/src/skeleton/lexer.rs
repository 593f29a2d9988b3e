//! A minimal Go lexer.
//!
//! It only knows enough of the language to find top-level declarations:
//! comments, string/rune literals and bracket nesting are honored, everything
//! else is reduced to identifiers and punctuation.

use std::ops::Range;

/// A lexical token with its byte span in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    Ident { text: &'a str, span: Range<usize> },
    Punct(char),
    /// String, rune or number literal
    Literal,
}

pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut chars = self.src[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(ch) = self.peek() {
            if !pred(ch) {
                break;
            }
            self.bump();
        }
    }

    /// Skip whitespace and comments.
    fn skip_trivia(&mut self) -> Result<(), String> {
        loop {
            match (self.peek(), self.peek_second()) {
                (Some(ch), _) if ch.is_whitespace() => {
                    self.bump();
                }
                (Some('/'), Some('/')) => self.eat_while(|ch| ch != '\n'),
                (Some('/'), Some('*')) => {
                    let start = self.pos;
                    match self.src[self.pos + 2..].find("*/") {
                        Some(end) => self.pos += 2 + end + 2,
                        None => {
                            return Err(format!("unterminated comment at byte {start}"));
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    /// Consume a quoted literal whose opening quote was already consumed.
    fn quoted(&mut self, quote: char, start: usize) -> Result<(), String> {
        loop {
            match self.bump() {
                Some('\\') => {
                    self.bump();
                }
                Some('\n') | None => {
                    return Err(format!("unterminated literal at byte {start}"));
                }
                Some(ch) if ch == quote => return Ok(()),
                Some(_) => {}
            }
        }
    }

    /// Next token, `None` at end of input.
    pub fn next_token(&mut self) -> Result<Option<Token<'a>>, String> {
        self.skip_trivia()?;
        let start = self.pos;
        let Some(ch) = self.bump() else {
            return Ok(None);
        };

        let token = match ch {
            '"' | '\'' => {
                self.quoted(ch, start)?;
                Token::Literal
            }
            '`' => match self.src[self.pos..].find('`') {
                Some(end) => {
                    self.pos += end + 1;
                    Token::Literal
                }
                None => return Err(format!("unterminated raw string at byte {start}")),
            },
            ch if ch.is_alphabetic() || ch == '_' => {
                self.eat_while(|ch| ch.is_alphanumeric() || ch == '_');
                Token::Ident {
                    text: &self.src[start..self.pos],
                    span: start..self.pos,
                }
            }
            ch if ch.is_ascii_digit() => {
                self.eat_while(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '.');
                Token::Literal
            }
            ch => Token::Punct(ch),
        };
        Ok(Some(token))
    }
}

/// Declarations found at the top level of a Go source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoSource {
    /// Package name from the package clause
    pub package: String,
    /// Byte span of the package name
    pub package_span: Range<usize>,
    /// Top-level function names in declaration order, methods excluded
    pub functions: Vec<String>,
}

/// Collect the package clause and top-level function names of `src`.
pub fn parse_source(src: &str) -> Result<GoSource, String> {
    let mut lexer = Lexer::new(src);
    let mut source = GoSource::default();
    let mut package: Option<(String, Range<usize>)> = None;
    let mut depth: usize = 0;
    let mut after_func = false;
    let mut after_package = false;

    while let Some(token) = lexer.next_token()? {
        match token {
            Token::Ident { text, span } => {
                if after_package {
                    package = Some((text.to_string(), span));
                } else if after_func {
                    source.functions.push(text.to_string());
                } else if depth == 0 && text == "func" {
                    after_func = true;
                    after_package = false;
                    continue;
                } else if depth == 0 && text == "package" && package.is_none() {
                    after_package = true;
                    continue;
                }
            }
            Token::Punct('{' | '(' | '[') => depth += 1,
            Token::Punct(ch @ ('}' | ')' | ']')) => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| format!("unbalanced {ch:?}"))?;
            }
            Token::Punct(_) | Token::Literal => {}
        }
        after_func = false;
        after_package = false;
    }

    if depth != 0 {
        return Err("unexpected end of file, unbalanced brackets".to_string());
    }

    let (name, span) = package.ok_or_else(|| "missing package clause".to_string())?;
    source.package = name;
    source.package_span = span;
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    const API_PETS: &str = r#"/*
 * Swagger Petstore
 *
 * package fake, inside a comment
 */

package openapi

import (
	"net/http"

	"github.com/gin-gonic/gin"
)

// CreatePets - Create a pet
func CreatePets(c *gin.Context) {
	c.JSON(http.StatusOK, gin.H{"braces": "}}}"})
}

// ListPets - List all pets
func ListPets(c *gin.Context) {
	f := func() { _ = `raw { string` }
	f()
	_ = '}'
}

func (s *server) Method() {}

type handler func(c *gin.Context)

var callback = func(x int) int { return x }

func ShowPetById[T any](c *gin.Context) {
}
"#;

    #[test]
    fn test_parse_source() {
        let source = parse_source(API_PETS).unwrap();
        assert_eq!(source.package, "openapi");
        assert_eq!(&API_PETS[source.package_span.clone()], "openapi");
        assert_eq!(
            source.functions,
            vec!["CreatePets", "ListPets", "ShowPetById"]
        );
    }

    #[test]
    fn test_errors() {
        assert!(parse_source("package x\nfunc A() {").is_err());
        assert!(parse_source("package x\n}").is_err());
        assert!(parse_source("package x\n/* open").is_err());
        assert!(parse_source("package x\nvar s = \"open\n\"").is_err());
        assert_eq!(
            parse_source("func A() {}"),
            Err("missing package clause".to_string())
        );
    }

    #[test]
    fn test_unicode_identifiers() {
        let source = parse_source("package ünï\n\nfunc Grüße() {}\n").unwrap();
        assert_eq!(source.package, "ünï");
        assert_eq!(source.functions, vec!["Grüße"]);
    }
}
