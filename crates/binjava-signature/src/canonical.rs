//! Canonical type text parsing (`a.b.C<D, ? extends E>[]`).
//!
//! This is the textual form used by external metadata (annotation files,
//! stubs) to describe types. It produces the same [`JavaType`] shapes as the
//! signature parser, so a type read from text and one read from a class file
//! look alike to consumers.

use std::sync::Arc;

use binjava_model::{JavaClassifierType, JavaType, JavaWildcardType, PrimitiveType};

use crate::error::{MalformedSignature, Result};
use crate::resolver::ClassifierResolver;

/// Parses canonical type text without resolving names; every classifier keeps
/// its qualified name and resolves to `None`.
pub fn parse_canonical_text(text: &str) -> Result<JavaType> {
    parse_canonical_text_in(text, &ClassifierResolver::detached())
}

/// Parses canonical type text, resolving names through `resolver`.
pub fn parse_canonical_text_in(text: &str, resolver: &ClassifierResolver) -> Result<JavaType> {
    let mut parser = Parser::new(text, resolver);
    parser.skip_ws();
    let ty = parser.parse_type()?;
    parser.skip_ws();
    if !parser.is_eof() {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(ty)
}

/// Parses text that must denote a class type (no array suffix, no primitive).
pub fn parse_canonical_classifier_type(text: &str) -> Result<Arc<JavaClassifierType>> {
    match parse_canonical_text(text)? {
        JavaType::Classifier(ty) => Ok(ty),
        _ => Err(MalformedSignature::new(text, 0, "expected a classifier type")),
    }
}

struct Parser<'a> {
    text: &'a str,
    pos: usize,
    resolver: &'a ClassifierResolver,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str, resolver: &'a ClassifierResolver) -> Self {
        Self {
            text,
            pos: 0,
            resolver,
        }
    }

    fn parse_type(&mut self) -> Result<JavaType> {
        let mut name = String::new();
        // Generic qualifiers (`Outer<A>.Inner<B>`) produce one group per
        // segment; they are flattened innermost first.
        let mut argument_groups: Vec<Vec<JavaType>> = Vec::new();
        while let Some(c) = self.peek_char() {
            match c {
                '<' => argument_groups.push(self.parse_type_args()?),
                '[' | ' ' | ',' | '&' | '>' => break,
                c if c.is_whitespace() => break,
                c => {
                    name.push(c);
                    self.bump_char();
                }
            }
        }
        if name.is_empty() {
            return Err(self.error("expected a type name"));
        }

        let keyword_type = if name == "void" {
            Some(JavaType::VOID)
        } else {
            PrimitiveType::from_keyword(&name).map(JavaType::primitive)
        };
        let element = match keyword_type {
            Some(ty) => {
                if !argument_groups.is_empty() {
                    return Err(self.error("primitive types cannot have type arguments"));
                }
                ty
            }
            None => {
                let type_arguments = argument_groups.into_iter().rev().flatten().collect();
                JavaType::classifier(self.resolver.resolve(&name), type_arguments)
            }
        };

        self.parse_array_suffixes(element)
    }

    fn parse_array_suffixes(&mut self, mut ty: JavaType) -> Result<JavaType> {
        while self.consume_char('[') {
            if !self.consume_char(']') {
                return Err(self.error("expected `]`"));
            }
            ty = JavaType::array(ty);
        }
        Ok(ty)
    }

    /// Reads `<...>`, including both angle brackets.
    fn parse_type_args(&mut self) -> Result<Vec<JavaType>> {
        self.bump_char();
        let mut args = Vec::new();
        loop {
            self.skip_ws();
            match self.peek_char() {
                Some('>') => {
                    self.bump_char();
                    return Ok(args);
                }
                Some(',') => {
                    self.bump_char();
                }
                Some('?') => args.push(self.parse_wildcard()?),
                Some(_) => args.push(self.parse_type()?),
                None => return Err(self.error("unterminated type argument list")),
            }
        }
    }

    fn parse_wildcard(&mut self) -> Result<JavaType> {
        self.bump_char();
        if !self.peek_char().is_some_and(char::is_whitespace) {
            return Ok(JavaType::Wildcard(JavaWildcardType::unbounded()));
        }
        self.skip_ws();

        let is_extends = if self.consume_keyword("extends") {
            true
        } else if self.consume_keyword("super") {
            false
        } else {
            return Err(self.error("expected `extends` or `super` in wildcard"));
        };
        self.skip_ws();
        let bound = self.parse_type()?;

        // Intersection bounds (`? extends A & B`) keep only the first component.
        loop {
            let save = self.pos;
            self.skip_ws();
            if !self.consume_char('&') {
                self.pos = save;
                break;
            }
            self.skip_ws();
            self.parse_type()?;
        }

        Ok(JavaType::Wildcard(JavaWildcardType {
            bound: Some(Box::new(bound)),
            is_extends,
        }))
    }

    fn consume_keyword(&mut self, keyword: &str) -> bool {
        let Some(rest) = self.rest().strip_prefix(keyword) else {
            return false;
        };
        if !rest.starts_with(char::is_whitespace) {
            return false;
        }
        self.pos += keyword.len();
        true
    }

    fn skip_ws(&mut self) {
        while self.peek_char().is_some_and(char::is_whitespace) {
            self.bump_char();
        }
    }

    fn consume_char(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.bump_char();
            true
        } else {
            false
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump_char(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn error(&self, reason: &'static str) -> MalformedSignature {
        MalformedSignature::new(self.text, self.pos, reason)
    }
}
