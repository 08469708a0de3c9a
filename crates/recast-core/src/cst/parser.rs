//! Reference parser producing a lossless CST
//!
//! Recursive descent for declarations and statements, precedence climbing for
//! binary expressions. The parser never fails: unexpected input is wrapped in
//! `Error` nodes so that `parse(source).text() == source` always holds.
//!
//! Trivia placement follows one rule. The trivia after a token, up to and
//! including the first line break, is that token's trailing trivia and is
//! emitted right after it. Everything else is leading trivia of the next token
//! and is emitted just before it, so it ends up inside the innermost node that
//! starts with that token.

use rowan::{GreenNode, GreenNodeBuilder};

use super::lexer::{CstSpan, CstToken, LexerError, lex_with_trivia};
use super::{SyntaxKind, SyntaxNode, SyntaxTree};

/// A recoverable syntax error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub span: CstSpan,
}

impl From<LexerError> for ParseError {
    fn from(err: LexerError) -> Self {
        Self {
            message: err.message,
            span: err.span,
        }
    }
}

/// Output of [`parse`]
#[derive(Debug, Clone)]
pub struct Parse {
    green: GreenNode,
    errors: Vec<ParseError>,
}

impl Parse {
    pub fn green(&self) -> &GreenNode {
        &self.green
    }

    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn tree(&self) -> SyntaxTree {
        SyntaxTree::new(self.green.clone())
    }
}

/// Parse source text into a CST
///
/// # Example
///
/// ```
/// use recast_core::cst::parse;
///
/// let source = "void M(int a, int b) { return; }\n";
/// let parse = parse(source);
/// assert!(parse.errors().is_empty());
/// assert_eq!(parse.syntax().text().to_string(), source);
/// ```
pub fn parse(source: &str) -> Parse {
    let (tokens, lex_errors) = lex_with_trivia(source);
    let mut parser = Parser::new(&tokens);
    parser.parse_compilation_unit();

    let mut errors: Vec<ParseError> = lex_errors.into_iter().map(ParseError::from).collect();
    errors.extend(parser.errors);
    tracing::trace!(errors = errors.len(), "parsed {} bytes", source.len());

    Parse {
        green: parser.builder.finish(),
        errors,
    }
}

/// Token stream parser
struct Parser<'a> {
    tokens: &'a [CstToken],
    /// Raw indices of non-trivia tokens
    significant: Vec<usize>,
    /// Next raw token to emit
    pos: usize,
    /// Next significant token
    sig: usize,
    builder: GreenNodeBuilder<'static>,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [CstToken]) -> Self {
        let significant = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.kind.is_trivia())
            .map(|(i, _)| i)
            .collect();

        Self {
            tokens,
            significant,
            pos: 0,
            sig: 0,
            builder: GreenNodeBuilder::new(),
            errors: Vec::new(),
        }
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn parse_compilation_unit(&mut self) {
        self.builder.start_node(SyntaxKind::CompilationUnit.into());

        while !self.at_end() {
            let before = self.sig;
            self.parse_member();
            if self.sig == before {
                self.error_and_recover("Unexpected token");
            }
        }

        // Trivia after the last token belongs to the unit
        while self.pos < self.tokens.len() {
            self.push_raw(self.pos);
            self.pos += 1;
        }

        self.builder.finish_node();
    }

    fn parse_member(&mut self) {
        if self.at_class() {
            self.parse_class();
        } else if self.at_method() {
            self.parse_method();
        } else {
            self.parse_stmt();
        }
    }

    /// Grammar: modifier* 'class' Ident '{' member* '}'
    fn parse_class(&mut self) {
        self.builder.start_node(SyntaxKind::ClassDecl.into());
        self.eat_modifiers();
        self.expect(SyntaxKind::ClassKw);
        self.expect(SyntaxKind::Ident);
        self.expect(SyntaxKind::LBrace);

        while !self.at_end() && !self.at(SyntaxKind::RBrace) {
            let before = self.sig;
            self.parse_member();
            if self.sig == before {
                self.error_and_recover("Unexpected token in class body");
            }
        }

        self.expect(SyntaxKind::RBrace);
        self.builder.finish_node();
    }

    /// Grammar: modifier* type Ident paramList (block | ';')
    fn parse_method(&mut self) {
        self.builder.start_node(SyntaxKind::MethodDecl.into());
        self.eat_modifiers();
        self.parse_type();
        self.expect(SyntaxKind::Ident);
        self.parse_parameter_list();

        if self.at(SyntaxKind::LBrace) {
            self.parse_block();
        } else {
            self.expect(SyntaxKind::Semicolon);
        }

        self.builder.finish_node();
    }

    fn parse_parameter_list(&mut self) {
        self.builder.start_node(SyntaxKind::ParameterList.into());
        self.expect(SyntaxKind::LParen);

        while !self.at_end() && !self.at(SyntaxKind::RParen) {
            self.parse_parameter();
            if !self.eat(SyntaxKind::Comma) {
                break;
            }
        }

        self.expect(SyntaxKind::RParen);
        self.builder.finish_node();
    }

    fn parse_parameter(&mut self) {
        self.builder.start_node(SyntaxKind::Parameter.into());
        self.eat_modifiers();
        self.parse_type();
        self.expect(SyntaxKind::Ident);
        self.builder.finish_node();
    }

    /// Grammar: Ident ('<' type (',' type)* '>')?
    fn parse_type(&mut self) {
        self.builder.start_node(SyntaxKind::TypeRef.into());
        self.expect(SyntaxKind::Ident);

        if self.at(SyntaxKind::Lt) {
            self.builder.start_node(SyntaxKind::TypeArgList.into());
            self.bump();
            loop {
                self.parse_type();
                if !self.eat(SyntaxKind::Comma) {
                    break;
                }
            }
            self.expect(SyntaxKind::Gt);
            self.builder.finish_node();
        }

        self.builder.finish_node();
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn parse_stmt(&mut self) {
        match self.current() {
            Some(SyntaxKind::LBrace) => self.parse_block(),
            Some(SyntaxKind::IfKw) => self.parse_if(),
            Some(SyntaxKind::SwitchKw) => self.parse_switch(),
            Some(SyntaxKind::WhileKw) => self.parse_while(),
            Some(SyntaxKind::BreakKw) => {
                self.builder.start_node(SyntaxKind::BreakStmt.into());
                self.bump();
                self.expect(SyntaxKind::Semicolon);
                self.builder.finish_node();
            }
            Some(SyntaxKind::ReturnKw) => {
                self.builder.start_node(SyntaxKind::ReturnStmt.into());
                self.bump();
                if !self.at(SyntaxKind::Semicolon) {
                    self.parse_expr();
                }
                self.expect(SyntaxKind::Semicolon);
                self.builder.finish_node();
            }
            Some(SyntaxKind::VarKw) => self.parse_local_decl(),
            Some(SyntaxKind::RBrace) | None => {}
            Some(_) if self.at_typed_local() => self.parse_local_decl(),
            Some(_) => {
                self.builder.start_node(SyntaxKind::ExprStmt.into());
                self.parse_expr();
                self.expect(SyntaxKind::Semicolon);
                self.builder.finish_node();
            }
        }
    }

    fn parse_block(&mut self) {
        self.builder.start_node(SyntaxKind::Block.into());
        self.expect(SyntaxKind::LBrace);

        while !self.at_end() && !self.at(SyntaxKind::RBrace) {
            let before = self.sig;
            self.parse_stmt();
            if self.sig == before {
                self.error_and_recover("Expected statement");
            }
        }

        self.expect(SyntaxKind::RBrace);
        self.builder.finish_node();
    }

    /// Grammar: 'if' '(' expr ')' stmt ('else' stmt)?
    fn parse_if(&mut self) {
        self.builder.start_node(SyntaxKind::IfStmt.into());
        self.bump();
        self.expect(SyntaxKind::LParen);
        self.parse_expr();
        self.expect(SyntaxKind::RParen);
        self.parse_embedded_stmt();

        if self.at(SyntaxKind::ElseKw) {
            self.builder.start_node(SyntaxKind::ElseClause.into());
            self.bump();
            self.parse_embedded_stmt();
            self.builder.finish_node();
        }

        self.builder.finish_node();
    }

    fn parse_while(&mut self) {
        self.builder.start_node(SyntaxKind::WhileStmt.into());
        self.bump();
        self.expect(SyntaxKind::LParen);
        self.parse_expr();
        self.expect(SyntaxKind::RParen);
        self.parse_embedded_stmt();
        self.builder.finish_node();
    }

    fn parse_embedded_stmt(&mut self) {
        let before = self.sig;
        self.parse_stmt();
        if self.sig == before {
            self.error("Expected statement");
        }
    }

    /// Grammar: 'switch' '(' expr ')' '{' section* '}'
    fn parse_switch(&mut self) {
        self.builder.start_node(SyntaxKind::SwitchStmt.into());
        self.bump();
        self.expect(SyntaxKind::LParen);
        self.parse_expr();
        self.expect(SyntaxKind::RParen);
        self.expect(SyntaxKind::LBrace);

        while self.at(SyntaxKind::CaseKw) || self.at(SyntaxKind::DefaultKw) {
            self.parse_switch_section();
        }

        self.expect(SyntaxKind::RBrace);
        self.builder.finish_node();
    }

    fn parse_switch_section(&mut self) {
        self.builder.start_node(SyntaxKind::SwitchSection.into());

        while self.at(SyntaxKind::CaseKw) || self.at(SyntaxKind::DefaultKw) {
            self.parse_switch_label();
        }

        while !self.at_end()
            && !self.at(SyntaxKind::RBrace)
            && !self.at(SyntaxKind::CaseKw)
            && !self.at(SyntaxKind::DefaultKw)
        {
            let before = self.sig;
            self.parse_stmt();
            if self.sig == before {
                self.error_and_recover("Expected statement");
            }
        }

        self.builder.finish_node();
    }

    /// Grammar:
    /// - 'default' ':'
    /// - 'case' type Ident ':'
    /// - 'case' expr 'when' expr ':'
    /// - 'case' expr '..' expr ':'
    /// - 'case' expr ':'
    fn parse_switch_label(&mut self) {
        if self.at(SyntaxKind::DefaultKw) {
            self.builder.start_node(SyntaxKind::DefaultLabel.into());
            self.bump();
            self.expect(SyntaxKind::Colon);
            self.builder.finish_node();
            return;
        }

        // `case int n:` declares a pattern variable
        if let Some(len) = self.scan_type(1)
            && self.nth(1 + len) == Some(SyntaxKind::Ident)
            && self.nth(2 + len) == Some(SyntaxKind::Colon)
        {
            self.builder.start_node(SyntaxKind::PatternLabel.into());
            self.bump();
            self.parse_type();
            self.bump();
            self.bump();
            self.builder.finish_node();
            return;
        }

        let checkpoint = self.builder.checkpoint();
        self.bump();
        self.parse_expr();

        let kind = if self.eat(SyntaxKind::DotDot) {
            self.parse_expr();
            SyntaxKind::RangeLabel
        } else if self.eat(SyntaxKind::WhenKw) {
            self.parse_expr();
            SyntaxKind::PatternLabel
        } else {
            SyntaxKind::CaseLabel
        };

        self.builder.start_node_at(checkpoint, kind.into());
        self.expect(SyntaxKind::Colon);
        self.builder.finish_node();
    }

    /// Grammar: ('var' | type) Ident ('=' expr)? ';'
    fn parse_local_decl(&mut self) {
        self.builder.start_node(SyntaxKind::LocalDecl.into());
        if !self.eat(SyntaxKind::VarKw) {
            self.parse_type();
        }
        self.expect(SyntaxKind::Ident);
        if self.eat(SyntaxKind::Eq) {
            self.parse_expr();
        }
        self.expect(SyntaxKind::Semicolon);
        self.builder.finish_node();
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn parse_expr(&mut self) {
        let checkpoint = self.builder.checkpoint();
        self.parse_binary(1);

        if self.at(SyntaxKind::Eq) {
            self.builder
                .start_node_at(checkpoint, SyntaxKind::BinaryExpr.into());
            self.bump();
            self.parse_expr();
            self.builder.finish_node();
        }
    }

    fn parse_binary(&mut self, min_prec: u8) {
        let checkpoint = self.builder.checkpoint();
        self.parse_prefix();

        while let Some(prec) = self.current().and_then(SyntaxKind::binary_precedence) {
            if prec < min_prec {
                break;
            }
            self.builder
                .start_node_at(checkpoint, SyntaxKind::BinaryExpr.into());
            self.bump();
            self.parse_binary(prec + 1);
            self.builder.finish_node();
        }
    }

    fn parse_prefix(&mut self) {
        let kind = match self.current() {
            Some(SyntaxKind::Bang | SyntaxKind::Minus) => SyntaxKind::PrefixExpr,
            Some(SyntaxKind::AwaitKw) => SyntaxKind::AwaitExpr,
            _ => return self.parse_postfix(),
        };

        self.builder.start_node(kind.into());
        self.bump();
        self.parse_prefix();
        self.builder.finish_node();
    }

    fn parse_postfix(&mut self) {
        let checkpoint = self.builder.checkpoint();
        self.parse_primary();

        loop {
            match self.current() {
                Some(SyntaxKind::Dot) => {
                    self.builder
                        .start_node_at(checkpoint, SyntaxKind::MemberAccessExpr.into());
                    self.bump();
                    self.expect(SyntaxKind::Ident);
                    self.builder.finish_node();
                }
                Some(SyntaxKind::LParen) => {
                    self.builder
                        .start_node_at(checkpoint, SyntaxKind::InvocationExpr.into());
                    self.parse_arg_list();
                    self.builder.finish_node();
                }
                _ => break,
            }
        }
    }

    fn parse_primary(&mut self) {
        match self.current() {
            Some(SyntaxKind::Ident) => {
                self.builder.start_node(SyntaxKind::NameExpr.into());
                self.bump();
                self.builder.finish_node();
            }
            Some(
                SyntaxKind::IntNumber
                | SyntaxKind::String
                | SyntaxKind::TrueKw
                | SyntaxKind::FalseKw
                | SyntaxKind::NullKw,
            ) => {
                self.builder.start_node(SyntaxKind::Literal.into());
                self.bump();
                self.builder.finish_node();
            }
            Some(SyntaxKind::LParen) => {
                self.builder.start_node(SyntaxKind::ParenExpr.into());
                self.bump();
                self.parse_expr();
                self.expect(SyntaxKind::RParen);
                self.builder.finish_node();
            }
            Some(
                SyntaxKind::RParen
                | SyntaxKind::RBrace
                | SyntaxKind::Semicolon
                | SyntaxKind::Colon
                | SyntaxKind::Comma,
            )
            | None => self.error("Expected expression"),
            Some(_) => self.error_and_recover("Expected expression"),
        }
    }

    fn parse_arg_list(&mut self) {
        self.builder.start_node(SyntaxKind::ArgList.into());
        self.expect(SyntaxKind::LParen);

        while !self.at_end() && !self.at(SyntaxKind::RParen) {
            self.builder.start_node(SyntaxKind::Argument.into());
            self.eat_modifiers();
            self.parse_expr();
            self.builder.finish_node();
            if !self.eat(SyntaxKind::Comma) {
                break;
            }
        }

        self.expect(SyntaxKind::RParen);
        self.builder.finish_node();
    }

    // ========================================================================
    // Lookahead
    // ========================================================================

    fn at_class(&self) -> bool {
        let mut n = 0;
        while self.nth(n) == Some(SyntaxKind::ModifierKw) {
            n += 1;
        }
        self.nth(n) == Some(SyntaxKind::ClassKw)
    }

    fn at_method(&self) -> bool {
        let mut n = 0;
        while self.nth(n) == Some(SyntaxKind::ModifierKw) {
            n += 1;
        }
        match self.scan_type(n) {
            Some(len) => {
                self.nth(n + len) == Some(SyntaxKind::Ident)
                    && self.nth(n + len + 1) == Some(SyntaxKind::LParen)
            }
            None => false,
        }
    }

    fn at_typed_local(&self) -> bool {
        match self.scan_type(0) {
            Some(len) => {
                self.nth(len) == Some(SyntaxKind::Ident)
                    && matches!(
                        self.nth(len + 1),
                        Some(SyntaxKind::Eq | SyntaxKind::Semicolon)
                    )
            }
            None => false,
        }
    }

    /// Number of significant tokens a type starting at lookahead `n` spans
    fn scan_type(&self, n: usize) -> Option<usize> {
        if self.nth(n) != Some(SyntaxKind::Ident) {
            return None;
        }
        if self.nth(n + 1) != Some(SyntaxKind::Lt) {
            return Some(1);
        }

        let mut len = 2;
        loop {
            len += self.scan_type(n + len)?;
            match self.nth(n + len) {
                Some(SyntaxKind::Comma) => len += 1,
                Some(SyntaxKind::Gt) => return Some(len + 1),
                _ => return None,
            }
        }
    }

    // ========================================================================
    // Token helpers
    // ========================================================================

    fn at_end(&self) -> bool {
        self.sig >= self.significant.len()
    }

    fn nth(&self, n: usize) -> Option<SyntaxKind> {
        self.significant
            .get(self.sig + n)
            .map(|&idx| self.tokens[idx].kind)
    }

    fn current(&self) -> Option<SyntaxKind> {
        self.nth(0)
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == Some(kind)
    }

    fn current_span(&self) -> CstSpan {
        match self.significant.get(self.sig) {
            Some(&idx) => self.tokens[idx].span.clone(),
            None => {
                let end = self.tokens.last().map_or(0, |t| t.span.end);
                end..end
            }
        }
    }

    fn push_raw(&mut self, idx: usize) {
        let token = &self.tokens[idx];
        self.builder.token(token.kind.into(), &token.text);
    }

    /// Emit the current token with its leading and trailing trivia
    fn bump(&mut self) {
        let Some(&idx) = self.significant.get(self.sig) else {
            return;
        };

        while self.pos < idx {
            self.push_raw(self.pos);
            self.pos += 1;
        }
        self.push_raw(idx);
        self.pos = idx + 1;
        self.sig += 1;

        while let Some(kind) = self.tokens.get(self.pos).map(|t| t.kind) {
            if !kind.is_trivia() {
                break;
            }
            self.push_raw(self.pos);
            self.pos += 1;
            if kind == SyntaxKind::Newline {
                break;
            }
        }
    }

    fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn eat_modifiers(&mut self) {
        while self.eat(SyntaxKind::ModifierKw) {}
    }

    fn expect(&mut self, kind: SyntaxKind) {
        if !self.eat(kind) {
            self.error(format!("Expected {kind}"));
        }
    }

    fn error(&mut self, message: impl Into<String>) {
        let span = self.current_span();
        self.errors.push(ParseError {
            message: message.into(),
            span: span.start..span.start,
        });
    }

    /// Wrap the current token in an `Error` node
    fn error_and_recover(&mut self, message: &str) {
        self.errors.push(ParseError {
            message: message.to_string(),
            span: self.current_span(),
        });
        self.builder.start_node(SyntaxKind::Error.into());
        self.bump();
        self.builder.finish_node();
    }
}
