//! Statement parsing.
//!
//! `parse_statement` dispatches on the current token. The `context`
//! argument says whether the statement is the body of an `if`, a label or
//! a loop, which restricts the declarations allowed there.

use super::classes::ClassKind;
use super::functions::FunctionKind;
use super::parser::{ForHead, Label, LabelKind, Marker, Parser, StatementContext};
use super::patterns::CoverErrors;
use super::scope::{BindingKind, ScopeFlags};
use crate::ast::*;
use crate::error::Result;
use crate::features::Features;
use crate::lexer::TokenKind;

/// A switch case whose span is closed once the next case begins.
struct OpenCase {
    start: Marker,
    test: Option<Expression>,
    consequent: Vec<Statement>,
}

impl Parser<'_> {
    /// Parses one statement or declaration.
    pub(super) fn parse_statement(&mut self, context: Option<StatementContext>, top_level: bool) -> Result<Statement> {
        self.guarded(|p| p.parse_statement_inner(context, top_level))
    }

    fn parse_statement_inner(&mut self, context: Option<StatementContext>, top_level: bool) -> Result<Statement> {
        let start = self.start_node();
        self.reject_escaped_declaration()?;
        if self.is_let(context) {
            if context.is_some() {
                return Err(self.unexpected());
            }
            return self.parse_var_statement(start, VariableKind::Let);
        }

        match self.cur.kind {
            TokenKind::Break => self.parse_break_continue(start, true),
            TokenKind::Continue => self.parse_break_continue(start, false),
            TokenKind::Debugger => {
                self.next()?;
                self.semicolon()?;
                Ok(Statement::Debugger(self.finish(start)))
            }
            TokenKind::Do => self.parse_do_statement(start),
            TokenKind::For => self.parse_for_statement(start),
            TokenKind::Function => {
                if context.is_some_and(|c| self.strict || c == StatementContext::Body) {
                    return Err(self.unexpected());
                }
                self.next()?;
                let kind = if context.is_some() {
                    FunctionKind::HangingDeclaration
                } else {
                    FunctionKind::Declaration
                };
                let function = self.parse_function(start, kind, false)?;
                Ok(Statement::FunctionDeclaration(Box::new(function)))
            }
            TokenKind::Class => {
                if context.is_some() {
                    return Err(self.unexpected());
                }
                Ok(Statement::ClassDeclaration(Box::new(self.parse_class(ClassKind::Declaration)?)))
            }
            TokenKind::If => self.parse_if_statement(start),
            TokenKind::Return => self.parse_return_statement(start),
            TokenKind::Switch => self.parse_switch_statement(start),
            TokenKind::Throw => self.parse_throw_statement(start),
            TokenKind::Try => self.parse_try_statement(start),
            TokenKind::Const | TokenKind::Var => {
                let kind = if self.is(&TokenKind::Var) {
                    VariableKind::Var
                } else {
                    if !self.has(Features::LET_CONST) {
                        return Err(self.unexpected());
                    }
                    VariableKind::Const
                };
                if context.is_some() && kind != VariableKind::Var {
                    return Err(self.unexpected());
                }
                self.parse_var_statement(start, kind)
            }
            TokenKind::While => self.parse_while_statement(start),
            TokenKind::With => self.parse_with_statement(start),
            TokenKind::LeftBrace => Ok(Statement::Block(self.parse_block(true)?)),
            TokenKind::Semicolon => {
                self.next()?;
                Ok(Statement::Empty(self.finish(start)))
            }
            TokenKind::Import | TokenKind::Export => {
                if self.is(&TokenKind::Import)
                    && matches!(
                        self.peek().map(|token| token.kind),
                        Some(TokenKind::LeftParen | TokenKind::Dot)
                    )
                {
                    let expression = self.parse_expression()?;
                    return self.parse_expression_statement(start, expression);
                }
                if !top_level {
                    return Err(self.raise(
                        self.cur.span.start,
                        "'import' and 'export' may only appear at the top level",
                    ));
                }
                if !self.in_module {
                    return Err(self.raise(
                        self.cur.span.start,
                        "'import' and 'export' may appear only with 'sourceType: module'",
                    ));
                }
                if self.is(&TokenKind::Import) {
                    self.parse_import(start)
                } else {
                    self.parse_export(start)
                }
            }
            _ => {
                if self.is_async_function() {
                    if context.is_some() {
                        return Err(self.raise(
                            self.cur.span.start,
                            "Async functions can only be declared at the top level or inside a block.",
                        ));
                    }
                    self.next()?;
                    self.next()?;
                    let function = self.parse_function(start, FunctionKind::Declaration, true)?;
                    return Ok(Statement::FunctionDeclaration(Box::new(function)));
                }
                let starts_with_name = matches!(self.cur.kind, TokenKind::Identifier(_));
                let expression = self.parse_expression()?;
                match expression {
                    Expression::Identifier(label) if starts_with_name && self.is(&TokenKind::Colon) => {
                        self.next()?;
                        self.parse_labeled_statement(start, label, context)
                    }
                    expression => self.parse_expression_statement(start, expression),
                }
            }
        }
    }

    /// `let` or `async` written with escapes and followed by what only a
    /// declaration could continue with.
    fn reject_escaped_declaration(&mut self) -> Result<()> {
        let keyword = if self.has(Features::LET_CONST) && self.is_escaped_contextual("let") {
            self.peek().is_some_and(|next| {
                !next.newline_before && matches!(next.kind, TokenKind::Identifier(_) | TokenKind::LeftBrace)
            })
        } else if self.has(Features::ASYNC_AWAIT) && self.is_escaped_contextual("async") {
            self.peek()
                .is_some_and(|next| next.kind == TokenKind::Function && !next.newline_before)
        } else {
            false
        };
        if keyword { Err(self.escaped_keyword()) } else { Ok(()) }
    }

    /// `let` starts a declaration here rather than naming a variable.
    pub(super) fn is_let(&mut self, context: Option<StatementContext>) -> bool {
        if !self.has(Features::LET_CONST) || !self.is_contextual("let") {
            return false;
        }
        let Some(next) = self.peek() else {
            return false;
        };
        if next.kind == TokenKind::LeftBracket {
            return true;
        }
        if context.is_some() {
            return false;
        }
        match next.kind {
            TokenKind::LeftBrace | TokenKind::Identifier(_) => true,
            TokenKind::In | TokenKind::Instanceof => false,
            ref kind => kind.is_keyword(),
        }
    }

    /// `async function` on one line.
    pub(super) fn is_async_function(&mut self) -> bool {
        if !self.has(Features::ASYNC_AWAIT) || !self.is_contextual("async") {
            return false;
        }
        self.peek()
            .is_some_and(|next| next.kind == TokenKind::Function && !next.newline_before && !next.escaped)
    }

    fn parse_expression_statement(&mut self, start: Marker, expression: Expression) -> Result<Statement> {
        self.semicolon()?;
        Ok(Statement::Expression(ExpressionStatement {
            span: self.finish(start),
            expression,
            directive: None,
        }))
    }

    fn parse_paren_expression(&mut self) -> Result<Expression> {
        self.expect(&TokenKind::LeftParen)?;
        let expression = self.parse_expression()?;
        self.expect(&TokenKind::RightParen)?;
        Ok(expression)
    }

    /// Parses `{ ... }`, optionally in a new lexical scope.
    pub(super) fn parse_block(&mut self, new_scope: bool) -> Result<BlockStatement> {
        let start = self.start_node();
        self.expect(&TokenKind::LeftBrace)?;
        let parse_body = |p: &mut Self| {
            let mut body = Vec::new();
            while !p.is(&TokenKind::RightBrace) {
                body.push(p.parse_statement(None, false)?);
            }
            Ok(body)
        };
        let body = if new_scope {
            self.with_scope(ScopeFlags::empty(), parse_body)?
        } else {
            parse_body(self)?
        };
        self.next()?;
        Ok(BlockStatement {
            span: self.finish(start),
            body,
        })
    }

    // ------------------------------------------------------------------
    // Labels and jumps
    // ------------------------------------------------------------------

    fn parse_labeled_statement(
        &mut self,
        start: Marker,
        label: Identifier,
        context: Option<StatementContext>,
    ) -> Result<Statement> {
        if self.labels.iter().any(|l| l.name.as_deref() == Some(label.name.as_str())) {
            return Err(self.raise(
                label.span.start,
                format!("Label '{}' is already declared", label.name),
            ));
        }
        let kind = if self.cur.kind.is_loop() {
            Some(LabelKind::Loop)
        } else if self.is(&TokenKind::Switch) {
            Some(LabelKind::Switch)
        } else {
            None
        };
        let body_start = self.cur.span.start;
        // Labels directly wrapping this one now label the same statement.
        for outer in self.labels.iter_mut().rev() {
            if outer.statement_start != Some(start.offset) {
                break;
            }
            outer.statement_start = Some(body_start);
            outer.kind = kind;
        }
        self.labels.push(Label {
            name: Some(label.name.clone()),
            kind,
            statement_start: Some(body_start),
        });
        let body_context = match context {
            None | Some(StatementContext::Label) => StatementContext::Label,
            Some(_) => StatementContext::Body,
        };
        let body = self.parse_statement(Some(body_context), false);
        self.labels.pop();
        Ok(Statement::Labeled(LabeledStatement {
            span: self.finish(start),
            label,
            body: Box::new(body?),
        }))
    }

    fn parse_break_continue(&mut self, start: Marker, is_break: bool) -> Result<Statement> {
        self.next()?;
        let label = if self.eat(&TokenKind::Semicolon)? || self.can_insert_semicolon() {
            None
        } else if matches!(self.cur.kind, TokenKind::Identifier(_)) {
            let label = self.parse_ident(false)?;
            self.semicolon()?;
            Some(label)
        } else {
            return Err(self.unexpected());
        };

        let name = label.as_ref().map(|l| l.name.as_str());
        let target_found = self.labels.iter().any(|l| {
            if name.is_some() && l.name.as_deref() != name {
                return false;
            }
            match l.kind {
                Some(kind) if is_break || kind == LabelKind::Loop => true,
                _ => name.is_some() && is_break,
            }
        });
        if !target_found {
            let keyword = if is_break { "break" } else { "continue" };
            return Err(self.raise(start.offset, format!("Unsyntactic {keyword}")));
        }

        let span = self.finish(start);
        Ok(if is_break {
            Statement::Break(BreakStatement { span, label })
        } else {
            Statement::Continue(ContinueStatement { span, label })
        })
    }

    // ------------------------------------------------------------------
    // Control flow
    // ------------------------------------------------------------------

    fn parse_if_statement(&mut self, start: Marker) -> Result<Statement> {
        self.next()?;
        let test = self.parse_paren_expression()?;
        let consequent = self.parse_statement(Some(StatementContext::If), false)?;
        let alternate = if self.eat(&TokenKind::Else)? {
            Some(Box::new(self.parse_statement(Some(StatementContext::If), false)?))
        } else {
            None
        };
        Ok(Statement::If(IfStatement {
            span: self.finish(start),
            test,
            consequent: Box::new(consequent),
            alternate,
        }))
    }

    fn parse_return_statement(&mut self, start: Marker) -> Result<Statement> {
        if !self.scopes.in_function() {
            return Err(self.raise(self.cur.span.start, "'return' outside of function"));
        }
        self.next()?;
        let argument = if self.eat(&TokenKind::Semicolon)? || self.can_insert_semicolon() {
            None
        } else {
            let argument = self.parse_expression()?;
            self.semicolon()?;
            Some(argument)
        };
        Ok(Statement::Return(ReturnStatement {
            span: self.finish(start),
            argument,
        }))
    }

    fn parse_switch_statement(&mut self, start: Marker) -> Result<Statement> {
        self.next()?;
        let discriminant = self.parse_paren_expression()?;
        self.expect(&TokenKind::LeftBrace)?;
        self.labels.push(Label::anonymous(LabelKind::Switch));
        let cases = self.with_scope(ScopeFlags::empty(), |p| p.parse_switch_cases());
        self.labels.pop();
        let cases = cases?;
        self.next()?;
        Ok(Statement::Switch(SwitchStatement {
            span: self.finish(start),
            discriminant,
            cases,
        }))
    }

    /// Parses cases up to, but not including, the closing brace.
    fn parse_switch_cases(&mut self) -> Result<Vec<SwitchCase>> {
        let mut cases = Vec::new();
        let mut open: Option<OpenCase> = None;
        let mut saw_default = false;
        while !self.is(&TokenKind::RightBrace) {
            if matches!(self.cur.kind, TokenKind::Case | TokenKind::Default) {
                let is_case = self.is(&TokenKind::Case);
                if let Some(case) = open.take() {
                    cases.push(self.close_case(case));
                }
                let case_start = self.start_node();
                self.next()?;
                let test = if is_case {
                    Some(self.parse_expression()?)
                } else {
                    if saw_default {
                        return Err(self.raise(self.prev_start, "Multiple default clauses"));
                    }
                    saw_default = true;
                    None
                };
                self.expect(&TokenKind::Colon)?;
                open = Some(OpenCase {
                    start: case_start,
                    test,
                    consequent: Vec::new(),
                });
            } else {
                let Some(case) = open.as_mut() else {
                    return Err(self.unexpected());
                };
                let statement = self.parse_statement(None, false)?;
                case.consequent.push(statement);
            }
        }
        if let Some(case) = open {
            cases.push(self.close_case(case));
        }
        Ok(cases)
    }

    fn close_case(&self, case: OpenCase) -> SwitchCase {
        SwitchCase {
            span: self.finish(case.start),
            test: case.test,
            consequent: case.consequent,
        }
    }

    fn parse_throw_statement(&mut self, start: Marker) -> Result<Statement> {
        self.next()?;
        if self.cur.newline_before {
            return Err(self.raise(self.prev_end, "Illegal newline after throw"));
        }
        let argument = self.parse_expression()?;
        self.semicolon()?;
        Ok(Statement::Throw(ThrowStatement {
            span: self.finish(start),
            argument,
        }))
    }

    fn parse_try_statement(&mut self, start: Marker) -> Result<Statement> {
        self.next()?;
        let block = self.parse_block(true)?;
        let handler = if self.is(&TokenKind::Catch) {
            Some(self.parse_catch_clause()?)
        } else {
            None
        };
        let finalizer = if self.eat(&TokenKind::Finally)? {
            Some(self.parse_block(true)?)
        } else {
            None
        };
        if handler.is_none() && finalizer.is_none() {
            return Err(self.raise(start.offset, "Missing catch or finally clause"));
        }
        Ok(Statement::Try(TryStatement {
            span: self.finish(start),
            block,
            handler,
            finalizer,
        }))
    }

    fn parse_catch_clause(&mut self) -> Result<CatchClause> {
        let start = self.start_node();
        self.next()?;
        let (param, body) = if self.eat(&TokenKind::LeftParen)? {
            let param = self.parse_binding_atom()?;
            let simple = param.is_identifier();
            let flags = if simple { ScopeFlags::SIMPLE_CATCH } else { ScopeFlags::empty() };
            let kind = if simple { BindingKind::SimpleCatch } else { BindingKind::Lexical };
            let body = self.with_scope(flags, |p| {
                p.check_lval_pattern(&param, Some(kind), None)?;
                p.expect(&TokenKind::RightParen)?;
                p.parse_block(false)
            })?;
            (Some(param), body)
        } else {
            if !self.has(Features::OPTIONAL_CATCH_PARAM) {
                return Err(self.unexpected());
            }
            (None, self.with_scope(ScopeFlags::empty(), |p| p.parse_block(false))?)
        };
        Ok(CatchClause {
            span: self.finish(start),
            param,
            body,
        })
    }

    fn parse_with_statement(&mut self, start: Marker) -> Result<Statement> {
        if self.strict {
            return Err(self.raise(self.cur.span.start, "'with' in strict mode"));
        }
        self.next()?;
        let object = self.parse_paren_expression()?;
        let body = self.parse_statement(Some(StatementContext::Body), false)?;
        Ok(Statement::With(WithStatement {
            span: self.finish(start),
            object,
            body: Box::new(body),
        }))
    }

    // ------------------------------------------------------------------
    // Loops
    // ------------------------------------------------------------------

    /// Parses a loop body with an anonymous loop label in place.
    fn parse_loop_body(&mut self) -> Result<Statement> {
        self.labels.push(Label::anonymous(LabelKind::Loop));
        let body = self.parse_statement(Some(StatementContext::Body), false);
        self.labels.pop();
        body
    }

    fn parse_while_statement(&mut self, start: Marker) -> Result<Statement> {
        self.next()?;
        let test = self.parse_paren_expression()?;
        let body = self.parse_loop_body()?;
        Ok(Statement::While(WhileStatement {
            span: self.finish(start),
            test,
            body: Box::new(body),
        }))
    }

    fn parse_do_statement(&mut self, start: Marker) -> Result<Statement> {
        self.next()?;
        let body = self.parse_loop_body()?;
        self.expect(&TokenKind::While)?;
        let test = self.parse_paren_expression()?;
        self.eat(&TokenKind::Semicolon)?;
        Ok(Statement::DoWhile(DoWhileStatement {
            span: self.finish(start),
            body: Box::new(body),
            test,
        }))
    }

    /// `for`, `for-in`, `for-of` and `for await`. The head and body share a
    /// scope for lexical declarations.
    fn parse_for_statement(&mut self, start: Marker) -> Result<Statement> {
        self.next()?;
        let await_at = if self.has(Features::ASYNC_ITERATION) && self.scopes.can_await() && self.eat_contextual("await")? {
            Some(self.prev_start)
        } else {
            None
        };
        self.labels.push(Label::anonymous(LabelKind::Loop));
        let result = self.with_scope(ScopeFlags::empty(), |p| p.parse_for_head(start, await_at));
        self.labels.pop();
        result
    }

    fn parse_for_head(&mut self, start: Marker, await_at: Option<usize>) -> Result<Statement> {
        self.expect(&TokenKind::LeftParen)?;
        if self.is(&TokenKind::Semicolon) {
            if let Some(offset) = await_at {
                return Err(self.unexpected_at(offset));
            }
            return self.parse_for(start, None);
        }

        self.reject_escaped_declaration()?;
        let is_let = self.is_let(None);
        if is_let || matches!(self.cur.kind, TokenKind::Var | TokenKind::Const) {
            let init_start = self.start_node();
            let kind = if is_let {
                VariableKind::Let
            } else if self.is(&TokenKind::Var) {
                VariableKind::Var
            } else {
                VariableKind::Const
            };
            if kind != VariableKind::Var && !self.has(Features::LET_CONST) {
                return Err(self.unexpected());
            }
            self.next()?;
            let declarations = self.parse_var(true, kind)?;
            let init = VariableDeclaration {
                span: self.finish(init_start),
                kind,
                declarations,
            };
            let is_in = self.is(&TokenKind::In);
            if (is_in || self.is_contextual("of")) && init.declarations.len() == 1 {
                if is_in {
                    if let Some(offset) = await_at {
                        return Err(self.unexpected_at(offset));
                    }
                }
                return self.parse_for_in(start, ForInLeft::Declaration(init), await_at.is_some());
            }
            if let Some(offset) = await_at {
                return Err(self.unexpected_at(offset));
            }
            return self.parse_for(start, Some(ForInit::Declaration(init)));
        }

        let starts_with_let = self.is_contextual("let");
        let escaped = self.cur.escaped;
        let init_pos = self.cur.span.start;
        let mut errors = CoverErrors::default();
        let init = if await_at.is_some() {
            self.parse_expr_subscripts(Some(&mut errors), ForHead::AwaitInit)?
        } else {
            self.parse_expression_with(ForHead::Init, Some(&mut errors))?
        };

        if self.is_escaped_contextual("of") {
            return Err(self.escaped_keyword());
        }
        let is_in = self.is(&TokenKind::In);
        let is_of = !is_in && self.is_contextual("of");
        if is_in || is_of {
            if is_in {
                if let Some(offset) = await_at {
                    return Err(self.unexpected_at(offset));
                }
            } else if await_at.is_none()
                && self.has(Features::ASYNC_AWAIT)
                && init.span().start == init_pos
                && !escaped
                && init.as_identifier() == Some("async")
            {
                return Err(self.unexpected());
            }
            if starts_with_let && is_of {
                return Err(self.raise(
                    init.span().start,
                    "The left-hand side of a for-of loop may not start with let.",
                ));
            }
            let target = self.to_assignable(init, false, Some(&errors))?;
            self.check_lval_pattern(&target, None, None)?;
            return self.parse_for_in(start, ForInLeft::Pattern(target), await_at.is_some());
        }
        self.check_expression_errors(Some(&errors), true)?;
        if let Some(offset) = await_at {
            return Err(self.unexpected_at(offset));
        }
        self.parse_for(start, Some(ForInit::Expression(init)))
    }

    fn parse_for(&mut self, start: Marker, init: Option<ForInit>) -> Result<Statement> {
        self.expect(&TokenKind::Semicolon)?;
        let test = if self.is(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(&TokenKind::Semicolon)?;
        let update = if self.is(&TokenKind::RightParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(&TokenKind::RightParen)?;
        let body = self.parse_statement(Some(StatementContext::Body), false)?;
        Ok(Statement::For(ForStatement {
            span: self.finish(start),
            init,
            test,
            update,
            body: Box::new(body),
        }))
    }

    fn parse_for_in(&mut self, start: Marker, left: ForInLeft, is_await: bool) -> Result<Statement> {
        let is_in = self.is(&TokenKind::In);
        self.next()?;
        if let ForInLeft::Declaration(decl) = &left {
            let first = &decl.declarations[0];
            // Annex B keeps `for (var x = 1 in y)` in sloppy code.
            let legacy_initializer =
                is_in && !self.strict && decl.kind == VariableKind::Var && first.id.is_identifier();
            if first.init.is_some() && !legacy_initializer {
                let head = if is_in { "for-in" } else { "for-of" };
                return Err(self.raise(
                    decl.span.start,
                    format!("{head} loop variable declaration may not have an initializer"),
                ));
            }
        }
        let right = if is_in {
            self.parse_expression()?
        } else {
            self.parse_maybe_assign(ForHead::No, None)?
        };
        self.expect(&TokenKind::RightParen)?;
        let body = Box::new(self.parse_statement(Some(StatementContext::Body), false)?);
        let span = self.finish(start);
        Ok(if is_in {
            Statement::ForIn(ForInStatement { span, left, right, body })
        } else {
            Statement::ForOf(ForOfStatement {
                span,
                left,
                right,
                body,
                is_await,
            })
        })
    }

    // ------------------------------------------------------------------
    // Variables
    // ------------------------------------------------------------------

    fn parse_var_statement(&mut self, start: Marker, kind: VariableKind) -> Result<Statement> {
        self.next()?;
        let declarations = self.parse_var(false, kind)?;
        self.semicolon()?;
        Ok(Statement::VariableDeclaration(VariableDeclaration {
            span: self.finish(start),
            kind,
            declarations,
        }))
    }

    /// Parses the declarator list after `var`, `let` or `const`.
    pub(super) fn parse_var(&mut self, is_for: bool, kind: VariableKind) -> Result<Vec<VariableDeclarator>> {
        let binding = if kind == VariableKind::Var {
            BindingKind::Var
        } else {
            BindingKind::Lexical
        };
        let for_head = if is_for { ForHead::Init } else { ForHead::No };
        let mut declarations = Vec::new();
        loop {
            let start = self.start_node();
            let id = self.parse_binding_atom()?;
            self.check_lval_pattern(&id, Some(binding), None)?;
            if is_for && self.is_escaped_contextual("of") {
                return Err(self.escaped_keyword());
            }
            let in_or_of = self.is(&TokenKind::In) || self.is_contextual("of");
            let init = if self.eat(&TokenKind::Equal)? {
                Some(self.parse_maybe_assign(for_head, None)?)
            } else if kind == VariableKind::Const && !in_or_of {
                return Err(self.raise(self.cur.span.start, "Missing initializer in const declaration"));
            } else if !id.is_identifier() && !(is_for && in_or_of) {
                return Err(self.raise(self.prev_end, "Complex binding patterns require an initialization value"));
            } else {
                None
            };
            declarations.push(VariableDeclarator {
                span: self.finish(start),
                id,
                init,
            });
            if !self.eat(&TokenKind::Comma)? {
                return Ok(declarations);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ParserOptions;
    use crate::ast::*;
    use crate::error::ParseError;
    use crate::parser::Parser;

    fn parse_ok(src: &str) -> Program {
        Parser::new(src).parse_program().unwrap()
    }

    fn parse_err(src: &str) -> ParseError {
        Parser::new(src).parse_program().unwrap_err()
    }

    fn script(src: &str) -> crate::error::Result<Program> {
        Parser::with_options(src, ParserOptions::script()).parse_program()
    }

    #[test]
    fn test_variable_declarations() {
        let program = parse_ok("var a = 1, b; let [c] = d; const { e } = f;");
        let kinds: Vec<_> = program
            .body
            .iter()
            .map(|s| match s {
                Statement::VariableDeclaration(decl) => decl.kind,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(kinds, [VariableKind::Var, VariableKind::Let, VariableKind::Const]);
        assert_eq!(parse_err("const a;").message, "Missing initializer in const declaration");
        let err = parse_err("let [a];");
        assert_eq!(err.message, "Complex binding patterns require an initialization value");
        assert_eq!(err.column, 7);
    }

    #[test]
    fn test_let_as_identifier() {
        script("let = 1; let\nin_x;").unwrap();
        assert_eq!(script("if (a) let\n[b] = c;").unwrap_err().message, "Unexpected token");
        script("var let = 1; let;").unwrap();
        let program = script("let\nx = 1").unwrap();
        assert!(matches!(program.body[0], Statement::VariableDeclaration(_)));
    }

    #[test]
    fn test_escaped_contextual_keywords() {
        let message = "Keyword must not contain escaped characters";
        let err = script("l\\u0065t x = 1").unwrap_err();
        assert_eq!((err.message.as_str(), err.column), (message, 0));
        assert_eq!(script("\\u0061sync function f() {}").unwrap_err().message, message);
        assert_eq!(script("for (x \\u006ff y);").unwrap_err().message, message);
        assert_eq!(parse_err("for (const x \\u006ff y);").message, message);
        assert_eq!(parse_err("for (l\\u0065t x of y);").message, message);
        script("var l\\u0065t = 1; l\\u0065t\nx = 2;").unwrap();
        script("var \\u0061sync; \\u0061sync\nfunction f() {}").unwrap();
    }

    #[test]
    fn test_if_else() {
        let program = parse_ok("if (a) b; else if (c) d; else { e }");
        let Statement::If(stmt) = &program.body[0] else {
            panic!("expected if");
        };
        assert!(matches!(stmt.alternate.as_deref(), Some(Statement::If(_))));
    }

    #[test]
    fn test_declarations_in_statement_position() {
        script("if (a) function f() {}").unwrap();
        script("l: function f() {}").unwrap();
        assert_eq!(script("while (a) function f() {}").unwrap_err().message, "Unexpected token");
        assert_eq!(parse_err("if (a) function f() {}").message, "Unexpected token");
        assert_eq!(parse_err("if (a) const b = 1;").message, "Unexpected token");
        assert_eq!(parse_err("if (a) class B {}").message, "Unexpected token");
        assert_eq!(
            parse_err("if (a) async function f() {}").message,
            "Async functions can only be declared at the top level or inside a block."
        );
    }

    #[test]
    fn test_labels() {
        parse_ok("a: b: while (1) { continue a; }");
        parse_ok("a: { break a; }");
        assert_eq!(parse_err("a: a: ;").message, "Label 'a' is already declared");
        assert_eq!(parse_err("a: { continue a; }").message, "Unsyntactic continue");
        assert_eq!(parse_err("break;").message, "Unsyntactic break");
        let err = parse_err("while (1) { continue b; }");
        assert_eq!((err.message.as_str(), err.column), ("Unsyntactic continue", 12));
        parse_ok("switch (a) { case 1: break; }");
        assert_eq!(parse_err("switch (a) { case 1: continue; }").message, "Unsyntactic continue");
    }

    #[test]
    fn test_for_variants() {
        let program = parse_ok("for (let i = 0; i < n; i++) {} for (const k in o) {} for (x of y) {} for (;;) break;");
        assert!(matches!(program.body[0], Statement::For(_)));
        assert!(matches!(program.body[1], Statement::ForIn(_)));
        assert!(matches!(program.body[2], Statement::ForOf(_)));
        let program = parse_ok("async function f() { for await (const x of y) {} }");
        let Statement::FunctionDeclaration(f) = &program.body[0] else {
            panic!("expected function");
        };
        assert!(matches!(&f.body.body[0], Statement::ForOf(ForOfStatement { is_await: true, .. })));
    }

    #[test]
    fn test_for_in_with_in_operator_in_init() {
        let program = parse_ok("for (var i = (a in b); i;) {}");
        assert!(matches!(program.body[0], Statement::For(_)));
        let program = parse_ok("for ([a, b] of c) {}");
        let Statement::ForOf(stmt) = &program.body[0] else {
            panic!("expected for-of");
        };
        assert!(matches!(stmt.left, ForInLeft::Pattern(Pattern::Array(_))));
    }

    #[test]
    fn test_for_head_errors() {
        assert_eq!(
            parse_err("for (let a = 1 of b) {}").message,
            "for-of loop variable declaration may not have an initializer"
        );
        script("for (var a = 1 in b) {}").unwrap();
        assert_eq!(
            parse_err("for (var a = 1 in b) {}").message,
            "for-in loop variable declaration may not have an initializer"
        );
        assert_eq!(
            script("for (let.x of y) {}").unwrap_err().message,
            "The left-hand side of a for-of loop may not start with let."
        );
        assert_eq!(script("for (async of x) {}").unwrap_err().message, "Unexpected token");
        script("for (async.x of y) {}").unwrap();
        assert_eq!(parse_err("for await (x in y) {}").message, "Unexpected token");
    }

    #[test]
    fn test_switch_cases() {
        let program = parse_ok("switch (x) { case 1: a; b; case 2: default: c }");
        let Statement::Switch(stmt) = &program.body[0] else {
            panic!("expected switch");
        };
        assert_eq!(stmt.cases.len(), 3);
        assert_eq!(stmt.cases[0].consequent.len(), 2);
        assert_eq!((stmt.cases[0].span.start, stmt.cases[0].span.end), (13, 26));
        assert!(stmt.cases[2].test.is_none());
        assert_eq!(
            parse_err("switch (x) { default: default: }").message,
            "Multiple default clauses"
        );
        assert_eq!(
            parse_err("switch (x) { case 1: let a; case 2: let a; }").message,
            "Identifier 'a' has already been declared"
        );
    }

    #[test]
    fn test_throw_and_try() {
        let err = parse_err("throw\nx;");
        assert_eq!(err.message, "Illegal newline after throw");
        assert_eq!((err.line, err.column), (1, 5));
        parse_ok("try { a } catch { b } finally { c }");
        parse_ok("try { a } catch ({ message }) { b }");
        assert_eq!(parse_err("try { a }").message, "Missing catch or finally clause");
        assert_eq!(
            parse_err("try {} catch (e) { let e; }").message,
            "Identifier 'e' has already been declared"
        );
        script("try {} catch (e) { var e; }").unwrap();
    }

    #[test]
    fn test_return_and_with() {
        assert_eq!(parse_err("return 1;").message, "'return' outside of function");
        assert_eq!(parse_err("with (a) {}").message, "'with' in strict mode");
        script("with (a) b;").unwrap();
    }

    #[test]
    fn test_import_export_placement() {
        assert_eq!(
            parse_err("{ import a from 'a'; }").message,
            "'import' and 'export' may only appear at the top level"
        );
        assert_eq!(
            script("export const a = 1;").unwrap_err().message,
            "'import' and 'export' may appear only with 'sourceType: module'"
        );
        script("import('a'); function f() { import('b'); }").unwrap();
    }

    #[test]
    fn test_block_scoping() {
        parse_ok("let a; { let a; }");
        assert_eq!(parse_err("let a; var a;").message, "Identifier 'a' has already been declared");
        assert_eq!(parse_err("{ var a; } let a;").message, "Identifier 'a' has already been declared");
        script("var a; var a; function a() {}").unwrap();
    }

    #[test]
    fn test_asi() {
        let program = parse_ok("a\nb\n++c");
        assert_eq!(program.body.len(), 3);
        assert_eq!(parse_err("a b").message, "Unexpected token");
        let program = parse_ok("x\n(1)");
        assert!(matches!(&program.body[0], Statement::Expression(s) if matches!(s.expression, Expression::Call(_))));
    }
}
