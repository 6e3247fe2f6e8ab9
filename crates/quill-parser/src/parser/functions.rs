//! Functions, arrow functions and methods.

use rustc_hash::FxHashSet;

use super::parser::{ForHead, Marker, Parser};
use super::patterns::ArrowParam;
use super::scope::{BindingKind, ScopeFlags};
use crate::ast::*;
use crate::error::Result;
use crate::features::Features;
use crate::lexer::TokenKind;

/// Where a `function` keyword was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum FunctionKind {
    Expression,
    Declaration,
    /// The body of `if` or a label in sloppy code; the name is not bound.
    HangingDeclaration,
    /// `export default function`, where the name is optional.
    DefaultExport,
}

impl FunctionKind {
    fn is_statement(self) -> bool {
        self != FunctionKind::Expression
    }
}

/// Saved cover grammar positions, restored when a function ends.
struct SavedPositions {
    yield_pos: Option<usize>,
    await_pos: Option<usize>,
    await_ident_pos: Option<usize>,
}

fn is_simple_param_list(params: &[Pattern]) -> bool {
    params.iter().all(Pattern::is_identifier)
}

impl Parser<'_> {
    fn take_positions(&mut self) -> SavedPositions {
        SavedPositions {
            yield_pos: self.yield_pos.take(),
            await_pos: self.await_pos.take(),
            await_ident_pos: self.await_ident_pos.take(),
        }
    }

    fn restore_positions(&mut self, saved: SavedPositions) {
        self.yield_pos = saved.yield_pos;
        self.await_pos = saved.await_pos;
        self.await_ident_pos = saved.await_ident_pos;
    }

    /// Parses a function after its `function` keyword. `start` is the
    /// start of the node, which includes a leading `async`.
    pub(super) fn parse_function(
        &mut self,
        start: Marker,
        kind: FunctionKind,
        is_async: bool,
    ) -> Result<Function> {
        if self.is(&TokenKind::Star) && kind == FunctionKind::HangingDeclaration {
            return Err(self.unexpected());
        }
        let is_generator = if is_async && !self.has(Features::ASYNC_GENERATOR) {
            false
        } else {
            self.eat(&TokenKind::Star)?
        };

        let mut id = None;
        if kind.is_statement() {
            let nullable = kind == FunctionKind::DefaultExport;
            if !(nullable && !matches!(self.cur.kind, TokenKind::Identifier(_))) {
                let name = self.parse_ident(false)?;
                if kind != FunctionKind::HangingDeclaration {
                    let binding = if self.strict || is_generator || is_async {
                        if self.scopes.treat_functions_as_var() {
                            BindingKind::Var
                        } else {
                            BindingKind::Lexical
                        }
                    } else {
                        BindingKind::Function
                    };
                    self.check_identifier_lval(&name, Some(binding), None)?;
                }
                id = Some(name);
            }
        }

        let saved = self.take_positions();
        let result = self.with_scope(ScopeFlags::function(is_async, is_generator), |p| {
            if !kind.is_statement() && matches!(p.cur.kind, TokenKind::Identifier(_)) {
                id = Some(p.parse_ident(false)?);
            }
            let params = p.parse_function_params()?;
            let body = p.parse_function_body(start.offset, &params, id.as_ref(), false, false)?;
            Ok((params, body))
        });
        self.restore_positions(saved);
        let (params, body) = result?;

        Ok(Function {
            span: self.finish(start),
            id,
            params,
            body,
            is_async,
            is_generator,
        })
    }

    fn parse_function_params(&mut self) -> Result<Vec<Pattern>> {
        self.expect(&TokenKind::LeftParen)?;
        let params = self
            .parse_binding_list(&TokenKind::RightParen, false, true)?
            .into_iter()
            .flatten()
            .collect();
        self.check_yield_await_in_default_params()?;
        Ok(params)
    }

    /// Parses a braced function body and validates the parameters against
    /// it. Must run inside the function's scope.
    pub(super) fn parse_function_body(
        &mut self,
        fn_start: usize,
        params: &[Pattern],
        id: Option<&Identifier>,
        is_arrow: bool,
        is_method: bool,
    ) -> Result<FunctionBody> {
        let old_strict = self.strict;
        let simple = is_simple_param_list(params);
        let mut use_strict = false;
        if !self.is(&TokenKind::LeftBrace) {
            return Err(self.unexpected());
        }
        if !old_strict || !simple {
            use_strict = self.strict_directive();
            if use_strict && !simple {
                return Err(self.raise_early(
                    fn_start,
                    "Illegal 'use strict' directive in function with non-simple parameter list",
                ));
            }
        }

        let old_labels = std::mem::take(&mut self.labels);
        if use_strict {
            self.strict = true;
        }
        let result = self.parse_function_body_inner(params, id, old_strict, use_strict, is_arrow, is_method);
        self.labels = old_labels;
        self.strict = old_strict;
        result
    }

    fn parse_function_body_inner(
        &mut self,
        params: &[Pattern],
        id: Option<&Identifier>,
        old_strict: bool,
        use_strict: bool,
        is_arrow: bool,
        is_method: bool,
    ) -> Result<FunctionBody> {
        let allow_duplicates = !old_strict && !use_strict && !is_arrow && !is_method && is_simple_param_list(params);
        self.check_params(params, allow_duplicates)?;
        if self.strict {
            if let Some(id) = id {
                self.check_identifier_lval(id, Some(BindingKind::Outside), None)?;
            }
        }

        let start = self.start_node();
        self.expect(&TokenKind::LeftBrace)?;
        let mut body = Vec::new();
        while !self.is(&TokenKind::RightBrace) {
            if self.is(&TokenKind::Eof) {
                return Err(self.unexpected());
            }
            body.push(self.parse_statement(None, false)?);
        }
        if use_strict && !old_strict {
            self.strict = false;
        }
        self.next()?;
        self.adapt_directive_prologue(&mut body);
        Ok(FunctionBody {
            span: self.finish(start),
            body,
        })
    }

    /// Declares parameters in the function scope, rejecting duplicates
    /// unless `allow_duplicates` is set.
    fn check_params(&mut self, params: &[Pattern], allow_duplicates: bool) -> Result<()> {
        let mut names = FxHashSet::default();
        for param in params {
            let clashes = if allow_duplicates { None } else { Some(&mut names) };
            self.check_lval_inner(param, Some(BindingKind::Var), clashes)?;
        }
        Ok(())
    }

    /// Parses the body of an arrow function whose parameters have already
    /// been read as expressions.
    pub(super) fn parse_arrow_expression(
        &mut self,
        start: Marker,
        items: Vec<ArrowParam>,
        is_async: bool,
        for_head: ForHead,
    ) -> Result<Expression> {
        let saved = self.take_positions();
        let result = self.with_scope(ScopeFlags::function(is_async, false) | ScopeFlags::ARROW, |p| {
            let params = p.arrow_params(items)?;
            let body = if p.is(&TokenKind::LeftBrace) {
                ArrowBody::Block(p.parse_function_body(start.offset, &params, None, true, false)?)
            } else {
                let old_labels = std::mem::take(&mut p.labels);
                let body = p.parse_maybe_assign(for_head, None);
                p.labels = old_labels;
                let body = body?;
                p.check_params(&params, false)?;
                ArrowBody::Expression(Box::new(body))
            };
            Ok((params, body))
        });
        self.restore_positions(saved);
        let (params, body) = result?;
        Ok(Expression::Arrow(Box::new(ArrowFunctionExpression {
            span: self.finish(start),
            params,
            body,
            is_async,
        })))
    }

    /// Parses the parameters and body of an object or class method. The
    /// node starts at the opening parenthesis.
    pub(super) fn parse_method(&mut self, is_generator: bool, is_async: bool, allow_direct_super: bool) -> Result<Function> {
        let start = self.start_node();
        let mut flags = ScopeFlags::function(is_async, is_generator) | ScopeFlags::SUPER;
        if allow_direct_super {
            flags |= ScopeFlags::DIRECT_SUPER;
        }
        let saved = self.take_positions();
        let result = self.with_scope(flags, |p| {
            let params = p.parse_function_params()?;
            let body = p.parse_function_body(start.offset, &params, None, false, true)?;
            Ok((params, body))
        });
        self.restore_positions(saved);
        let (params, body) = result?;
        Ok(Function {
            span: self.finish(start),
            id: None,
            params,
            body,
            is_async,
            is_generator,
        })
    }

    /// `yield` and `await` expressions may not appear in parameter
    /// defaults.
    pub(super) fn check_yield_await_in_default_params(&self) -> Result<()> {
        if let Some(yield_pos) = self.yield_pos {
            if self.await_pos.is_none_or(|await_pos| yield_pos < await_pos) {
                return Err(self.raise(yield_pos, "Yield expression cannot be a default value"));
            }
        }
        if let Some(await_pos) = self.await_pos {
            return Err(self.raise(await_pos, "Await expression cannot be a default value"));
        }
        Ok(())
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
    fn test_function_declaration() {
        let program = parse_ok("async function* f(a, { b }, ...c) { yield a; await b; }");
        let Statement::FunctionDeclaration(f) = &program.body[0] else {
            panic!("expected function declaration");
        };
        assert_eq!(f.id.as_ref().map(|id| id.name.as_str()), Some("f"));
        assert!(f.is_async && f.is_generator);
        assert_eq!(f.params.len(), 3);
        assert_eq!(f.body.body.len(), 2);
        assert_eq!(f.span.start, 0);
    }

    #[test]
    fn test_duplicate_parameters() {
        script("function f(a, a) {}").unwrap();
        assert_eq!(script("'use strict'; function f(a, a) {}").unwrap_err().message, "Argument name clash");
        assert_eq!(script("function f(a, [a]) {}").unwrap_err().message, "Argument name clash");
        assert_eq!(script("(a, a) => 1").unwrap_err().message, "Argument name clash");
        assert_eq!(script("({ m(a, a) {} })").unwrap_err().message, "Argument name clash");
    }

    #[test]
    fn test_use_strict_in_body() {
        let err = script("function f(a = 1) { 'use strict'; }").unwrap_err();
        assert_eq!(
            err.message,
            "Illegal 'use strict' directive in function with non-simple parameter list"
        );
        assert_eq!(err.column, 0);
        let err = script("function eval() { 'use strict'; }").unwrap_err();
        assert_eq!(err.message, "Binding eval in strict mode");
        script("function f() { 'use strict'; } with (a) {}").unwrap();
    }

    #[test]
    fn test_directives_in_body() {
        let program = parse_ok("function f() { 'a'; 'b'; c; }");
        let Statement::FunctionDeclaration(f) = &program.body[0] else {
            panic!("expected function declaration");
        };
        assert_eq!(f.body.body[1].directive(), Some("b"));
        assert_eq!(f.body.body[2].directive(), None);
    }

    #[test]
    fn test_function_expression_name_scope() {
        assert_eq!(
            parse_err("(function* yield() {})").message,
            "Cannot use 'yield' as identifier inside a generator"
        );
        script("(function yield() {})").unwrap();
        script("function* yield() {}").unwrap();
    }

    #[test]
    fn test_default_parameter_expressions() {
        assert_eq!(
            parse_err("async function f(a = await 1) {}").message,
            "Await expression cannot be a default value"
        );
        assert_eq!(
            parse_err("function* g(a = yield) {}").message,
            "Yield expression cannot be a default value"
        );
    }

    #[test]
    fn test_arrow_body_scopes() {
        let program = parse_ok("const f = (a) => { let b = a; return b; };");
        assert_eq!(program.body.len(), 1);
        assert_eq!(parse_err("(a) => { let a; }").message, "Identifier 'a' has already been declared");
        assert_eq!(parse_err("() => { return; }; return;").message, "'return' outside of function");
    }

    #[test]
    fn test_labels_do_not_cross_functions() {
        assert_eq!(
            parse_err("l: while (1) { function f() { break l; } }").message,
            "Unsyntactic break"
        );
    }

    #[test]
    fn test_method_super() {
        parse_ok("({ m() { return super.x; } })");
        parse_ok("class A extends B { constructor() { super(); } }");
    }
}
