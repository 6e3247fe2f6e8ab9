//! Binding patterns and assignment targets.
//!
//! Destructuring assignments and arrow parameters are first parsed as
//! expressions and converted here once the parser knows what they are.
//! [`CoverErrors`] remembers the constructs that are only valid under one
//! of the two readings.

use rustc_hash::FxHashSet;

use super::parser::{Marker, Parser};
use super::scope::BindingKind;
use crate::ast::*;
use crate::error::Result;
use crate::features::Features;
use crate::lexer::TokenKind;

/// Offsets of constructs whose validity depends on whether the enclosing
/// expression turns out to be a pattern.
#[derive(Debug, Default, Clone, Copy)]
pub(super) struct CoverErrors {
    /// `{ a = 1 }`: only valid as a pattern
    pub shorthand_assign: Option<usize>,
    /// A comma after a spread element: not valid in a pattern
    pub trailing_comma: Option<usize>,
    /// A parenthesized non-simple target: not valid in an assignment pattern
    pub parenthesized_assign: Option<usize>,
    /// Any parenthesized item: not valid in a binding pattern
    pub parenthesized_bind: Option<usize>,
    /// A second `__proto__`: only valid in a pattern
    pub double_proto: Option<usize>,
}

/// An item parsed before the parser knows it is an arrow parameter.
pub(super) enum ArrowParam {
    Expression(Expression),
    Spread(SpreadElement),
    Rest(RestElement),
}

/// Reserved as binding names in strict mode code.
pub(super) fn is_strict_bind_reserved(name: &str) -> bool {
    matches!(name, "eval" | "arguments") || is_strict_reserved(name)
}

/// Reserved words that only apply to strict mode code.
pub(super) fn is_strict_reserved(name: &str) -> bool {
    matches!(
        name,
        "implements" | "interface" | "let" | "package" | "private" | "protected" | "public" | "static" | "yield"
    )
}

impl Parser<'_> {
    /// Fails if the cover contains something that cannot be a pattern.
    pub(super) fn check_pattern_errors(&self, errors: Option<&CoverErrors>, is_assign: bool) -> Result<()> {
        let Some(errors) = errors else {
            return Ok(());
        };
        if let Some(offset) = errors.trailing_comma {
            return Err(self.raise(offset, "Comma is not permitted after the rest element"));
        }
        let parens = if is_assign {
            errors.parenthesized_assign
        } else {
            errors.parenthesized_bind
        };
        if let Some(offset) = parens {
            let message = if is_assign { "Assigning to rvalue" } else { "Parenthesized pattern" };
            return Err(self.raise(offset, message));
        }
        Ok(())
    }

    /// Reports whether the cover contains something that can only be a
    /// pattern. With `and_throw` that is an error instead.
    pub(super) fn check_expression_errors(&self, errors: Option<&CoverErrors>, and_throw: bool) -> Result<bool> {
        let Some(errors) = errors else {
            return Ok(false);
        };
        if !and_throw {
            return Ok(errors.shorthand_assign.is_some() || errors.double_proto.is_some());
        }
        if let Some(offset) = errors.shorthand_assign {
            return Err(self.raise(
                offset,
                "Shorthand property assignments are valid only in destructuring patterns",
            ));
        }
        if let Some(offset) = errors.double_proto {
            return Err(self.raise_early(offset, "Redefinition of __proto__ property"));
        }
        Ok(false)
    }

    // ------------------------------------------------------------------
    // Expression to pattern conversion
    // ------------------------------------------------------------------

    /// Converts a parsed expression into an assignment or binding target.
    pub(super) fn to_assignable(
        &mut self,
        expr: Expression,
        is_binding: bool,
        errors: Option<&CoverErrors>,
    ) -> Result<Pattern> {
        match expr {
            Expression::Identifier(id) => {
                if self.scopes.in_async() && id.name == "await" {
                    return Err(self.raise(
                        id.span.start,
                        "Cannot use 'await' as identifier inside an async function",
                    ));
                }
                Ok(Pattern::Identifier(id))
            }
            Expression::Object(object) => {
                self.check_pattern_errors(errors, true)?;
                let mut properties = Vec::with_capacity(object.properties.len());
                for property in object.properties {
                    properties.push(self.property_to_assignable(property, is_binding)?);
                }
                Ok(Pattern::Object(ObjectPattern {
                    span: object.span,
                    properties,
                }))
            }
            Expression::Array(array) => {
                self.check_pattern_errors(errors, true)?;
                let mut elements = Vec::with_capacity(array.elements.len());
                for element in array.elements {
                    elements.push(match element {
                        None => None,
                        Some(ExprOrSpread::Expression(expr)) => Some(self.to_assignable(expr, is_binding, None)?),
                        Some(ExprOrSpread::Spread(spread)) => {
                            Some(Pattern::Rest(self.spread_to_rest(spread, is_binding)?))
                        }
                    });
                }
                Ok(Pattern::Array(ArrayPattern {
                    span: array.span,
                    elements,
                }))
            }
            Expression::Assignment(assign) => {
                if assign.operator != AssignmentOperator::Assign {
                    return Err(self.raise(
                        assign.left.span().end,
                        "Only '=' operator can be used for specifying default value.",
                    ));
                }
                let left = self.reinterpret(*assign.left, is_binding)?;
                Ok(Pattern::Assignment(AssignmentPattern {
                    span: assign.span,
                    left: Box::new(left),
                    right: assign.right,
                }))
            }
            Expression::Chain(chain) => Err(self.raise(
                chain.span.start,
                "Optional chaining cannot appear in left-hand side",
            )),
            Expression::Member(member) if !is_binding => Ok(Pattern::Expression(Box::new(Expression::Member(member)))),
            other => Err(self.raise(other.span().start, "Assigning to rvalue")),
        }
    }

    fn property_to_assignable(&mut self, property: ObjectProperty, is_binding: bool) -> Result<ObjectPatternProperty> {
        match property {
            ObjectProperty::Property(property) => {
                if property.kind != PropertyKind::Init {
                    return Err(self.raise(
                        property.key.span().start,
                        "Object pattern can't contain getter or setter",
                    ));
                }
                let value = self.to_assignable(property.value, is_binding, None)?;
                Ok(ObjectPatternProperty::Property(AssignmentProperty {
                    span: property.span,
                    key: property.key,
                    value,
                    shorthand: property.shorthand,
                    computed: property.computed,
                }))
            }
            ObjectProperty::Spread(spread) => {
                let rest = self.spread_to_rest(spread, is_binding)?;
                if matches!(*rest.argument, Pattern::Array(_) | Pattern::Object(_)) {
                    return Err(self.unexpected_at(rest.argument.span().start));
                }
                Ok(ObjectPatternProperty::Rest(rest))
            }
        }
    }

    pub(super) fn spread_to_rest(&mut self, spread: SpreadElement, is_binding: bool) -> Result<RestElement> {
        let argument = self.to_assignable(spread.argument, is_binding, None)?;
        if let Pattern::Assignment(assign) = &argument {
            return Err(self.raise(assign.span.start, "Rest elements cannot have a default value"));
        }
        Ok(RestElement {
            span: spread.span,
            argument: Box::new(argument),
        })
    }

    /// Revisits the target of an already converted default, which was
    /// converted as an assignment target.
    fn reinterpret(&mut self, pattern: Pattern, is_binding: bool) -> Result<Pattern> {
        if !is_binding {
            return Ok(pattern);
        }
        match pattern {
            Pattern::Expression(expr) => Err(self.raise(expr.span().start, "Assigning to rvalue")),
            Pattern::Object(mut object) => {
                for property in &mut object.properties {
                    let target = match property {
                        ObjectPatternProperty::Property(p) => &mut p.value,
                        ObjectPatternProperty::Rest(r) => r.argument.as_mut(),
                    };
                    let span = target.span();
                    let taken = std::mem::replace(target, Pattern::Array(ArrayPattern::default_at(span)));
                    *target = self.reinterpret(taken, true)?;
                }
                Ok(Pattern::Object(object))
            }
            Pattern::Array(mut array) => {
                for element in array.elements.iter_mut().flatten() {
                    let span = element.span();
                    let taken = std::mem::replace(element, Pattern::Array(ArrayPattern::default_at(span)));
                    *element = self.reinterpret(taken, true)?;
                }
                Ok(Pattern::Array(array))
            }
            Pattern::Assignment(mut assign) => {
                let left = self.reinterpret(*assign.left, true)?;
                assign.left = Box::new(left);
                Ok(Pattern::Assignment(assign))
            }
            Pattern::Rest(mut rest) => {
                let argument = self.reinterpret(*rest.argument, true)?;
                rest.argument = Box::new(argument);
                Ok(Pattern::Rest(rest))
            }
            identifier @ Pattern::Identifier(_) => Ok(identifier),
        }
    }

    /// Converts the items of a parenthesized list or argument list into
    /// arrow parameters. Runs inside the arrow's own scope.
    pub(super) fn arrow_params(&mut self, items: Vec<ArrowParam>) -> Result<Vec<Pattern>> {
        let mut params = Vec::with_capacity(items.len());
        for item in items {
            params.push(match item {
                ArrowParam::Expression(expr) => self.to_assignable(expr, true, None)?,
                ArrowParam::Spread(spread) => Pattern::Rest(self.spread_to_rest(spread, true)?),
                ArrowParam::Rest(rest) => Pattern::Rest(rest),
            });
        }
        Ok(params)
    }

    /// The target of `++`, `--` or a compound assignment.
    pub(super) fn simple_assign_target(&mut self, expr: Expression) -> Result<Pattern> {
        self.check_lval_simple(&expr)?;
        Ok(match expr {
            Expression::Identifier(id) => Pattern::Identifier(id),
            other => Pattern::Expression(Box::new(other)),
        })
    }

    // ------------------------------------------------------------------
    // Target checks
    // ------------------------------------------------------------------

    /// Checks an expression used as a simple assignment target.
    pub(super) fn check_lval_simple(&mut self, expr: &Expression) -> Result<()> {
        match expr {
            Expression::Identifier(id) => self.check_identifier_lval(id, None, None),
            Expression::Member(_) => Ok(()),
            Expression::Chain(chain) => Err(self.raise(
                chain.span.start,
                "Optional chaining cannot appear in left-hand side",
            )),
            other => Err(self.raise(other.span().start, "Assigning to rvalue")),
        }
    }

    /// Checks an identifier being assigned or bound, declaring it when
    /// `kind` is given. `clashes` collects names for duplicate parameter
    /// detection.
    pub(super) fn check_identifier_lval(
        &mut self,
        id: &Identifier,
        kind: Option<BindingKind>,
        clashes: Option<&mut FxHashSet<String>>,
    ) -> Result<()> {
        if self.strict && is_strict_bind_reserved(&id.name) {
            let verb = if kind.is_some() { "Binding" } else { "Assigning to" };
            return Err(self.raise_early(id.span.start, format!("{verb} {} in strict mode", id.name)));
        }
        let Some(kind) = kind else {
            return Ok(());
        };
        if kind == BindingKind::Lexical && id.name == "let" {
            return Err(self.raise_early(id.span.start, "let is disallowed as a lexically bound name"));
        }
        if let Some(clashes) = clashes {
            if !clashes.insert(id.name.clone()) {
                return Err(self.raise_early(id.span.start, "Argument name clash"));
            }
        }
        if kind != BindingKind::Outside {
            self.declare_name(&id.name, kind, id.span.start)?;
        }
        Ok(())
    }

    /// Checks every name in a target pattern.
    pub(super) fn check_lval_pattern(
        &mut self,
        pattern: &Pattern,
        kind: Option<BindingKind>,
        mut clashes: Option<&mut FxHashSet<String>>,
    ) -> Result<()> {
        match pattern {
            Pattern::Object(object) => {
                for property in &object.properties {
                    match property {
                        ObjectPatternProperty::Property(p) => {
                            self.check_lval_inner(&p.value, kind, clashes.as_deref_mut())?
                        }
                        ObjectPatternProperty::Rest(r) => {
                            self.check_lval_pattern(&r.argument, kind, clashes.as_deref_mut())?
                        }
                    }
                }
                Ok(())
            }
            Pattern::Array(array) => {
                for element in array.elements.iter().flatten() {
                    self.check_lval_inner(element, kind, clashes.as_deref_mut())?;
                }
                Ok(())
            }
            _ => self.check_lval_leaf(pattern, kind, clashes),
        }
    }

    /// Like [`Self::check_lval_pattern`], also accepting a default or a rest
    /// element at this position.
    pub(super) fn check_lval_inner(
        &mut self,
        pattern: &Pattern,
        kind: Option<BindingKind>,
        clashes: Option<&mut FxHashSet<String>>,
    ) -> Result<()> {
        match pattern {
            Pattern::Assignment(assign) => self.check_lval_pattern(&assign.left, kind, clashes),
            Pattern::Rest(rest) => self.check_lval_pattern(&rest.argument, kind, clashes),
            _ => self.check_lval_pattern(pattern, kind, clashes),
        }
    }

    fn check_lval_leaf(
        &mut self,
        pattern: &Pattern,
        kind: Option<BindingKind>,
        clashes: Option<&mut FxHashSet<String>>,
    ) -> Result<()> {
        let is_bind = kind.is_some();
        match pattern {
            Pattern::Identifier(id) => self.check_identifier_lval(id, kind, clashes),
            Pattern::Expression(expr) => match expr.as_ref() {
                Expression::Member(member) if is_bind => {
                    Err(self.raise(member.span.start, "Binding member expression"))
                }
                Expression::Member(_) => Ok(()),
                Expression::Chain(chain) => Err(self.raise(
                    chain.span.start,
                    "Optional chaining cannot appear in left-hand side",
                )),
                other => Err(self.raise(other.span().start, "Assigning to rvalue")),
            },
            other => {
                let message = if is_bind { "Binding rvalue" } else { "Assigning to rvalue" };
                Err(self.raise(other.span().start, message))
            }
        }
    }

    // ------------------------------------------------------------------
    // Binding patterns
    // ------------------------------------------------------------------

    /// Parses an identifier, array pattern or object pattern.
    pub(super) fn parse_binding_atom(&mut self) -> Result<Pattern> {
        match self.cur.kind {
            TokenKind::LeftBracket => self.guarded(|p| {
                let start = p.start_node();
                p.next()?;
                let elements = p.parse_binding_list(&TokenKind::RightBracket, true, true)?;
                Ok(Pattern::Array(ArrayPattern {
                    span: p.finish(start),
                    elements,
                }))
            }),
            TokenKind::LeftBrace => self.guarded(|p| p.parse_object_pattern()),
            _ => Ok(Pattern::Identifier(self.parse_ident(false)?)),
        }
    }

    /// Parses binding elements up to and including `close`. Holes are only
    /// produced when `allow_empty` is set.
    pub(super) fn parse_binding_list(
        &mut self,
        close: &TokenKind,
        allow_empty: bool,
        allow_trailing_comma: bool,
    ) -> Result<Vec<Option<Pattern>>> {
        let mut elements = Vec::new();
        let mut first = true;
        while !self.eat(close)? {
            if first {
                first = false;
            } else {
                self.expect(&TokenKind::Comma)?;
            }
            if allow_empty && self.is(&TokenKind::Comma) {
                elements.push(None);
            } else if allow_trailing_comma && self.after_trailing_comma(close, false)? {
                break;
            } else if self.is(&TokenKind::Ellipsis) {
                elements.push(Some(Pattern::Rest(self.parse_rest_binding()?)));
                if self.is(&TokenKind::Comma) {
                    return Err(self.raise(self.cur.span.start, "Comma is not permitted after the rest element"));
                }
                self.expect(close)?;
                break;
            } else {
                let start = self.start_node();
                elements.push(Some(self.parse_maybe_default(start, None)?));
            }
        }
        Ok(elements)
    }

    pub(super) fn parse_rest_binding(&mut self) -> Result<RestElement> {
        let start = self.start_node();
        self.next()?;
        let argument = self.parse_binding_atom()?;
        Ok(RestElement {
            span: self.finish(start),
            argument: Box::new(argument),
        })
    }

    /// Parses `target` or `target = default`. `left` is an already parsed
    /// target.
    pub(super) fn parse_maybe_default(&mut self, start: Marker, left: Option<Pattern>) -> Result<Pattern> {
        let left = match left {
            Some(left) => left,
            None => self.parse_binding_atom()?,
        };
        if !self.eat(&TokenKind::Equal)? {
            return Ok(left);
        }
        let right = self.parse_maybe_assign(super::parser::ForHead::No, None)?;
        Ok(Pattern::Assignment(AssignmentPattern {
            span: self.finish(start),
            left: Box::new(left),
            right: Box::new(right),
        }))
    }

    fn parse_object_pattern(&mut self) -> Result<Pattern> {
        let start = self.start_node();
        self.next()?;
        let mut properties = Vec::new();
        let mut first = true;
        while !self.eat(&TokenKind::RightBrace)? {
            if first {
                first = false;
            } else {
                self.expect(&TokenKind::Comma)?;
                if self.after_trailing_comma(&TokenKind::RightBrace, false)? {
                    break;
                }
            }

            if self.is(&TokenKind::Ellipsis) {
                if !self.has(Features::SPREAD) {
                    return Err(self.unexpected());
                }
                let rest_start = self.start_node();
                self.next()?;
                let argument = Pattern::Identifier(self.parse_ident(false)?);
                if self.is(&TokenKind::Comma) {
                    return Err(self.raise(self.cur.span.start, "Comma is not permitted after the rest element"));
                }
                properties.push(ObjectPatternProperty::Rest(RestElement {
                    span: self.finish(rest_start),
                    argument: Box::new(argument),
                }));
                continue;
            }

            let property_start = self.start_node();
            let (key, computed) = self.parse_property_name()?;
            let property = if self.eat(&TokenKind::Colon)? {
                let value_start = self.start_node();
                let value = self.parse_maybe_default(value_start, None)?;
                AssignmentProperty {
                    span: self.finish(property_start),
                    key,
                    value,
                    shorthand: false,
                    computed,
                }
            } else {
                let id = match (&key, computed) {
                    (Expression::Identifier(id), false) => id.clone(),
                    _ => return Err(self.unexpected()),
                };
                self.check_unreserved(&id)?;
                if id.name == "await" && self.await_ident_pos.is_none() {
                    self.await_ident_pos = Some(id.span.start);
                }
                let value = self.parse_maybe_default(property_start, Some(Pattern::Identifier(id)))?;
                AssignmentProperty {
                    span: self.finish(property_start),
                    key,
                    value,
                    shorthand: true,
                    computed: false,
                }
            };
            properties.push(ObjectPatternProperty::Property(property));
        }
        Ok(Pattern::Object(ObjectPattern {
            span: self.finish(start),
            properties,
        }))
    }
}

impl ArrayPattern {
    /// An empty placeholder, used while rewriting a pattern in place.
    fn default_at(span: Span) -> Self {
        Self {
            span,
            elements: Vec::new(),
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

    fn script_err(src: &str) -> ParseError {
        Parser::with_options(src, ParserOptions::script()).parse_program().unwrap_err()
    }

    fn declarator(program: &Program) -> &VariableDeclarator {
        match &program.body[0] {
            Statement::VariableDeclaration(decl) => &decl.declarations[0],
            other => panic!("expected a declaration, got {other:?}"),
        }
    }

    #[test]
    fn test_object_binding_pattern() {
        let program = parse_ok("let { a, b: [c, , d = 1], ...rest } = obj;");
        let Pattern::Object(object) = &declarator(&program).id else {
            panic!("expected object pattern");
        };
        assert_eq!(object.properties.len(), 3);
        let ObjectPatternProperty::Property(second) = &object.properties[1] else {
            panic!("expected property");
        };
        let Pattern::Array(array) = &second.value else {
            panic!("expected array pattern");
        };
        assert_eq!(array.elements.len(), 3);
        assert!(array.elements[1].is_none());
        assert!(matches!(array.elements[2], Some(Pattern::Assignment(_))));
        assert!(matches!(object.properties[2], ObjectPatternProperty::Rest(_)));
    }

    #[test]
    fn test_destructuring_assignment_converts_expression() {
        let program = parse_ok("[a.b, { c = 1 }] = x;");
        let Statement::Expression(stmt) = &program.body[0] else {
            panic!("expected expression statement");
        };
        let Expression::Assignment(assign) = &stmt.expression else {
            panic!("expected assignment");
        };
        let Pattern::Array(array) = assign.left.as_ref() else {
            panic!("expected array pattern");
        };
        assert!(matches!(array.elements[0], Some(Pattern::Expression(_))));
        let Some(Pattern::Object(object)) = &array.elements[1] else {
            panic!("expected object pattern");
        };
        let ObjectPatternProperty::Property(property) = &object.properties[0] else {
            panic!("expected property");
        };
        assert!(property.shorthand);
        assert!(matches!(property.value, Pattern::Assignment(_)));
    }

    #[test]
    fn test_shorthand_default_outside_pattern() {
        let err = parse_err("({ a = 1 });");
        assert_eq!(
            err.message,
            "Shorthand property assignments are valid only in destructuring patterns"
        );
        assert_eq!(err.column, 5);
    }

    #[test]
    fn test_rest_errors() {
        assert_eq!(
            parse_err("let [...a, b] = c;").message,
            "Comma is not permitted after the rest element"
        );
        assert_eq!(
            parse_err("[...a, b] = c;").message,
            "Comma is not permitted after the rest element"
        );
        assert_eq!(
            parse_err("[...a = 1] = c;").message,
            "Rest elements cannot have a default value"
        );
        assert_eq!(parse_err("({ ...{ a } } = c);").message, "Unexpected token");
    }

    #[test]
    fn test_invalid_assignment_targets() {
        assert_eq!(parse_err("a + b = 1;").message, "Assigning to rvalue");
        assert_eq!(parse_err("({ a }) = 1;").message, "Assigning to rvalue");
        assert_eq!(
            parse_err("a?.b = 1;").message,
            "Optional chaining cannot appear in left-hand side"
        );
        assert_eq!(
            parse_err("({ get a() {} } = 1);").message,
            "Object pattern can't contain getter or setter"
        );
        assert_eq!(
            parse_err("[a += 1] = c;").message,
            "Only '=' operator can be used for specifying default value."
        );
    }

    #[test]
    fn test_strict_binding_names() {
        assert_eq!(parse_err("let eval = 1;").message, "Binding eval in strict mode");
        assert_eq!(parse_err("arguments = 1;").message, "Assigning to arguments in strict mode");
        assert_eq!(script_err("let let = 1;").message, "let is disallowed as a lexically bound name");
    }

    #[test]
    fn test_parenthesized_binding_pattern() {
        let err = parse_err("([(a)]) => 1;");
        assert_eq!(err.message, "Parenthesized pattern");
        parse_ok("[(a)] = b;");
        parse_ok("[(a.b)] = c;");
    }

    #[test]
    fn test_lexical_redeclaration() {
        let err = parse_err("let a; let { a } = b;");
        assert_eq!(err.message, "Identifier 'a' has already been declared");
        assert_eq!(err.column, 13);
    }
}
