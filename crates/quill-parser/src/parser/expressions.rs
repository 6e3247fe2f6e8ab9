//! Expression parsing.
//!
//! Operators are parsed by precedence climbing over
//! `parse_maybe_assign` > `parse_maybe_conditional` > `parse_expr_ops` >
//! `parse_maybe_unary` > `parse_expr_subscripts` > `parse_expr_atom`.
//! Parenthesized lists, array and object literals are parsed as
//! expressions first and converted to patterns when an `=` or `=>`
//! follows; see [`CoverErrors`].

use super::classes::ClassKind;
use super::functions::FunctionKind;
use super::parser::{ForHead, Marker, Parser};
use super::patterns::{ArrowParam, CoverErrors, is_strict_reserved};
use crate::ast::*;
use crate::error::Result;
use crate::features::Features;
use crate::lexer::TokenKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinaryOp {
    Binary(BinaryOperator),
    Logical(LogicalOperator),
}

enum PrefixOp {
    Unary(UnaryOperator),
    Update(UpdateOperator),
}

/// The result of one step of the subscript loop.
struct Subscript {
    expression: Expression,
    progressed: bool,
    optional: bool,
}

/// Tokens that can begin an expression, used to decide whether `yield`
/// or a top-level `await` has an operand.
fn starts_expression(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Number(_)
            | TokenKind::BigInt(_)
            | TokenKind::String(_)
            | TokenKind::Template { .. }
            | TokenKind::RegExp { .. }
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Null
            | TokenKind::Identifier(_)
            | TokenKind::PrivateIdentifier(_)
            | TokenKind::LeftBrace
            | TokenKind::LeftParen
            | TokenKind::LeftBracket
            | TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Bang
            | TokenKind::Tilde
            | TokenKind::PlusPlus
            | TokenKind::MinusMinus
            | TokenKind::Slash
            | TokenKind::SlashEqual
            | TokenKind::LessThan
            | TokenKind::Class
            | TokenKind::Function
            | TokenKind::New
            | TokenKind::Super
            | TokenKind::This
            | TokenKind::Typeof
            | TokenKind::Void
            | TokenKind::Delete
            | TokenKind::Import
    )
}

fn is_simple_assign_target(expr: &Expression) -> bool {
    matches!(expr, Expression::Identifier(_) | Expression::Member(_))
}

fn is_private_field_access(expr: &Expression) -> bool {
    match expr {
        Expression::Member(member) => matches!(member.property.as_ref(), Expression::PrivateIdentifier(_)),
        Expression::Chain(chain) => is_private_field_access(&chain.expression),
        _ => false,
    }
}

impl Parser<'_> {
    // ------------------------------------------------------------------
    // Comma and assignment
    // ------------------------------------------------------------------

    /// Parses a full expression, including the comma operator.
    pub(super) fn parse_expression(&mut self) -> Result<Expression> {
        self.parse_expression_with(ForHead::No, None)
    }

    pub(super) fn parse_expression_with(
        &mut self,
        for_head: ForHead,
        mut errors: Option<&mut CoverErrors>,
    ) -> Result<Expression> {
        let start = self.start_node();
        let expr = self.parse_maybe_assign(for_head, errors.as_deref_mut())?;
        if !self.is(&TokenKind::Comma) {
            return Ok(expr);
        }
        let mut expressions = vec![expr];
        while self.eat(&TokenKind::Comma)? {
            expressions.push(self.parse_maybe_assign(for_head, errors.as_deref_mut())?);
        }
        Ok(Expression::Sequence(SequenceExpression {
            span: self.finish(start),
            expressions,
        }))
    }

    /// Parses an assignment expression, or anything of higher precedence.
    ///
    /// When `errors` is `None` this is a standalone expression and pending
    /// pattern-only constructs are reported here. Otherwise they are left
    /// for the caller, which may still turn the expression into a pattern.
    pub(super) fn parse_maybe_assign(
        &mut self,
        for_head: ForHead,
        errors: Option<&mut CoverErrors>,
    ) -> Result<Expression> {
        self.guarded(|p| p.parse_maybe_assign_inner(for_head, errors))
    }

    fn parse_maybe_assign_inner(&mut self, for_head: ForHead, errors: Option<&mut CoverErrors>) -> Result<Expression> {
        if self.is_contextual("yield") && self.scopes.in_generator() {
            return self.parse_yield(for_head);
        }

        let mut own = CoverErrors::default();
        let owns_errors = errors.is_none();
        let errors: &mut CoverErrors = match errors {
            Some(errors) => errors,
            None => &mut own,
        };
        let old_paren_assign = errors.parenthesized_assign.take();
        let old_trailing_comma = errors.trailing_comma.take();
        let old_double_proto = errors.double_proto;

        let start = self.start_node();
        if matches!(self.cur.kind, TokenKind::LeftParen | TokenKind::Identifier(_)) {
            self.potential_arrow_at = Some(self.cur.span.start);
            self.potential_arrow_in_for_await = for_head == ForHead::AwaitInit;
        }
        let left = self.parse_maybe_conditional(for_head, Some(&mut *errors))?;

        if let Some(operator) = self.assign_operator() {
            let left = if operator == AssignmentOperator::Assign {
                self.to_assignable(left, false, Some(&*errors))?
            } else {
                self.simple_assign_target(left)?
            };
            if !owns_errors {
                errors.parenthesized_assign = None;
                errors.trailing_comma = None;
                errors.double_proto = None;
            }
            if errors.shorthand_assign.is_some_and(|offset| offset >= left.span().start) {
                errors.shorthand_assign = None;
            }
            if operator == AssignmentOperator::Assign {
                self.check_lval_pattern(&left, None, None)?;
            }
            self.next()?;
            let right = self.parse_maybe_assign(for_head, None)?;
            if old_double_proto.is_some() {
                errors.double_proto = old_double_proto;
            }
            return Ok(Expression::Assignment(AssignmentExpression {
                span: self.finish(start),
                operator,
                left: Box::new(left),
                right: Box::new(right),
            }));
        }
        if owns_errors {
            self.check_expression_errors(Some(&*errors), true)?;
        }
        if old_paren_assign.is_some() {
            errors.parenthesized_assign = old_paren_assign;
        }
        if old_trailing_comma.is_some() {
            errors.trailing_comma = old_trailing_comma;
        }
        Ok(left)
    }

    fn assign_operator(&self) -> Option<AssignmentOperator> {
        let pow = self.has(Features::POW);
        let logic = self.has(Features::LOGIC_ASSIGN);
        Some(match self.cur.kind {
            TokenKind::Equal => AssignmentOperator::Assign,
            TokenKind::PlusEqual => AssignmentOperator::AddAssign,
            TokenKind::MinusEqual => AssignmentOperator::SubtractAssign,
            TokenKind::StarEqual => AssignmentOperator::MultiplyAssign,
            TokenKind::SlashEqual => AssignmentOperator::DivideAssign,
            TokenKind::PercentEqual => AssignmentOperator::ModuloAssign,
            TokenKind::StarStarEqual if pow => AssignmentOperator::ExponentAssign,
            TokenKind::LeftShiftEqual => AssignmentOperator::LeftShiftAssign,
            TokenKind::RightShiftEqual => AssignmentOperator::RightShiftAssign,
            TokenKind::UnsignedRightShiftEqual => AssignmentOperator::UnsignedRightShiftAssign,
            TokenKind::AmpersandEqual => AssignmentOperator::BitwiseAndAssign,
            TokenKind::PipeEqual => AssignmentOperator::BitwiseOrAssign,
            TokenKind::CaretEqual => AssignmentOperator::BitwiseXorAssign,
            TokenKind::AmpersandAmpersandEqual if logic => AssignmentOperator::LogicalAndAssign,
            TokenKind::PipePipeEqual if logic => AssignmentOperator::LogicalOrAssign,
            TokenKind::QuestionQuestionEqual if logic => AssignmentOperator::NullishCoalescingAssign,
            _ => return None,
        })
    }

    fn parse_yield(&mut self, for_head: ForHead) -> Result<Expression> {
        if self.yield_pos.is_none() {
            self.yield_pos = Some(self.cur.span.start);
        }
        let start = self.start_node();
        self.next()?;
        let (delegate, argument) = if self.is(&TokenKind::Semicolon)
            || self.can_insert_semicolon()
            || (!self.is(&TokenKind::Star) && !starts_expression(&self.cur.kind))
        {
            (false, None)
        } else {
            let delegate = self.eat(&TokenKind::Star)?;
            (delegate, Some(Box::new(self.parse_maybe_assign(for_head, None)?)))
        };
        Ok(Expression::Yield(YieldExpression {
            span: self.finish(start),
            argument,
            delegate,
        }))
    }

    // ------------------------------------------------------------------
    // Conditional and binary operators
    // ------------------------------------------------------------------

    fn parse_maybe_conditional(&mut self, for_head: ForHead, mut errors: Option<&mut CoverErrors>) -> Result<Expression> {
        let start = self.start_node();
        let expr = self.parse_expr_ops(for_head, errors.as_deref_mut())?;
        if self.check_expression_errors(errors.as_deref(), false)? {
            return Ok(expr);
        }
        if !self.eat(&TokenKind::Question)? {
            return Ok(expr);
        }
        let consequent = self.parse_maybe_assign(ForHead::No, None)?;
        self.expect(&TokenKind::Colon)?;
        let alternate = self.parse_maybe_assign(for_head, None)?;
        Ok(Expression::Conditional(ConditionalExpression {
            span: self.finish(start),
            test: Box::new(expr),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        }))
    }

    fn parse_expr_ops(&mut self, for_head: ForHead, mut errors: Option<&mut CoverErrors>) -> Result<Expression> {
        let start = self.start_node();
        let expr = self.parse_maybe_unary(errors.as_deref_mut(), None, false, for_head)?;
        if self.check_expression_errors(errors.as_deref(), false)? {
            return Ok(expr);
        }
        if matches!(expr, Expression::Arrow(_)) && expr.span().start == start.offset {
            return Ok(expr);
        }
        self.parse_expr_op(expr, start, 0, for_head)
    }

    /// Binding power and node kind of the current token as a binary
    /// operator. `**` is handled in `parse_maybe_unary`.
    fn binary_operator(&self) -> Option<(BinaryOp, u8)> {
        use BinaryOp::{Binary, Logical};
        Some(match self.cur.kind {
            TokenKind::QuestionQuestion if self.has(Features::NULLISH) => {
                (Logical(LogicalOperator::NullishCoalescing), 1)
            }
            TokenKind::PipePipe => (Logical(LogicalOperator::Or), 1),
            TokenKind::AmpersandAmpersand => (Logical(LogicalOperator::And), 2),
            TokenKind::Pipe => (Binary(BinaryOperator::BitwiseOr), 3),
            TokenKind::Caret => (Binary(BinaryOperator::BitwiseXor), 4),
            TokenKind::Ampersand => (Binary(BinaryOperator::BitwiseAnd), 5),
            TokenKind::EqualEqual => (Binary(BinaryOperator::Equal), 6),
            TokenKind::NotEqual => (Binary(BinaryOperator::NotEqual), 6),
            TokenKind::StrictEqual => (Binary(BinaryOperator::StrictEqual), 6),
            TokenKind::StrictNotEqual => (Binary(BinaryOperator::StrictNotEqual), 6),
            TokenKind::LessThan => (Binary(BinaryOperator::LessThan), 7),
            TokenKind::GreaterThan => (Binary(BinaryOperator::GreaterThan), 7),
            TokenKind::LessThanEqual => (Binary(BinaryOperator::LessThanEqual), 7),
            TokenKind::GreaterThanEqual => (Binary(BinaryOperator::GreaterThanEqual), 7),
            TokenKind::In => (Binary(BinaryOperator::In), 7),
            TokenKind::Instanceof => (Binary(BinaryOperator::InstanceOf), 7),
            TokenKind::LeftShift => (Binary(BinaryOperator::LeftShift), 8),
            TokenKind::RightShift => (Binary(BinaryOperator::RightShift), 8),
            TokenKind::UnsignedRightShift => (Binary(BinaryOperator::UnsignedRightShift), 8),
            TokenKind::Plus => (Binary(BinaryOperator::Add), 9),
            TokenKind::Minus => (Binary(BinaryOperator::Subtract), 9),
            TokenKind::Star => (Binary(BinaryOperator::Multiply), 10),
            TokenKind::Slash => (Binary(BinaryOperator::Divide), 10),
            TokenKind::Percent => (Binary(BinaryOperator::Modulo), 10),
            _ => return None,
        })
    }

    /// Folds binary operators binding tighter than `min_prec` onto `left`.
    fn parse_expr_op(&mut self, mut left: Expression, left_start: Marker, min_prec: u8, for_head: ForHead) -> Result<Expression> {
        loop {
            let Some((op, prec)) = self.binary_operator() else {
                return Ok(left);
            };
            if (for_head.no_in() && self.is(&TokenKind::In)) || prec <= min_prec {
                return Ok(left);
            }
            let logical = matches!(op, BinaryOp::Logical(LogicalOperator::And | LogicalOperator::Or));
            let coalesce = op == BinaryOp::Logical(LogicalOperator::NullishCoalescing);
            // `??` binds its right operand like `&&` so that mixing is detectable.
            let right_prec = if coalesce { 2 } else { prec };
            let op_start = self.cur.span.start;
            self.next()?;

            let right_start = self.start_node();
            let operand = self.parse_maybe_unary(None, None, false, for_head)?;
            let right = self.parse_expr_op(operand, right_start, right_prec, for_head)?;
            left = self.build_binary(left_start, left, right, op)?;

            let mixed = (logical && self.is(&TokenKind::QuestionQuestion))
                || (coalesce && matches!(self.cur.kind, TokenKind::PipePipe | TokenKind::AmpersandAmpersand));
            if mixed {
                let offset = if coalesce { op_start } else { self.cur.span.start };
                return Err(self.raise(offset, "Cannot use unparenthesized `??` within logic expressions"));
            }
        }
    }

    fn build_binary(&self, start: Marker, left: Expression, right: Expression, op: BinaryOp) -> Result<Expression> {
        if let Expression::PrivateIdentifier(id) = &right {
            return Err(self.raise(
                id.span.start,
                "Private identifier can only be left side of binary expression",
            ));
        }
        let span = self.finish(start);
        Ok(match op {
            BinaryOp::Binary(operator) => Expression::Binary(BinaryExpression {
                span,
                operator,
                left: Box::new(left),
                right: Box::new(right),
            }),
            BinaryOp::Logical(operator) => Expression::Logical(LogicalExpression {
                span,
                operator,
                left: Box::new(left),
                right: Box::new(right),
            }),
        })
    }

    // ------------------------------------------------------------------
    // Unary operators
    // ------------------------------------------------------------------

    fn prefix_operator(&self) -> Option<PrefixOp> {
        Some(match self.cur.kind {
            TokenKind::Minus => PrefixOp::Unary(UnaryOperator::Minus),
            TokenKind::Plus => PrefixOp::Unary(UnaryOperator::Plus),
            TokenKind::Bang => PrefixOp::Unary(UnaryOperator::LogicalNot),
            TokenKind::Tilde => PrefixOp::Unary(UnaryOperator::BitwiseNot),
            TokenKind::Typeof => PrefixOp::Unary(UnaryOperator::Typeof),
            TokenKind::Void => PrefixOp::Unary(UnaryOperator::Void),
            TokenKind::Delete => PrefixOp::Unary(UnaryOperator::Delete),
            TokenKind::PlusPlus => PrefixOp::Update(UpdateOperator::Increment),
            TokenKind::MinusMinus => PrefixOp::Update(UpdateOperator::Decrement),
            _ => return None,
        })
    }

    /// Parses prefix and postfix operators and `**`.
    ///
    /// `saw_unary` names the unary operator directly before this operand,
    /// which makes a following `**` an error. `inc_dec` marks the operand
    /// of `++`/`--`, which never takes `**` itself.
    pub(super) fn parse_maybe_unary(
        &mut self,
        mut errors: Option<&mut CoverErrors>,
        mut saw_unary: Option<&'static str>,
        inc_dec: bool,
        for_head: ForHead,
    ) -> Result<Expression> {
        let start = self.start_node();
        let expr = if self.is_contextual("await")
            && self.scopes.can_await()
            && self.has(Features::ASYNC_AWAIT)
            && (self.scopes.in_async() || self.await_has_operand())
        {
            saw_unary = Some("await");
            self.parse_await(for_head)?
        } else if let Some(op) = self.prefix_operator() {
            let update = matches!(op, PrefixOp::Update(_));
            self.next()?;
            let operand_saw = match &op {
                PrefixOp::Unary(operator) => Some(operator.as_str()),
                PrefixOp::Update(_) => saw_unary,
            };
            let argument = self.guarded(|p| p.parse_maybe_unary(None, operand_saw, update, for_head))?;
            self.check_expression_errors(errors.as_deref(), true)?;
            match op {
                PrefixOp::Update(operator) => {
                    self.check_lval_simple(&argument)?;
                    Expression::Update(UpdateExpression {
                        span: self.finish(start),
                        operator,
                        prefix: true,
                        argument: Box::new(argument),
                    })
                }
                PrefixOp::Unary(operator) => {
                    if operator == UnaryOperator::Delete {
                        if self.strict && matches!(argument, Expression::Identifier(_)) {
                            return Err(self.raise_early(start.offset, "Deleting local variable in strict mode"));
                        }
                        if is_private_field_access(&argument) {
                            return Err(self.raise_early(start.offset, "Private fields can not be deleted"));
                        }
                    }
                    saw_unary = Some(operator.as_str());
                    Expression::Unary(UnaryExpression {
                        span: self.finish(start),
                        operator,
                        argument: Box::new(argument),
                    })
                }
            }
        } else if saw_unary.is_none() && matches!(self.cur.kind, TokenKind::PrivateIdentifier(_)) {
            if for_head.no_in() || !self.private_names.in_class() {
                return Err(self.unexpected());
            }
            let id = self.parse_private_ident_ref()?;
            if !self.is(&TokenKind::In) {
                return Err(self.unexpected());
            }
            Expression::PrivateIdentifier(id)
        } else {
            let mut expr = self.parse_expr_subscripts(errors.as_deref_mut(), for_head)?;
            if self.check_expression_errors(errors.as_deref(), false)? {
                return Ok(expr);
            }
            while !self.can_insert_semicolon() {
                let operator = match self.cur.kind {
                    TokenKind::PlusPlus => UpdateOperator::Increment,
                    TokenKind::MinusMinus => UpdateOperator::Decrement,
                    _ => break,
                };
                self.check_lval_simple(&expr)?;
                self.next()?;
                expr = Expression::Update(UpdateExpression {
                    span: self.finish(start),
                    operator,
                    prefix: false,
                    argument: Box::new(expr),
                });
            }
            expr
        };

        if inc_dec || !self.is(&TokenKind::StarStar) || !self.has(Features::POW) {
            return Ok(expr);
        }
        if let Some(operator) = saw_unary {
            return Err(self.raise(
                start.offset,
                format!("Unary operator `{operator}` used immediately before exponentiation expression"),
            ));
        }
        self.next()?;
        let right = self.guarded(|p| p.parse_maybe_unary(None, None, false, for_head))?;
        self.build_binary(start, expr, right, BinaryOp::Binary(BinaryOperator::Exponent))
    }

    /// Outside async functions a top-level `await` only acts as an operator
    /// when something follows that could be its operand.
    fn await_has_operand(&mut self) -> bool {
        self.peek().is_some_and(|next| starts_expression(&next.kind))
    }

    fn parse_await(&mut self, for_head: ForHead) -> Result<Expression> {
        if self.await_pos.is_none() {
            self.await_pos = Some(self.cur.span.start);
        }
        let start = self.start_node();
        self.next()?;
        let argument = self.guarded(|p| p.parse_maybe_unary(None, Some("await"), false, for_head))?;
        Ok(Expression::Await(AwaitExpression {
            span: self.finish(start),
            argument: Box::new(argument),
        }))
    }

    // ------------------------------------------------------------------
    // Calls and member access
    // ------------------------------------------------------------------

    pub(super) fn parse_expr_subscripts(
        &mut self,
        errors: Option<&mut CoverErrors>,
        for_head: ForHead,
    ) -> Result<Expression> {
        let start = self.start_node();
        let mut errors = errors;
        let expr = self.parse_expr_atom(errors.as_deref_mut(), for_head, false)?;
        if matches!(expr, Expression::Arrow(_)) && self.prev_text() != ")" {
            return Ok(expr);
        }
        let result = self.parse_subscripts(expr, start, false, for_head)?;
        if let (Some(errors), Expression::Member(member)) = (errors, &result) {
            let member_start = member.span.start;
            for pending in [
                &mut errors.parenthesized_assign,
                &mut errors.parenthesized_bind,
                &mut errors.trailing_comma,
            ] {
                if pending.is_some_and(|offset| offset >= member_start) {
                    *pending = None;
                }
            }
        }
        Ok(result)
    }

    /// Applies member accesses, calls and tagged templates to `base`.
    /// `no_calls` is set for the callee of `new`.
    pub(super) fn parse_subscripts(
        &mut self,
        mut base: Expression,
        start: Marker,
        no_calls: bool,
        for_head: ForHead,
    ) -> Result<Expression> {
        let base_span = base.span();
        let maybe_async_arrow = self.has(Features::ASYNC_AWAIT)
            && base.as_identifier() == Some("async")
            && self.prev_end == base_span.end
            && !self.can_insert_semicolon()
            && base_span.len() == 5
            && self.potential_arrow_at == Some(base_span.start);
        let mut optional_chained = false;
        loop {
            let step = self.parse_subscript(base, start, no_calls, maybe_async_arrow, optional_chained, for_head)?;
            optional_chained |= step.optional;
            if !step.progressed || matches!(step.expression, Expression::Arrow(_)) {
                if optional_chained && !matches!(step.expression, Expression::Arrow(_)) {
                    return Ok(Expression::Chain(ChainExpression {
                        span: self.finish(start),
                        expression: Box::new(step.expression),
                    }));
                }
                return Ok(step.expression);
            }
            base = step.expression;
        }
    }

    fn parse_subscript(
        &mut self,
        base: Expression,
        start: Marker,
        no_calls: bool,
        maybe_async_arrow: bool,
        optional_chained: bool,
        for_head: ForHead,
    ) -> Result<Subscript> {
        let optional = self.has(Features::OPT_EXPR) && self.eat(&TokenKind::QuestionDot)?;
        if no_calls && optional {
            return Err(self.raise(
                self.prev_start,
                "Optional chaining cannot appear in the callee of new expressions",
            ));
        }

        let computed = self.eat(&TokenKind::LeftBracket)?;
        if computed
            || (optional && !matches!(self.cur.kind, TokenKind::LeftParen | TokenKind::Template { .. }))
            || self.eat(&TokenKind::Dot)?
        {
            let property = if computed {
                let property = self.parse_expression()?;
                self.expect(&TokenKind::RightBracket)?;
                property
            } else if matches!(self.cur.kind, TokenKind::PrivateIdentifier(_)) && !matches!(base, Expression::Super(_)) {
                Expression::PrivateIdentifier(self.parse_private_ident_ref()?)
            } else {
                Expression::Identifier(self.parse_ident(true)?)
            };
            return Ok(Subscript {
                expression: Expression::Member(MemberExpression {
                    span: self.finish(start),
                    object: Box::new(base),
                    property: Box::new(property),
                    computed,
                    optional,
                }),
                progressed: true,
                optional,
            });
        }

        if !no_calls && self.eat(&TokenKind::LeftParen)? {
            let mut errors = CoverErrors::default();
            let old_yield = self.yield_pos.take();
            let old_await = self.await_pos.take();
            let old_await_ident = self.await_ident_pos.take();
            let arguments: Vec<ExprOrSpread> = self
                .parse_expr_list(&TokenKind::RightParen, true, false, Some(&mut errors))?
                .into_iter()
                .flatten()
                .collect();

            if maybe_async_arrow && !optional && !self.can_insert_semicolon() && self.eat(&TokenKind::Arrow)? {
                self.check_pattern_errors(Some(&errors), false)?;
                self.check_yield_await_in_default_params()?;
                if let Some(offset) = self.await_ident_pos {
                    return Err(self.raise(offset, "Cannot use 'await' as identifier inside an async function"));
                }
                self.yield_pos = old_yield;
                self.await_pos = old_await;
                self.await_ident_pos = old_await_ident;
                let params = arguments
                    .into_iter()
                    .map(|argument| match argument {
                        ExprOrSpread::Expression(expr) => ArrowParam::Expression(expr),
                        ExprOrSpread::Spread(spread) => ArrowParam::Spread(spread),
                    })
                    .collect();
                let arrow = self.parse_arrow_expression(start, params, true, for_head)?;
                return Ok(Subscript {
                    expression: arrow,
                    progressed: true,
                    optional: false,
                });
            }

            self.check_expression_errors(Some(&errors), true)?;
            self.yield_pos = old_yield.or(self.yield_pos);
            self.await_pos = old_await.or(self.await_pos);
            self.await_ident_pos = old_await_ident.or(self.await_ident_pos);
            return Ok(Subscript {
                expression: Expression::Call(CallExpression {
                    span: self.finish(start),
                    callee: Box::new(base),
                    arguments,
                    optional,
                }),
                progressed: true,
                optional,
            });
        }

        if matches!(self.cur.kind, TokenKind::Template { .. }) {
            if optional || optional_chained {
                return Err(self.raise(
                    self.cur.span.start,
                    "Optional chaining cannot appear in the tag of tagged template expressions",
                ));
            }
            let quasi = self.parse_template(true)?;
            return Ok(Subscript {
                expression: Expression::TaggedTemplate(TaggedTemplateExpression {
                    span: self.finish(start),
                    tag: Box::new(base),
                    quasi,
                }),
                progressed: true,
                optional: false,
            });
        }

        Ok(Subscript {
            expression: base,
            progressed: false,
            optional: false,
        })
    }

    /// Parses comma separated expressions up to and including `close`.
    pub(super) fn parse_expr_list(
        &mut self,
        close: &TokenKind,
        allow_trailing_comma: bool,
        allow_empty: bool,
        mut errors: Option<&mut CoverErrors>,
    ) -> Result<Vec<Option<ExprOrSpread>>> {
        let mut elements = Vec::new();
        let mut first = true;
        while !self.eat(close)? {
            if first {
                first = false;
            } else {
                self.expect(&TokenKind::Comma)?;
                if allow_trailing_comma && self.after_trailing_comma(close, false)? {
                    break;
                }
            }

            if allow_empty && self.is(&TokenKind::Comma) {
                elements.push(None);
            } else if self.is(&TokenKind::Ellipsis) {
                let spread = self.parse_spread(errors.as_deref_mut())?;
                if self.is(&TokenKind::Comma) {
                    if let Some(errors) = errors.as_deref_mut() {
                        errors.trailing_comma.get_or_insert(self.cur.span.start);
                    }
                }
                elements.push(Some(ExprOrSpread::Spread(spread)));
            } else {
                let expr = self.parse_maybe_assign(ForHead::No, errors.as_deref_mut())?;
                elements.push(Some(ExprOrSpread::Expression(expr)));
            }
        }
        Ok(elements)
    }

    fn parse_spread(&mut self, errors: Option<&mut CoverErrors>) -> Result<SpreadElement> {
        let start = self.start_node();
        self.next()?;
        let argument = self.parse_maybe_assign(ForHead::No, errors)?;
        Ok(SpreadElement {
            span: self.finish(start),
            argument,
        })
    }

    // ------------------------------------------------------------------
    // Primary expressions
    // ------------------------------------------------------------------

    /// Parses an atomic expression: literals, identifiers, parenthesized
    /// expressions and everything introduced by a keyword or bracket.
    pub(super) fn parse_expr_atom(
        &mut self,
        errors: Option<&mut CoverErrors>,
        for_head: ForHead,
        for_new: bool,
    ) -> Result<Expression> {
        if matches!(self.cur.kind, TokenKind::Slash | TokenKind::SlashEqual) {
            self.cur = self.scanner.relex_as_regex(&self.cur)?;
        }
        let can_be_arrow = self.potential_arrow_at == Some(self.cur.span.start);

        match self.cur.kind {
            TokenKind::Super => {
                let span = self.cur_span();
                if !self.scopes.allow_super() {
                    return Err(self.raise(span.start, "'super' keyword outside a method"));
                }
                self.next()?;
                if self.is(&TokenKind::LeftParen) && !self.scopes.allow_direct_super() {
                    return Err(self.raise(span.start, "super() call outside constructor of a subclass"));
                }
                if !matches!(self.cur.kind, TokenKind::Dot | TokenKind::LeftBracket | TokenKind::LeftParen) {
                    return Err(self.unexpected());
                }
                Ok(Expression::Super(span))
            }
            TokenKind::This => {
                let span = self.cur_span();
                self.next()?;
                Ok(Expression::This(span))
            }
            TokenKind::Identifier(_) => self.parse_identifier_atom(can_be_arrow, for_head),
            TokenKind::Number(_)
            | TokenKind::BigInt(_)
            | TokenKind::String(_)
            | TokenKind::RegExp { .. }
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Null => Ok(Expression::Literal(self.parse_literal()?)),
            TokenKind::LeftParen => {
                let paren_start = self.cur.span.start;
                let expr = self.parse_paren_and_distinguish(can_be_arrow, for_head)?;
                if let Some(errors) = errors {
                    if errors.parenthesized_assign.is_none() && !is_simple_assign_target(&expr) {
                        errors.parenthesized_assign = Some(paren_start);
                    }
                    errors.parenthesized_bind.get_or_insert(paren_start);
                }
                Ok(expr)
            }
            TokenKind::LeftBracket => self.guarded(|p| {
                let start = p.start_node();
                p.next()?;
                let elements = p.parse_expr_list(&TokenKind::RightBracket, true, true, errors)?;
                Ok(Expression::Array(ArrayExpression {
                    span: p.finish(start),
                    elements,
                }))
            }),
            TokenKind::LeftBrace => self.guarded(|p| p.parse_object(errors)),
            TokenKind::Function => {
                let start = self.start_node();
                self.next()?;
                let function = self.parse_function(start, FunctionKind::Expression, false)?;
                Ok(Expression::Function(Box::new(function)))
            }
            TokenKind::Class => Ok(Expression::Class(Box::new(self.parse_class(ClassKind::Expression)?))),
            TokenKind::New => self.guarded(|p| p.parse_new()),
            TokenKind::Template { .. } => Ok(Expression::TemplateLiteral(self.parse_template(false)?)),
            TokenKind::Import => self.parse_expr_import(for_new),
            TokenKind::LessThan if self.has(Features::JSX) => self.parse_jsx_element(),
            _ => Err(self.unexpected()),
        }
    }

    fn parse_identifier_atom(&mut self, can_be_arrow: bool, for_head: ForHead) -> Result<Expression> {
        let start = self.start_node();
        let escaped = self.cur.escaped;
        let id = self.parse_ident(false)?;
        let async_ok = self.has(Features::ASYNC_AWAIT) && !escaped && id.name == "async";

        if async_ok && !self.can_insert_semicolon() && self.is(&TokenKind::Function) {
            self.next()?;
            let function = self.parse_function(start, FunctionKind::Expression, true)?;
            return Ok(Expression::Function(Box::new(function)));
        }
        if can_be_arrow && !self.can_insert_semicolon() {
            if self.eat(&TokenKind::Arrow)? {
                let params = vec![ArrowParam::Expression(Expression::Identifier(id))];
                return self.parse_arrow_expression(start, params, false, for_head);
            }
            if async_ok
                && matches!(self.cur.kind, TokenKind::Identifier(_))
                && !(self.potential_arrow_in_for_await && self.is_contextual("of"))
            {
                let param = self.parse_ident(false)?;
                if self.can_insert_semicolon() || !self.eat(&TokenKind::Arrow)? {
                    return Err(self.unexpected());
                }
                let params = vec![ArrowParam::Expression(Expression::Identifier(param))];
                return self.parse_arrow_expression(start, params, true, for_head);
            }
        }
        Ok(Expression::Identifier(id))
    }

    /// Parses a literal token. Legacy octal syntax is rejected here in
    /// strict mode code.
    pub(super) fn parse_literal(&mut self) -> Result<Literal> {
        let span = self.cur_span();
        if self.strict {
            if let Some(offset) = self.cur.octal_at {
                let message = if matches!(self.cur.kind, TokenKind::Number(_)) {
                    "Invalid number"
                } else {
                    "Octal literal in strict mode"
                };
                return Err(self.raise(offset, message));
            }
        }
        let value = match &self.cur.kind {
            TokenKind::Number(n) => LiteralValue::Number(*n),
            TokenKind::BigInt(digits) => LiteralValue::BigInt(digits.clone()),
            TokenKind::String(s) => LiteralValue::String(s.clone()),
            TokenKind::RegExp { pattern, flags } => LiteralValue::RegExp {
                pattern: pattern.clone(),
                flags: flags.clone(),
            },
            TokenKind::True => LiteralValue::Boolean(true),
            TokenKind::False => LiteralValue::Boolean(false),
            TokenKind::Null => LiteralValue::Null,
            _ => return Err(self.unexpected()),
        };
        let raw = self.source[span.start..span.end].to_string();
        self.next()?;
        Ok(Literal { span, value, raw })
    }

    fn parse_paren_and_distinguish(&mut self, can_be_arrow: bool, for_head: ForHead) -> Result<Expression> {
        let start = self.start_node();
        self.next()?;
        let inner_start = self.start_node();
        let mut items = Vec::new();
        let mut errors = CoverErrors::default();
        let old_yield = self.yield_pos.take();
        let old_await = self.await_pos.take();
        let mut last_is_comma = false;
        let mut spread_start = None;
        let mut first = true;

        while !self.is(&TokenKind::RightParen) {
            if first {
                first = false;
            } else {
                self.expect(&TokenKind::Comma)?;
            }
            if self.after_trailing_comma(&TokenKind::RightParen, true)? {
                last_is_comma = true;
                break;
            }
            if self.is(&TokenKind::Ellipsis) {
                spread_start = Some(self.cur.span.start);
                items.push(ArrowParam::Rest(self.parse_rest_binding()?));
                if self.is(&TokenKind::Comma) {
                    return Err(self.raise(self.cur.span.start, "Comma is not permitted after the rest element"));
                }
                break;
            }
            items.push(ArrowParam::Expression(
                self.parse_maybe_assign(ForHead::No, Some(&mut errors))?,
            ));
        }
        let inner_end = self.prev_end;
        self.expect(&TokenKind::RightParen)?;

        if can_be_arrow && !self.can_insert_semicolon() && self.eat(&TokenKind::Arrow)? {
            self.check_pattern_errors(Some(&errors), false)?;
            self.check_yield_await_in_default_params()?;
            self.yield_pos = old_yield;
            self.await_pos = old_await;
            return self.parse_arrow_expression(start, items, false, for_head);
        }

        if items.is_empty() || last_is_comma {
            return Err(self.unexpected_at(self.prev_start));
        }
        if let Some(offset) = spread_start {
            return Err(self.unexpected_at(offset));
        }
        self.check_expression_errors(Some(&errors), true)?;
        self.yield_pos = old_yield.or(self.yield_pos);
        self.await_pos = old_await.or(self.await_pos);

        let mut expressions: Vec<Expression> = items
            .into_iter()
            .filter_map(|item| match item {
                ArrowParam::Expression(expr) => Some(expr),
                _ => None,
            })
            .collect();
        if expressions.len() == 1 {
            if let Some(expr) = expressions.pop() {
                return Ok(expr);
            }
        }
        Ok(Expression::Sequence(SequenceExpression {
            span: self.span_between(inner_start.offset, inner_end),
            expressions,
        }))
    }

    fn parse_new(&mut self) -> Result<Expression> {
        let start = self.start_node();
        let meta_span = self.cur_span();
        self.next()?;

        if self.is(&TokenKind::Dot) {
            if !self.has(Features::META_PROPERTY) {
                return Err(self.unexpected());
            }
            self.next()?;
            let escaped = self.cur.escaped;
            let property = self.parse_ident(true)?;
            if property.name != "target" {
                return Err(self.raise(
                    property.span.start,
                    "The only valid meta property for new is `new.target`",
                ));
            }
            if escaped {
                return Err(self.raise(start.offset, "'new.target' must not contain escaped characters"));
            }
            if !self.scopes.allow_new_target() {
                return Err(self.raise(
                    start.offset,
                    "'new.target' can only be used in functions and class static block",
                ));
            }
            return Ok(Expression::MetaProperty(MetaProperty {
                span: self.finish(start),
                meta: Identifier {
                    span: meta_span,
                    name: "new".to_string(),
                },
                property,
            }));
        }

        let callee_start = self.start_node();
        let atom = self.parse_expr_atom(None, ForHead::No, true)?;
        let callee = self.parse_subscripts(atom, callee_start, true, ForHead::No)?;
        let arguments = if self.eat(&TokenKind::LeftParen)? {
            self.parse_expr_list(&TokenKind::RightParen, true, false, None)?
                .into_iter()
                .flatten()
                .collect()
        } else {
            Vec::new()
        };
        Ok(Expression::New(NewExpression {
            span: self.finish(start),
            callee: Box::new(callee),
            arguments,
        }))
    }

    /// `import(source)` or `import.meta`.
    fn parse_expr_import(&mut self, for_new: bool) -> Result<Expression> {
        let start = self.start_node();
        let meta_span = self.cur_span();
        self.next()?;

        match self.cur.kind {
            TokenKind::LeftParen => {
                if for_new {
                    return Err(self.raise(start.offset, "Cannot use new with import()"));
                }
                if !self.has(Features::DYNAMIC_IMPORT) {
                    return Err(self.unexpected_at(start.offset));
                }
                self.next()?;
                let source = self.parse_maybe_assign(ForHead::No, None)?;
                if !self.eat(&TokenKind::RightParen)? {
                    let error_at = self.cur.span.start;
                    if self.eat(&TokenKind::Comma)? && self.eat(&TokenKind::RightParen)? {
                        return Err(self.raise(error_at, "Trailing comma is not allowed in import()"));
                    }
                    return Err(self.unexpected_at(error_at));
                }
                Ok(Expression::Import(ImportExpression {
                    span: self.finish(start),
                    source: Box::new(source),
                }))
            }
            TokenKind::Dot => {
                if !self.has(Features::META_PROPERTY) {
                    return Err(self.unexpected());
                }
                self.next()?;
                let escaped = self.cur.escaped;
                let property = self.parse_ident(true)?;
                if property.name != "meta" {
                    return Err(self.raise(
                        property.span.start,
                        "The only valid meta property for import is `import.meta`",
                    ));
                }
                if escaped {
                    return Err(self.raise(start.offset, "'import.meta' must not contain escaped characters"));
                }
                if !self.in_module {
                    return Err(self.raise(start.offset, "Cannot use 'import.meta' outside a module"));
                }
                Ok(Expression::MetaProperty(MetaProperty {
                    span: self.finish(start),
                    meta: Identifier {
                        span: meta_span,
                        name: "import".to_string(),
                    },
                    property,
                }))
            }
            _ => Err(self.unexpected()),
        }
    }

    // ------------------------------------------------------------------
    // Templates
    // ------------------------------------------------------------------

    /// Parses a template literal starting at the current template token.
    pub(super) fn parse_template(&mut self, tagged: bool) -> Result<TemplateLiteral> {
        let start = self.start_node();
        let mut quasis = Vec::new();
        let mut expressions = Vec::new();
        loop {
            let TokenKind::Template {
                cooked,
                raw,
                tail,
                invalid_escape,
            } = &self.cur.kind
            else {
                return Err(self.unexpected());
            };
            if let Some((offset, message)) = invalid_escape {
                if !tagged || !self.has(Features::BAD_ESCAPE_IN_TAGGED_TPL) {
                    return Err(self.raise(*offset, *message));
                }
            }
            let tail = *tail;
            let text_start = self.cur.span.start + 1;
            let text_end = self.cur.span.end - if tail { 1 } else { 2 };
            quasis.push(TemplateElement {
                span: self.span_between(text_start, text_end),
                tail,
                cooked: cooked.clone(),
                raw: raw.clone(),
            });
            self.next()?;
            if tail {
                break;
            }
            expressions.push(self.parse_expression()?);
            if !self.is(&TokenKind::RightBrace) {
                return Err(self.unexpected());
            }
            self.cur = self.scanner.relex_template_continuation(&self.cur)?;
        }
        Ok(TemplateLiteral {
            span: self.finish(start),
            quasis,
            expressions,
        })
    }

    // ------------------------------------------------------------------
    // Object literals
    // ------------------------------------------------------------------

    fn parse_object(&mut self, mut errors: Option<&mut CoverErrors>) -> Result<Expression> {
        let start = self.start_node();
        self.next()?;
        let mut properties = Vec::new();
        let mut has_proto = false;
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
            let property = self.parse_property(errors.as_deref_mut())?;
            self.check_prop_clash(&property, &mut has_proto, errors.as_deref_mut())?;
            properties.push(property);
        }
        Ok(Expression::Object(ObjectExpression {
            span: self.finish(start),
            properties,
        }))
    }

    fn parse_property(&mut self, mut errors: Option<&mut CoverErrors>) -> Result<ObjectProperty> {
        let start = self.start_node();
        if self.is(&TokenKind::Ellipsis) {
            if !self.has(Features::SPREAD) {
                return Err(self.unexpected());
            }
            let spread = self.parse_spread(errors.as_deref_mut())?;
            if self.is(&TokenKind::Comma) {
                if let Some(errors) = errors {
                    errors.trailing_comma.get_or_insert(self.cur.span.start);
                }
            }
            return Ok(ObjectProperty::Spread(spread));
        }

        let mut is_generator = self.eat(&TokenKind::Star)?;
        let mut escaped = self.cur.escaped;
        let (mut key, mut computed) = self.parse_property_name()?;
        let mut is_async = false;
        if !escaped && !is_generator && self.is_async_property(&key, computed) {
            is_async = true;
            is_generator = self.eat(&TokenKind::Star)?;
            if is_generator && !self.has(Features::ASYNC_GENERATOR) {
                return Err(self.unexpected_at(self.prev_start));
            }
            escaped = self.cur.escaped;
            (key, computed) = self.parse_property_name()?;
        }

        if (is_generator || is_async) && self.is(&TokenKind::Colon) {
            return Err(self.unexpected());
        }

        if self.eat(&TokenKind::Colon)? {
            let value = self.parse_maybe_assign(ForHead::No, errors)?;
            return Ok(ObjectProperty::Property(Property {
                span: self.finish(start),
                key,
                value,
                kind: PropertyKind::Init,
                method: false,
                shorthand: false,
                computed,
            }));
        }

        if self.is(&TokenKind::LeftParen) {
            let value = self.parse_method(is_generator, is_async, false)?;
            return Ok(ObjectProperty::Property(Property {
                span: self.finish(start),
                key,
                value: Expression::Function(Box::new(value)),
                kind: PropertyKind::Init,
                method: true,
                shorthand: false,
                computed,
            }));
        }

        let accessor = match key.as_identifier() {
            Some("get") => Some(PropertyKind::Get),
            Some("set") => Some(PropertyKind::Set),
            _ => None,
        };
        if let Some(kind) = accessor.filter(|_| {
            !escaped
                && !computed
                && !matches!(self.cur.kind, TokenKind::Comma | TokenKind::RightBrace | TokenKind::Equal)
        }) {
            if is_generator || is_async {
                return Err(self.unexpected());
            }
            let (key, computed) = self.parse_property_name()?;
            let value = self.parse_method(false, false, false)?;
            self.check_accessor_params(kind == PropertyKind::Get, &value)?;
            return Ok(ObjectProperty::Property(Property {
                span: self.finish(start),
                key,
                value: Expression::Function(Box::new(value)),
                kind,
                method: false,
                shorthand: false,
                computed,
            }));
        }

        let id = match (&key, computed) {
            (Expression::Identifier(id), false) if !is_generator && !is_async => id.clone(),
            _ => return Err(self.unexpected()),
        };
        self.check_unreserved(&id)?;
        if id.name == "await" && self.await_ident_pos.is_none() {
            self.await_ident_pos = Some(start.offset);
        }
        let value = match errors {
            Some(errors) if self.is(&TokenKind::Equal) => {
                errors.shorthand_assign.get_or_insert(self.cur.span.start);
                self.next()?;
                let right = self.parse_maybe_assign(ForHead::No, None)?;
                Expression::Assignment(AssignmentExpression {
                    span: self.finish(start),
                    operator: AssignmentOperator::Assign,
                    left: Box::new(Pattern::Identifier(id)),
                    right: Box::new(right),
                })
            }
            _ => Expression::Identifier(id),
        };
        Ok(ObjectProperty::Property(Property {
            span: self.finish(start),
            key,
            value,
            kind: PropertyKind::Init,
            method: false,
            shorthand: true,
            computed: false,
        }))
    }

    fn is_async_property(&self, key: &Expression, computed: bool) -> bool {
        self.has(Features::ASYNC_AWAIT)
            && !computed
            && key.as_identifier() == Some("async")
            && !self.cur.newline_before
            && (matches!(
                self.cur.kind,
                TokenKind::Identifier(_)
                    | TokenKind::Number(_)
                    | TokenKind::String(_)
                    | TokenKind::BigInt(_)
                    | TokenKind::LeftBracket
                    | TokenKind::Star
            ) || self.cur.kind.is_keyword())
    }

    /// Parses a property key. Returns the key and whether it was computed.
    pub(super) fn parse_property_name(&mut self) -> Result<(Expression, bool)> {
        if self.eat(&TokenKind::LeftBracket)? {
            let key = self.parse_maybe_assign(ForHead::No, None)?;
            self.expect(&TokenKind::RightBracket)?;
            return Ok((key, true));
        }
        let key = match self.cur.kind {
            TokenKind::Number(_) | TokenKind::String(_) | TokenKind::BigInt(_) => {
                Expression::Literal(self.parse_literal()?)
            }
            _ => Expression::Identifier(self.parse_ident(true)?),
        };
        Ok((key, false))
    }

    pub(super) fn check_accessor_params(&self, is_getter: bool, function: &Function) -> Result<()> {
        let start = function.span.start;
        if is_getter {
            if !function.params.is_empty() {
                return Err(self.raise(start, "getter should have no params"));
            }
            return Ok(());
        }
        match function.params.as_slice() {
            [Pattern::Rest(rest)] => Err(self.raise(rest.span.start, "Setter cannot use rest params")),
            [_] => Ok(()),
            _ => Err(self.raise(start, "setter should have exactly one param")),
        }
    }

    /// Reports a duplicate `__proto__: value` entry, or records it when the
    /// object may still become a pattern.
    fn check_prop_clash(
        &self,
        property: &ObjectProperty,
        has_proto: &mut bool,
        errors: Option<&mut CoverErrors>,
    ) -> Result<()> {
        let ObjectProperty::Property(property) = property else {
            return Ok(());
        };
        if property.computed || property.method || property.shorthand || property.kind != PropertyKind::Init {
            return Ok(());
        }
        let (name, offset) = match &property.key {
            Expression::Identifier(id) => (Some(id.name.as_str()), id.span.start),
            Expression::Literal(lit) => (lit.as_str(), lit.span.start),
            _ => return Ok(()),
        };
        if name != Some("__proto__") {
            return Ok(());
        }
        if *has_proto {
            match errors {
                Some(errors) => {
                    errors.double_proto.get_or_insert(offset);
                }
                None => return Err(self.raise_early(offset, "Redefinition of __proto__ property")),
            }
        }
        *has_proto = true;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Identifiers
    // ------------------------------------------------------------------

    /// Parses an identifier. With `liberal`, reserved words are accepted
    /// as names (property names, meta properties).
    pub(super) fn parse_ident(&mut self, liberal: bool) -> Result<Identifier> {
        let span = self.cur_span();
        let name = match &self.cur.kind {
            TokenKind::Identifier(name) => name.clone(),
            kind => match kind.keyword_text() {
                Some(text) => text.to_string(),
                None => return Err(self.unexpected()),
            },
        };
        if liberal {
            self.next_liberal()?;
            return Ok(Identifier { span, name });
        }
        let id = Identifier { span, name };
        self.check_unreserved(&id)?;
        self.next()?;
        if id.name == "await" && self.await_ident_pos.is_none() {
            self.await_ident_pos = Some(id.span.start);
        }
        Ok(id)
    }

    /// Rejects names that cannot be identifier references or bindings in
    /// the current context.
    pub(super) fn check_unreserved(&self, id: &Identifier) -> Result<()> {
        let name = id.name.as_str();
        let start = id.span.start;
        if self.scopes.in_generator() && name == "yield" {
            return Err(self.raise(start, "Cannot use 'yield' as identifier inside a generator"));
        }
        if self.scopes.in_async() && name == "await" {
            return Err(self.raise(start, "Cannot use 'await' as identifier inside an async function"));
        }
        if self.scopes.in_class_static_block() && (name == "arguments" || name == "await") {
            return Err(self.raise(start, format!("Cannot use {name} in class static initialization block")));
        }
        if self.scopes.in_class_field_init() && name == "arguments" {
            return Err(self.raise(start, "Cannot use 'arguments' in class field initializer"));
        }
        if TokenKind::from_keyword(name).is_some() {
            return Err(self.raise(start, format!("Unexpected keyword '{name}'")));
        }
        if name == "await" && self.in_module {
            return Err(self.raise_early(start, "Cannot use keyword 'await' outside an async function"));
        }
        if self.strict && is_strict_reserved(name) {
            return Err(self.raise_early(start, format!("The keyword '{name}' is reserved")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::ParserOptions;
    use crate::ast::*;
    use crate::error::ParseError;
    use crate::features::Features;
    use crate::parser::Parser;

    fn expr(src: &str) -> Expression {
        let program = Parser::new(src).parse_program().unwrap();
        match program.body.into_iter().next() {
            Some(Statement::Expression(stmt)) => stmt.expression,
            other => panic!("expected expression statement, got {other:?}"),
        }
    }

    fn parse_err(src: &str) -> ParseError {
        Parser::new(src).parse_program().unwrap_err()
    }

    fn script_expr(src: &str) -> Expression {
        let program = Parser::with_options(src, ParserOptions::script()).parse_program().unwrap();
        match program.body.into_iter().next() {
            Some(Statement::Expression(stmt)) => stmt.expression,
            other => panic!("expected expression statement, got {other:?}"),
        }
    }

    fn without(feature: Features) -> ParserOptions {
        ParserOptions {
            features: Features::default().off(feature),
            ..ParserOptions::default()
        }
    }

    #[test]
    fn test_parse_literals() {
        assert!(matches!(expr("42"), Expression::Literal(Literal { value: LiteralValue::Number(n), .. }) if n == 42.0));
        assert!(matches!(expr("'hi'"), Expression::Literal(Literal { value: LiteralValue::String(s), .. }) if s == "hi"));
        assert!(matches!(expr("true"), Expression::Literal(Literal { value: LiteralValue::Boolean(true), .. })));
        assert!(matches!(expr("null"), Expression::Literal(Literal { value: LiteralValue::Null, .. })));
        let Expression::Literal(big) = expr("12n") else {
            panic!("expected literal");
        };
        assert_eq!(big.value, LiteralValue::BigInt("12".into()));
        assert_eq!(big.raw, "12n");
    }

    #[test]
    fn test_binary_precedence() {
        let Expression::Binary(add) = expr("1 + 2 * 3") else {
            panic!("expected binary");
        };
        assert_eq!(add.operator, BinaryOperator::Add);
        assert!(matches!(*add.right, Expression::Binary(BinaryExpression { operator: BinaryOperator::Multiply, .. })));

        let Expression::Logical(or) = expr("a && b || c") else {
            panic!("expected logical");
        };
        assert_eq!(or.operator, LogicalOperator::Or);
        assert!(matches!(*or.left, Expression::Logical(_)));
    }

    #[test]
    fn test_exponent_is_right_associative() {
        let Expression::Binary(pow) = expr("2 ** 3 ** 2") else {
            panic!("expected binary");
        };
        assert_eq!(pow.operator, BinaryOperator::Exponent);
        assert!(matches!(*pow.right, Expression::Binary(_)));
        expr("(-2) ** 2");
    }

    #[test]
    fn test_unary_before_exponent() {
        let err = parse_err("delete o.p ** 2;");
        assert_eq!(err.message, "Unary operator `delete` used immediately before exponentiation expression");
        assert_eq!((err.line, err.column), (1, 7));
        assert!(parse_err("-x ** 2").message.contains("`-`"));
    }

    #[test]
    fn test_nullish_mixing() {
        let err = parse_err("a ?? b || c");
        assert_eq!(err.message, "Cannot use unparenthesized `??` within logic expressions");
        assert_eq!(err.column, 2);
        let err = parse_err("a || b ?? c");
        assert_eq!(err.column, 7);
        expr("(a ?? b) || c");
        expr("a ?? (b || c)");
    }

    #[test]
    fn test_regex_versus_division() {
        let Expression::Binary(div) = expr("a / b / c") else {
            panic!("expected division");
        };
        assert_eq!(div.operator, BinaryOperator::Divide);
        let Expression::Literal(regex) = expr("/a[/]b/gi") else {
            panic!("expected regex");
        };
        assert_eq!(
            regex.value,
            LiteralValue::RegExp {
                pattern: "a[/]b".into(),
                flags: "gi".into()
            }
        );
        assert!(matches!(expr("x = /=/"), Expression::Assignment(_)));
    }

    #[test]
    fn test_conditional_and_sequence() {
        assert!(matches!(expr("a ? b : c"), Expression::Conditional(_)));
        let Expression::Sequence(seq) = expr("(a, b)") else {
            panic!("expected sequence");
        };
        assert_eq!(seq.expressions.len(), 2);
        assert_eq!((seq.span.start, seq.span.end), (1, 5));
    }

    #[test]
    fn test_optional_chain_wrapping() {
        let Expression::Chain(chain) = expr("a?.b.c()") else {
            panic!("expected chain");
        };
        let Expression::Call(call) = *chain.expression else {
            panic!("expected call");
        };
        assert!(!call.optional);
        assert!(matches!(*call.callee, Expression::Member(_)));
        assert!(matches!(expr("a.b"), Expression::Member(_)));
        assert_eq!(
            parse_err("new a?.b()").message,
            "Optional chaining cannot appear in the callee of new expressions"
        );
        assert_eq!(
            parse_err("a?.b`t`").message,
            "Optional chaining cannot appear in the tag of tagged template expressions"
        );
    }

    #[test]
    fn test_arrow_functions() {
        let Expression::Arrow(arrow) = expr("(a, [b], ...c) => a") else {
            panic!("expected arrow");
        };
        assert_eq!(arrow.params.len(), 3);
        assert!(matches!(arrow.params[2], Pattern::Rest(_)));
        assert!(matches!(arrow.body, ArrowBody::Expression(_)));
        let Expression::Arrow(arrow) = expr("async x => { await x; }") else {
            panic!("expected async arrow");
        };
        assert!(arrow.is_async);
        let Expression::Arrow(arrow) = expr("async (a, b) => a") else {
            panic!("expected async arrow");
        };
        assert_eq!(arrow.params.len(), 2);
        assert!(matches!(expr("async(a, b)"), Expression::Call(_)));
        assert_eq!(parse_err("(a, b) \n => a").message, "Unexpected token");
    }

    #[test]
    fn test_arrow_parameter_errors() {
        let err = Parser::with_options("async (await) => 1", ParserOptions::script())
            .parse_program()
            .unwrap_err();
        assert_eq!(err.message, "Cannot use 'await' as identifier inside an async function");
        assert_eq!(parse_err("(a, a) => 1").message, "Argument name clash");
        assert_eq!(parse_err("function* g() { (a = yield) => 1 }").message, "Yield expression cannot be a default value");
    }

    #[test]
    fn test_template_literal() {
        let Expression::TemplateLiteral(template) = expr("`a${b}c${d}`") else {
            panic!("expected template");
        };
        assert_eq!(template.quasis.len(), 3);
        assert_eq!(template.expressions.len(), 2);
        assert_eq!((template.quasis[0].span.start, template.quasis[0].span.end), (1, 2));
        assert_eq!((template.quasis[1].span.start, template.quasis[1].span.end), (6, 7));
        assert!(template.quasis[2].tail);
        assert_eq!(template.quasis[2].cooked.as_deref(), Some(""));
    }

    #[test]
    fn test_invalid_escape_in_template() {
        let Expression::TaggedTemplate(tagged) = expr("tag`\\unicode`") else {
            panic!("expected tagged template");
        };
        assert_eq!(tagged.quasi.quasis[0].cooked, None);
        assert_eq!(tagged.quasi.quasis[0].raw, "\\unicode");
        assert!(parse_err("`\\unicode`").message.contains("escape"));
    }

    #[test]
    fn test_object_literal() {
        let Expression::Object(object) = expr("({ a, b: 1, [c]: 2, d() {}, get e() { return 1 }, set e(v) {}, async *f() {}, ...g })") else {
            panic!("expected object");
        };
        assert_eq!(object.properties.len(), 8);
        let ObjectProperty::Property(getter) = &object.properties[4] else {
            panic!("expected property");
        };
        assert_eq!(getter.kind, PropertyKind::Get);
        let ObjectProperty::Property(method) = &object.properties[6] else {
            panic!("expected property");
        };
        assert!(method.method);
        assert!(matches!(&method.value, Expression::Function(f) if f.is_async && f.is_generator));
    }

    #[test]
    fn test_accessor_param_errors() {
        assert_eq!(parse_err("({ get a(x) {} })").message, "getter should have no params");
        assert_eq!(parse_err("({ set a() {} })").message, "setter should have exactly one param");
        assert_eq!(parse_err("({ set a(...x) {} })").message, "Setter cannot use rest params");
    }

    #[test]
    fn test_duplicate_proto() {
        let err = parse_err("({ __proto__: 1, '__proto__': 2 })");
        assert_eq!(err.message, "Redefinition of __proto__ property");
        assert_eq!(err.column, 17);
        expr("({ __proto__: 1, __proto__ })");
        expr("({ __proto__: a, __proto__: b } = c)");
    }

    #[test]
    fn test_delete_errors() {
        assert_eq!(parse_err("delete x;").message, "Deleting local variable in strict mode");
        script_expr("delete x");
        assert_eq!(
            parse_err("class A { #x; m() { delete this.#x; } }").message,
            "Private fields can not be deleted"
        );
    }

    #[test]
    fn test_update_targets() {
        assert!(matches!(expr("a++"), Expression::Update(UpdateExpression { prefix: false, .. })));
        assert!(matches!(expr("--a.b"), Expression::Update(UpdateExpression { prefix: true, .. })));
        assert_eq!(parse_err("a() ++").message, "Assigning to rvalue");
        assert_eq!(parse_err("++a()").message, "Assigning to rvalue");
    }

    #[test]
    fn test_super_and_meta_property_errors() {
        assert_eq!(parse_err("super.x").message, "'super' keyword outside a method");
        assert_eq!(
            parse_err("({ m() { super(); } })").message,
            "super() call outside constructor of a subclass"
        );
        assert_eq!(
            parse_err("new.target").message,
            "'new.target' can only be used in functions and class static block"
        );
        assert_eq!(
            parse_err("function f() { new.foo }").message,
            "The only valid meta property for new is `new.target`"
        );
        let script = Parser::with_options("import.meta", ParserOptions::script()).parse_program();
        assert_eq!(script.unwrap_err().message, "Cannot use 'import.meta' outside a module");
    }

    #[test]
    fn test_dynamic_import() {
        assert!(matches!(expr("import('a')"), Expression::Import(_)));
        assert_eq!(parse_err("import('a',)").message, "Trailing comma is not allowed in import()");
        assert_eq!(parse_err("new import('a')").message, "Cannot use new with import()");
    }

    #[test]
    fn test_await_and_yield() {
        assert!(matches!(expr("await x"), Expression::Await(_)));
        assert!(matches!(script_expr("await"), Expression::Identifier(_)));
        assert!(matches!(script_expr("await x"), Expression::Await(_)));
        let script = ParserOptions::script();
        let sync_top = script.with_features(script.features.off(Features::GLOBAL_ASYNC));
        let program = Parser::with_options("await\nx", sync_top).parse_program().unwrap();
        assert_eq!(program.body.len(), 2);
        assert!(
            matches!(&program.body[0], Statement::Expression(stmt) if matches!(stmt.expression, Expression::Identifier(_)))
        );
        let program = Parser::new("function* g() { yield; yield* a; }").parse_program().unwrap();
        let Statement::FunctionDeclaration(g) = &program.body[0] else {
            panic!("expected function");
        };
        assert_eq!(g.body.body.len(), 2);
        assert_eq!(
            parse_err("function* g() { var yield; }").message,
            "Cannot use 'yield' as identifier inside a generator"
        );
    }

    #[test]
    fn test_reserved_identifiers() {
        assert_eq!(parse_err("var if = 1;").message, "Unexpected keyword 'if'");
        assert_eq!(parse_err("var package;").message, "The keyword 'package' is reserved");
        assert_eq!(
            parse_err("var await;").message,
            "Cannot use keyword 'await' outside an async function"
        );
    }

    #[test]
    fn test_feature_gated_operators() {
        let err = Parser::with_options("a ** b", without(Features::POW)).parse_program().unwrap_err();
        assert_eq!(err.message, "Unexpected token");
        let err = Parser::with_options("a ?? b", without(Features::NULLISH)).parse_program().unwrap_err();
        assert_eq!(err.message, "Unexpected token");
        let err = Parser::with_options("a ||= b", without(Features::LOGIC_ASSIGN)).parse_program().unwrap_err();
        assert_eq!(err.message, "Unexpected token");
        let err = Parser::with_options("a?.b", without(Features::OPT_EXPR)).parse_program().unwrap_err();
        assert_eq!(err.message, "Unexpected token");
    }

    #[test]
    fn test_private_in() {
        let program = Parser::new("class A { #x; static has(o) { return #x in o; } }").parse_program();
        assert!(program.is_ok());
        assert_eq!(parse_err("#x in o").message, "Unexpected token");
    }
}
