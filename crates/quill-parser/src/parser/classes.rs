//! Class declarations and expressions.
//!
//! Class bodies are always strict. Private names are collected per class
//! body and resolved when the body closes, so a method may refer to a
//! private field declared after it.

use super::parser::{ForHead, Marker, Parser};
use super::scope::{BindingKind, PrivateMember, ScopeFlags};
use crate::ast::*;
use crate::error::Result;
use crate::features::Features;
use crate::lexer::TokenKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ClassKind {
    Expression,
    Declaration,
    /// `export default class`, where the name is optional.
    DefaultExport,
}

/// A non-computed key spelled `name`, as an identifier or a string.
fn key_is(key: &Expression, computed: bool, name: &str) -> bool {
    if computed {
        return false;
    }
    match key {
        Expression::Identifier(id) => id.name == name,
        Expression::Literal(lit) => lit.as_str() == Some(name),
        _ => false,
    }
}

/// Modifiers read before a class element's name.
struct ElementHead {
    start: Marker,
    is_static: bool,
    is_async: bool,
    is_generator: bool,
    kind: MethodKind,
}

impl Parser<'_> {
    /// Parses a class starting at the `class` keyword.
    pub(super) fn parse_class(&mut self, kind: ClassKind) -> Result<Class> {
        let start = self.start_node();
        self.next()?;
        let old_strict = self.strict;
        self.strict = true;
        let result = self.guarded(|p| p.parse_class_rest(start, kind));
        self.strict = old_strict;
        result
    }

    fn parse_class_rest(&mut self, start: Marker, kind: ClassKind) -> Result<Class> {
        let id = if matches!(self.cur.kind, TokenKind::Identifier(_)) {
            let id = self.parse_ident(false)?;
            if kind == ClassKind::Declaration || kind == ClassKind::DefaultExport {
                self.check_identifier_lval(&id, Some(BindingKind::Lexical), None)?;
            }
            Some(id)
        } else {
            if kind == ClassKind::Declaration {
                return Err(self.unexpected());
            }
            None
        };

        let super_class = if self.eat(&TokenKind::Extends)? {
            Some(Box::new(self.parse_expr_subscripts(None, ForHead::No)?))
        } else {
            None
        };

        self.private_names.enter_class_body();
        let body = self.parse_class_body(super_class.is_some());
        let exited = self.private_names.exit_class_body();
        let body = body?;
        exited.map_err(|(error, offset)| self.scope_error(error, offset))?;

        Ok(Class {
            span: self.finish(start),
            id,
            super_class,
            body,
        })
    }

    fn parse_class_body(&mut self, has_super: bool) -> Result<ClassBody> {
        let start = self.start_node();
        self.expect(&TokenKind::LeftBrace)?;
        let mut body = Vec::new();
        let mut had_constructor = false;
        while !self.is(&TokenKind::RightBrace) {
            let Some(element) = self.parse_class_element(has_super)? else {
                continue;
            };
            match &element {
                ClassElement::Method(method) if method.kind == MethodKind::Constructor => {
                    if had_constructor {
                        return Err(self.raise_early(method.span.start, "Duplicate constructor in the same class"));
                    }
                    had_constructor = true;
                }
                ClassElement::Method(MethodDefinition {
                    key: Expression::PrivateIdentifier(key),
                    kind,
                    is_static,
                    ..
                }) => {
                    let member = match kind {
                        MethodKind::Get => PrivateMember::Getter { is_static: *is_static },
                        MethodKind::Set => PrivateMember::Setter { is_static: *is_static },
                        _ => PrivateMember::Method,
                    };
                    self.declare_private(key, member)?;
                }
                ClassElement::Property(PropertyDefinition {
                    key: Expression::PrivateIdentifier(key),
                    ..
                }) => self.declare_private(key, PrivateMember::Field)?,
                _ => {}
            }
            body.push(element);
        }
        self.next()?;
        Ok(ClassBody {
            span: self.finish(start),
            body,
        })
    }

    fn declare_private(&mut self, key: &PrivateIdentifier, member: PrivateMember) -> Result<()> {
        self.private_names
            .declare(&key.name, member)
            .map_err(|error| self.scope_error(error, key.span.start))
    }

    /// Something that can name a class element follows.
    fn is_class_element_name_start(&self) -> bool {
        matches!(
            self.cur.kind,
            TokenKind::Identifier(_)
                | TokenKind::PrivateIdentifier(_)
                | TokenKind::Number(_)
                | TokenKind::BigInt(_)
                | TokenKind::String(_)
                | TokenKind::LeftBracket
        ) || self.cur.kind.is_keyword()
    }

    fn parse_class_element(&mut self, has_super: bool) -> Result<Option<ClassElement>> {
        if self.eat(&TokenKind::Semicolon)? {
            return Ok(None);
        }
        let mut head = ElementHead {
            start: self.start_node(),
            is_static: false,
            is_async: false,
            is_generator: false,
            kind: MethodKind::Method,
        };
        // A modifier word that turned out to be the element's name.
        let mut key_name: Option<&'static str> = None;

        if ["static", "async", "get", "set"].iter().any(|word| self.is_escaped_contextual(word))
            && self.peek().is_some_and(|next| {
                !next.newline_before
                    && (next.kind.is_keyword()
                        || matches!(
                            next.kind,
                            TokenKind::Identifier(_)
                                | TokenKind::PrivateIdentifier(_)
                                | TokenKind::Number(_)
                                | TokenKind::BigInt(_)
                                | TokenKind::String(_)
                                | TokenKind::LeftBracket
                                | TokenKind::Star
                                | TokenKind::LeftBrace
                        ))
            })
        {
            return Err(self.escaped_keyword());
        }

        if self.eat_contextual("static")? {
            if self.is(&TokenKind::LeftBrace) && self.has(Features::CLASS_STATIC_BLOCK) {
                return self.parse_class_static_block(head.start).map(Some);
            }
            if self.is_class_element_name_start() || self.is(&TokenKind::Star) {
                head.is_static = true;
            } else {
                key_name = Some("static");
            }
        }
        if key_name.is_none() && self.has(Features::ASYNC_AWAIT) && self.eat_contextual("async")? {
            if (self.is_class_element_name_start() || self.is(&TokenKind::Star)) && !self.can_insert_semicolon() {
                head.is_async = true;
            } else {
                key_name = Some("async");
            }
        }
        if key_name.is_none()
            && (!head.is_async || self.has(Features::ASYNC_GENERATOR))
            && self.eat(&TokenKind::Star)?
        {
            head.is_generator = true;
        }
        if key_name.is_none() && !head.is_async && !head.is_generator {
            for (word, kind) in [("get", MethodKind::Get), ("set", MethodKind::Set)] {
                if self.eat_contextual(word)? {
                    if self.is_class_element_name_start() {
                        head.kind = kind;
                    } else {
                        key_name = Some(word);
                    }
                    break;
                }
            }
        }

        let (key, computed) = match key_name {
            Some(name) => {
                let key = Identifier {
                    span: self.span_between(self.prev_start, self.prev_end),
                    name: name.to_string(),
                };
                (Expression::Identifier(key), false)
            }
            None => self.parse_class_element_name()?,
        };

        let element = if self.is(&TokenKind::LeftParen)
            || head.kind != MethodKind::Method
            || head.is_generator
            || head.is_async
        {
            self.parse_class_method(head, key, computed, has_super)?
        } else {
            self.parse_class_field(head, key, computed)?
        };
        Ok(Some(element))
    }

    fn parse_class_element_name(&mut self) -> Result<(Expression, bool)> {
        if let TokenKind::PrivateIdentifier(name) = &self.cur.kind {
            if name == "constructor" {
                return Err(self.raise(
                    self.cur.span.start,
                    "Classes can't have an element named '#constructor'",
                ));
            }
            return Ok((Expression::PrivateIdentifier(self.parse_private_name()?), false));
        }
        self.parse_property_name()
    }

    fn parse_class_method(
        &mut self,
        head: ElementHead,
        key: Expression,
        computed: bool,
        has_super: bool,
    ) -> Result<ClassElement> {
        let key_start = key.span().start;
        let is_constructor = !head.is_static && key_is(&key, computed, "constructor");
        if is_constructor {
            if head.kind != MethodKind::Method {
                return Err(self.raise(key_start, "Constructor can't have get/set modifier"));
            }
            if head.is_generator {
                return Err(self.raise(key_start, "Constructor can't be a generator"));
            }
            if head.is_async {
                return Err(self.raise(key_start, "Constructor can't be an async method"));
            }
        } else if head.is_static && key_is(&key, computed, "prototype") {
            return Err(self.raise(key_start, "Classes may not have a static property named prototype"));
        }

        let kind = if is_constructor { MethodKind::Constructor } else { head.kind };
        let value = self.parse_method(head.is_generator, head.is_async, is_constructor && has_super)?;
        match kind {
            MethodKind::Get => self.check_accessor_params(true, &value)?,
            MethodKind::Set => self.check_accessor_params(false, &value)?,
            _ => {}
        }
        Ok(ClassElement::Method(MethodDefinition {
            span: self.finish(head.start),
            key,
            value: Box::new(value),
            kind,
            computed,
            is_static: head.is_static,
        }))
    }

    fn parse_class_field(&mut self, head: ElementHead, key: Expression, computed: bool) -> Result<ClassElement> {
        let key_start = key.span().start;
        if !matches!(key, Expression::PrivateIdentifier(_)) && !self.has(Features::CLASS_PUB_FIELD) {
            return Err(self.unexpected());
        }
        if key_is(&key, computed, "constructor") {
            return Err(self.raise(key_start, "Classes can't have a field named 'constructor'"));
        }
        if head.is_static && key_is(&key, computed, "prototype") {
            return Err(self.raise(key_start, "Classes can't have a static field named 'prototype'"));
        }
        let value = if self.eat(&TokenKind::Equal)? {
            let flags = ScopeFlags::CLASS_FIELD_INIT | ScopeFlags::SUPER;
            Some(self.with_scope(flags, |p| p.parse_maybe_assign(ForHead::No, None))?)
        } else {
            None
        };
        self.semicolon()?;
        Ok(ClassElement::Property(PropertyDefinition {
            span: self.finish(head.start),
            key,
            value,
            computed,
            is_static: head.is_static,
        }))
    }

    /// `static { ... }`, with the current token at the brace.
    fn parse_class_static_block(&mut self, start: Marker) -> Result<ClassElement> {
        self.next()?;
        let old_labels = std::mem::take(&mut self.labels);
        let body = self.with_scope(ScopeFlags::CLASS_STATIC_BLOCK | ScopeFlags::SUPER, |p| {
            let mut body = Vec::new();
            while !p.is(&TokenKind::RightBrace) {
                body.push(p.parse_statement(None, false)?);
            }
            Ok(body)
        });
        self.labels = old_labels;
        let body = body?;
        self.next()?;
        Ok(ClassElement::StaticBlock(StaticBlock {
            span: self.finish(start),
            body,
        }))
    }

    /// Parses `#name` as the key of a class element.
    fn parse_private_name(&mut self) -> Result<PrivateIdentifier> {
        if !self.has(Features::CLASS_PRIV) {
            return Err(self.unexpected());
        }
        let TokenKind::PrivateIdentifier(name) = &self.cur.kind else {
            return Err(self.unexpected());
        };
        let id = PrivateIdentifier {
            span: self.cur_span(),
            name: name.clone(),
        };
        self.next()?;
        Ok(id)
    }

    /// Parses a reference to `#name`, which must be declared by an
    /// enclosing class.
    pub(super) fn parse_private_ident_ref(&mut self) -> Result<PrivateIdentifier> {
        let id = self.parse_private_name()?;
        self.private_names
            .resolve_private_name(&id.name, id.span.start)
            .map_err(|error| self.scope_error(error, id.span.start))?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use crate::ParserOptions;
    use crate::ast::*;
    use crate::error::ParseError;
    use crate::features::Features;
    use crate::parser::Parser;

    fn parse_ok(src: &str) -> Program {
        Parser::new(src).parse_program().unwrap()
    }

    fn parse_err(src: &str) -> ParseError {
        Parser::new(src).parse_program().unwrap_err()
    }

    fn class_body(program: &Program) -> &[ClassElement] {
        match &program.body[0] {
            Statement::ClassDeclaration(class) => &class.body.body,
            other => panic!("expected class declaration, got {other:?}"),
        }
    }

    #[test]
    fn test_class_elements() {
        let program = parse_ok(
            "class A extends B {
                constructor() { super(); }
                static create() {}
                get x() { return this.#x; }
                set x(v) {}
                async *gen() {}
                #x = 1;
                static y;
                'quoted'() {}
                [computed] = 2;
                static { this.y = 3; }
            }",
        );
        let body = class_body(&program);
        assert_eq!(body.len(), 10);
        assert!(matches!(&body[0], ClassElement::Method(m) if m.kind == MethodKind::Constructor));
        assert!(matches!(&body[1], ClassElement::Method(m) if m.is_static));
        assert!(matches!(&body[2], ClassElement::Method(m) if m.kind == MethodKind::Get));
        assert!(matches!(&body[5], ClassElement::Property(p) if matches!(p.key, Expression::PrivateIdentifier(_))));
        assert!(matches!(&body[8], ClassElement::Property(p) if p.computed));
        assert!(matches!(&body[9], ClassElement::StaticBlock(_)));
    }

    #[test]
    fn test_modifier_words_as_names() {
        let program = parse_ok("class A { static; async; get; set = 1; static static() {} async\n m() {} }");
        let body = class_body(&program);
        let names: Vec<_> = body
            .iter()
            .map(|element| match element {
                ClassElement::Property(p) => p.key.as_identifier().map(str::to_owned),
                ClassElement::Method(m) => m.key.as_identifier().map(str::to_owned),
                ClassElement::StaticBlock(_) => None,
            })
            .collect();
        assert_eq!(
            names,
            ["static", "async", "get", "set", "static", "async", "m"].map(|s| Some(s.to_string()))
        );
    }

    #[test]
    fn test_escaped_modifiers() {
        let message = "Keyword must not contain escaped characters";
        assert_eq!(parse_err("class A { st\\u0061tic m() {} }").message, message);
        assert_eq!(parse_err("class A { \\u0061sync m() {} }").message, message);
        assert_eq!(parse_err("class A { g\\u0065t x() {} }").message, message);
        let program = parse_ok("class A { st\\u0061tic() {} s\\u0065t = 1; \\u0061sync\n m() {} }");
        let body = class_body(&program);
        assert_eq!(body.len(), 3);
        assert!(matches!(&body[0], ClassElement::Method(m) if !m.is_static && m.key.as_identifier() == Some("static")));
        assert!(matches!(&body[1], ClassElement::Property(p) if p.key.as_identifier() == Some("set")));
    }

    #[test]
    fn test_constructor_errors() {
        assert_eq!(
            parse_err("class A { constructor() {} constructor() {} }").message,
            "Duplicate constructor in the same class"
        );
        assert_eq!(parse_err("class A { get constructor() {} }").message, "Constructor can't have get/set modifier");
        assert_eq!(parse_err("class A { *constructor() {} }").message, "Constructor can't be a generator");
        assert_eq!(parse_err("class A { async constructor() {} }").message, "Constructor can't be an async method");
        assert_eq!(
            parse_err("class A { constructor() { super(); } }").message,
            "super() call outside constructor of a subclass"
        );
        parse_ok("class A { static constructor() {} }");
    }

    #[test]
    fn test_reserved_element_names() {
        assert_eq!(
            parse_err("class A { #constructor() {} }").message,
            "Classes can't have an element named '#constructor'"
        );
        assert_eq!(
            parse_err("class A { static prototype() {} }").message,
            "Classes may not have a static property named prototype"
        );
        assert_eq!(
            parse_err("class A { constructor = 1 }").message,
            "Classes can't have a field named 'constructor'"
        );
        assert_eq!(
            parse_err("class A { static 'prototype' = 1 }").message,
            "Classes can't have a static field named 'prototype'"
        );
        parse_ok("class A { prototype() {} static ['prototype'] = 1 }");
    }

    #[test]
    fn test_private_names() {
        parse_ok("class A { m() { return this.#later; } #later; }");
        parse_ok("class A { get #a() {} set #a(v) {} }");
        let err = parse_err("class A { #a; #a; }");
        assert_eq!(err.message, "Identifier '#a' has already been declared");
        assert_eq!(err.column, 14);
        assert_eq!(
            parse_err("class A { static get #a() {} set #a(v) {} }").message,
            "Identifier '#a' has already been declared"
        );
        let err = parse_err("class A { m() { this.#missing; } }");
        assert_eq!(err.message, "Private field '#missing' must be declared in an enclosing class");
        assert_eq!(err.column, 21);
        parse_ok("class A { #x; m() { class B { n(o) { return o.#x; } } } }");
        assert_eq!(
            parse_err("this.#x").message,
            "Private field '#x' must be declared in an enclosing class"
        );
    }

    #[test]
    fn test_field_initializer_context() {
        assert_eq!(
            parse_err("class A { x = arguments; }").message,
            "Cannot use 'arguments' in class field initializer"
        );
        parse_ok("class A { x = function () { return arguments; }; y = super.z; }");
        assert_eq!(
            parse_err("class A { static { await; } }").message,
            "Cannot use await in class static initialization block"
        );
        assert_eq!(parse_err("class A { static { return; } }").message, "'return' outside of function");
    }

    #[test]
    fn test_class_is_strict() {
        let script = ParserOptions::script();
        Parser::with_options("with (a) {}", script).parse_program().unwrap();
        let err = Parser::with_options("class A { m() { with (a) {} } }", script)
            .parse_program()
            .unwrap_err();
        assert_eq!(err.message, "'with' in strict mode");
        let err = Parser::with_options("class yield {}", script).parse_program().unwrap_err();
        assert_eq!(err.message, "The keyword 'yield' is reserved");
    }

    #[test]
    fn test_class_expression() {
        let program = parse_ok("const A = class extends (B, C) {};");
        let Statement::VariableDeclaration(decl) = &program.body[0] else {
            panic!("expected declaration");
        };
        assert!(matches!(&decl.declarations[0].init, Some(Expression::Class(c)) if c.id.is_none()));
        assert_eq!(parse_err("class {}").message, "Unexpected token");
    }

    #[test]
    fn test_class_feature_gates() {
        let options = ParserOptions {
            features: Features::default().off(Features::CLASS_PUB_FIELD),
            ..ParserOptions::default()
        };
        let err = Parser::with_options("class A { x = 1 }", options).parse_program().unwrap_err();
        assert_eq!(err.message, "Unexpected token");
        let options = ParserOptions {
            features: Features::default().off(Features::CLASS_PRIV),
            ..ParserOptions::default()
        };
        assert!(Parser::with_options("class A { #x }", options).parse_program().is_err());
    }
}
