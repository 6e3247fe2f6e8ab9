//! Span invariants over whole programs: every node lies inside its parent
//! and siblings never go backwards.

use quill_macros::assert_ok;
use quill_parser::ast::visit::{self, Visit};
use quill_parser::ast::*;
use quill_parser::{ParserOptions, compile, compile_with_opts};

/// Checks containment and ordering while walking the tree.
struct SpanChecker<'s> {
    source: &'s str,
    /// Open ancestors with the end of their last visited child.
    stack: Vec<(Span, usize)>,
    visited: usize,
}

impl<'s> SpanChecker<'s> {
    fn new(source: &'s str, program: &Program) -> Self {
        Self {
            source,
            stack: vec![(program.span, 0)],
            visited: 0,
        }
    }

    fn enter(&mut self, kind: &str, span: Span) {
        assert!(span.start <= span.end, "{kind} has inverted span {span:?}");
        assert!(span.end <= self.source.len(), "{kind} ends past the source");
        if let Some((parent, last_end)) = self.stack.last_mut() {
            assert!(
                parent.start <= span.start && span.end <= parent.end,
                "{kind} {:?} escapes its parent {:?} in `{}`",
                span,
                parent,
                self.source
            );
            assert!(
                *last_end <= span.start,
                "{kind} {span:?} starts before its previous sibling ends ({last_end}) in `{}`",
                self.source
            );
        }
        self.stack.push((span, span.start));
        self.visited += 1;
    }

    fn leave(&mut self) {
        let (span, _) = self.stack.pop().unwrap();
        if let Some((_, last_end)) = self.stack.last_mut() {
            *last_end = span.end;
        }
    }
}

impl<'ast> Visit<'ast> for SpanChecker<'_> {
    fn visit_statement(&mut self, stmt: &'ast Statement) {
        self.enter("statement", stmt.span());
        visit::walk_statement(self, stmt);
        self.leave();
    }

    fn visit_expression(&mut self, expr: &'ast Expression) {
        self.enter("expression", expr.span());
        visit::walk_expression(self, expr);
        self.leave();
    }

    fn visit_pattern(&mut self, pattern: &'ast Pattern) {
        self.enter("pattern", pattern.span());
        visit::walk_pattern(self, pattern);
        self.leave();
    }

    fn visit_class(&mut self, class: &'ast Class) {
        self.enter("class", class.span);
        visit::walk_class(self, class);
        self.leave();
    }

    fn visit_jsx_child(&mut self, child: &'ast JsxChild) {
        self.enter("jsx child", child.span());
        visit::walk_jsx_child(self, child);
        self.leave();
    }

    fn visit_identifier(&mut self, id: &'ast Identifier) {
        self.enter("identifier", id.span);
        let slice = &self.source[id.span.start..id.span.end];
        if !slice.contains('\\') {
            assert_eq!(slice, id.name, "identifier text differs from its name");
        }
        self.leave();
    }

    fn visit_literal(&mut self, literal: &'ast Literal) {
        self.enter("literal", literal.span);
        assert_eq!(literal.raw, &self.source[literal.span.start..literal.span.end]);
        self.leave();
    }
}

fn check(source: &str) -> usize {
    let program = assert_ok!(compile(source));
    assert_eq!(program.span.start, 0);
    assert_eq!(program.span.end, source.len());
    let mut checker = SpanChecker::new(source, &program);
    checker.visit_program(&program);
    checker.visited
}

#[test]
fn test_statement_spans() {
    assert!(check("var a = 1, b;\nif (a) { b = 2 } else b = 3;\nfor (let i = 0; i < 3; i++) continue;") > 10);
    check("switch (x) { case 1: y(); break; default: z(); }");
    check("try { a() } catch ({ message }) { b(message) } finally { c() }");
    check("outer: while (a) { do { break outer; } while (b) }");
}

#[test]
fn test_expression_spans() {
    check("a = b ? c : d, e ?? f, (g || h) && i;");
    check("x = { a, b: [c, ...d], [e]: f, g() {}, get h() { return 1 } };");
    check("y = async (a, { b } = {}, ...c) => a + b;");
    check("z = tag`a${b}c${d}e` + `plain`;");
    check("w = new Foo.Bar(1)?.baz?.[0]?.(2);");
    check("({ a, b: [c] } = obj); [x, , y = 1] = arr;");
}

#[test]
fn test_class_and_module_spans() {
    check("import d, { a as b } from 'm';\nexport class K extends d { #p = 1; static s() { return this.#p } }");
    check("export default async function* gen() { yield* other(); for await (const x of y) {} }");
}

#[test]
fn test_jsx_spans() {
    check("const el = <div className=\"a\" {...rest}>text {value} <br /> &amp; <></></div>;");
    check("f(<A.B c={1}>{/* nothing */}</A.B>);");
}

#[test]
fn test_literal_raw_round_trip() {
    check("v = [0x1F, 1_000, .5e3, 0b101n, 'it\\'s', \"\\u{1F600}\", null, true, /re[/]g];");
}

#[test]
fn test_locations_match_offsets() {
    let source = "let a = 1;\n  let b = <p>\n</p>;";
    let program = assert_ok!(compile_with_opts(source, ParserOptions::default().with_locations(true)));
    let Statement::VariableDeclaration(second) = &program.body[1] else {
        panic!("expected declaration");
    };
    let loc = second.span.loc.unwrap();
    assert_eq!((loc.start.line, loc.start.column), (2, 2));
    assert_eq!((loc.end.line, loc.end.column), (3, 5));
}
