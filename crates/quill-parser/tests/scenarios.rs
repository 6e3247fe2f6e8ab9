//! End-to-end parse scenarios through the public entry points.

use quill_macros::{assert_matches, assert_ok, assert_parse_error, parse_error_cases};
use quill_parser::ast::*;
use quill_parser::{Features, ParseError, ParserOptions, compile, compile_with_opts};

fn script(src: &str) -> Result<Program, ParseError> {
    compile_with_opts(src, ParserOptions::script())
}

fn without(flag: Features) -> ParserOptions {
    ParserOptions::default().with_features(Features::default().off(flag))
}

#[test]
fn test_async_function_declaration() {
    let program = assert_ok!(compile("async function foo() { }"));
    assert_eq!(program.span.end, 24);
    assert_matches!(
        &program.body[0],
        Statement::FunctionDeclaration(f)
            if f.is_async && !f.is_generator && f.id.as_ref().is_some_and(|id| id.name == "foo")
    );
}

#[test]
fn test_async_newline_is_identifier() {
    let program = assert_ok!(compile("async\nfunction foo() { }"));
    assert_eq!(program.body.len(), 2);
    assert_matches!(
        &program.body[0],
        Statement::Expression(ExpressionStatement { expression: Expression::Identifier(id), .. })
            if id.name == "async"
    );
    assert_matches!(&program.body[1], Statement::FunctionDeclaration(f) if !f.is_async);
}

#[test]
fn test_nullish_mixed_with_logical() {
    assert_parse_error!(
        compile("a ?? b || c"),
        "Cannot use unparenthesized `??` within logic expressions",
        1,
        2
    );
    assert_ok!(compile("(a ?? b) || c"));
    assert_ok!(compile("a ?? (b || c)"));
}

#[test]
fn test_exponent_without_pow() {
    assert_parse_error!(compile_with_opts("x ** y", without(Features::POW)), "Unexpected token", 1, 2);
    assert_ok!(compile("x ** y"));
}

#[test]
fn test_delete_before_exponent() {
    assert_parse_error!(
        script("delete o.p ** 2;"),
        "Unary operator `delete` used immediately before exponentiation expression",
        1,
        7
    );
    assert_ok!(script("(delete o.p) ** 2;"));
}

#[test]
fn test_dynamic_import() {
    let program = assert_ok!(compile("import('dynamicImport.js')"));
    let Statement::Expression(stmt) = &program.body[0] else {
        panic!("expected expression statement");
    };
    assert_matches!(&stmt.expression, Expression::Import(import) if import.span.end == 26);
    assert_eq!(program.span.end, 26);
}

#[test]
fn test_private_field_access() {
    let program = assert_ok!(compile("class C { #aaa; f() { this.#aaa } }"));
    let Statement::ClassDeclaration(class) = &program.body[0] else {
        panic!("expected class");
    };
    assert_matches!(
        &class.body.body[0],
        ClassElement::Property(PropertyDefinition { key: Expression::PrivateIdentifier(key), .. })
            if key.name == "aaa"
    );
    let ClassElement::Method(method) = &class.body.body[1] else {
        panic!("expected method");
    };
    let Statement::Expression(stmt) = &method.value.body.body[0] else {
        panic!("expected expression statement");
    };
    assert_matches!(
        &stmt.expression,
        Expression::Member(MemberExpression { property, .. })
            if matches!(property.as_ref(), Expression::PrivateIdentifier(p) if p.name == "aaa")
    );
}

fn first_body_expression(program: &Program) -> &Expression {
    let Statement::FunctionDeclaration(function) = &program.body[0] else {
        panic!("expected function declaration");
    };
    let Statement::Expression(stmt) = &function.body.body[0] else {
        panic!("expected expression statement");
    };
    &stmt.expression
}

#[test]
fn test_await_reads_by_context() {
    let program = assert_ok!(script("function f() { await + 1 }"));
    assert_matches!(
        first_body_expression(&program),
        Expression::Binary(BinaryExpression { operator: BinaryOperator::Add, left, .. })
            if matches!(left.as_ref(), Expression::Identifier(id) if id.name == "await")
    );

    let program = assert_ok!(compile("async function f() { await + 1 }"));
    assert_matches!(
        first_body_expression(&program),
        Expression::Await(AwaitExpression { argument, .. })
            if matches!(argument.as_ref(), Expression::Unary(UnaryExpression { operator: UnaryOperator::Plus, .. }))
    );
}

#[test]
fn test_yield_in_arrow_inside_generator() {
    assert_parse_error!(compile("function* g() { () => yield }"), "The keyword 'yield' is reserved", 1, 22);
    assert_ok!(script("function* g() { () => yield }"));
}

#[test]
fn test_escaped_contextual_keywords() {
    let message = "Keyword must not contain escaped characters";
    assert_parse_error!(script("l\\u0065t x = 1"), message, 1, 0);
    assert_parse_error!(script("\\u0061sync function f() {}"), message, 1, 0);
    assert_parse_error!(compile("class A { st\\u0061tic m() {} }"), message, 1, 10);
    assert_parse_error!(script("for (x \\u006ff y);"), message, 1, 7);
}

#[test]
fn test_error_display_format() {
    let err = compile("let x = ;").unwrap_err();
    assert_eq!(err.to_string(), "Unexpected token at (1:8)");
}

#[test]
fn test_multiline_positions() {
    assert_parse_error!(compile("let a;\nlet a;"), "Identifier 'a' has already been declared", 2, 4);
    assert_parse_error!(compile("x;\r\n  y z"), "Unexpected token", 2, 4);
}

#[test]
fn test_mixed_program() {
    let src = r#"
        import React, { useState } from "react";

        export default function Counter({ start = 0, ...rest }) {
            const [count, setCount] = useState(start);
            const inc = async () => { await setCount(c => c + 1); };
            label: for (const item of rest.items ?? []) {
                if (!item) continue label;
            }
            return <button onClick={inc} {...rest}>Count: {count}</button>;
        }

        export class Store extends Base {
            static #instances = 0;
            #state = {};
            get state() { return this.#state; }
            static { Store.#instances++; }
        }

        export const tag = String.raw`a${1}b`, big = 10n ** 2n, re = /a+/gu;
    "#;
    let program = assert_ok!(compile(src));
    assert_eq!(program.source_type, SourceType::Module);
    assert_eq!(program.body.len(), 4);
}

parse_error_cases!(test_early_errors, compile, [
    "let a; var a;" => "Identifier 'a' has already been declared",
    "const a;" => "Missing initializer in const declaration",
    "break;" => "Unsyntactic break",
    "new.target" => "'new.target' can only be used in functions and class static block",
    "x = import.meta.url; import.foo" => "The only valid meta property for import is `import.meta`",
    "function f(a, a) {}" => "Argument name clash",
    "class A { constructor() {} constructor() {} }" => "Duplicate constructor in the same class",
    "export { a }" => "Export 'a' is not defined",
    "`\\unicode`" => "Invalid Unicode escape sequence",
    "<a></b>" => "Expected corresponding JSX closing tag for <a>",
]);
