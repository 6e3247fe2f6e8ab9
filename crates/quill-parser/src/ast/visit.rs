//! Read-only traversal of the AST.
//!
//! Implement [`Visit`] and override the `visit_*` methods for the nodes of
//! interest. Each default method calls the matching `walk_*` function, which
//! visits the node's children in source order; call it from an override to
//! keep descending.
//!
//! ```rust
//! use quill_parser::ast::visit::{self, Visit};
//! use quill_parser::ast::Identifier;
//!
//! #[derive(Default)]
//! struct Names(Vec<String>);
//!
//! impl<'ast> Visit<'ast> for Names {
//!     fn visit_identifier(&mut self, id: &'ast Identifier) {
//!         self.0.push(id.name.clone());
//!     }
//! }
//!
//! let program = quill_parser::compile("let a = b + c;").unwrap();
//! let mut names = Names::default();
//! names.visit_program(&program);
//! assert_eq!(names.0, ["a", "b", "c"]);
//! ```

use super::*;

/// A visitor over borrowed AST nodes.
pub trait Visit<'ast> {
    /// Visits the program root.
    fn visit_program(&mut self, program: &'ast Program) {
        walk_program(self, program);
    }

    /// Visits a statement.
    fn visit_statement(&mut self, stmt: &'ast Statement) {
        walk_statement(self, stmt);
    }

    /// Visits an expression.
    fn visit_expression(&mut self, expr: &'ast Expression) {
        walk_expression(self, expr);
    }

    /// Visits a pattern.
    fn visit_pattern(&mut self, pattern: &'ast Pattern) {
        walk_pattern(self, pattern);
    }

    /// Visits a function.
    fn visit_function(&mut self, function: &'ast Function) {
        walk_function(self, function);
    }

    /// Visits a class.
    fn visit_class(&mut self, class: &'ast Class) {
        walk_class(self, class);
    }

    /// Visits a class element.
    fn visit_class_element(&mut self, element: &'ast ClassElement) {
        walk_class_element(self, element);
    }

    /// Visits a variable declaration.
    fn visit_variable_declaration(&mut self, decl: &'ast VariableDeclaration) {
        walk_variable_declaration(self, decl);
    }

    /// Visits a template literal.
    fn visit_template_literal(&mut self, template: &'ast TemplateLiteral) {
        walk_template_literal(self, template);
    }

    /// Visits a JSX element.
    fn visit_jsx_element(&mut self, element: &'ast JsxElement) {
        walk_jsx_element(self, element);
    }

    /// Visits a JSX fragment.
    fn visit_jsx_fragment(&mut self, fragment: &'ast JsxFragment) {
        walk_jsx_fragment(self, fragment);
    }

    /// Visits a JSX child.
    fn visit_jsx_child(&mut self, child: &'ast JsxChild) {
        walk_jsx_child(self, child);
    }

    /// Visits an identifier.
    fn visit_identifier(&mut self, _id: &'ast Identifier) {}

    /// Visits a private identifier.
    fn visit_private_identifier(&mut self, _id: &'ast PrivateIdentifier) {}

    /// Visits a literal.
    fn visit_literal(&mut self, _literal: &'ast Literal) {}

    /// Visits a template element.
    fn visit_template_element(&mut self, _element: &'ast TemplateElement) {}
}

/// Visits the children of the program.
pub fn walk_program<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, program: &'ast Program) {
    for stmt in &program.body {
        v.visit_statement(stmt);
    }
}

/// Visits the children of a statement.
pub fn walk_statement<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, stmt: &'ast Statement) {
    match stmt {
        Statement::Expression(s) => v.visit_expression(&s.expression),
        Statement::Block(s) => walk_statements(v, &s.body),
        Statement::Empty(_) | Statement::Debugger(_) => {}
        Statement::With(s) => {
            v.visit_expression(&s.object);
            v.visit_statement(&s.body);
        }
        Statement::Return(s) => {
            if let Some(arg) = &s.argument {
                v.visit_expression(arg);
            }
        }
        Statement::Labeled(s) => {
            v.visit_identifier(&s.label);
            v.visit_statement(&s.body);
        }
        Statement::Break(BreakStatement { label, .. }) | Statement::Continue(ContinueStatement { label, .. }) => {
            if let Some(label) = label {
                v.visit_identifier(label);
            }
        }
        Statement::If(s) => {
            v.visit_expression(&s.test);
            v.visit_statement(&s.consequent);
            if let Some(alt) = &s.alternate {
                v.visit_statement(alt);
            }
        }
        Statement::Switch(s) => {
            v.visit_expression(&s.discriminant);
            for case in &s.cases {
                if let Some(test) = &case.test {
                    v.visit_expression(test);
                }
                walk_statements(v, &case.consequent);
            }
        }
        Statement::Throw(s) => v.visit_expression(&s.argument),
        Statement::Try(s) => {
            walk_statements(v, &s.block.body);
            if let Some(handler) = &s.handler {
                if let Some(param) = &handler.param {
                    v.visit_pattern(param);
                }
                walk_statements(v, &handler.body.body);
            }
            if let Some(finalizer) = &s.finalizer {
                walk_statements(v, &finalizer.body);
            }
        }
        Statement::While(s) => {
            v.visit_expression(&s.test);
            v.visit_statement(&s.body);
        }
        Statement::DoWhile(s) => {
            v.visit_statement(&s.body);
            v.visit_expression(&s.test);
        }
        Statement::For(s) => {
            match &s.init {
                Some(ForInit::Declaration(decl)) => v.visit_variable_declaration(decl),
                Some(ForInit::Expression(expr)) => v.visit_expression(expr),
                None => {}
            }
            if let Some(test) = &s.test {
                v.visit_expression(test);
            }
            if let Some(update) = &s.update {
                v.visit_expression(update);
            }
            v.visit_statement(&s.body);
        }
        Statement::ForIn(ForInStatement { left, right, body, .. })
        | Statement::ForOf(ForOfStatement { left, right, body, .. }) => {
            match left {
                ForInLeft::Declaration(decl) => v.visit_variable_declaration(decl),
                ForInLeft::Pattern(pattern) => v.visit_pattern(pattern),
            }
            v.visit_expression(right);
            v.visit_statement(body);
        }
        Statement::FunctionDeclaration(f) => v.visit_function(f),
        Statement::VariableDeclaration(decl) => v.visit_variable_declaration(decl),
        Statement::ClassDeclaration(c) => v.visit_class(c),
        Statement::Import(decl) => {
            for spec in &decl.specifiers {
                if let ImportDeclarationSpecifier::Specifier(s) = spec {
                    walk_module_export_name(v, &s.imported);
                }
                v.visit_identifier(spec.local());
            }
            v.visit_literal(&decl.source);
        }
        Statement::ExportNamed(decl) => {
            if let Some(inner) = &decl.declaration {
                v.visit_statement(inner);
            }
            for spec in &decl.specifiers {
                walk_module_export_name(v, &spec.local);
                if spec.exported.span() != spec.local.span() {
                    walk_module_export_name(v, &spec.exported);
                }
            }
            if let Some(source) = &decl.source {
                v.visit_literal(source);
            }
        }
        Statement::ExportDefault(decl) => match &decl.declaration {
            ExportDefaultKind::Function(f) => v.visit_function(f),
            ExportDefaultKind::Class(c) => v.visit_class(c),
            ExportDefaultKind::Expression(e) => v.visit_expression(e),
        },
        Statement::ExportAll(decl) => {
            if let Some(exported) = &decl.exported {
                walk_module_export_name(v, exported);
            }
            v.visit_literal(&decl.source);
        }
    }
}

fn walk_statements<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, body: &'ast [Statement]) {
    for stmt in body {
        v.visit_statement(stmt);
    }
}

fn walk_module_export_name<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, name: &'ast ModuleExportName) {
    match name {
        ModuleExportName::Identifier(id) => v.visit_identifier(id),
        ModuleExportName::Literal(lit) => v.visit_literal(lit),
    }
}

/// Visits the children of a variable declaration.
pub fn walk_variable_declaration<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, decl: &'ast VariableDeclaration) {
    for declarator in &decl.declarations {
        v.visit_pattern(&declarator.id);
        if let Some(init) = &declarator.init {
            v.visit_expression(init);
        }
    }
}

/// Visits the children of a function.
pub fn walk_function<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, function: &'ast Function) {
    if let Some(id) = &function.id {
        v.visit_identifier(id);
    }
    for param in &function.params {
        v.visit_pattern(param);
    }
    walk_statements(v, &function.body.body);
}

/// Visits the children of a class.
pub fn walk_class<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, class: &'ast Class) {
    if let Some(id) = &class.id {
        v.visit_identifier(id);
    }
    if let Some(super_class) = &class.super_class {
        v.visit_expression(super_class);
    }
    for element in &class.body.body {
        v.visit_class_element(element);
    }
}

/// Visits the children of a class element.
pub fn walk_class_element<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, element: &'ast ClassElement) {
    match element {
        ClassElement::Method(m) => {
            v.visit_expression(&m.key);
            v.visit_function(&m.value);
        }
        ClassElement::Property(p) => {
            v.visit_expression(&p.key);
            if let Some(value) = &p.value {
                v.visit_expression(value);
            }
        }
        ClassElement::StaticBlock(b) => walk_statements(v, &b.body),
    }
}

fn walk_expr_or_spread<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, item: &'ast ExprOrSpread) {
    match item {
        ExprOrSpread::Expression(e) => v.visit_expression(e),
        ExprOrSpread::Spread(s) => v.visit_expression(&s.argument),
    }
}

/// Visits the children of an expression.
pub fn walk_expression<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, expr: &'ast Expression) {
    match expr {
        Expression::Identifier(id) => v.visit_identifier(id),
        Expression::PrivateIdentifier(id) => v.visit_private_identifier(id),
        Expression::Literal(lit) => v.visit_literal(lit),
        Expression::This(_) | Expression::Super(_) => {}
        Expression::Array(a) => {
            for element in a.elements.iter().flatten() {
                walk_expr_or_spread(v, element);
            }
        }
        Expression::Object(o) => {
            for prop in &o.properties {
                match prop {
                    ObjectProperty::Property(p) => {
                        if !p.shorthand {
                            v.visit_expression(&p.key);
                        }
                        v.visit_expression(&p.value);
                    }
                    ObjectProperty::Spread(s) => v.visit_expression(&s.argument),
                }
            }
        }
        Expression::Function(f) => v.visit_function(f),
        Expression::Arrow(a) => {
            for param in &a.params {
                v.visit_pattern(param);
            }
            match &a.body {
                ArrowBody::Expression(e) => v.visit_expression(e),
                ArrowBody::Block(body) => walk_statements(v, &body.body),
            }
        }
        Expression::Class(c) => v.visit_class(c),
        Expression::TemplateLiteral(t) => v.visit_template_literal(t),
        Expression::TaggedTemplate(t) => {
            v.visit_expression(&t.tag);
            v.visit_template_literal(&t.quasi);
        }
        Expression::Unary(u) => v.visit_expression(&u.argument),
        Expression::Update(u) => v.visit_expression(&u.argument),
        Expression::Binary(b) => {
            v.visit_expression(&b.left);
            v.visit_expression(&b.right);
        }
        Expression::Logical(l) => {
            v.visit_expression(&l.left);
            v.visit_expression(&l.right);
        }
        Expression::Assignment(a) => {
            v.visit_pattern(&a.left);
            v.visit_expression(&a.right);
        }
        Expression::Conditional(c) => {
            v.visit_expression(&c.test);
            v.visit_expression(&c.consequent);
            v.visit_expression(&c.alternate);
        }
        Expression::Call(c) => {
            v.visit_expression(&c.callee);
            for arg in &c.arguments {
                walk_expr_or_spread(v, arg);
            }
        }
        Expression::New(n) => {
            v.visit_expression(&n.callee);
            for arg in &n.arguments {
                walk_expr_or_spread(v, arg);
            }
        }
        Expression::Member(m) => {
            v.visit_expression(&m.object);
            v.visit_expression(&m.property);
        }
        Expression::Chain(c) => v.visit_expression(&c.expression),
        Expression::Sequence(s) => {
            for e in &s.expressions {
                v.visit_expression(e);
            }
        }
        Expression::Yield(y) => {
            if let Some(arg) = &y.argument {
                v.visit_expression(arg);
            }
        }
        Expression::Await(a) => v.visit_expression(&a.argument),
        Expression::MetaProperty(m) => {
            v.visit_identifier(&m.meta);
            v.visit_identifier(&m.property);
        }
        Expression::Import(i) => v.visit_expression(&i.source),
        Expression::JsxElement(e) => v.visit_jsx_element(e),
        Expression::JsxFragment(f) => v.visit_jsx_fragment(f),
    }
}

/// Visits the children of a template literal.
pub fn walk_template_literal<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, template: &'ast TemplateLiteral) {
    let mut expressions = template.expressions.iter();
    for quasi in &template.quasis {
        v.visit_template_element(quasi);
        if let Some(expr) = expressions.next() {
            v.visit_expression(expr);
        }
    }
}

/// Visits the children of a pattern.
pub fn walk_pattern<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, pattern: &'ast Pattern) {
    match pattern {
        Pattern::Identifier(id) => v.visit_identifier(id),
        Pattern::Object(o) => {
            for prop in &o.properties {
                match prop {
                    ObjectPatternProperty::Property(p) => {
                        if !p.shorthand {
                            v.visit_expression(&p.key);
                        }
                        v.visit_pattern(&p.value);
                    }
                    ObjectPatternProperty::Rest(r) => v.visit_pattern(&r.argument),
                }
            }
        }
        Pattern::Array(a) => {
            for element in a.elements.iter().flatten() {
                v.visit_pattern(element);
            }
        }
        Pattern::Assignment(a) => {
            v.visit_pattern(&a.left);
            v.visit_expression(&a.right);
        }
        Pattern::Rest(r) => v.visit_pattern(&r.argument),
        Pattern::Expression(e) => v.visit_expression(e),
    }
}

/// Visits the children of a JSX element.
pub fn walk_jsx_element<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, element: &'ast JsxElement) {
    for attr in &element.opening.attributes {
        match attr {
            JsxAttributeItem::Attribute(a) => match &a.value {
                Some(JsxAttributeValue::Literal(lit)) => v.visit_literal(lit),
                Some(JsxAttributeValue::ExpressionContainer(c)) => walk_jsx_container(v, c),
                Some(JsxAttributeValue::Element(e)) => v.visit_jsx_element(e),
                Some(JsxAttributeValue::Fragment(f)) => v.visit_jsx_fragment(f),
                None => {}
            },
            JsxAttributeItem::Spread(s) => v.visit_expression(&s.argument),
        }
    }
    for child in &element.children {
        v.visit_jsx_child(child);
    }
}

/// Visits the children of a JSX fragment.
pub fn walk_jsx_fragment<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, fragment: &'ast JsxFragment) {
    for child in &fragment.children {
        v.visit_jsx_child(child);
    }
}

/// Visits the children of a JSX child.
pub fn walk_jsx_child<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, child: &'ast JsxChild) {
    match child {
        JsxChild::Text(_) => {}
        JsxChild::ExpressionContainer(c) => walk_jsx_container(v, c),
        JsxChild::Spread(s) => v.visit_expression(&s.expression),
        JsxChild::Element(e) => v.visit_jsx_element(e),
        JsxChild::Fragment(f) => v.visit_jsx_fragment(f),
    }
}

fn walk_jsx_container<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, container: &'ast JsxExpressionContainer) {
    if let JsxExpression::Expression(e) = &container.expression {
        v.visit_expression(e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        statements: usize,
        identifiers: Vec<String>,
    }

    impl<'ast> Visit<'ast> for Counter {
        fn visit_statement(&mut self, stmt: &'ast Statement) {
            self.statements += 1;
            walk_statement(self, stmt);
        }

        fn visit_identifier(&mut self, id: &'ast Identifier) {
            self.identifiers.push(id.name.clone());
        }
    }

    #[test]
    fn test_walks_nested_functions() {
        let program = crate::compile("function f(a) { if (a) { return b; } }").unwrap();
        let mut counter = Counter::default();
        counter.visit_program(&program);
        assert_eq!(counter.statements, 4);
        assert_eq!(counter.identifiers, ["f", "a", "a", "b"]);
    }

    #[test]
    fn test_shorthand_property_visits_value_once() {
        let program = crate::compile("({ a, b: c });").unwrap();
        let mut counter = Counter::default();
        counter.visit_program(&program);
        assert_eq!(counter.identifiers, ["a", "b", "c"]);
    }
}
