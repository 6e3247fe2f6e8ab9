//! `import` and `export` declarations.
//!
//! Exported names are tracked per module so duplicates fail early. Local
//! names exported by a specifier list must be bound at the top level by the
//! end of the program; [`Parser::parse_program`] reports the first one that
//! never was.

use super::classes::ClassKind;
use super::functions::FunctionKind;
use super::parser::{ForHead, Marker, Parser};
use super::scope::BindingKind;
use crate::ast::*;
use crate::error::Result;
use crate::features::Features;
use crate::lexer::TokenKind;

/// Collects the identifiers a binding pattern declares.
fn bound_names<'p>(pattern: &'p Pattern, names: &mut Vec<&'p Identifier>) {
    match pattern {
        Pattern::Identifier(id) => names.push(id),
        Pattern::Object(object) => {
            for property in &object.properties {
                match property {
                    ObjectPatternProperty::Property(p) => bound_names(&p.value, names),
                    ObjectPatternProperty::Rest(rest) => bound_names(&rest.argument, names),
                }
            }
        }
        Pattern::Array(array) => {
            for element in array.elements.iter().flatten() {
                bound_names(element, names);
            }
        }
        Pattern::Assignment(assign) => bound_names(&assign.left, names),
        Pattern::Rest(rest) => bound_names(&rest.argument, names),
        Pattern::Expression(_) => {}
    }
}

impl Parser<'_> {
    /// Parses an import declaration. The current token is `import`.
    pub(super) fn parse_import(&mut self, start: Marker) -> Result<Statement> {
        self.next()?;
        let specifiers = if matches!(self.cur.kind, TokenKind::String(_)) {
            Vec::new()
        } else {
            let specifiers = self.parse_import_specifiers()?;
            self.expect_contextual("from")?;
            specifiers
        };
        let source = self.parse_module_source()?;
        self.semicolon()?;
        Ok(Statement::Import(ImportDeclaration {
            span: self.finish(start),
            specifiers,
            source,
        }))
    }

    fn parse_module_source(&mut self) -> Result<Literal> {
        if !matches!(self.cur.kind, TokenKind::String(_)) {
            return Err(self.unexpected());
        }
        self.parse_literal()
    }

    fn parse_import_specifiers(&mut self) -> Result<Vec<ImportDeclarationSpecifier>> {
        let mut specifiers = Vec::new();
        if matches!(self.cur.kind, TokenKind::Identifier(_)) {
            let start = self.start_node();
            let local = self.parse_import_local()?;
            specifiers.push(ImportDeclarationSpecifier::Default(ImportDefaultSpecifier {
                span: self.finish(start),
                local,
            }));
            if !self.eat(&TokenKind::Comma)? {
                return Ok(specifiers);
            }
        }
        if self.is(&TokenKind::Star) {
            let start = self.start_node();
            self.next()?;
            self.expect_contextual("as")?;
            let local = self.parse_import_local()?;
            specifiers.push(ImportDeclarationSpecifier::Namespace(ImportNamespaceSpecifier {
                span: self.finish(start),
                local,
            }));
            return Ok(specifiers);
        }

        self.expect(&TokenKind::LeftBrace)?;
        let mut first = true;
        while !self.eat(&TokenKind::RightBrace)? {
            if !first {
                self.expect(&TokenKind::Comma)?;
                if self.after_trailing_comma(&TokenKind::RightBrace, false)? {
                    break;
                }
            }
            first = false;
            specifiers.push(ImportDeclarationSpecifier::Specifier(self.parse_import_specifier()?));
        }
        Ok(specifiers)
    }

    fn parse_import_specifier(&mut self) -> Result<ImportSpecifier> {
        let start = self.start_node();
        let imported = self.parse_module_export_name()?;
        let local = if self.eat_contextual("as")? {
            self.parse_ident(false)?
        } else {
            match &imported {
                ModuleExportName::Identifier(id) => {
                    self.check_unreserved(id)?;
                    id.clone()
                }
                ModuleExportName::Literal(lit) => {
                    return Err(self.raise(lit.span.start, "A string literal cannot be used as an imported binding."));
                }
            }
        };
        self.check_identifier_lval(&local, Some(BindingKind::Lexical), None)?;
        Ok(ImportSpecifier {
            span: self.finish(start),
            imported,
            local,
        })
    }

    fn parse_import_local(&mut self) -> Result<Identifier> {
        let local = self.parse_ident(false)?;
        self.check_identifier_lval(&local, Some(BindingKind::Lexical), None)?;
        Ok(local)
    }

    /// An identifier, keywords included, or a string literal.
    fn parse_module_export_name(&mut self) -> Result<ModuleExportName> {
        if matches!(self.cur.kind, TokenKind::String(_)) {
            return Ok(ModuleExportName::Literal(self.parse_literal()?));
        }
        Ok(ModuleExportName::Identifier(self.parse_ident(true)?))
    }

    /// Parses an export declaration. The current token is `export`.
    pub(super) fn parse_export(&mut self, start: Marker) -> Result<Statement> {
        self.next()?;
        if self.eat(&TokenKind::Star)? {
            return self.parse_export_all(start);
        }
        if self.is(&TokenKind::Default) {
            self.check_export("default", self.cur.span.start)?;
            self.next()?;
            let declaration = self.parse_export_default()?;
            return Ok(Statement::ExportDefault(ExportDefaultDeclaration {
                span: self.finish(start),
                declaration,
            }));
        }

        if self.starts_export_declaration() {
            let declaration = self.parse_statement(None, true)?;
            self.check_declaration_export(&declaration)?;
            return Ok(Statement::ExportNamed(ExportNamedDeclaration {
                span: self.finish(start),
                declaration: Some(Box::new(declaration)),
                specifiers: Vec::new(),
                source: None,
            }));
        }

        let specifiers = self.parse_export_specifiers()?;
        let source = if self.eat_contextual("from")? {
            Some(self.parse_module_source()?)
        } else {
            for specifier in &specifiers {
                match &specifier.local {
                    ModuleExportName::Identifier(local) => {
                        self.check_unreserved(local)?;
                        self.check_local_export(local);
                    }
                    ModuleExportName::Literal(lit) => {
                        return Err(self.raise(
                            lit.span.start,
                            "A string literal cannot be used as an exported binding without `from`.",
                        ));
                    }
                }
            }
            None
        };
        self.semicolon()?;
        Ok(Statement::ExportNamed(ExportNamedDeclaration {
            span: self.finish(start),
            declaration: None,
            specifiers,
            source,
        }))
    }

    fn parse_export_all(&mut self, start: Marker) -> Result<Statement> {
        let exported = if self.has(Features::EXPORT_ALL_AS_NS) && self.eat_contextual("as")? {
            let name = self.parse_module_export_name()?;
            self.check_export(name.name(), name.span().start)?;
            Some(name)
        } else {
            None
        };
        self.expect_contextual("from")?;
        let source = self.parse_module_source()?;
        self.semicolon()?;
        Ok(Statement::ExportAll(ExportAllDeclaration {
            span: self.finish(start),
            exported,
            source,
        }))
    }

    fn parse_export_default(&mut self) -> Result<ExportDefaultKind> {
        let is_async = !self.is(&TokenKind::Function) && self.is_async_function();
        if self.is(&TokenKind::Function) || is_async {
            let start = self.start_node();
            self.next()?;
            if is_async {
                self.next()?;
            }
            let function = self.parse_function(start, FunctionKind::DefaultExport, is_async)?;
            return Ok(ExportDefaultKind::Function(Box::new(function)));
        }
        if self.is(&TokenKind::Class) {
            let class = self.parse_class(ClassKind::DefaultExport)?;
            return Ok(ExportDefaultKind::Class(Box::new(class)));
        }
        let expression = self.parse_maybe_assign(ForHead::No, None)?;
        self.semicolon()?;
        Ok(ExportDefaultKind::Expression(expression))
    }

    fn starts_export_declaration(&mut self) -> bool {
        matches!(
            self.cur.kind,
            TokenKind::Var | TokenKind::Const | TokenKind::Class | TokenKind::Function
        ) || self.is_let(None)
            || self.is_async_function()
    }

    fn parse_export_specifiers(&mut self) -> Result<Vec<ExportSpecifier>> {
        let mut specifiers = Vec::new();
        self.expect(&TokenKind::LeftBrace)?;
        let mut first = true;
        while !self.eat(&TokenKind::RightBrace)? {
            if !first {
                self.expect(&TokenKind::Comma)?;
                if self.after_trailing_comma(&TokenKind::RightBrace, false)? {
                    break;
                }
            }
            first = false;

            let start = self.start_node();
            let local = self.parse_module_export_name()?;
            let exported = if self.eat_contextual("as")? {
                self.parse_module_export_name()?
            } else {
                local.clone()
            };
            self.check_export(exported.name(), exported.span().start)?;
            specifiers.push(ExportSpecifier {
                span: self.finish(start),
                local,
                exported,
            });
        }
        Ok(specifiers)
    }

    fn check_declaration_export(&mut self, declaration: &Statement) -> Result<()> {
        match declaration {
            Statement::VariableDeclaration(decl) => {
                let mut names = Vec::new();
                for declarator in &decl.declarations {
                    bound_names(&declarator.id, &mut names);
                }
                for id in names {
                    self.check_export(&id.name, id.span.start)?;
                }
            }
            Statement::FunctionDeclaration(function) => {
                if let Some(id) = &function.id {
                    self.check_export(&id.name, id.span.start)?;
                }
            }
            Statement::ClassDeclaration(class) => {
                if let Some(id) = &class.id {
                    self.check_export(&id.name, id.span.start)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn check_export(&mut self, name: &str, offset: usize) -> Result<()> {
        if !self.exports.insert(name.to_string()) {
            return Err(self.raise_early(offset, format!("Duplicate export '{name}'")));
        }
        Ok(())
    }

    fn check_local_export(&mut self, local: &Identifier) {
        if !self.scopes.declared_at_top(&local.name) {
            self.undefined_exports.push((local.name.clone(), local.span.start));
        }
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

    #[test]
    fn test_import_forms() {
        let program = parse_ok(
            "import 'side-effect';
             import a from 'a';
             import * as ns from 'ns';
             import b, { c, d as e, 'f-g' as h, default as i, } from 'b';",
        );
        assert_eq!(program.body.len(), 4);
        let Statement::Import(bare) = &program.body[0] else {
            panic!("expected import");
        };
        assert!(bare.specifiers.is_empty());
        assert_eq!(bare.source.as_str(), Some("side-effect"));

        let Statement::Import(list) = &program.body[3] else {
            panic!("expected import");
        };
        let locals: Vec<_> = list.specifiers.iter().map(|s| s.local().name.as_str()).collect();
        assert_eq!(locals, ["b", "c", "e", "h", "i"]);
        assert!(matches!(
            &list.specifiers[3],
            ImportDeclarationSpecifier::Specifier(s) if matches!(s.imported, ModuleExportName::Literal(_))
        ));
    }

    #[test]
    fn test_import_binding_errors() {
        assert_eq!(
            parse_err("import a from 'a'; let a;").message,
            "Identifier 'a' has already been declared"
        );
        assert_eq!(parse_err("import { default } from 'a';").message, "Unexpected keyword 'default'");
        assert_eq!(
            parse_err("import { 'x' } from 'a';").message,
            "A string literal cannot be used as an imported binding."
        );
        assert_eq!(parse_err("import a from b;").message, "Unexpected token");
        assert_eq!(parse_err("import * from 'a';").message, "Unexpected token");
    }

    #[test]
    fn test_export_declarations() {
        let program = parse_ok(
            "export var a = 1, { b, c: [d] } = o;
             export let e;
             export const f = 2;
             export function g() {}
             export async function h() {}
             export class I {}",
        );
        assert_eq!(program.body.len(), 6);
        assert!(program.body.iter().all(|s| matches!(s, Statement::ExportNamed(e) if e.declaration.is_some())));
    }

    #[test]
    fn test_export_default_forms() {
        for src in [
            "export default function () {}",
            "export default function named() {}",
            "export default async function () {}",
            "export default class {}",
            "export default class Named extends Base {}",
            "export default a + b;",
            "export default (function () {});",
        ] {
            let program = parse_ok(src);
            assert!(matches!(program.body[0], Statement::ExportDefault(_)), "{src}");
        }
        let program = parse_ok("export default function () {}\n(1);");
        assert_eq!(program.body.len(), 2);
    }

    #[test]
    fn test_duplicate_exports() {
        let err = parse_err("export var a; export { a };");
        assert_eq!(err.message, "Duplicate export 'a'");
        assert_eq!(err.column, 23);
        assert_eq!(
            parse_err("export default 1; export default 2;").message,
            "Duplicate export 'default'"
        );
        assert_eq!(
            parse_err("var x; export { x as default }; export default 1;").message,
            "Duplicate export 'default'"
        );
        assert_eq!(
            parse_err("export * as ns from 'a'; export * as ns from 'b';").message,
            "Duplicate export 'ns'"
        );
        parse_ok("export * from 'a'; export * from 'b';");
    }

    #[test]
    fn test_exported_locals_must_be_declared() {
        parse_ok("export { a }; var a;");
        parse_ok("export { b as c }; function b() {}");
        let err = parse_err("export { missing }; { let missing; }");
        assert_eq!(err.message, "Export 'missing' is not defined");
        assert_eq!(err.column, 9);
        parse_ok("export { anything } from 'elsewhere';");
        assert_eq!(
            parse_err("export { 'str' };").message,
            "A string literal cannot be used as an exported binding without `from`."
        );
        parse_ok("export { 'str' as name, x as 'other name' } from 'mod';");
        assert_eq!(parse_err("export { if };").message, "Unexpected keyword 'if'");
    }

    #[test]
    fn test_export_all_as_namespace_feature() {
        let options = ParserOptions {
            features: Features::default().off(Features::EXPORT_ALL_AS_NS),
            ..ParserOptions::default()
        };
        let err = Parser::with_options("export * as ns from 'a';", options)
            .parse_program()
            .unwrap_err();
        assert_eq!(err.message, "Unexpected token");
    }
}
