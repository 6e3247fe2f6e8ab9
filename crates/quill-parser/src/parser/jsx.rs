//! JSX elements and fragments.
//!
//! The scanner has three modes here. Tag contents are read with
//! `next_jsx_tag_token`, text between tags with `next_jsx_child`, and
//! `{...}` containers with the ordinary tokenizer. Every `>` that ends a tag
//! decides which mode reads the token after it.

use super::parser::{ForHead, Marker, Parser};
use crate::ast::*;
use crate::error::{ParseError, Result};
use crate::features::Features;
use crate::lexer::TokenKind;

/// Where the parser resumes after a tag's closing `>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum After {
    /// Back to ordinary expression tokens.
    Expression,
    /// Inside the children of an enclosing element.
    Child,
    /// Inside an enclosing tag, after an element used as an attribute value.
    Tag,
}

enum JsxNode {
    Element(JsxElement),
    Fragment(JsxFragment),
}

/// A tag or attribute name before it is placed in its node.
enum JsxName {
    Plain(JsxIdentifier),
    Namespaced(JsxNamespacedName),
}

impl Parser<'_> {
    fn next_tag(&mut self) -> Result<()> {
        self.advance_with(|scanner| scanner.next_jsx_tag_token())
    }

    fn next_child(&mut self) -> Result<()> {
        self.advance_with(|scanner| scanner.next_jsx_child())
    }

    fn next_after(&mut self, after: After) -> Result<()> {
        match after {
            After::Expression => self.next(),
            After::Child => self.next_child(),
            After::Tag => self.next_tag(),
        }
    }

    /// Consumes the `>` ending a tag.
    fn expect_tag_end(&mut self, after: After) -> Result<()> {
        if !self.is(&TokenKind::GreaterThan) {
            return Err(self.unexpected());
        }
        self.next_after(after)
    }

    /// Consumes the `}` ending a container.
    fn expect_container_end(&mut self, after: After) -> Result<()> {
        if !self.is(&TokenKind::RightBrace) {
            return Err(self.unexpected());
        }
        self.next_after(after)
    }

    /// Parses a JSX element or fragment in expression position. The current
    /// token is `<`.
    pub(super) fn parse_jsx_element(&mut self) -> Result<Expression> {
        let node = self.guarded(|p| {
            let start = p.start_node();
            p.next_tag()?;
            p.parse_jsx_element_at(start, After::Expression)
        })?;
        if self.is(&TokenKind::LessThan) {
            return Err(self.raise(
                self.cur.span.start,
                "Adjacent JSX elements must be wrapped in an enclosing tag",
            ));
        }
        Ok(match node {
            JsxNode::Element(element) => Expression::JsxElement(Box::new(element)),
            JsxNode::Fragment(fragment) => Expression::JsxFragment(Box::new(fragment)),
        })
    }

    /// Parses the rest of an element whose `<` has been consumed.
    fn parse_jsx_element_at(&mut self, start: Marker, after: After) -> Result<JsxNode> {
        if self.is(&TokenKind::GreaterThan) {
            self.next_child()?;
            let opening = self.finish(start);
            let (children, closing_start, name) = self.parse_jsx_children()?;
            if name.is_some() {
                return Err(self.mismatched_closing(closing_start, ""));
            }
            self.expect_tag_end(after)?;
            return Ok(JsxNode::Fragment(JsxFragment {
                span: self.finish(start),
                opening,
                closing: self.finish(closing_start),
                children,
            }));
        }

        let name = self.parse_jsx_element_name()?;
        let mut attributes = Vec::new();
        while !self.is(&TokenKind::Slash) && !self.is(&TokenKind::GreaterThan) {
            attributes.push(self.parse_jsx_attribute()?);
        }
        let self_closing = self.is(&TokenKind::Slash);
        if self_closing {
            self.next_tag()?;
            self.expect_tag_end(after)?;
        } else {
            self.expect_tag_end(After::Child)?;
        }
        let opening = JsxOpeningElement {
            span: self.finish(start),
            name,
            attributes,
            self_closing,
        };
        if self_closing {
            return Ok(JsxNode::Element(JsxElement {
                span: self.finish(start),
                opening,
                closing: None,
                children: Vec::new(),
            }));
        }

        let (children, closing_start, closing_name) = self.parse_jsx_children()?;
        let expected = opening.name.qualified_name();
        let Some(closing_name) = closing_name.filter(|name| name.qualified_name() == expected) else {
            return Err(self.mismatched_closing(closing_start, &expected));
        };
        self.expect_tag_end(after)?;
        Ok(JsxNode::Element(JsxElement {
            span: self.finish(start),
            opening,
            closing: Some(JsxClosingElement {
                span: self.finish(closing_start),
                name: closing_name,
            }),
            children,
        }))
    }

    fn mismatched_closing(&self, closing: Marker, expected: &str) -> ParseError {
        self.raise(closing.offset, format!("Expected corresponding JSX closing tag for <{expected}>"))
    }

    /// Parses children up to and including the name of the closing tag.
    /// Returns the children, the start of the closing tag and its name,
    /// absent for `</>`. Leaves the closing `>` as the current token.
    fn parse_jsx_children(&mut self) -> Result<(Vec<JsxChild>, Marker, Option<JsxElementName>)> {
        let mut children = Vec::new();
        loop {
            match &self.cur.kind {
                TokenKind::LessThan => {
                    let start = self.start_node();
                    self.next_tag()?;
                    if self.is(&TokenKind::Slash) {
                        self.next_tag()?;
                        let name = if self.is(&TokenKind::GreaterThan) {
                            None
                        } else {
                            Some(self.parse_jsx_element_name()?)
                        };
                        return Ok((children, start, name));
                    }
                    let child = match self.guarded(|p| p.parse_jsx_element_at(start, After::Child))? {
                        JsxNode::Element(element) => JsxChild::Element(Box::new(element)),
                        JsxNode::Fragment(fragment) => JsxChild::Fragment(Box::new(fragment)),
                    };
                    children.push(child);
                }
                TokenKind::JsxText(value) => {
                    let span = self.cur_span();
                    let text = JsxText {
                        value: value.clone(),
                        raw: self.source[span.start..span.end].to_string(),
                        span,
                    };
                    children.push(JsxChild::Text(text));
                    self.next_child()?;
                }
                TokenKind::LeftBrace => children.push(self.parse_jsx_child_container()?),
                TokenKind::Eof => {
                    return Err(self.raise(self.cur.span.start, "Unterminated JSX contents"));
                }
                _ => return Err(self.unexpected()),
            }
        }
    }

    /// `{expression}`, `{}` or `{...spread}` between tags.
    fn parse_jsx_child_container(&mut self) -> Result<JsxChild> {
        let start = self.start_node();
        self.next()?;
        if self.eat(&TokenKind::Ellipsis)? {
            let expression = self.parse_expression()?;
            self.expect_container_end(After::Child)?;
            return Ok(JsxChild::Spread(JsxSpreadChild {
                span: self.finish(start),
                expression,
            }));
        }
        let expression = self.parse_jsx_expression()?;
        self.expect_container_end(After::Child)?;
        Ok(JsxChild::ExpressionContainer(JsxExpressionContainer {
            span: self.finish(start),
            expression,
        }))
    }

    /// The inside of a container whose `{` has been consumed. An empty
    /// container spans the text between the braces.
    fn parse_jsx_expression(&mut self) -> Result<JsxExpression> {
        if self.is(&TokenKind::RightBrace) {
            return Ok(JsxExpression::Empty(self.span_between(self.prev_end, self.cur.span.start)));
        }
        Ok(JsxExpression::Expression(self.parse_expression()?))
    }

    fn parse_jsx_identifier(&mut self) -> Result<JsxIdentifier> {
        let TokenKind::Identifier(name) = &self.cur.kind else {
            return Err(self.unexpected());
        };
        let id = JsxIdentifier {
            span: self.cur_span(),
            name: name.clone(),
        };
        self.next_tag()?;
        Ok(id)
    }

    /// `name` or, with namespaces enabled, `namespace:name`.
    fn parse_jsx_namespaced_name(&mut self) -> Result<JsxName> {
        let start = self.start_node();
        let namespace = self.parse_jsx_identifier()?;
        if !self.has(Features::JSX_NS) || !self.is(&TokenKind::Colon) {
            return Ok(JsxName::Plain(namespace));
        }
        self.next_tag()?;
        let name = self.parse_jsx_identifier()?;
        Ok(JsxName::Namespaced(JsxNamespacedName {
            span: self.finish(start),
            namespace,
            name,
        }))
    }

    fn parse_jsx_element_name(&mut self) -> Result<JsxElementName> {
        let start = self.start_node();
        let mut name = match self.parse_jsx_namespaced_name()? {
            JsxName::Plain(id) => JsxElementName::Identifier(id),
            JsxName::Namespaced(namespaced) => return Ok(JsxElementName::Namespaced(namespaced)),
        };
        while self.is(&TokenKind::Dot) {
            self.next_tag()?;
            let property = self.parse_jsx_identifier()?;
            name = JsxElementName::Member(JsxMemberExpression {
                span: self.finish(start),
                object: Box::new(name),
                property,
            });
        }
        Ok(name)
    }

    fn parse_jsx_attribute(&mut self) -> Result<JsxAttributeItem> {
        let start = self.start_node();
        if self.is(&TokenKind::LeftBrace) {
            self.next()?;
            self.expect(&TokenKind::Ellipsis)?;
            let argument = self.parse_maybe_assign(ForHead::No, None)?;
            self.expect_container_end(After::Tag)?;
            return Ok(JsxAttributeItem::Spread(JsxSpreadAttribute {
                span: self.finish(start),
                argument,
            }));
        }

        let name = match self.parse_jsx_namespaced_name()? {
            JsxName::Plain(id) => JsxAttributeName::Identifier(id),
            JsxName::Namespaced(namespaced) => JsxAttributeName::Namespaced(namespaced),
        };
        let value = if self.is(&TokenKind::Equal) {
            self.next_tag()?;
            Some(self.parse_jsx_attribute_value()?)
        } else {
            None
        };
        Ok(JsxAttributeItem::Attribute(JsxAttribute {
            span: self.finish(start),
            name,
            value,
        }))
    }

    fn parse_jsx_attribute_value(&mut self) -> Result<JsxAttributeValue> {
        let start = self.start_node();
        match &self.cur.kind {
            TokenKind::LeftBrace => {
                self.next()?;
                let expression = self.parse_jsx_expression()?;
                if matches!(expression, JsxExpression::Empty(_)) {
                    return Err(self.raise(start.offset, "JSX attributes must only be assigned a non-empty expression"));
                }
                self.expect_container_end(After::Tag)?;
                Ok(JsxAttributeValue::ExpressionContainer(JsxExpressionContainer {
                    span: self.finish(start),
                    expression,
                }))
            }
            TokenKind::String(value) => {
                let span = self.cur_span();
                let literal = Literal {
                    value: LiteralValue::String(value.clone()),
                    raw: self.source[span.start..span.end].to_string(),
                    span,
                };
                self.next_tag()?;
                Ok(JsxAttributeValue::Literal(literal))
            }
            TokenKind::LessThan => {
                self.next_tag()?;
                Ok(match self.guarded(|p| p.parse_jsx_element_at(start, After::Tag))? {
                    JsxNode::Element(element) => JsxAttributeValue::Element(Box::new(element)),
                    JsxNode::Fragment(fragment) => JsxAttributeValue::Fragment(Box::new(fragment)),
                })
            }
            _ => Err(self.raise(
                self.cur.span.start,
                "JSX value should be either an expression or a quoted JSX text",
            )),
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

    fn jsx(src: &str) -> Expression {
        let program = Parser::new(src).parse_program().unwrap();
        match program.body.into_iter().next() {
            Some(Statement::Expression(stmt)) => stmt.expression,
            other => panic!("expected expression statement, got {other:?}"),
        }
    }

    fn element(src: &str) -> JsxElement {
        match jsx(src) {
            Expression::JsxElement(element) => *element,
            other => panic!("expected element, got {other:?}"),
        }
    }

    fn parse_err(src: &str) -> ParseError {
        Parser::new(src).parse_program().unwrap_err()
    }

    #[test]
    fn test_self_closing_element() {
        let el = element("<br />;");
        assert!(el.opening.self_closing);
        assert!(el.closing.is_none());
        assert_eq!((el.span.start, el.span.end), (0, 6));
    }

    #[test]
    fn test_children_and_text() {
        let el = element("<p>Hello &amp; {name}!</p>");
        assert_eq!(el.children.len(), 3);
        let JsxChild::Text(text) = &el.children[0] else {
            panic!("expected text");
        };
        assert_eq!(text.value, "Hello & ");
        assert_eq!(text.raw, "Hello &amp; ");
        assert!(matches!(&el.children[1], JsxChild::ExpressionContainer(c) if matches!(c.expression, JsxExpression::Expression(_))));
        let closing = el.closing.unwrap();
        assert_eq!((closing.span.start, closing.span.end), (22, 26));
        assert_eq!(el.span.end, 26);
    }

    #[test]
    fn test_attributes() {
        let el = element(r#"<input type="text" disabled value={x} {...rest} data-id='7' icon=<i /> />"#);
        let attrs = &el.opening.attributes;
        assert_eq!(attrs.len(), 6);
        assert!(matches!(&attrs[0], JsxAttributeItem::Attribute(a) if matches!(&a.value, Some(JsxAttributeValue::Literal(l)) if l.raw == "\"text\"")));
        assert!(matches!(&attrs[1], JsxAttributeItem::Attribute(a) if a.value.is_none()));
        assert!(matches!(&attrs[2], JsxAttributeItem::Attribute(a) if matches!(a.value, Some(JsxAttributeValue::ExpressionContainer(_)))));
        assert!(matches!(&attrs[3], JsxAttributeItem::Spread(_)));
        assert!(matches!(&attrs[4], JsxAttributeItem::Attribute(a) if matches!(&a.name, JsxAttributeName::Identifier(n) if n.name == "data-id")));
        assert!(matches!(&attrs[5], JsxAttributeItem::Attribute(a) if matches!(a.value, Some(JsxAttributeValue::Element(_)))));
    }

    #[test]
    fn test_member_and_namespaced_names() {
        let el = element("<a.b.c></a.b.c>");
        assert_eq!(el.opening.name.qualified_name(), "a.b.c");
        let el = element("<svg:path xlink:href='#a' />");
        let JsxElementName::Namespaced(name) = &el.opening.name else {
            panic!("expected namespaced element name");
        };
        assert_eq!((name.namespace.name.as_str(), name.name.name.as_str()), ("svg", "path"));
        assert_eq!((name.span.start, name.span.end), (1, 9));
        let JsxAttributeItem::Attribute(attr) = &el.opening.attributes[0] else {
            panic!("expected attribute");
        };
        let JsxAttributeName::Namespaced(attr_name) = &attr.name else {
            panic!("expected namespaced attribute name");
        };
        assert_eq!((attr_name.namespace.name.as_str(), attr_name.name.name.as_str()), ("xlink", "href"));

        let options = ParserOptions {
            features: Features::default().off(Features::JSX_NS),
            ..ParserOptions::default()
        };
        assert!(Parser::with_options("<svg:path />", options).parse_program().is_err());
    }

    #[test]
    fn test_fragments_and_nesting() {
        let Expression::JsxFragment(fragment) = jsx("<><a>{1}</a><b/>text</>") else {
            panic!("expected fragment");
        };
        assert_eq!((fragment.opening.start, fragment.opening.end), (0, 2));
        assert_eq!((fragment.closing.start, fragment.closing.end), (20, 23));
        assert_eq!(fragment.children.len(), 3);
    }

    #[test]
    fn test_empty_expression_spans_comment() {
        let el = element("<a>{/* c */}</a>");
        let JsxChild::ExpressionContainer(container) = &el.children[0] else {
            panic!("expected container");
        };
        let JsxExpression::Empty(span) = container.expression else {
            panic!("expected empty expression");
        };
        assert_eq!((span.start, span.end), (4, 11));
    }

    #[test]
    fn test_spread_child() {
        let el = element("<a>{...items}</a>");
        assert!(matches!(&el.children[0], JsxChild::Spread(_)));
    }

    #[test]
    fn test_raw_brace_and_angle_in_text() {
        let el = element("<a>x > y }</a>");
        let JsxChild::Text(text) = &el.children[0] else {
            panic!("expected text");
        };
        assert_eq!(text.value, "x > y }");
    }

    #[test]
    fn test_element_as_operand() {
        let program = Parser::new("f(<a/>, <b></b>); x = <c/> / 2;").parse_program().unwrap();
        assert_eq!(program.body.len(), 2);
    }

    #[test]
    fn test_closing_tag_mismatch() {
        let err = parse_err("<a><b></a></b>");
        assert_eq!(err.message, "Expected corresponding JSX closing tag for <b>");
        assert_eq!(err.column, 6);
        assert_eq!(parse_err("<>x</a>").message, "Expected corresponding JSX closing tag for <>");
        assert_eq!(parse_err("<a>x</>").message, "Expected corresponding JSX closing tag for <a>");
    }

    #[test]
    fn test_jsx_errors() {
        let err = parse_err("<a/><b/>");
        assert_eq!(err.message, "Adjacent JSX elements must be wrapped in an enclosing tag");
        assert_eq!(err.column, 4);
        assert_eq!(
            parse_err("<a b={} />").message,
            "JSX attributes must only be assigned a non-empty expression"
        );
        assert_eq!(
            parse_err("<a b=c />").message,
            "JSX value should be either an expression or a quoted JSX text"
        );
        assert_eq!(parse_err("<a>text").message, "Unterminated JSX contents");
        assert_eq!(parse_err("<a><<b/></a>").message, "Unexpected token");
    }

    #[test]
    fn test_jsx_disabled() {
        let options = ParserOptions {
            features: Features::default().off(Features::JSX),
            ..ParserOptions::default()
        };
        assert!(Parser::with_options("<a />", options).parse_program().is_err());
    }
}
