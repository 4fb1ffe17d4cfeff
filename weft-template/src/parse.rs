use pest::Parser;
use pest::iterators::Pair;

use weft_core::Value;

use crate::ast::{Attribute, Child, EventBinding, TemplateNode, TextSpec, ValueSpec};
use crate::error::ParseError;
use crate::expr::{Expr, parse_handler};

#[derive(pest_derive::Parser)]
#[grammar = "template.pest"]
struct TemplateParser;

/// Parse template markup into a [`TemplateNode`].
///
/// Supported syntax:
/// - nested elements, self-closing tags (`<input/>`) and `<!-- comments -->`
/// - static attributes (`class="x"`), interpolated ones (`class="a {{b}}"`),
///   bound ones (`:value="expr"`) and events (`@click="handler"`)
/// - `attach-point="a, b"` and `xmlns="..."`
/// - text with `{{ expr }}` interpolations
pub fn parse_template(src: &str) -> Result<TemplateNode, ParseError> {
    let mut pairs =
        TemplateParser::parse(Rule::template, src).map_err(|e| ParseError::Syntax(e.to_string()))?;
    let Some(file) = pairs.next() else {
        return Err(ParseError::RootCount(0));
    };

    let mut roots = Vec::new();
    let mut stray_text = 0;
    for node in file.into_inner() {
        match node.as_rule() {
            Rule::element => roots.push(build_element(node)?),
            Rule::text if !is_all_ws(node.as_str()) => stray_text += 1,
            _ => {}
        }
    }

    if roots.len() != 1 || stray_text > 0 {
        return Err(ParseError::RootCount(roots.len() + stray_text));
    }
    Ok(roots.remove(0))
}

fn build_element(pair: Pair<Rule>) -> Result<TemplateNode, ParseError> {
    let mut inner = pair.into_inner();
    let tag = inner
        .next()
        .map(|p| p.as_str().to_string())
        .ok_or_else(|| ParseError::Syntax("element without a tag".into()))?;

    let mut node = TemplateNode::element(tag.clone());
    match tag.as_str() {
        "svg" => node.namespace = Some("svg".into()),
        "math" => node.namespace = Some("math".into()),
        _ => {}
    }

    for part in inner {
        match part.as_rule() {
            Rule::attribute => apply_attribute(&mut node, part)?,
            Rule::element => {
                let child = build_element(part)?;
                node.children.push(Child::Element(child));
            }
            Rule::text => {
                let raw = trim_layout(part.as_str());
                if !raw.is_empty() {
                    node.children.push(Child::Text(parse_interpolated(raw)?));
                }
            }
            Rule::close_tag => {
                let close = part
                    .into_inner()
                    .next()
                    .map(|p| p.as_str())
                    .unwrap_or_default();
                if close != tag {
                    return Err(ParseError::MismatchedClose {
                        open: tag,
                        close: close.to_string(),
                    });
                }
            }
            _ => {}
        }
    }
    Ok(node)
}

fn apply_attribute(node: &mut TemplateNode, pair: Pair<Rule>) -> Result<(), ParseError> {
    let mut name = "";
    let mut value: Option<&str> = None;
    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::attr_name => name = part.as_str(),
            Rule::quoted => value = part.into_inner().next().map(|v| v.as_str()),
            _ => {}
        }
    }

    if let Some(bound) = name.strip_prefix(':') {
        let src = value.unwrap_or(bound);
        let spec = Expr::parse(src)?.into_spec(src.trim());
        node.attributes.push(Attribute {
            name: bound.to_string(),
            spec,
        });
    } else if let Some(event) = name.strip_prefix('@') {
        let handler = parse_handler(value.unwrap_or_default())?;
        node.events.push(EventBinding {
            event: event.to_string(),
            handler,
        });
    } else if name == "attach-point" {
        node.attach_points.extend(
            value
                .unwrap_or_default()
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        );
    } else if name == "xmlns" {
        node.namespace = value.map(str::to_string);
    } else {
        let spec = match value {
            // Boolean attribute: `<input disabled>`
            None => ValueSpec::constant(Value::Bool(true)),
            Some(v) => parse_interpolated(v)?,
        };
        node.attributes.push(Attribute {
            name: name.to_string(),
            spec,
        });
    }
    Ok(())
}

/// Split `a {{ b }} c` into literal and expression parts. Plain text becomes
/// a constant; a lone `{{ expr }}` keeps the expression's own value.
pub fn parse_interpolated(src: &str) -> Result<TextSpec, ParseError> {
    let mut parts: Vec<Expr> = Vec::new();
    let mut rest = src;
    while let Some(start) = rest.find("{{") {
        if start > 0 {
            parts.push(Expr::Literal(Value::Str(rest[..start].to_string())));
        }
        let after = &rest[start + 2..];
        let end = after.find("}}").ok_or_else(|| ParseError::Expression {
            source_text: src.to_string(),
            message: "unterminated '{{'".into(),
        })?;
        parts.push(Expr::parse(&after[..end])?);
        rest = &after[end + 2..];
    }
    if !rest.is_empty() {
        parts.push(Expr::Literal(Value::Str(rest.to_string())));
    }

    let has_expr = parts.iter().any(|p| !matches!(p, Expr::Literal(_)));
    if !has_expr {
        return Ok(ValueSpec::constant(src));
    }
    if parts.len() == 1 {
        let only = parts.remove(0);
        let label = src.trim().trim_start_matches("{{").trim_end_matches("}}").trim();
        return Ok(only.into_spec(label));
    }
    Ok(Expr::Concat(parts).into_spec(src))
}

/// Drop indentation: leading/trailing whitespace that spans a line break.
fn trim_layout(s: &str) -> &str {
    let mut out = s;
    let lead = &out[..out.len() - out.trim_start().len()];
    if lead.contains('\n') {
        out = out.trim_start();
    }
    let trail = &out[out.trim_end().len()..];
    if trail.contains('\n') {
        out = out.trim_end();
    }
    out
}

fn is_all_ws(s: &str) -> bool {
    s.chars().all(|c| c.is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trim_layout_keeps_inline_spaces() {
        assert_eq!(trim_layout("\n    Hello "), "Hello ");
        assert_eq!(trim_layout(" world\n  "), " world");
        assert_eq!(trim_layout("  \n  "), "");
    }

    #[test]
    fn interpolation_label_and_deps() {
        let spec = parse_interpolated("Hello, {{ name }}!").unwrap();
        assert_eq!(spec.deps, vec!["name"]);
        assert_eq!(spec.value.label(), "Hello, {{ name }}!");

        let lone = parse_interpolated("{{ count }}").unwrap();
        assert_eq!(lone.deps, vec!["count"]);
        assert_eq!(lone.value.label(), "count");

        let plain = parse_interpolated("static").unwrap();
        assert!(plain.deps.is_empty());
    }

    #[test]
    fn unterminated_interpolation() {
        assert!(matches!(
            parse_interpolated("a {{ b"),
            Err(ParseError::Expression { .. })
        ));
    }
}
