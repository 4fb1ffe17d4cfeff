//! The small expression language used inside template source.
//!
//! Property names are plain identifiers; `event` names the detail of the event
//! being handled. Operators: `!`, `+`, `-`, `==`, `!=`, `&&`, `||`.

use pest::Parser;
use pest::iterators::Pair;

use weft_core::{Component, EvalError, Value};

use crate::ast::{Computation, HandlerSpec, InlineHandler, ValueSpec};
use crate::error::ParseError;

#[derive(pest_derive::Parser)]
#[grammar = "expr.pest"]
struct ExprParser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Or,
    And,
    Eq,
    Ne,
    Add,
    Sub,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Prop(String),
    Event,
    Not(Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    /// String concatenation of every part, produced by `a {{b}} c` runs.
    Concat(Vec<Expr>),
}

impl Expr {
    pub fn parse(src: &str) -> Result<Expr, ParseError> {
        let mut pairs =
            ExprParser::parse(Rule::expression, src).map_err(|e| expr_error(src, e.to_string()))?;
        let root = pairs
            .next()
            .and_then(|p| p.into_inner().next())
            .ok_or_else(|| expr_error(src, "empty expression"))?;
        build(root).map_err(|m| expr_error(src, m))
    }

    /// Referenced property names, first occurrence first.
    pub fn deps(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_deps(&mut out);
        out
    }

    fn collect_deps(&self, out: &mut Vec<String>) {
        match self {
            Expr::Prop(name) => {
                if !out.contains(name) {
                    out.push(name.clone());
                }
            }
            Expr::Not(inner) => inner.collect_deps(out),
            Expr::Binary(_, l, r) => {
                l.collect_deps(out);
                r.collect_deps(out);
            }
            Expr::Concat(parts) => parts.iter().for_each(|p| p.collect_deps(out)),
            Expr::Literal(_) | Expr::Event => {}
        }
    }

    pub fn eval(&self, component: &Component, event: Option<&Value>) -> Result<Value, EvalError> {
        Ok(match self {
            Expr::Literal(v) => v.clone(),
            Expr::Prop(name) => component.get(name).clone(),
            Expr::Event => event.cloned().unwrap_or_default(),
            Expr::Not(inner) => Value::Bool(!inner.eval(component, event)?.is_truthy()),
            Expr::Binary(op, l, r) => {
                let left = l.eval(component, event)?;
                match op {
                    BinOp::Or if left.is_truthy() => left,
                    BinOp::And if !left.is_truthy() => left,
                    BinOp::Or | BinOp::And => r.eval(component, event)?,
                    BinOp::Eq => Value::Bool(left == r.eval(component, event)?),
                    BinOp::Ne => Value::Bool(left != r.eval(component, event)?),
                    BinOp::Add => add(left, r.eval(component, event)?)?,
                    BinOp::Sub => {
                        let right = r.eval(component, event)?;
                        match (&left, &right) {
                            (Value::Number(a), Value::Number(b)) => Value::Number(a - b),
                            _ => {
                                return Err(EvalError::Type(format!(
                                    "cannot subtract {} from {}",
                                    right.type_name(),
                                    left.type_name()
                                )));
                            }
                        }
                    }
                }
            }
            Expr::Concat(parts) => {
                let mut out = String::new();
                for part in parts {
                    out.push_str(&part.eval(component, event)?.to_string());
                }
                Value::Str(out)
            }
        })
    }

    /// Wrap as a value spec whose dependencies are the referenced properties.
    pub fn into_spec(self, label: impl Into<String>) -> ValueSpec {
        let deps = self.deps();
        ValueSpec::new(Computation::new(label, move |c| self.eval(c, None)), deps)
    }
}

fn add(left: Value, right: Value) -> Result<Value, EvalError> {
    match (&left, &right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
        (Value::Str(_), _) | (_, Value::Str(_)) => Ok(Value::Str(format!("{left}{right}"))),
        _ => Err(EvalError::Type(format!(
            "cannot add {} and {}",
            left.type_name(),
            right.type_name()
        ))),
    }
}

fn expr_error(src: &str, message: impl Into<String>) -> ParseError {
    ParseError::Expression {
        source_text: src.to_string(),
        message: message.into(),
    }
}

fn build(pair: Pair<Rule>) -> Result<Expr, String> {
    match pair.as_rule() {
        Rule::or_expr => fold_uniform(pair, BinOp::Or),
        Rule::and_expr => fold_uniform(pair, BinOp::And),
        Rule::eq_expr | Rule::add_expr => fold_operators(pair),
        Rule::unary => {
            let mut negations = 0;
            let mut operand = None;
            for p in pair.into_inner() {
                match p.as_rule() {
                    Rule::not => negations += 1,
                    _ => operand = Some(build(p)?),
                }
            }
            let mut expr = operand.ok_or("missing operand")?;
            for _ in 0..negations {
                expr = Expr::Not(Box::new(expr));
            }
            Ok(expr)
        }
        Rule::string => {
            let body = pair.into_inner().next().map(|p| p.as_str()).unwrap_or("");
            Ok(Expr::Literal(Value::Str(body.to_string())))
        }
        Rule::number => pair
            .as_str()
            .parse::<f64>()
            .map(|n| Expr::Literal(Value::Number(n)))
            .map_err(|e| e.to_string()),
        Rule::boolean => Ok(Expr::Literal(Value::Bool(pair.as_str() == "true"))),
        Rule::null => Ok(Expr::Literal(Value::Null)),
        Rule::ident => Ok(match pair.as_str() {
            "event" => Expr::Event,
            name => Expr::Prop(name.to_string()),
        }),
        other => Err(format!("unexpected {other:?}")),
    }
}

/// `a || b || c`: operands only, one operator.
fn fold_uniform(pair: Pair<Rule>, op: BinOp) -> Result<Expr, String> {
    let mut inner = pair.into_inner();
    let mut acc = build(inner.next().ok_or("missing operand")?)?;
    for rhs in inner {
        acc = Expr::Binary(op, Box::new(acc), Box::new(build(rhs)?));
    }
    Ok(acc)
}

/// `a + b - c`: operands interleaved with operator pairs.
fn fold_operators(pair: Pair<Rule>) -> Result<Expr, String> {
    let mut inner = pair.into_inner();
    let mut acc = build(inner.next().ok_or("missing operand")?)?;
    while let Some(op) = inner.next() {
        let op = match op.as_str() {
            "==" => BinOp::Eq,
            "!=" => BinOp::Ne,
            "+" => BinOp::Add,
            "-" => BinOp::Sub,
            other => return Err(format!("unknown operator '{other}'")),
        };
        let rhs = build(inner.next().ok_or("missing right operand")?)?;
        acc = Expr::Binary(op, Box::new(acc), Box::new(rhs));
    }
    Ok(acc)
}

/// Parse an event handler: a bare method name, or `prop = expr`.
pub fn parse_handler(src: &str) -> Result<HandlerSpec, ParseError> {
    let mut pairs =
        ExprParser::parse(Rule::handler, src).map_err(|e| expr_error(src, e.to_string()))?;
    let body = pairs
        .next()
        .and_then(|p| p.into_inner().next())
        .ok_or_else(|| expr_error(src, "empty handler"))?;
    match body.as_rule() {
        Rule::method => Ok(HandlerSpec::Method(body.as_str().trim().to_string())),
        Rule::assignment => {
            let mut inner = body.into_inner();
            let target = inner
                .next()
                .map(|p| p.as_str().to_string())
                .ok_or_else(|| expr_error(src, "missing assignment target"))?;
            let value = inner
                .next()
                .ok_or_else(|| expr_error(src, "missing assigned value"))
                .and_then(|p| build(p).map_err(|m| expr_error(src, m)))?;
            Ok(HandlerSpec::Inline(InlineHandler::new(src.trim(), move |c, ev| {
                let v = value.eval(c, Some(&ev.detail))?;
                c.set(target.clone(), v);
                Ok(())
            })))
        }
        other => Err(expr_error(src, format!("unexpected {other:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_and_deps() {
        let e = Expr::parse("a + b == c || !d").unwrap();
        assert_eq!(e.deps(), vec!["a", "b", "c", "d"]);
        match e {
            Expr::Binary(BinOp::Or, l, r) => {
                assert!(matches!(*l, Expr::Binary(BinOp::Eq, _, _)));
                assert!(matches!(*r, Expr::Not(_)));
            }
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn literals() {
        assert_eq!(
            Expr::parse("'hi'").unwrap(),
            Expr::Literal(Value::from("hi"))
        );
        assert_eq!(Expr::parse("2.5").unwrap(), Expr::Literal(Value::Number(2.5)));
        assert_eq!(Expr::parse("true").unwrap(), Expr::Literal(Value::Bool(true)));
        assert_eq!(Expr::parse("trueish").unwrap(), Expr::Prop("trueish".into()));
        assert_eq!(Expr::parse("null").unwrap(), Expr::Literal(Value::Null));
        assert_eq!(Expr::parse("event").unwrap(), Expr::Event);
    }

    #[test]
    fn deps_are_deduplicated() {
        let e = Expr::parse("(x + y) + x").unwrap();
        assert_eq!(e.deps(), vec!["x", "y"]);
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            Expr::parse("a +"),
            Err(ParseError::Expression { .. })
        ));
        assert!(parse_handler("a == b").is_err());
    }

    #[test]
    fn eval_operators() {
        let c = Component::new("t")
            .with_prop("n", 2)
            .with_prop("name", "Ann")
            .with_prop("empty", "");
        let eval = |src: &str| Expr::parse(src).unwrap().eval(&c, None);

        assert_eq!(eval("n + 1"), Ok(Value::Number(3.0)));
        assert_eq!(eval("'Hello, ' + name"), Ok(Value::from("Hello, Ann")));
        assert_eq!(eval("empty || 'fallback'"), Ok(Value::from("fallback")));
        assert_eq!(eval("name && n"), Ok(Value::Number(2.0)));
        assert_eq!(eval("!empty"), Ok(Value::Bool(true)));
        assert_eq!(eval("n != 2"), Ok(Value::Bool(false)));
        assert!(matches!(eval("name - 1"), Err(EvalError::Type(_))));
        assert!(matches!(eval("true + 1"), Err(EvalError::Type(_))));
    }
}
