//! Rewritten expressions evaluate like the calls they replace
//!
//! A small evaluator runs the original and the rewritten expression over
//! every combination of null, empty and non-empty sequences. It counts
//! `Any()` calls and fails on a call through null, so short-circuiting is
//! checked along with the result.

use std::cell::Cell;
use std::collections::HashMap;

use linqguard_core::cst::ast::{AstNode, CallExpr, Expr};
use linqguard_core::cst::{CsSyntaxKind, CsSyntaxNode};
use linqguard_core::{ResolvedSymbol, SourceUnit};
use linqguard_rules::is_null_or_empty::{TARGET_METHOD, TARGET_TYPE};
use linqguard_rules::{FixOptions, apply_fix_all_with, find_violations};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Value {
    Null,
    Bool(bool),
    Seq(usize),
}

struct Evaluator<'a> {
    env: &'a HashMap<&'static str, Value>,
    any_calls: Cell<usize>,
}

impl Evaluator<'_> {
    fn eval(&self, expr: &Expr) -> Result<Value, String> {
        use CsSyntaxKind as K;

        match expr.kind() {
            K::NameRef => {
                let name = expr.as_identifier().ok_or("unnamed reference")?;
                self.env
                    .get(name.as_str())
                    .copied()
                    .ok_or(format!("unbound `{name}`"))
            }
            K::Literal => match expr.text().as_str() {
                "null" => Ok(Value::Null),
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                other => Err(format!("unsupported literal `{other}`")),
            },
            K::ParenExpr => self.eval(&single_child(expr)?),
            K::PrefixExpr => {
                let operand = self.eval(&single_child(expr)?)?;
                Ok(Value::Bool(!as_bool(operand)?))
            }
            K::BinaryExpr => self.binary(expr),
            K::ConditionalExpr => {
                let parts = expr.children();
                if as_bool(self.eval(&parts[0])?)? {
                    self.eval(&parts[1])
                } else {
                    self.eval(&parts[2])
                }
            }
            K::IsPatternExpr => {
                let operand = self.eval(&single_child(expr)?)?;
                let constant = pattern_constant(expr.syntax())?;
                Ok(Value::Bool(operand == constant))
            }
            K::CallExpr => self.call(&expr.as_call().ok_or("not a call")?),
            other => Err(format!("unsupported expression {other:?}")),
        }
    }

    fn binary(&self, expr: &Expr) -> Result<Value, String> {
        let operands = expr.children();
        let op = first_token(expr.syntax()).ok_or("missing operator")?;
        let lhs = self.eval(&operands[0])?;
        match op {
            CsSyntaxKind::PipePipe => {
                if as_bool(lhs)? {
                    return Ok(Value::Bool(true));
                }
                Ok(Value::Bool(as_bool(self.eval(&operands[1])?)?))
            }
            CsSyntaxKind::AmpAmp => {
                if !as_bool(lhs)? {
                    return Ok(Value::Bool(false));
                }
                Ok(Value::Bool(as_bool(self.eval(&operands[1])?)?))
            }
            CsSyntaxKind::QuestionQuestion => match lhs {
                Value::Null => self.eval(&operands[1]),
                value => Ok(value),
            },
            CsSyntaxKind::EqEq => Ok(Value::Bool(lhs == self.eval(&operands[1])?)),
            other => Err(format!("unsupported operator {other:?}")),
        }
    }

    fn call(&self, call: &CallExpr) -> Result<Value, String> {
        let name = call.method_name().ok_or("unnamed call")?;
        let args = call.args();
        let target = match (args.as_slice(), call.member_access()) {
            ([], Some(access)) => self.eval(&access.receiver().ok_or("no receiver")?)?,
            ([arg], _) => self.eval(&arg.expr().ok_or("no argument")?)?,
            _ => return Err(format!("unsupported call shape for `{name}`")),
        };

        match (name.as_str(), target) {
            ("IsNullOrEmpty", Value::Null) => Ok(Value::Bool(true)),
            ("IsNullOrEmpty", Value::Seq(len)) => Ok(Value::Bool(len == 0)),
            ("Any", Value::Null) => Err("NullReferenceException in Any()".to_string()),
            ("Any", Value::Seq(len)) => {
                self.any_calls.set(self.any_calls.get() + 1);
                Ok(Value::Bool(len > 0))
            }
            (name, value) => Err(format!("cannot call `{name}` on {value:?}")),
        }
    }
}

fn single_child(expr: &Expr) -> Result<Expr, String> {
    expr.children()
        .into_iter()
        .next()
        .ok_or_else(|| format!("empty {:?}", expr.kind()))
}

fn first_token(node: &CsSyntaxNode) -> Option<CsSyntaxKind> {
    node.children_with_tokens()
        .filter_map(|element| element.into_token())
        .map(|token| token.kind())
        .find(|kind| !kind.is_trivia())
}

fn pattern_constant(node: &CsSyntaxNode) -> Result<Value, String> {
    let pattern = node
        .children()
        .find(|child| child.kind() == CsSyntaxKind::ConstantPattern)
        .ok_or("only constant patterns are supported")?;
    let literal = pattern.children().find_map(Expr::cast).ok_or("empty pattern")?;
    match literal.text().as_str() {
        "null" => Ok(Value::Null),
        "true" => Ok(Value::Bool(true)),
        "false" => Ok(Value::Bool(false)),
        other => Err(format!("unsupported constant `{other}`")),
    }
}

fn as_bool(value: Value) -> Result<bool, String> {
    match value {
        Value::Bool(b) => Ok(b),
        other => Err(format!("expected a bool, found {other:?}")),
    }
}

/// Expression body of the only method in `unit`
fn body(unit: &SourceUnit) -> Expr {
    unit.syntax()
        .descendants()
        .find(|node| node.kind() == CsSyntaxKind::ExprBody)
        .and_then(|node| node.children().find_map(Expr::cast))
        .expect("expression body")
}

fn wrap(expression: &str) -> String {
    format!("class A {{ bool M() => {expression}; }}")
}

fn rewrite(source: &str) -> SourceUnit {
    let unit = SourceUnit::parse(source);
    let resolver = |call: &CallExpr| {
        (call.method_name()? == TARGET_METHOD)
            .then(|| ResolvedSymbol::new(TARGET_TYPE, TARGET_METHOD))
    };
    let locations: Vec<_> = find_violations(&unit, &resolver)
        .map(|d| d.location)
        .collect();
    assert!(!locations.is_empty(), "nothing to rewrite in {source}");

    let options = FixOptions {
        allow_side_effecting_receivers: true,
    };
    let outcome = apply_fix_all_with(&unit, &locations, &options);
    assert!(outcome.is_complete(), "{:?}", outcome.failures);
    outcome.unit
}

fn environments() -> Vec<HashMap<&'static str, Value>> {
    let sequences = [Value::Null, Value::Seq(0), Value::Seq(3)];
    let mut envs = Vec::new();
    for xs in sequences {
        for ys in sequences {
            for flag in [true, false] {
                envs.push(HashMap::from([
                    ("xs", xs),
                    ("ys", ys),
                    ("flag", Value::Bool(flag)),
                ]));
            }
        }
    }
    envs
}

#[test]
fn test_rewrites_are_equivalent() {
    let expressions = [
        "xs.IsNullOrEmpty()",
        "!xs.IsNullOrEmpty()",
        "!xs.IsNullOrEmpty() && flag",
        "flag || xs.IsNullOrEmpty()",
        "flag && xs.IsNullOrEmpty()",
        "xs.IsNullOrEmpty() == flag",
        "xs.IsNullOrEmpty() is false",
        "xs.IsNullOrEmpty() ? flag : !flag",
        "xs.IsNullOrEmpty() && ys.IsNullOrEmpty()",
        "CollectionUtilities.IsNullOrEmpty(xs ?? ys)",
        "IsNullOrEmpty(ys) || (xs).IsNullOrEmpty()",
    ];

    for expression in expressions {
        let source = wrap(expression);
        let original = SourceUnit::parse(&source);
        let rewritten = rewrite(&source);
        let reparsed = SourceUnit::parse(&rewritten.text());
        assert!(!reparsed.has_errors(), "{}", rewritten.text());
        let rewritten_text = body(&rewritten).text();
        assert!(
            !rewritten_text.contains("IsNullOrEmpty"),
            "{expression} was not fully rewritten: {rewritten_text}"
        );

        for env in environments() {
            let before = Evaluator {
                env: &env,
                any_calls: Cell::new(0),
            }
            .eval(&body(&original));
            let after = Evaluator {
                env: &env,
                any_calls: Cell::new(0),
            }
            .eval(&body(&rewritten));

            let reread = Evaluator {
                env: &env,
                any_calls: Cell::new(0),
            }
            .eval(&body(&reparsed));

            assert_eq!(
                before, after,
                "{expression} => {rewritten_text} differs for {env:?}"
            );
            assert_eq!(after, reread, "{rewritten_text} reads back differently");
        }
    }
}

#[test]
fn test_any_is_never_called_on_null() {
    let rewritten = rewrite(&wrap("xs.IsNullOrEmpty()"));
    let expr = body(&rewritten);

    for (value, expected, calls) in [
        (Value::Null, true, 0),
        (Value::Seq(0), true, 1),
        (Value::Seq(5), false, 1),
    ] {
        let env = HashMap::from([("xs", value)]);
        let evaluator = Evaluator {
            env: &env,
            any_calls: Cell::new(0),
        };

        assert_eq!(evaluator.eval(&expr), Ok(Value::Bool(expected)));
        assert_eq!(evaluator.any_calls.get(), calls, "{value:?}");
    }
}

#[test]
fn test_rewritten_shape() {
    let rewritten = rewrite(&wrap("xs.IsNullOrEmpty()"));
    let expr = body(&rewritten);

    assert_eq!(expr.kind(), CsSyntaxKind::BinaryExpr);
    let operands = expr.children();
    assert_eq!(operands.len(), 2);
    assert_eq!(operands[0].kind(), CsSyntaxKind::IsPatternExpr);
    assert_eq!(operands[1].kind(), CsSyntaxKind::IsPatternExpr);
    assert_eq!(operands[1].children()[0].kind(), CsSyntaxKind::CallExpr);
}
