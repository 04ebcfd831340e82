//! Green node factories for synthesized syntax
//!
//! Rewrites build replacement subtrees directly instead of formatting text
//! and re-parsing it. Every factory produces nodes shaped like the parser's
//! own output so later passes can walk them the same way.

use rowan::{GreenNode, GreenToken, NodeOrToken};

use super::CsSyntaxKind;

pub type GreenElement = NodeOrToken<GreenNode, GreenToken>;

pub fn token(kind: CsSyntaxKind, text: &str) -> GreenElement {
    NodeOrToken::Token(GreenToken::new(kind.into(), text))
}

pub fn node(kind: CsSyntaxKind, children: Vec<GreenElement>) -> GreenNode {
    GreenNode::new(kind.into(), children)
}

pub fn space() -> GreenElement {
    token(CsSyntaxKind::Whitespace, " ")
}

/// A run of trivia text split into whitespace, newline and comment tokens
pub fn trivia(text: &str) -> Vec<GreenElement> {
    let (tokens, _) = super::lex_with_trivia(text);
    tokens
        .iter()
        .map(|t| {
            let kind = if t.kind.is_trivia() {
                t.kind
            } else {
                CsSyntaxKind::Whitespace
            };
            token(kind, &t.text)
        })
        .collect()
}

pub fn name_ref(ident: &str) -> GreenNode {
    node(
        CsSyntaxKind::NameRef,
        vec![token(CsSyntaxKind::Ident, ident)],
    )
}

pub fn literal(kind: CsSyntaxKind, text: &str) -> GreenNode {
    node(CsSyntaxKind::Literal, vec![token(kind, text)])
}

/// `(inner)`
pub fn paren(inner: GreenNode) -> GreenNode {
    paren_with_trivia(inner, Vec::new(), Vec::new())
}

/// `(inner)` wrapped in the given leading and trailing trivia
pub fn paren_with_trivia(
    inner: GreenNode,
    leading: Vec<GreenElement>,
    trailing: Vec<GreenElement>,
) -> GreenNode {
    let mut children = leading;
    children.extend([
        token(CsSyntaxKind::LParen, "("),
        NodeOrToken::Node(inner),
        token(CsSyntaxKind::RParen, ")"),
    ]);
    children.extend(trailing);
    node(CsSyntaxKind::ParenExpr, children)
}

/// `receiver.member`
pub fn member_access(receiver: GreenNode, member: &str) -> GreenNode {
    node(
        CsSyntaxKind::MemberAccessExpr,
        vec![
            NodeOrToken::Node(receiver),
            token(CsSyntaxKind::Dot, "."),
            NodeOrToken::Node(name_ref(member)),
        ],
    )
}

/// `callee()`
pub fn call_no_args(callee: GreenNode) -> GreenNode {
    let args = node(
        CsSyntaxKind::ArgList,
        vec![
            token(CsSyntaxKind::LParen, "("),
            token(CsSyntaxKind::RParen, ")"),
        ],
    );
    node(
        CsSyntaxKind::CallExpr,
        vec![NodeOrToken::Node(callee), NodeOrToken::Node(args)],
    )
}

/// `operand is <constant>` with a literal constant pattern
pub fn is_constant(operand: GreenNode, constant_kind: CsSyntaxKind, constant: &str) -> GreenNode {
    let pattern = node(
        CsSyntaxKind::ConstantPattern,
        vec![NodeOrToken::Node(literal(constant_kind, constant))],
    );
    node(
        CsSyntaxKind::IsPatternExpr,
        vec![
            NodeOrToken::Node(operand),
            space(),
            token(CsSyntaxKind::IsKw, "is"),
            space(),
            NodeOrToken::Node(pattern),
        ],
    )
}

/// `lhs <op> rhs` with single spaces around the operator, wrapped in the
/// given leading and trailing trivia
pub fn binary(
    lhs: GreenNode,
    op_kind: CsSyntaxKind,
    op: &str,
    rhs: GreenNode,
    leading: Vec<GreenElement>,
    trailing: Vec<GreenElement>,
) -> GreenNode {
    let mut children = leading;
    children.extend([
        NodeOrToken::Node(lhs),
        space(),
        token(op_kind, op),
        space(),
        NodeOrToken::Node(rhs),
    ]);
    children.extend(trailing);
    node(CsSyntaxKind::BinaryExpr, children)
}

/// `{indent}using A.B.C;{newline}`
pub fn using_directive(indent: &str, namespace: &str, newline: &str) -> GreenNode {
    let mut name_children = Vec::new();
    for (index, segment) in namespace.split('.').enumerate() {
        if index > 0 {
            name_children.push(token(CsSyntaxKind::Dot, "."));
        }
        name_children.push(token(CsSyntaxKind::Ident, segment));
    }

    let mut children = trivia(indent);
    children.extend([
        token(CsSyntaxKind::UsingKw, "using"),
        space(),
        NodeOrToken::Node(node(CsSyntaxKind::Name, name_children)),
        token(CsSyntaxKind::Semicolon, ";"),
    ]);
    children.extend(trivia(newline));
    node(CsSyntaxKind::UsingDirective, children)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::CsSyntaxNode;

    #[test]
    fn test_using_directive_text() {
        let green = using_directive("  ", "System.Linq", "\r\n");
        let node = CsSyntaxNode::new_root(green);

        assert_eq!(node.text().to_string(), "  using System.Linq;\r\n");
        assert_eq!(node.kind(), CsSyntaxKind::UsingDirective);
    }

    #[test]
    fn test_null_or_empty_shape() {
        let lhs = is_constant(name_ref("xs"), CsSyntaxKind::NullKw, "null");
        let any = call_no_args(member_access(name_ref("xs"), "Any"));
        let rhs = is_constant(any, CsSyntaxKind::FalseKw, "false");
        let green = binary(lhs, CsSyntaxKind::PipePipe, "||", rhs, trivia("  "), vec![]);
        let node = CsSyntaxNode::new_root(green);

        assert_eq!(node.text().to_string(), "  xs is null || xs.Any() is false");
    }

    #[test]
    fn test_trivia_splits_tokens() {
        let kinds: Vec<_> = trivia(" // c\n\t")
            .into_iter()
            .map(|element| CsSyntaxKind::ALL[element.kind().0 as usize])
            .collect();

        assert_eq!(
            kinds,
            vec![
                CsSyntaxKind::Whitespace,
                CsSyntaxKind::LineComment,
                CsSyntaxKind::Newline,
                CsSyntaxKind::Whitespace
            ]
        );
    }
}
