//! Trivia helpers for the C# CST
//!
//! Nodes carry their leading and trailing trivia, so a node's text range
//! includes indentation and end-of-line comments. Diagnostics and rewrites
//! work on the trimmed range instead and move the edge trivia over to any
//! replacement node.

use rowan::{NodeOrToken, TextRange, WalkEvent};

use super::{CstBuilder, CsSyntaxNode, CsSyntaxToken};

/// Range of `node` without leading and trailing trivia
///
/// A node made only of trivia yields an empty range at its start.
pub fn trimmed_range(node: &CsSyntaxNode) -> TextRange {
    let tokens = significant_tokens(node);
    match (tokens.first(), tokens.last()) {
        (Some(first), Some(last)) => {
            TextRange::new(first.text_range().start(), last.text_range().end())
        }
        _ => TextRange::empty(node.text_range().start()),
    }
}

/// Trivia text in front of the first significant token of `node`
pub fn leading_trivia(node: &CsSyntaxNode) -> String {
    let range = trimmed_range(node);
    let full = node.text_range();
    slice_text(node, TextRange::new(full.start(), range.start()))
}

/// Trivia text after the last significant token of `node`
pub fn trailing_trivia(node: &CsSyntaxNode) -> String {
    let range = trimmed_range(node);
    let full = node.text_range();
    slice_text(node, TextRange::new(range.end(), full.end()))
}

/// Leading trivia tokens of `node`, in source order
pub fn leading_trivia_tokens(node: &CsSyntaxNode) -> Vec<CsSyntaxToken> {
    all_tokens(node)
        .into_iter()
        .take_while(|token| token.kind().is_trivia())
        .collect()
}

/// Trailing trivia tokens of `node`, in source order
pub fn trailing_trivia_tokens(node: &CsSyntaxNode) -> Vec<CsSyntaxToken> {
    let mut tokens: Vec<_> = all_tokens(node)
        .into_iter()
        .rev()
        .take_while(|token| token.kind().is_trivia())
        .collect();
    tokens.reverse();
    tokens
}

/// Copy of `node` with its edge trivia dropped; interior trivia is kept
pub fn without_edge_trivia(node: &CsSyntaxNode) -> rowan::GreenNode {
    let tokens = all_tokens(node);
    let first = tokens.iter().position(|token| !token.kind().is_trivia());
    let last = tokens.iter().rposition(|token| !token.kind().is_trivia());

    let mut builder = CstBuilder::new();
    let mut index = 0usize;
    for event in node.preorder_with_tokens() {
        match event {
            WalkEvent::Enter(NodeOrToken::Node(child)) => builder.start_node(child.kind()),
            WalkEvent::Leave(NodeOrToken::Node(_)) => builder.finish_node(),
            WalkEvent::Enter(NodeOrToken::Token(token)) => {
                let keep = match (first, last) {
                    (Some(first), Some(last)) => index >= first && index <= last,
                    _ => false,
                };
                if keep {
                    builder.token(token.kind(), token.text());
                }
                index += 1;
            }
            WalkEvent::Leave(NodeOrToken::Token(_)) => {}
        }
    }
    builder.finish()
}

/// Source text of `node` with every trivia token removed
pub fn compact_text(node: &CsSyntaxNode) -> String {
    significant_tokens(node)
        .iter()
        .map(|token| token.text().to_string())
        .collect()
}

fn all_tokens(node: &CsSyntaxNode) -> Vec<CsSyntaxToken> {
    node.descendants_with_tokens()
        .filter_map(|element| element.into_token())
        .collect()
}

fn significant_tokens(node: &CsSyntaxNode) -> Vec<CsSyntaxToken> {
    node.descendants_with_tokens()
        .filter_map(|element| element.into_token())
        .filter(|token| !token.kind().is_trivia())
        .collect()
}

fn slice_text(node: &CsSyntaxNode, range: TextRange) -> String {
    let full = node.text_range();
    let relative = range - full.start();
    node.text().slice(relative).to_string()
}
