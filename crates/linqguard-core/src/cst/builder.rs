//! Thin wrapper over rowan's `GreenNodeBuilder` speaking [`CsSyntaxKind`]

use rowan::{Checkpoint, GreenNode, GreenNodeBuilder};

use super::{CsSyntaxKind, CstToken};

/// Incremental green tree builder used by the parser
#[derive(Default)]
pub struct CstBuilder {
    inner: GreenNodeBuilder<'static>,
}

impl CstBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_node(&mut self, kind: CsSyntaxKind) {
        self.inner.start_node(kind.into());
    }

    /// Wrap everything emitted since `checkpoint` in a node of `kind`
    pub fn start_node_at(&mut self, checkpoint: Checkpoint, kind: CsSyntaxKind) {
        self.inner.start_node_at(checkpoint, kind.into());
    }

    pub fn checkpoint(&self) -> Checkpoint {
        self.inner.checkpoint()
    }

    pub fn finish_node(&mut self) {
        self.inner.finish_node();
    }

    pub fn token(&mut self, kind: CsSyntaxKind, text: &str) {
        self.inner.token(kind.into(), text);
    }

    pub fn add_token(&mut self, token: &CstToken) {
        self.token(token.kind, &token.text);
    }

    pub fn finish(self) -> GreenNode {
        self.inner.finish()
    }
}
