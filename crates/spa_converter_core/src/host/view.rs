//! What the host renders for one container.

use crate::container::ContainerToken;
use crate::contract::handle::Renderable;

/// Which branch of the container output was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Loading,
    Error,
    Child,
    Empty,
}

/// Container element produced for the host UI tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerView {
    pub token: ContainerToken,
    pub kind: ViewKind,
    pub content: Renderable,
}

impl ContainerView {
    pub fn text(&self) -> &str {
        self.content.as_str()
    }
}
