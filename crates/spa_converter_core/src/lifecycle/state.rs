//! Child instance state and error payload.

use crate::contract::handle::ChildError;
use crate::contract::validator::ContractError;
use crate::entry::resolver::ResolveError;
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Pipeline stage or lifecycle call that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Resolve,
    Validate,
    Mount,
    Render,
}

impl FailureStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Resolve => "resolve",
            Self::Validate => "validate",
            Self::Mount => "mount",
            Self::Render => "render",
        }
    }
}

/// Human-readable failure carried by [`ChildInstanceState::Error`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorPayload {
    stage: FailureStage,
    message: String,
}

impl ErrorPayload {
    pub fn new(stage: FailureStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }

    pub fn stage(&self) -> FailureStage {
        self.stage
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for ErrorPayload {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<ResolveError> for ErrorPayload {
    fn from(value: ResolveError) -> Self {
        Self::new(FailureStage::Resolve, value.to_string())
    }
}

impl From<ContractError> for ErrorPayload {
    fn from(value: ContractError) -> Self {
        Self::new(FailureStage::Validate, value.to_string())
    }
}

impl ErrorPayload {
    pub(crate) fn from_child(stage: FailureStage, err: &ChildError) -> Self {
        Self::new(stage, err.to_string())
    }
}

/// State of one child instance, owned by its controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildInstanceState {
    Loading,
    Ready,
    Error(ErrorPayload),
}

impl ChildInstanceState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    pub fn error(&self) -> Option<&ErrorPayload> {
        match self {
            Self::Error(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Error(_) => "error",
        }
    }
}
