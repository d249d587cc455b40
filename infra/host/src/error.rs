use crate::view::ElementId;
use std::borrow::Cow;

/// A specialized [`HostError`] enum of this crate.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// The element was removed by a re-render after it was looked up.
    #[error("Element {element} is detached{}", format_context(.context))]
    Detached { element: ElementId, context: Option<Cow<'static, str>> },

    /// A fixture could not be decoded.
    #[error("Fixture error{}: {source}", format_context(.context))]
    Fixture { source: serde_json::Error, context: Option<Cow<'static, str>> },
}

impl HostError {
    #[must_use]
    pub const fn detached(element: ElementId) -> Self {
        Self::Detached { element, context: None }
    }
}

pub trait HostErrorExt<T> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, HostError>;
}

impl<T> HostErrorExt<T> for Result<T, HostError> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Self {
        self.map_err(|mut e| {
            match &mut e {
                HostError::Detached { context: c, .. } | HostError::Fixture { context: c, .. } => {
                    *c = Some(context.into());
                },
            }
            e
        })
    }
}

impl<T> HostErrorExt<T> for Result<T, serde_json::Error> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, HostError> {
        self.map_err(|source| HostError::Fixture { source, context: Some(context.into()) })
    }
}

impl From<serde_json::Error> for HostError {
    fn from(source: serde_json::Error) -> Self {
        Self::Fixture { source, context: None }
    }
}

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}
