use std::borrow::Cow;
use tcard_domain::color::InvalidColor;
use tcard_host::HostError;
use tcard_storage::StoreError;

/// A specialized [`OverlayError`] enum of this crate.
#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
    /// No enhancement is registered under `name`.
    #[error("Enhancement '{name}' not found{}", format_context(.context))]
    NotFound { name: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A write to the host view failed, typically because a re-render detached the element.
    #[error("Host mutation failed{}: {source}", format_context(.context))]
    Host { source: HostError, context: Option<Cow<'static, str>> },

    #[error("Preference persistence failed{}: {source}", format_context(.context))]
    Persistence { source: StoreError, context: Option<Cow<'static, str>> },

    /// A command could not be decoded into a known request shape.
    #[error("Invalid request{}: {message}", format_context(.context))]
    Protocol { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("{source}{}", format_context(.context))]
    InvalidColor { source: InvalidColor, context: Option<Cow<'static, str>> },

    /// The event loop is gone; no further commands can be served.
    #[error("Driver stopped{}", format_context(.context))]
    Stopped { context: Option<Cow<'static, str>> },
}

impl OverlayError {
    pub fn not_found(name: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound { name: name.into(), context: None }
    }
}

pub trait OverlayErrorExt<T> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, OverlayError>;
}

impl<T> OverlayErrorExt<T> for Result<T, OverlayError> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Self {
        self.map_err(|mut e| {
            match &mut e {
                OverlayError::NotFound { context: c, .. }
                | OverlayError::Host { context: c, .. }
                | OverlayError::Persistence { context: c, .. }
                | OverlayError::Protocol { context: c, .. }
                | OverlayError::InvalidColor { context: c, .. }
                | OverlayError::Stopped { context: c } => *c = Some(context.into()),
            }
            e
        })
    }
}

impl<T> OverlayErrorExt<T> for Result<T, HostError> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, OverlayError> {
        self.map_err(|source| OverlayError::Host { source, context: Some(context.into()) })
    }
}

impl<T> OverlayErrorExt<T> for Result<T, StoreError> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, OverlayError> {
        self.map_err(|source| OverlayError::Persistence { source, context: Some(context.into()) })
    }
}

impl From<HostError> for OverlayError {
    fn from(source: HostError) -> Self {
        Self::Host { source, context: None }
    }
}

impl From<StoreError> for OverlayError {
    fn from(source: StoreError) -> Self {
        Self::Persistence { source, context: None }
    }
}

impl From<InvalidColor> for OverlayError {
    fn from(source: InvalidColor) -> Self {
        Self::InvalidColor { source, context: None }
    }
}

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}
