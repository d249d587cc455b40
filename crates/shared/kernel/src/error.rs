use std::borrow::Cow;

/// Errors raised by kernel helpers.
#[derive(Debug, thiserror::Error)]
pub enum KernelError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

pub trait KernelErrorExt<T> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, KernelError>;
}

impl<T> KernelErrorExt<T> for Result<T, config::ConfigError> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, KernelError> {
        self.map_err(|source| KernelError::Config { source, context: Some(context.into()) })
    }
}

impl From<config::ConfigError> for KernelError {
    fn from(source: config::ConfigError) -> Self {
        Self::Config { source, context: None }
    }
}

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}
