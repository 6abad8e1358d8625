//! Error kinds the binary reports differently.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// A problem with the user's input or invocation.
///
/// Shown verbatim so the user can correct it. Every other error is logged
/// and replaced by the generic failure screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserError(String);

impl UserError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl Display for UserError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Error for UserError {}

/// Whether `err` should be shown to the user as-is.
pub fn is_user_error(err: &anyhow::Error) -> bool {
    err.downcast_ref::<UserError>().is_some()
}
