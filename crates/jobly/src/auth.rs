//! Authorization gates over an already-verified principal.
//!
//! Token verification happens upstream; these helpers only decide whether the
//! principal it produced (if any) may proceed.

use crate::error::{JoblyError, JoblyResult};
use serde::Deserialize;

/// The caller identity carried by a verified token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub username: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// Require any authenticated caller.
pub fn ensure_logged_in(principal: Option<&Principal>) -> JoblyResult<&Principal> {
    principal.ok_or(JoblyError::Unauthorized)
}

/// Require an authenticated administrator.
pub fn ensure_admin(principal: Option<&Principal>) -> JoblyResult<&Principal> {
    match ensure_logged_in(principal)? {
        p if p.is_admin => Ok(p),
        _ => Err(JoblyError::Unauthorized),
    }
}
