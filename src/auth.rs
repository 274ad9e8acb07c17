//! Caller identity and the authorization policy for admin-only reads.
//!
//! Authentication itself happens upstream; the identity provider forwards the verified
//! e-mail in [`AUTHENTICATED_EMAIL_HEADER`].

use std::collections::HashSet;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::StorefrontError;

pub const AUTHENTICATED_EMAIL_HEADER: &str = "x-authenticated-email";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Caller {
    pub email: String,
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = StorefrontError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(AUTHENTICATED_EMAIL_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|email| Caller { email: email.to_string() })
            .ok_or(StorefrontError::Forbidden)
    }
}

pub trait AuthorizationPolicy: Send + Sync {
    fn may_list_orders(&self, caller: &Caller) -> bool;
}

/// Admins are the configured e-mail addresses, compared case-insensitively.
#[derive(Clone, Debug, Default)]
pub struct AdminAllowList {
    emails: HashSet<String>,
}

impl AdminAllowList {
    pub fn new<I, E>(emails: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: AsRef<str>,
    {
        let emails = emails
            .into_iter()
            .map(|e| e.as_ref().trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        Self { emails }
    }

    pub fn is_empty(&self) -> bool { self.emails.is_empty() }
}

impl AuthorizationPolicy for AdminAllowList {
    fn may_list_orders(&self, caller: &Caller) -> bool {
        self.emails.contains(&caller.email.trim().to_lowercase())
    }
}
