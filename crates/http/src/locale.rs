//! Request locale negotiated from the `Accept-Language` header.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{header::ACCEPT_LANGUAGE, request::Parts},
};

/// Preferred locale of the client, if it sent a usable `Accept-Language`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestLocale(pub Option<String>);

impl RequestLocale {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Pick the language range with the highest quality; ties keep header order.
    pub fn from_header(value: &str) -> Self {
        let mut best: Option<(f32, &str)> = None;

        for entry in value.split(',') {
            let mut parts = entry.split(';').map(str::trim);
            let Some(tag) = parts.next().filter(|tag| !tag.is_empty() && *tag != "*") else {
                continue;
            };

            let quality = parts
                .find_map(|param| param.strip_prefix("q="))
                .and_then(|q| q.trim().parse::<f32>().ok())
                .unwrap_or(1.0);

            if quality <= 0.0 {
                continue;
            }
            if best.map_or(true, |(current, _)| quality > current) {
                best = Some((quality, tag));
            }
        }

        Self(best.map(|(_, tag)| tag.to_ascii_lowercase()))
    }
}

impl<S> FromRequestParts<S> for RequestLocale
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .headers
            .get(ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok())
            .map(Self::from_header)
            .unwrap_or_default())
    }
}
