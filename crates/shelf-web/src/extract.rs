//! Request extractors shared by the product and export handlers.

use axum::{
    extract::{FromRequestParts, Path},
    http::{StatusCode, request::Parts},
};
use shelf_core::ProductId;

/// The `{id}` segment of a product URL.
///
/// A segment that is not an integer matches no product route and is a 404.
#[derive(Debug, Clone, Copy)]
pub struct IdPath(pub ProductId);

impl<S: Send + Sync> FromRequestParts<S> for IdPath {
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<i64>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(IdPath(ProductId(id))),
            Err(rejection) => {
                tracing::debug!(%rejection, path = %parts.uri.path(), "Not a product id");
                Err(StatusCode::NOT_FOUND)
            }
        }
    }
}
