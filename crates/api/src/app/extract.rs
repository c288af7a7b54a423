//! Request-body extraction with enveloped rejections.

use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;

use crate::app::errors;

/// `axum::Json` under this API's error contract: a body that cannot be
/// deserialized into the target type is a `400` carrying the usual
/// `{"error","message"}` envelope, not axum's plain-text `415`/`422`.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: serde::de::DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = axum::response::Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(body)) => Ok(ApiJson(body)),
            Err(rejection) => {
                tracing::debug!(error = %rejection, "rejected request body");
                Err(errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "validation_error",
                    rejection.body_text(),
                ))
            }
        }
    }
}
