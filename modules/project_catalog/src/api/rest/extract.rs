//! Request extractors that reject with problem responses

use super::error::Problem;
use crate::domain::upload::UploadedFile;
use axum::extract::{FromRequest, FromRequestParts, Multipart};

/// JSON body; malformed bodies are a 400 problem
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(Problem))]
pub struct ApiJson<T>(pub T);

/// Path parameters; unparsable ids are a 400 problem
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Problem))]
pub struct ApiPath<T>(pub T);

/// Query string; unparsable values are a 400 problem
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Problem))]
pub struct ApiQuery<T>(pub T);

/// Pull the first part named `name` out of a multipart body
pub async fn file_field(mut multipart: Multipart, name: &str) -> Result<Option<UploadedFile>, Problem> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(name) {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let contents = field.bytes().await?;
        return Ok(Some(UploadedFile { file_name, contents }));
    }
    Ok(None)
}
