//! User property REST handlers.
//!
//! Properties live in the document store and are written with upsert
//! semantics: the body may carry a single object or a list, and each entry
//! replaces whatever was stored under its user identifier.

use actix_web::{get, post, web, HttpResponse};
use serde_json::Value;

use crate::domain::ports::PropertyStoreError;
use crate::domain::{Error, UserProperty};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

fn map_property_store_error(error: PropertyStoreError) -> Error {
    match error {
        PropertyStoreError::Connection { message } => Error::service_unavailable(message),
        PropertyStoreError::Query { message } => Error::internal(message),
    }
}

/// Accept either a single property object or a list of them.
fn properties_from_body(body: &Value) -> Result<Vec<UserProperty>, Error> {
    let parsed = match body {
        Value::Array(_) => serde_json::from_value::<Vec<UserProperty>>(body.clone()),
        _ => serde_json::from_value::<UserProperty>(body.clone()).map(|property| vec![property]),
    };
    parsed.map_err(|_| Error::invalid_request("Invalid request body"))
}

/// Upsert one or more user properties.
#[utoipa::path(
    post,
    path = "/userproperty",
    request_body = [UserProperty],
    responses(
        (status = 200, description = "User property(ies) added successfully", body = [UserProperty]),
        (status = 400, description = "Invalid input data", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["properties"],
    operation_id = "addUserProperty"
)]
#[post("/userproperty")]
pub async fn add_user_properties(
    state: web::Data<HttpState>,
    payload: web::Json<Value>,
) -> ApiResult<web::Json<Vec<UserProperty>>> {
    let properties = properties_from_body(&payload.into_inner())?;

    // Entries are independent upserts; a later entry with the same user id
    // replaces an earlier one within the same request.
    let mut saved = Vec::with_capacity(properties.len());
    for property in &properties {
        saved.push(
            state
                .properties
                .save(property)
                .await
                .map_err(map_property_store_error)?,
        );
    }
    Ok(web::Json(saved))
}

/// Fetch the property document stored under a user identifier.
#[utoipa::path(
    get,
    path = "/userproperty/{userId}",
    params(("userId" = String, Path, description = "Caller-supplied user identifier")),
    responses(
        (status = 200, description = "Stored user property", body = UserProperty),
        (status = 404, description = "No property stored for this identifier", body = Error)
    ),
    tags = ["properties"],
    operation_id = "getUserProperty"
)]
#[get("/userproperty/{user_id}")]
pub async fn get_user_property(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = path.into_inner();
    let stored = state
        .properties
        .find_by_id(&user_id)
        .await
        .map_err(map_property_store_error)?;

    match stored {
        Some(property) => Ok(HttpResponse::Ok().json(property)),
        None => Err(Error::not_found(format!(
            "No property stored for user '{user_id}'"
        ))),
    }
}
