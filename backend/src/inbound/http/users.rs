//! User registry REST handlers.
//!
//! ```text
//! GET  /hello
//! GET  /users
//! POST /users            [{"name":"...","email":"...","birthdate":"1990-01-01"}, ..]
//! GET  /deleteuser/{id}
//! POST /deleteuser       [{"id":1},{"name":"Bob Johnson"}, ..]
//! DELETE /users?id=1     optional body [{"id":..}|{"name":..}, ..]
//! GET  /crazy            {"id":1} deletes, {"name":"Bob Johnson"} looks up
//! ```

use actix_web::{delete, get, post, web, HttpResponse};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::domain::{
    AggregateResponse, Error, MutationContext, NewUser, ParsedSelector, Selector, User,
    UserValidationError,
};
use crate::inbound::http::error::batch_status_code;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Candidate user payload for `POST /users`.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct NewUserRequest {
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    /// ISO 8601 calendar date.
    #[schema(example = "1815-12-10")]
    pub birthdate: String,
}

fn map_user_validation_error(err: UserValidationError) -> Error {
    match err {
        UserValidationError::EmptyName => Error::invalid_request("name must not be empty")
            .with_details(json!({ "field": "name", "code": "empty_name" })),
        UserValidationError::EmptyEmail => Error::invalid_request("email must not be empty")
            .with_details(json!({ "field": "email", "code": "empty_email" })),
        UserValidationError::InvalidEmail => Error::invalid_request("email must be a valid address")
            .with_details(json!({ "field": "email", "code": "invalid_email" })),
    }
}

fn candidate_from_request(request: NewUserRequest) -> Result<NewUser, Error> {
    let birthdate = request.birthdate.parse::<NaiveDate>().map_err(|_| {
        Error::invalid_request(format!("'{}' is not a valid date", request.birthdate))
            .with_details(json!({ "field": "birthdate", "value": request.birthdate }))
    })?;
    NewUser::try_from_parts(request.name, request.email, birthdate)
        .map_err(map_user_validation_error)
}

/// Render an aggregated batch with its status per the decision table.
pub(super) fn aggregate_to_response(aggregate: &AggregateResponse) -> HttpResponse {
    let status = batch_status_code(aggregate.status());
    match aggregate {
        AggregateResponse::IncorrectRequest { message } => {
            HttpResponse::build(status).json(json!({ "incorrectRequest": message }))
        }
        AggregateResponse::Batch { context, outcome } => {
            let mut body = Map::new();
            body.insert(context.primary_key().to_owned(), json!(outcome.succeeded()));
            if !outcome.failed().is_empty() {
                body.insert("errors".to_owned(), json!(outcome.failed()));
            }
            HttpResponse::build(status).json(Value::Object(body))
        }
    }
}

fn selectors_from_entries(entries: &[Map<String, Value>]) -> Vec<ParsedSelector> {
    entries.iter().map(Selector::from_entry).collect()
}

/// Hardcoded greeting, kept as the smoke-test endpoint.
#[utoipa::path(
    get,
    path = "/hello",
    responses((status = 200, description = "Greeting", content_type = "text/plain")),
    tags = ["users"],
    operation_id = "sayHello"
)]
#[get("/hello")]
pub async fn hello() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("Hello")
}

/// List all registered users.
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "Users", body = [User]),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<User>>> {
    let users = state.registry.list_users().await?;
    Ok(web::Json(users))
}

/// Add one or more users, enforcing name and email uniqueness per candidate.
#[utoipa::path(
    post,
    path = "/users",
    request_body = [NewUserRequest],
    responses(
        (status = 200, description = "All users added"),
        (status = 400, description = "Invalid input data", body = Error),
        (status = 409, description = "One or more users already registered"),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "addUsers"
)]
#[post("/users")]
pub async fn add_users(
    state: web::Data<HttpState>,
    payload: web::Json<Vec<NewUserRequest>>,
) -> ApiResult<HttpResponse> {
    let requests = payload.into_inner();
    if requests.is_empty() {
        return Ok(aggregate_to_response(
            &AggregateResponse::incorrect_request("Missing user entries in request body"),
        ));
    }

    // Field validation fails the whole request before the batch starts;
    // uniqueness conflicts are per-item and collected by the orchestrator.
    let candidates = requests
        .into_iter()
        .map(candidate_from_request)
        .collect::<Result<Vec<_>, _>>()?;

    let outcome = state.registry.add_users(candidates).await?;
    Ok(aggregate_to_response(&AggregateResponse::from_outcome(
        MutationContext::Add,
        outcome,
    )))
}

/// Delete a single user by path identifier.
///
/// The original API really does delete on GET; the route is preserved.
#[utoipa::path(
    get,
    path = "/deleteuser/{id}",
    params(("id" = i64, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 404, description = "User not found")
    ),
    tags = ["users"],
    operation_id = "deleteUserById"
)]
#[get("/deleteuser/{id}")]
pub async fn delete_user_by_path(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    let outcome = state
        .registry
        .delete_users(vec![Ok(Selector::Id(id))])
        .await?;
    Ok(aggregate_to_response(&AggregateResponse::from_outcome(
        MutationContext::Delete,
        outcome,
    )))
}

/// Delete one or more users by id or name.
#[utoipa::path(
    post,
    path = "/deleteuser",
    responses(
        (status = 200, description = "User(s) deleted"),
        (status = 400, description = "No selectors in request body"),
        (status = 404, description = "One or more users not found")
    ),
    tags = ["users"],
    operation_id = "deleteUsersByNameOrId"
)]
#[post("/deleteuser")]
pub async fn delete_users_by_body(
    state: web::Data<HttpState>,
    payload: web::Json<Vec<Map<String, Value>>>,
) -> ApiResult<HttpResponse> {
    let entries = payload.into_inner();
    if entries.is_empty() {
        return Ok(aggregate_to_response(
            &AggregateResponse::incorrect_request("Missing 'id' or 'name' entries in request body"),
        ));
    }

    let outcome = state
        .registry
        .delete_users(selectors_from_entries(&entries))
        .await?;
    Ok(aggregate_to_response(&AggregateResponse::from_outcome(
        MutationContext::Delete,
        outcome,
    )))
}

#[derive(Debug, Deserialize)]
pub struct DeleteUsersQuery {
    id: Option<String>,
}

/// Delete users via query parameter and/or body list.
///
/// Both sources are resolved and merged into one batch, query selector
/// first. A request carrying neither is rejected outright.
#[utoipa::path(
    delete,
    path = "/users",
    params(("id" = Option<String>, Query, description = "User identifier")),
    responses(
        (status = 200, description = "User(s) deleted"),
        (status = 400, description = "No id in query param or request body"),
        (status = 404, description = "One or more users not found")
    ),
    tags = ["users"],
    operation_id = "deleteUsers"
)]
#[delete("/users")]
pub async fn delete_users_flexible(
    state: web::Data<HttpState>,
    query: web::Query<DeleteUsersQuery>,
    payload: Option<web::Json<Vec<Map<String, Value>>>>,
) -> ApiResult<HttpResponse> {
    let mut items: Vec<ParsedSelector> = Vec::new();
    if let Some(raw) = query.into_inner().id {
        items.push(Selector::from_id_text(&raw));
    }
    if let Some(entries) = payload {
        items.extend(selectors_from_entries(&entries.into_inner()));
    }

    if items.is_empty() {
        return Ok(aggregate_to_response(
            &AggregateResponse::incorrect_request(
                "Missing 'id' in query param or request body",
            ),
        ));
    }

    let outcome = state.registry.delete_users(items).await?;
    Ok(aggregate_to_response(&AggregateResponse::from_outcome(
        MutationContext::Delete,
        outcome,
    )))
}

/// Delete by id or look up by name, driven by a JSON body on GET.
///
/// A historical endpoint kept for compatibility: a body with an `id` deletes
/// that user, a body with a `name` reads without mutating. Unlike the batch
/// endpoints it reports a single outcome, not success/error lists.
#[utoipa::path(
    get,
    path = "/crazy",
    responses(
        (status = 200, description = "User deleted or users found"),
        (status = 400, description = "Body carries neither a usable 'id' nor a 'name'"),
        (status = 404, description = "No user matched the body")
    ),
    tags = ["users"],
    operation_id = "crazyDeleteOrLookup"
)]
#[get("/crazy")]
pub async fn crazy_delete_or_lookup(
    state: web::Data<HttpState>,
    payload: Option<web::Json<Map<String, Value>>>,
) -> ApiResult<HttpResponse> {
    let entry = payload.map(web::Json::into_inner).unwrap_or_default();

    if let Some(raw) = entry.get("id") {
        let id = match Selector::from_id_value(raw) {
            Ok(Selector::Id(id)) => id,
            _ => {
                return Ok(HttpResponse::BadRequest()
                    .json(json!({ "error": "'id' must be a valid number" })));
            }
        };
        return Ok(if state.registry.remove_by_id(id).await? {
            HttpResponse::Ok()
                .json(json!({ "message": format!("User with ID {id} deleted successfully") }))
        } else {
            HttpResponse::NotFound().json(json!({ "error": format!("User with ID {id} not found") }))
        });
    }

    if let Some(raw) = entry.get("name") {
        let name = match raw.as_str() {
            Some(name) => name.to_owned(),
            None => raw.to_string(),
        };
        let found = state.registry.lookup_by_name(&name).await?;
        return Ok(if found.is_empty() {
            HttpResponse::NotFound()
                .json(json!({ "error": format!("No user found with name '{name}'") }))
        } else {
            HttpResponse::Ok().json(json!({ "foundUsers": found }))
        });
    }

    Ok(HttpResponse::BadRequest().json(json!({ "error": "Request body must contain 'name' or 'id'" })))
}
