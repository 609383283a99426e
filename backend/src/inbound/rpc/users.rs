//! User registry RPC handlers.
//!
//! ```text
//! POST /rpc/users/add     {"user": {"name":"...","email":"...","birthdate":"1990-01-01"}}
//! POST /rpc/users/list    {}
//! POST /rpc/users/delete  {"request": [{"id":1},{"name":"Bob Johnson"}, ..]}
//! ```
//!
//! Message fields follow the wire conventions of the stub-generated
//! interface this replaces: an `id` of 0 and an empty `name` both read as
//! unset, and empty repeated fields are omitted from responses.

use actix_web::{post, web, HttpResponse};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{
    AggregateResponse, Error, MutationContext, NewUser, ParsedSelector, Registration, Selector,
    SelectorParseError, User,
};
use crate::inbound::http::error::batch_status_code;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Wire representation of a user record.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UserMessage {
    #[serde(default)]
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    /// ISO 8601 calendar date.
    #[schema(example = "1815-12-10")]
    pub birthdate: String,
}

impl UserMessage {
    fn from_user(user: &User) -> Self {
        Self {
            id: user.id(),
            name: user.name().to_string(),
            email: user.email().to_string(),
            birthdate: user.birthdate().to_string(),
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AddUserRequest {
    pub user: UserMessage,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AddUserResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub error: Vec<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct GetUsersResponse {
    pub users: Vec<UserMessage>,
}

/// One delete selector entry; `id` 0 and empty `name` both mean unset.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct DeleteUserEntry {
    #[serde(default)]
    #[schema(example = 1)]
    pub id: i64,
    #[serde(default)]
    #[schema(example = "Bob Johnson")]
    pub name: String,
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct DeleteUsersRequest {
    #[serde(default)]
    pub request: Vec<DeleteUserEntry>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DeleteUsersResponse {
    pub delete: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub error: Vec<String>,
}

fn candidate_from_message(message: UserMessage) -> Result<NewUser, Error> {
    let birthdate = message.birthdate.parse::<NaiveDate>().map_err(|_| {
        Error::invalid_request(format!("'{}' is not a valid date", message.birthdate))
            .with_details(json!({ "field": "birthdate", "value": message.birthdate }))
    })?;
    NewUser::try_from_parts(message.name, message.email, birthdate)
        .map_err(|err| Error::invalid_request(err.to_string()))
}

fn selector_from_entry(entry: &DeleteUserEntry) -> ParsedSelector {
    if entry.id != 0 {
        return Ok(Selector::Id(entry.id));
    }
    if !entry.name.is_empty() {
        return Ok(Selector::Name(entry.name.clone()));
    }
    let raw = serde_json::to_string(entry).unwrap_or_else(|_| "{}".to_owned());
    Err(SelectorParseError::unrecognised(raw))
}

/// Register a single candidate user.
///
/// An unparsable date or a field validation failure is rejected before the
/// orchestrator runs; uniqueness failures are collected into the `error`
/// list with both checks reported when both fail.
#[utoipa::path(
    post,
    path = "/rpc/users/add",
    request_body = AddUserRequest,
    responses(
        (status = 200, description = "User registered", body = AddUserResponse),
        (status = 400, description = "Invalid input data", body = Error),
        (status = 409, description = "Name or email already registered", body = AddUserResponse)
    ),
    tags = ["rpc"],
    operation_id = "rpcAddUser"
)]
#[post("/users/add")]
pub async fn add_user(
    state: web::Data<HttpState>,
    payload: web::Json<AddUserRequest>,
) -> ApiResult<HttpResponse> {
    let candidate = candidate_from_message(payload.into_inner().user)?;

    match state.registry.register_user(candidate).await? {
        Registration::Registered(user) => Ok(HttpResponse::Ok().json(AddUserResponse {
            user: Some(UserMessage::from_user(&user)),
            error: Vec::new(),
        })),
        Registration::Rejected(errors) => Ok(HttpResponse::Conflict().json(AddUserResponse {
            user: None,
            error: errors,
        })),
    }
}

/// List all registered users.
#[utoipa::path(
    post,
    path = "/rpc/users/list",
    responses((status = 200, description = "Users", body = GetUsersResponse)),
    tags = ["rpc"],
    operation_id = "rpcGetUsers"
)]
#[post("/users/list")]
pub async fn get_users(state: web::Data<HttpState>) -> ApiResult<web::Json<GetUsersResponse>> {
    let users = state.registry.list_users().await?;
    Ok(web::Json(GetUsersResponse {
        users: users.iter().map(UserMessage::from_user).collect(),
    }))
}

/// Delete a batch of users by id or name.
#[utoipa::path(
    post,
    path = "/rpc/users/delete",
    request_body = DeleteUsersRequest,
    responses(
        (status = 200, description = "All selectors deleted", body = DeleteUsersResponse),
        (status = 400, description = "No selectors in the request"),
        (status = 404, description = "One or more selectors unmatched", body = DeleteUsersResponse)
    ),
    tags = ["rpc"],
    operation_id = "rpcDeleteUsers"
)]
#[post("/users/delete")]
pub async fn delete_users(
    state: web::Data<HttpState>,
    payload: web::Json<DeleteUsersRequest>,
) -> ApiResult<HttpResponse> {
    let entries = payload.into_inner().request;
    if entries.is_empty() {
        return Ok(HttpResponse::BadRequest()
            .json(json!({ "incorrectRequest": "Missing 'id' or 'name' entries in request" })));
    }

    let items = entries.iter().map(selector_from_entry).collect();
    let outcome = state.registry.delete_users(items).await?;
    let status = batch_status_code(
        AggregateResponse::from_outcome(MutationContext::Delete, outcome.clone()).status(),
    );

    Ok(HttpResponse::build(status).json(DeleteUsersResponse {
        delete: outcome.succeeded().to_vec(),
        error: outcome.failed().to_vec(),
    }))
}
