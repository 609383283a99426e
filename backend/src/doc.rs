//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct generating the OpenAPI specification for
//! the REST and RPC surfaces. The generated JSON document is served at
//! `/api-docs/openapi.json` in debug builds.

use utoipa::OpenApi;

use crate::domain::{Error, ErrorCode, User, UserProperty};
use crate::inbound::http::users::NewUserRequest;
use crate::inbound::rpc::users::{
    AddUserRequest, AddUserResponse, DeleteUserEntry, DeleteUsersRequest, DeleteUsersResponse,
    GetUsersResponse, UserMessage,
};

/// OpenAPI document for the registry API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "User registry API",
        description = "Registry of users with batch add/delete by id or name, \
                       plus per-user property documents."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::hello,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::add_users,
        crate::inbound::http::users::delete_user_by_path,
        crate::inbound::http::users::delete_users_by_body,
        crate::inbound::http::users::delete_users_flexible,
        crate::inbound::http::users::crazy_delete_or_lookup,
        crate::inbound::http::properties::add_user_properties,
        crate::inbound::http::properties::get_user_property,
        crate::inbound::rpc::users::add_user,
        crate::inbound::rpc::users::get_users,
        crate::inbound::rpc::users::delete_users,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        User,
        Error,
        ErrorCode,
        NewUserRequest,
        UserProperty,
        UserMessage,
        AddUserRequest,
        AddUserResponse,
        GetUsersResponse,
        DeleteUserEntry,
        DeleteUsersRequest,
        DeleteUsersResponse,
    )),
    tags(
        (name = "users", description = "User registry operations"),
        (name = "properties", description = "Per-user property documents"),
        (name = "rpc", description = "RPC surface mirroring the stub-generated interface"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
