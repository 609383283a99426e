//! Server construction and route wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::inbound::http::health::{live, ready, HealthState};
use crate::inbound::http::properties::{add_user_properties, get_user_property};
use crate::inbound::http::users::{
    add_users, crazy_delete_or_lookup, delete_user_by_path, delete_users_by_body,
    delete_users_flexible, hello, list_users,
};
use crate::inbound::rpc::users as rpc_users;
use state_builders::build_http_state;
#[cfg(debug_assertions)]
use utoipa::OpenApi;

#[cfg(debug_assertions)]
async fn openapi_json() -> web::Json<utoipa::openapi::OpenApi> {
    web::Json(ApiDoc::openapi())
}

/// Register every route on a service config.
///
/// Shared by [`create_server`] and the integration tests, so the test app
/// and the real app cannot drift apart. State (`HttpState`, `HealthState`)
/// is attached by the caller via `app_data`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(hello)
        .service(list_users)
        .service(add_users)
        .service(delete_user_by_path)
        .service(delete_users_by_body)
        .service(delete_users_flexible)
        .service(crazy_delete_or_lookup)
        .service(add_user_properties)
        .service(get_user_property)
        .service(
            web::scope("/rpc")
                .service(rpc_users::add_user)
                .service(rpc_users::get_users)
                .service(rpc_users::delete_users),
        )
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    cfg.route("/api-docs/openapi.json", web::get().to(openapi_json));
}

/// Construct an Actix HTTP server from the provided health state and
/// configuration.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let http_state = build_http_state(&config);
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        App::new()
            .app_data(server_health_state.clone())
            .app_data(http_state.clone())
            .configure(configure)
    })
    .bind(config.bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
