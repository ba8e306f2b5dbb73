use std::net::TcpListener;
use std::sync::Arc;

use actix_web::dev::Server;
use actix_web::{web, App, HttpResponse, HttpServer};

use crate::auth::RevocationList;
use crate::configuration::JwtSettings;
use crate::logger::RequestLogger;
use crate::middleware::JwtMiddleware;
use crate::repository::{CalculationRepository, UserRepository};
use crate::routes::{
    create_calculation, delete_calculation, get_calculation, get_current_user, health_check,
    list_calculations, login, logout, refresh, register, update_calculation,
};

/// Bodies that fail to deserialize against a route's schema come back as
/// 422, matching the error shape used elsewhere.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        actix_web::error::InternalError::from_response(
            err,
            HttpResponse::UnprocessableEntity().json(serde_json::json!({
                "message": message,
                "code": "UNPROCESSABLE_ENTITY",
                "status": 422,
            })),
        )
        .into()
    })
}

/// Build the HTTP server on an already-bound listener.
///
/// Storage is injected as trait objects so tests can run the full stack on
/// in-memory backends.
pub fn run(
    listener: TcpListener,
    users: Arc<dyn UserRepository>,
    calculations: Arc<dyn CalculationRepository>,
    revocations: RevocationList,
    jwt_config: JwtSettings,
) -> Result<Server, std::io::Error> {
    let users = web::Data::from(users);
    let calculations = web::Data::from(calculations);
    let revocations_data = web::Data::new(revocations.clone());
    let jwt_data = web::Data::new(jwt_config.clone());

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestLogger)
            .app_data(json_config())
            .app_data(users.clone())
            .app_data(calculations.clone())
            .app_data(revocations_data.clone())
            .app_data(jwt_data.clone())
            .route("/health", web::get().to(health_check))
            .route("/auth/register", web::post().to(register))
            .route("/auth/login", web::post().to(login))
            .route("/auth/refresh", web::post().to(refresh))
            .route("/auth/logout", web::post().to(logout))
            .service(
                web::resource("/auth/me")
                    .wrap(JwtMiddleware::new(jwt_config.clone(), revocations.clone()))
                    .route(web::get().to(get_current_user)),
            )
            .service(
                web::scope("/calculations")
                    .wrap(JwtMiddleware::new(jwt_config.clone(), revocations.clone()))
                    .route("", web::get().to(list_calculations))
                    .route("", web::post().to(create_calculation))
                    .route("/{id}", web::get().to(get_calculation))
                    .route("/{id}", web::put().to(update_calculation))
                    .route("/{id}", web::delete().to(delete_calculation)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
