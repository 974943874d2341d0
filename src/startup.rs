use actix_web::dev::Server;
use actix_web::{error::JsonPayloadError, middleware::Logger, web, App, HttpRequest, HttpServer};
use std::net::TcpListener;

use crate::error::{AppError, RequestFormatError};
use crate::middleware::JwtMiddleware;
use crate::routes::{create_user, health_check, login, refresh, revoke, update_user};
use crate::session::SessionService;

/// Malformed JSON bodies go through the same error path as everything else
fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::RequestFormat(RequestFormatError::InvalidBody(err.to_string())).into()
}

pub fn run(listener: TcpListener, sessions: SessionService) -> Result<Server, std::io::Error> {
    let sessions = web::Data::new(sessions);

    let server = HttpServer::new(move || {
        let codec = sessions.codec().clone();

        App::new()
            .wrap(Logger::default())
            .app_data(sessions.clone())
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .route("/api/healthz", web::get().to(health_check))
            .route("/api/login", web::post().to(login))
            .route("/api/refresh", web::post().to(refresh))
            .route("/api/revoke", web::post().to(revoke))
            .service(
                web::resource("/api/users")
                    .route(web::post().to(create_user))
                    // Credential changes require an access token
                    .route(web::put().to(update_user).wrap(JwtMiddleware::new(codec))),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
