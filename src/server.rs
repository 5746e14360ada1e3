use actix_cors::Cors;
use actix_files as fs;
use actix_web::{get, middleware, web, App, HttpRequest, HttpResponse, HttpServer};

use crate::analytics;
use crate::auth;
use crate::bookings;
use crate::config::Config;
use crate::db;
use crate::errors::ServiceError;
use crate::feedback;
use crate::matches;
use crate::notifications;
use crate::payments;
use crate::sports;
use crate::stats;
use crate::teams;
use crate::users;
use crate::venues;

pub type Response = Result<HttpResponse, ServiceError>;

#[get("/health")]
async fn health(_: HttpRequest) -> &'static str {
    "ok"
}

pub async fn launch(db_pool: db::Pool) -> std::io::Result<()> {
    let stats = web::Data::new(stats::Stats::new());

    HttpServer::new(move || {
        App::new()
            .data(db_pool.clone())
            .app_data(stats.clone())
            .wrap(middleware::DefaultHeaders::new().header("X-Version", env!("CARGO_PKG_VERSION")))
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .wrap(middleware::NormalizePath::default())
            .wrap(stats::Middleware::default())
            .wrap(Cors::permissive())
            .data(web::JsonConfig::default().limit(262_144))
            .data(web::PayloadConfig::default().limit(262_144))
            .service(
                web::scope("/api")
                    .configure(auth::routes::register)
                    .configure(users::routes::register)
                    .configure(sports::routes::register)
                    .configure(venues::routes::register)
                    .configure(bookings::routes::register)
                    .configure(payments::routes::register)
                    .configure(teams::routes::register)
                    .configure(matches::routes::register)
                    .configure(feedback::routes::register)
                    .configure(notifications::routes::register)
                    .configure(analytics::routes::register)
                    .service(stats::route)
                    .service(health),
            )
            .service(fs::Files::new("/", "./static").index_file("index.html"))
    })
    .bind(format!("{}:{}", Config::api_host(), Config::api_port()))?
    .run()
    .await
}
