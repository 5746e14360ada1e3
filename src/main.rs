//! TeamTango, a sports venue booking backend for Pune.
#![warn(missing_debug_implementations, rust_2018_idioms)]

#[macro_use]
extern crate diesel;

#[macro_use]
extern crate diesel_migrations;

#[macro_use]
extern crate lazy_static;

#[macro_use]
extern crate log;

#[macro_use]
extern crate serde_derive;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use anyhow::Error;
use dotenv::dotenv;

#[macro_use]
mod macros;

mod analytics;
mod audit;
mod auth;
mod bookings;
mod config;
mod db;
mod errors;
mod feedback;
mod matches;
mod notifications;
mod payments;
mod permissions;
mod schema;
mod server;
mod sports;
mod stats;
mod teams;
mod users;
mod validator;
mod venues;

#[actix_web::main]
async fn main() -> anyhow::Result<(), Error> {
    init().await?;

    Ok(())
}

async fn init() -> anyhow::Result<(), Error> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .expect("unable to initialize the tracing subscriber");

    db::migrate(config::Config::database_url())?;

    let pool = db::build_connection_pool(config::Config::database_url())?;

    debug!("launching the actix webserver");
    server::launch(pool).await?;

    Ok(())
}
