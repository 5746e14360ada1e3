use actix_web::web::{Data, Path};
use actix_web::{get, web};

use crate::auth::{Claims, Role};
use crate::db;
use crate::server::Response;
use crate::venues::Venue;

use crate::analytics::models::{PlatformReport, VenueRevenue};

#[get("/analytics/platform")]
async fn platform(claims: Claims, pool: Data<db::Pool>) -> Response {
    claims.require_admin()?;

    let report = web::block(move || PlatformReport::generate(&pool.get()?)).await?;

    http_ok_json!(report);
}

#[get("/analytics/venues")]
async fn venue_revenue(claims: Claims, pool: Data<db::Pool>) -> Response {
    claims.require_role(&[Role::VenueOwner, Role::Admin])?;

    let report =
        web::block(move || VenueRevenue::for_owner(claims.user_id(), &pool.get()?)).await?;

    http_ok_json!(report);
}

#[get("/analytics/owners/{owner_id}")]
async fn owner_revenue(owner_id: Path<i64>, claims: Claims, pool: Data<db::Pool>) -> Response {
    claims.require_admin()?;

    let report = web::block(move || VenueRevenue::for_owner(*owner_id, &pool.get()?)).await?;

    http_ok_json!(report);
}

#[get("/venues/{venue_id}/revenue")]
async fn single_venue(venue_id: Path<i64>, claims: Claims, pool: Data<db::Pool>) -> Response {
    let report = web::block(move || {
        let conn = pool.get()?;
        let venue = Venue::find(*venue_id, &conn)?;

        if !venue.is_owner(&claims) {
            forbidden!("you can only view revenue for your own venues");
        }

        let report = VenueRevenue::for_owner(venue.owner_id, &conn)?
            .into_iter()
            .find(|entry| entry.venue_id == venue.id);

        report.ok_or(crate::errors::ServiceError::NotFound)
    })
    .await?;

    http_ok_json!(report);
}

pub fn register(cfg: &mut web::ServiceConfig) {
    cfg.service(platform);
    cfg.service(venue_revenue);
    cfg.service(owner_revenue);
    cfg.service(single_venue);
}
