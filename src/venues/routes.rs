use actix_web::web::{Data, Json, Path, Query};
use actix_web::{delete, get, post, put, web};
use serde_json::json;

use crate::audit;
use crate::auth::Claims;
use crate::db;
use crate::permissions::{self, Action};
use crate::server::Response;
use crate::validator::Validator;

use crate::venues::models::{CreateVenue, UpdateVenue, Venue, VenueFilter};

#[get("/venues")]
async fn find_all(filter: Query<VenueFilter>, pool: Data<db::Pool>) -> Response {
    let venues = web::block(move || Venue::find_all(filter.into_inner(), &pool.get()?)).await?;

    http_ok_json!(venues);
}

#[get("/venues/{id}")]
async fn find(venue_id: Path<i64>, pool: Data<db::Pool>) -> Response {
    let venue = web::block(move || Venue::find(*venue_id, &pool.get()?)).await?;

    http_ok_json!(venue);
}

#[post("/venues")]
async fn create(
    venue: Json<Validator<CreateVenue>>,
    claims: Claims,
    pool: Data<db::Pool>,
) -> Response {
    let mut venue = venue.into_inner().validate()?;

    if !claims.is_admin() || venue.owner_id.is_none() {
        venue.owner_id = Some(claims.user_id());
    }

    let venue = web::block(move || {
        let conn = pool.get()?;

        permissions::check(&claims, "venues", Action::Insert, &conn)?;

        let venue = Venue::create(venue, &conn)?;

        audit::log(
            Some(claims.user_id()),
            "CREATE",
            "venues",
            Some(venue.id),
            json!({ "venue_name": venue.venue_name }),
            &conn,
        );

        Ok(venue)
    })
    .await?;

    http_created_json!(venue);
}

#[put("/venues/{id}")]
async fn update(
    venue_id: Path<i64>,
    update: Json<Validator<UpdateVenue>>,
    claims: Claims,
    pool: Data<db::Pool>,
) -> Response {
    let update = update.into_inner().validate()?;

    let venue = web::block(move || {
        let conn = pool.get()?;
        let venue = Venue::find(*venue_id, &conn)?;

        if !venue.is_owner(&claims) {
            forbidden!("you can only update your own venues");
        }

        let venue = venue.update(update, &conn)?;

        audit::log(
            Some(claims.user_id()),
            "UPDATE",
            "venues",
            Some(venue.id),
            json!({ "venue_name": venue.venue_name }),
            &conn,
        );

        Ok(venue)
    })
    .await?;

    http_ok_json!(venue);
}

#[delete("/venues/{id}")]
async fn delete(venue_id: Path<i64>, claims: Claims, pool: Data<db::Pool>) -> Response {
    web::block(move || {
        let conn = pool.get()?;
        let venue = Venue::find(*venue_id, &conn)?;

        if !venue.is_owner(&claims) {
            forbidden!("you can only delete your own venues");
        }

        venue.delete(&conn)?;

        audit::log(
            Some(claims.user_id()),
            "DELETE",
            "venues",
            Some(venue.id),
            json!({ "venue_name": venue.venue_name }),
            &conn,
        );

        Ok(())
    })
    .await?;

    http_ok_json!(json!({ "message": "venue deleted" }));
}

pub fn register(cfg: &mut web::ServiceConfig) {
    cfg.service(find_all);
    cfg.service(find);
    cfg.service(create);
    cfg.service(update);
    cfg.service(delete);
}
