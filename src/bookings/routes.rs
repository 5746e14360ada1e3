use actix_web::web::{Data, Json, Path, Query};
use actix_web::{delete, get, post, put, web};
use chrono::NaiveDate;
use serde_json::json;

use crate::audit;
use crate::auth::Claims;
use crate::db;
use crate::permissions::{self, Action};
use crate::server::Response;
use crate::validator::Validator;
use crate::venues::Venue;

use crate::bookings::models::{Booking, NewBooking, Timeslot, UpdateBooking};

#[derive(Debug, Deserialize)]
pub struct TimeslotFilter {
    pub date: Option<NaiveDate>,
}

#[post("/bookings")]
async fn create(
    booking: Json<Validator<NewBooking>>,
    claims: Claims,
    pool: Data<db::Pool>,
) -> Response {
    let booking = booking.into_inner().validate()?;

    let booking = web::block(move || {
        let conn = pool.get()?;

        permissions::check(&claims, "bookings", Action::Insert, &conn)?;

        let booking = booking.create(claims.user_id(), &conn)?;

        audit::log(
            Some(claims.user_id()),
            "CREATE",
            "bookings",
            Some(booking.id),
            json!({ "venue_id": booking.venue_id, "total_amount": booking.total_amount }),
            &conn,
        );

        Ok(booking)
    })
    .await?;

    http_created_json!(booking);
}

#[get("/bookings")]
async fn find_all(claims: Claims, pool: Data<db::Pool>) -> Response {
    let bookings = web::block(move || Booking::find_all(&claims, &pool.get()?)).await?;

    http_ok_json!(bookings);
}

#[get("/bookings/venue/{venue_id}")]
async fn find_for_venue(venue_id: Path<i64>, claims: Claims, pool: Data<db::Pool>) -> Response {
    let bookings = web::block(move || {
        let conn = pool.get()?;
        let venue = Venue::find(*venue_id, &conn)?;

        if !venue.is_owner(&claims) {
            forbidden!("only the venue owner can list a venue's bookings");
        }

        Booking::find_for_venue(venue.id, &conn)
    })
    .await?;

    http_ok_json!(bookings);
}

#[get("/bookings/{id}")]
async fn find(booking_id: Path<i64>, claims: Claims, pool: Data<db::Pool>) -> Response {
    let booking = web::block(move || {
        let conn = pool.get()?;
        let booking = Booking::find(*booking_id, &conn)?;

        if !booking.can_view(&claims, &conn)? {
            forbidden!("you can only view your own bookings or bookings at your venues");
        }

        Ok(booking)
    })
    .await?;

    http_ok_json!(booking);
}

#[put("/bookings/{id}")]
async fn update(
    booking_id: Path<i64>,
    update: Json<UpdateBooking>,
    claims: Claims,
    pool: Data<db::Pool>,
) -> Response {
    let booking = web::block(move || {
        let conn = pool.get()?;
        let booking = Booking::update(*booking_id, update.into_inner(), &claims, &conn)?;

        audit::log(
            Some(claims.user_id()),
            "UPDATE",
            "bookings",
            Some(booking.id),
            json!({ "status": booking.status }),
            &conn,
        );

        Ok(booking)
    })
    .await?;

    http_ok_json!(booking);
}

#[delete("/bookings/{id}")]
async fn cancel(booking_id: Path<i64>, claims: Claims, pool: Data<db::Pool>) -> Response {
    let booking = web::block(move || {
        let conn = pool.get()?;
        let booking = Booking::cancel(*booking_id, &claims, &conn)?;

        audit::log(
            Some(claims.user_id()),
            "CANCEL",
            "bookings",
            Some(booking.id),
            json!({ "status": booking.status }),
            &conn,
        );

        Ok(booking)
    })
    .await?;

    http_ok_json!(booking);
}

#[get("/venues/{venue_id}/timeslots")]
async fn venue_timeslots(
    venue_id: Path<i64>,
    filter: Query<TimeslotFilter>,
    pool: Data<db::Pool>,
) -> Response {
    let slots = web::block(move || {
        let conn = pool.get()?;

        // surface a 404 for venues that don't exist
        let venue = Venue::find(*venue_id, &conn)?;

        Timeslot::find_for_venue(venue.id, filter.date, &conn)
    })
    .await?;

    http_ok_json!(slots);
}

pub fn register(cfg: &mut web::ServiceConfig) {
    cfg.service(create);
    cfg.service(find_all);
    cfg.service(find_for_venue);
    cfg.service(find);
    cfg.service(update);
    cfg.service(cancel);
    cfg.service(venue_timeslots);
}
