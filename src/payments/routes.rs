use actix_web::web::{Data, Json, Path};
use actix_web::{get, post, web};
use serde_json::json;

use crate::audit;
use crate::auth::Claims;
use crate::bookings::Booking;
use crate::db;
use crate::notifications::Notification;
use crate::server::Response;

use crate::payments::models::{Payment, ProcessPayment};

#[post("/payments/bookings/{booking_id}")]
async fn process(
    booking_id: Path<i64>,
    message: Json<ProcessPayment>,
    claims: Claims,
    pool: Data<db::Pool>,
) -> Response {
    let payment = web::block(move || {
        let conn = pool.get()?;
        let payment = Payment::process(*booking_id, message.into_inner(), &claims, &conn)?;

        audit::log(
            Some(claims.user_id()),
            "PAYMENT",
            "payments",
            Some(payment.id),
            json!({ "booking_id": payment.booking_id, "amount": payment.amount }),
            &conn,
        );

        // the confirmation goes to the player, not necessarily the payer
        let booking = Booking::find(payment.booking_id, &conn)?;

        Notification::push(
            booking.user_id,
            &format!(
                "Payment of ₹{} received, booking #{} is confirmed",
                payment.amount, payment.booking_id
            ),
            &conn,
        );

        Ok(payment)
    })
    .await?;

    http_ok_json!(payment);
}

#[post("/payments/{id}/refund")]
async fn refund(payment_id: Path<i64>, claims: Claims, pool: Data<db::Pool>) -> Response {
    claims.require_admin()?;

    let payment = web::block(move || {
        let conn = pool.get()?;
        let payment = Payment::refund(*payment_id, &conn)?;

        audit::log(
            Some(claims.user_id()),
            "REFUND",
            "payments",
            Some(payment.id),
            json!({ "booking_id": payment.booking_id, "amount": payment.amount }),
            &conn,
        );

        Ok(payment)
    })
    .await?;

    http_ok_json!(payment);
}

#[get("/payments")]
async fn find_all(claims: Claims, pool: Data<db::Pool>) -> Response {
    claims.require_admin()?;

    let payments = web::block(move || Payment::find_all(&pool.get()?)).await?;

    http_ok_json!(payments);
}

#[get("/payments/{id}")]
async fn find(payment_id: Path<i64>, claims: Claims, pool: Data<db::Pool>) -> Response {
    let payment = web::block(move || {
        let conn = pool.get()?;
        let payment = Payment::find(*payment_id, &conn)?;

        if !payment.can_view(&claims, &conn)? {
            forbidden!("you can only view payments for your own bookings or venues");
        }

        Ok(payment)
    })
    .await?;

    http_ok_json!(payment);
}

pub fn register(cfg: &mut web::ServiceConfig) {
    cfg.service(process);
    cfg.service(refund);
    cfg.service(find_all);
    cfg.service(find);
}
