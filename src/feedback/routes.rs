use actix_web::web::{Data, Json, Path};
use actix_web::{delete, get, post, web};
use serde_json::json;

use crate::audit;
use crate::auth::Claims;
use crate::db;
use crate::server::Response;
use crate::validator::Validator;

use crate::feedback::models::{Feedback, NewFeedback};

#[get("/venues/{venue_id}/feedback")]
async fn find_for_venue(venue_id: Path<i64>, pool: Data<db::Pool>) -> Response {
    let feedback = web::block(move || Feedback::find_for_venue(*venue_id, &pool.get()?)).await?;

    http_ok_json!(feedback);
}

#[post("/feedback")]
async fn create(
    feedback: Json<Validator<NewFeedback>>,
    claims: Claims,
    pool: Data<db::Pool>,
) -> Response {
    let feedback = feedback.into_inner().validate()?;

    let feedback = web::block(move || {
        let conn = pool.get()?;
        let feedback = Feedback::create(feedback, claims.user_id(), &conn)?;

        audit::log(
            Some(claims.user_id()),
            "CREATE",
            "feedback",
            Some(feedback.id),
            json!({ "venue_id": feedback.venue_id, "rating": feedback.rating }),
            &conn,
        );

        Ok(feedback)
    })
    .await?;

    http_created_json!(feedback);
}

#[delete("/feedback/{id}")]
async fn delete(feedback_id: Path<i64>, claims: Claims, pool: Data<db::Pool>) -> Response {
    web::block(move || {
        let conn = pool.get()?;
        let feedback = Feedback::find(*feedback_id, &conn)?;

        feedback.delete(&claims, &conn)?;

        audit::log(
            Some(claims.user_id()),
            "DELETE",
            "feedback",
            Some(feedback.id),
            json!({ "venue_id": feedback.venue_id }),
            &conn,
        );

        Ok(())
    })
    .await?;

    http_ok_json!(json!({ "message": "feedback removed" }));
}

pub fn register(cfg: &mut web::ServiceConfig) {
    cfg.service(find_for_venue);
    cfg.service(create);
    cfg.service(delete);
}
