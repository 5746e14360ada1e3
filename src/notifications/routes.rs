use actix_web::web::{Data, Json, Path};
use actix_web::{get, post, put, web};
use serde_json::json;

use crate::auth::Claims;
use crate::db;
use crate::server::Response;
use crate::validator::Validator;

use crate::notifications::models::{NewNotification, Notification};

#[get("/notifications")]
async fn find_all(claims: Claims, pool: Data<db::Pool>) -> Response {
    let notifications =
        web::block(move || Notification::find_for_user(claims.user_id(), &pool.get()?)).await?;

    http_ok_json!(notifications);
}

#[put("/notifications/{id}/read")]
async fn mark_read(notification_id: Path<i64>, claims: Claims, pool: Data<db::Pool>) -> Response {
    let notification = web::block(move || {
        Notification::mark_read(*notification_id, claims.user_id(), &pool.get()?)
    })
    .await?;

    http_ok_json!(notification);
}

#[put("/notifications/read-all")]
async fn mark_all_read(claims: Claims, pool: Data<db::Pool>) -> Response {
    let updated =
        web::block(move || Notification::mark_all_read(claims.user_id(), &pool.get()?)).await?;

    http_ok_json!(json!({ "marked_read": updated }));
}

#[post("/notifications")]
async fn create(
    notification: Json<Validator<NewNotification>>,
    claims: Claims,
    pool: Data<db::Pool>,
) -> Response {
    claims.require_admin()?;

    let notification = notification.into_inner().validate()?;

    let notification =
        web::block(move || Notification::create(notification, &pool.get()?)).await?;

    http_created_json!(notification);
}

pub fn register(cfg: &mut web::ServiceConfig) {
    cfg.service(find_all);
    cfg.service(mark_all_read);
    cfg.service(mark_read);
    cfg.service(create);
}
