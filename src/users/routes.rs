use actix_web::http::StatusCode;
use actix_web::web::{Data, Path, Query};
use actix_web::{delete, get, web, HttpResponse};

use crate::audit;
use crate::auth::Claims;
use crate::db;
use crate::server::Response;
use crate::users::{Filter, User};

#[get("/users")]
async fn find_all(filter: Query<Filter>, claims: Claims, pool: Data<db::Pool>) -> Response {
    claims.require_admin()?;

    let users = web::block(move || User::find_all(filter.into_inner(), &pool.get()?)).await?;

    http_ok_json!(users);
}

#[get("/users/me")]
async fn find_me(claims: Claims, pool: Data<db::Pool>) -> Response {
    let user = web::block(move || User::find(claims.user_id(), &pool.get()?)).await?;

    http_ok_json!(user);
}

#[get("/users/{id}")]
async fn find(user_id: Path<i64>, claims: Claims, pool: Data<db::Pool>) -> Response {
    let user_id = user_id.into_inner();

    if claims.user_id() != user_id && !claims.is_admin() {
        forbidden!("you can only access your own profile");
    }

    let user = web::block(move || User::find(user_id, &pool.get()?)).await?;

    http_ok_json!(user);
}

#[delete("/users/{id}")]
async fn delete(user_id: Path<i64>, claims: Claims, pool: Data<db::Pool>) -> Response {
    claims.require_admin()?;

    let admin_id = claims.user_id();
    let user_id = user_id.into_inner();

    web::block(move || {
        let conn = pool.get()?;
        User::delete(user_id, &conn)?;

        audit::log(
            Some(admin_id),
            "DELETE",
            "users",
            Some(user_id),
            serde_json::json!({ "deleted_by": admin_id }),
            &conn,
        );

        Ok(())
    })
    .await?;

    Ok(HttpResponse::new(StatusCode::OK))
}

pub fn register(cfg: &mut web::ServiceConfig) {
    cfg.service(find_all);
    cfg.service(find_me);
    cfg.service(find);
    cfg.service(delete);
}
