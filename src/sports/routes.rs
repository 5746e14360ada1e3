use actix_web::web::{Data, Json, Path};
use actix_web::{delete, get, post, put, web};
use serde_json::json;

use crate::audit;
use crate::auth::Claims;
use crate::db;
use crate::server::Response;
use crate::validator::Validator;

use crate::sports::models::{NewSport, Sport};

#[get("/sports")]
async fn find_all(pool: Data<db::Pool>) -> Response {
    let sports = web::block(move || Sport::find_all(&pool.get()?)).await?;

    http_ok_json!(sports);
}

#[get("/sports/{id}")]
async fn find(sport_id: Path<i64>, pool: Data<db::Pool>) -> Response {
    let sport = web::block(move || Sport::find(*sport_id, &pool.get()?)).await?;

    http_ok_json!(sport);
}

#[post("/sports")]
async fn create(sport: Json<Validator<NewSport>>, claims: Claims, pool: Data<db::Pool>) -> Response {
    claims.require_admin()?;

    let sport = sport.into_inner().validate()?;

    let sport = web::block(move || {
        let conn = pool.get()?;
        let sport = Sport::create(sport, &conn)?;

        audit::log(
            Some(claims.user_id()),
            "CREATE",
            "sports",
            Some(sport.id),
            json!({ "sport_name": sport.sport_name }),
            &conn,
        );

        Ok(sport)
    })
    .await?;

    http_created_json!(sport);
}

#[put("/sports/{id}")]
async fn update(
    sport_id: Path<i64>,
    update: Json<Validator<NewSport>>,
    claims: Claims,
    pool: Data<db::Pool>,
) -> Response {
    claims.require_admin()?;

    let update = update.into_inner().validate()?;

    let sport = web::block(move || {
        let conn = pool.get()?;
        let sport = Sport::find(*sport_id, &conn)?;

        sport.update(update, &conn)
    })
    .await?;

    http_ok_json!(sport);
}

#[delete("/sports/{id}")]
async fn delete(sport_id: Path<i64>, claims: Claims, pool: Data<db::Pool>) -> Response {
    claims.require_admin()?;

    web::block(move || {
        let conn = pool.get()?;
        let sport = Sport::find(*sport_id, &conn)?;

        sport.delete(&conn)?;

        audit::log(
            Some(claims.user_id()),
            "DELETE",
            "sports",
            Some(sport.id),
            json!({ "sport_name": sport.sport_name }),
            &conn,
        );

        Ok(())
    })
    .await?;

    http_ok_json!(json!({ "message": "sport deleted" }));
}

pub fn register(cfg: &mut web::ServiceConfig) {
    cfg.service(find_all);
    cfg.service(find);
    cfg.service(create);
    cfg.service(update);
    cfg.service(delete);
}
