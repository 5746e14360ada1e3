use actix_web::web::{Data, Json, Path, Query};
use actix_web::{delete, get, post, put, web};
use serde_json::json;

use crate::audit;
use crate::auth::Claims;
use crate::db;
use crate::server::Response;
use crate::validator::Validator;

use crate::matches::models::{Match, MatchFilter, NewMatch, UpdateMatch};

#[get("/matches")]
async fn find_all(filter: Query<MatchFilter>, pool: Data<db::Pool>) -> Response {
    let games = web::block(move || Match::find_all(filter.into_inner(), &pool.get()?)).await?;

    http_ok_json!(games);
}

#[get("/matches/{id}")]
async fn find(match_id: Path<i64>, pool: Data<db::Pool>) -> Response {
    let game = web::block(move || Match::find(*match_id, &pool.get()?)).await?;

    http_ok_json!(game);
}

#[post("/matches")]
async fn create(game: Json<Validator<NewMatch>>, claims: Claims, pool: Data<db::Pool>) -> Response {
    let game = game.into_inner().validate()?;

    let game = web::block(move || {
        let conn = pool.get()?;
        let game = Match::create(game, &claims, &conn)?;

        audit::log(
            Some(claims.user_id()),
            "CREATE",
            "matches",
            Some(game.id),
            json!({ "team_a": game.team_a, "venue_id": game.venue_id }),
            &conn,
        );

        Ok(game)
    })
    .await?;

    http_created_json!(game);
}

#[put("/matches/{id}")]
async fn update(
    match_id: Path<i64>,
    update: Json<UpdateMatch>,
    claims: Claims,
    pool: Data<db::Pool>,
) -> Response {
    let game = web::block(move || {
        let conn = pool.get()?;
        let game = Match::update(*match_id, update.into_inner(), &claims, &conn)?;

        audit::log(
            Some(claims.user_id()),
            "UPDATE",
            "matches",
            Some(game.id),
            json!({ "status": game.status }),
            &conn,
        );

        Ok(game)
    })
    .await?;

    http_ok_json!(game);
}

#[delete("/matches/{id}")]
async fn delete(match_id: Path<i64>, claims: Claims, pool: Data<db::Pool>) -> Response {
    web::block(move || {
        let conn = pool.get()?;

        Match::delete(*match_id, &claims, &conn)?;

        audit::log(
            Some(claims.user_id()),
            "DELETE",
            "matches",
            Some(*match_id),
            json!({}),
            &conn,
        );

        Ok(())
    })
    .await?;

    http_ok_json!(json!({ "message": "match removed" }));
}

pub fn register(cfg: &mut web::ServiceConfig) {
    cfg.service(find_all);
    cfg.service(find);
    cfg.service(create);
    cfg.service(update);
    cfg.service(delete);
}
