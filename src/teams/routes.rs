use actix_web::web::{Data, Json, Path};
use actix_web::{delete, get, post, web};
use serde_json::json;

use crate::audit;
use crate::auth::Claims;
use crate::db;
use crate::server::Response;
use crate::validator::Validator;

use crate::teams::models::{NewTeam, Team};

#[get("/teams")]
async fn find_all(pool: Data<db::Pool>) -> Response {
    let teams = web::block(move || Team::find_all(&pool.get()?)).await?;

    http_ok_json!(teams);
}

#[get("/teams/my")]
async fn my_teams(claims: Claims, pool: Data<db::Pool>) -> Response {
    let teams = web::block(move || Team::find_for_user(claims.user_id(), &pool.get()?)).await?;

    http_ok_json!(teams);
}

#[get("/teams/{id}")]
async fn find(team_id: Path<i64>, pool: Data<db::Pool>) -> Response {
    let team = web::block(move || Team::detail(*team_id, &pool.get()?)).await?;

    http_ok_json!(team);
}

#[post("/teams")]
async fn create(team: Json<Validator<NewTeam>>, claims: Claims, pool: Data<db::Pool>) -> Response {
    let team = team.into_inner().validate()?;

    let team = web::block(move || {
        let conn = pool.get()?;
        let team = Team::create(team, claims.user_id(), &conn)?;

        audit::log(
            Some(claims.user_id()),
            "CREATE",
            "teams",
            Some(team.id),
            json!({ "team_name": team.team_name }),
            &conn,
        );

        Ok(team)
    })
    .await?;

    http_created_json!(team);
}

#[post("/teams/{id}/join")]
async fn join(team_id: Path<i64>, claims: Claims, pool: Data<db::Pool>) -> Response {
    web::block(move || {
        let conn = pool.get()?;
        let team = Team::find(*team_id, &conn)?;

        team.join(claims.user_id(), &conn)?;

        audit::log(
            Some(claims.user_id()),
            "JOIN",
            "team_members",
            Some(team.id),
            json!({ "team_name": team.team_name }),
            &conn,
        );

        Ok(())
    })
    .await?;

    http_ok_json!(json!({ "message": "joined the team" }));
}

#[delete("/teams/{id}/leave")]
async fn leave(team_id: Path<i64>, claims: Claims, pool: Data<db::Pool>) -> Response {
    web::block(move || {
        let conn = pool.get()?;
        let team = Team::find(*team_id, &conn)?;

        team.leave(claims.user_id(), &conn)?;

        audit::log(
            Some(claims.user_id()),
            "LEAVE",
            "team_members",
            Some(team.id),
            json!({ "team_name": team.team_name }),
            &conn,
        );

        Ok(())
    })
    .await?;

    http_ok_json!(json!({ "message": "left the team" }));
}

#[delete("/teams/{id}")]
async fn delete(team_id: Path<i64>, claims: Claims, pool: Data<db::Pool>) -> Response {
    web::block(move || {
        let conn = pool.get()?;
        let team = Team::find(*team_id, &conn)?;

        team.delete(&claims, &conn)?;

        audit::log(
            Some(claims.user_id()),
            "DELETE",
            "teams",
            Some(team.id),
            json!({ "team_name": team.team_name }),
            &conn,
        );

        Ok(())
    })
    .await?;

    http_ok_json!(json!({ "message": "team deleted" }));
}

pub fn register(cfg: &mut web::ServiceConfig) {
    cfg.service(find_all);
    cfg.service(my_teams);
    cfg.service(find);
    cfg.service(create);
    cfg.service(join);
    cfg.service(leave);
    cfg.service(delete);
}
