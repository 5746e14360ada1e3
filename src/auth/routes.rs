use actix_web::web::{Data, Json, Path};
use actix_web::{get, post, put, web};
use serde_json::json;

use crate::audit;
use crate::auth::Claims;
use crate::db;
use crate::errors::ServiceError;
use crate::permissions::{self, Action};
use crate::server::Response;
use crate::users::{ProfileUpdate, User};
use crate::validator::Validator;

use crate::auth::models::{Credentials, RegisterMessage};

#[post("/auth/register")]
async fn register_user(message: Json<Validator<RegisterMessage>>, pool: Data<db::Pool>) -> Response {
    let message = message.into_inner().validate()?;
    // validate() already accepted the user_type
    let role = message
        .role()
        .ok_or_else(|| ServiceError::BadRequest("invalid user type".to_string()))?;

    let user = web::block(move || {
        let conn = pool.get()?;

        if User::email_taken(&message.email, &conn)? {
            conflict!("email already registered, use a different email or log in");
        }

        let user = User::create(message.into_new_user(role), &conn)?;

        audit::log(
            Some(user.id),
            "CREATE",
            "users",
            Some(user.id),
            json!({ "role": role.name() }),
            &conn,
        );

        Ok(user)
    })
    .await?;

    http_created_json!(user.response());
}

#[post("/auth/login")]
async fn login(credentials: Json<Validator<Credentials>>, pool: Data<db::Pool>) -> Response {
    let credentials = credentials.into_inner().validate()?;

    let user = web::block(move || {
        let conn = pool.get()?;

        let user = User::find_by_email(&credentials.email, &conn).map_err(|error| match error {
            // an unknown email reads exactly like a wrong password
            ServiceError::NotFound => {
                ServiceError::Unauthorized("invalid email or password".to_string())
            }
            _ => error,
        })?;

        user.verify_password(credentials.password.as_bytes())?;

        audit::log(
            Some(user.id),
            "LOGIN",
            "users",
            Some(user.id),
            json!({}),
            &conn,
        );

        Ok(user)
    })
    .await?;

    let token = Claims::new(&user).sign()?;

    http_ok_json!(json!({ "token": token, "user": user.response() }));
}

#[get("/auth/profile")]
async fn profile(claims: Claims, pool: Data<db::Pool>) -> Response {
    let user = web::block(move || User::find(claims.user_id(), &pool.get()?)).await?;

    http_ok_json!(user);
}

#[put("/auth/profile")]
async fn update_profile(
    update: Json<ProfileUpdate>,
    claims: Claims,
    pool: Data<db::Pool>,
) -> Response {
    let user_id = claims.user_id();

    let user = web::block(move || {
        let conn = pool.get()?;
        let user = User::update_profile(user_id, update.into_inner(), &conn)?;

        audit::log(
            Some(user_id),
            "UPDATE",
            "users",
            Some(user_id),
            json!({ "profile": "updated" }),
            &conn,
        );

        Ok(user)
    })
    .await?;

    http_ok_json!(user);
}

#[get("/auth/permissions/{table}/{action}")]
async fn my_permissions(
    path: Path<(String, String)>,
    claims: Claims,
    pool: Data<db::Pool>,
) -> Response {
    let (table, action) = path.into_inner();

    let action = Action::parse(&action)
        .ok_or_else(|| ServiceError::BadRequest(format!("unknown action: {}", action)))?;

    let role_name = claims.role_name.clone();
    let allowed =
        web::block(move || permissions::allowed(&claims, &table, action, &pool.get()?)).await?;

    http_ok_json!(json!({ "has_permission": allowed, "role": role_name }));
}

pub fn register(cfg: &mut web::ServiceConfig) {
    cfg.service(register_user);
    cfg.service(login);
    cfg.service(profile);
    cfg.service(update_profile);
    cfg.service(my_permissions);
}
