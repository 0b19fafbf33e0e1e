//! Account handlers: login, registration, profile, logout.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Form, Json};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{hash_password, Session, SessionUser};
use crate::interfaces::{NewUser, ProfileUpdate, StoreError, UserProfile};

use super::{AppError, AppState};

/// Where anonymous visitors are sent.
const LOGIN_PATH: &str = "/";
const REGISTERED: &str = "Registration successful!";

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    #[serde(rename = "U_password")]
    pub password: String,
}

/// Registration form; field names match the HTML form.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    #[serde(rename = "U_password")]
    pub password: String,
    #[serde(flatten)]
    pub profile: ProfileFields,
}

/// Profile edit form.
#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    pub username: String,
    #[serde(flatten)]
    pub profile: ProfileFields,
}

/// Profile fields as submitted, before validation.
#[derive(Debug, Deserialize)]
pub struct ProfileFields {
    pub email: String,
    pub phone_no: String,
    #[serde(rename = "R_address")]
    pub r_address: String,
    pub gender: String,
    pub age: String,
    pub dob: String,
}

impl ProfileFields {
    fn validate(self) -> Result<UserProfile, AppError> {
        let age = self
            .age
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|age| *age >= 0)
            .ok_or_else(|| AppError::invalid_form("age", format!("{:?} is not an age", self.age)))?;

        let dob = NaiveDate::parse_from_str(self.dob.trim(), "%Y-%m-%d")
            .map_err(|e| AppError::invalid_form("dob", e.to_string()))?;

        Ok(UserProfile {
            email: self.email,
            phone_no: self.phone_no,
            r_address: self.r_address,
            gender: self.gender,
            age,
            dob,
        })
    }
}

fn require_username(username: &str) -> Result<String, AppError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AppError::invalid_form("username", "must not be empty"));
    }
    Ok(username.to_string())
}

/// View returned by `/info` and `/profile`.
#[derive(Debug, Serialize)]
pub struct UserView<'a> {
    pub user: &'a SessionUser,
}

/// `POST /`: check credentials and open a session.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let digest = hash_password(&form.password);
    let Some(record) = state
        .users
        .find_by_credentials(form.username.trim(), &digest)
        .await?
    else {
        return Err(AppError::InvalidCredentials);
    };

    let user = SessionUser::from(record);
    info!(user_id = user.id, username = %user.username, "user signed in");

    let jar = session.sign_in(&user)?;
    Ok((jar, Redirect::to("/info")).into_response())
}

/// `POST /register`: create an account.
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let username = require_username(&form.username)?;
    if form.password.is_empty() {
        return Err(AppError::invalid_form("U_password", "must not be empty"));
    }

    let user = NewUser {
        username,
        password_hash: hash_password(&form.password),
        profile: form.profile.validate()?,
    };

    let id = state.users.insert_user(&user).await?;
    info!(user_id = id, username = %user.username, "user registered");

    Ok((StatusCode::CREATED, REGISTERED).into_response())
}

/// `GET /info`: landing view for the signed-in user.
pub async fn info(session: Session) -> Response {
    match session.user() {
        Some(user) => Json(UserView { user }).into_response(),
        None => Redirect::to(LOGIN_PATH).into_response(),
    }
}

/// `GET /profile`: the signed-in user's profile.
pub async fn profile(session: Session) -> Response {
    info(session).await
}

/// `POST /profile`: overwrite the signed-in user's profile.
///
/// On success the session is refreshed from the stored row.
pub async fn update_profile(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ProfileForm>,
) -> Result<Response, AppError> {
    let Some(current) = session.user() else {
        return Ok(Redirect::to(LOGIN_PATH).into_response());
    };
    let id = current.id;

    let update = ProfileUpdate {
        username: require_username(&form.username)?,
        profile: form.profile.validate()?,
    };
    state.users.update_user(id, &update).await?;

    let record = state
        .users
        .find_by_id(id)
        .await?
        .ok_or(StoreError::NotFound(id))?;
    info!(user_id = id, "profile updated");

    let jar = session.sign_in(&SessionUser::from(record))?;
    Ok((jar, Redirect::to("/profile")).into_response())
}

/// `GET /logout`: end the session.
pub async fn logout(session: Session) -> Response {
    if let Some(user) = session.user() {
        info!(user_id = user.id, "user signed out");
    }
    (session.sign_out(), Redirect::to(LOGIN_PATH)).into_response()
}
