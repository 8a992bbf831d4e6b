//! Sign-in flows. Together with the 401 teardown these are the only writers
//! of the session store.

use super::{
    contact::valid_email,
    errors::{AppError, ValidationError},
    session::{Session, SessionStore, UserProfile},
    transport::ApiClient,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use url::Url;

pub const LOGIN_PATH: &str = "/auth/login";
pub const SIGNUP_PATH: &str = "/auth/signup";

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct SignupRequest<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct AuthSuccess {
    token: String,
    #[serde(default)]
    id: Option<i64>,
    username: String,
    email: String,
    #[serde(default)]
    email_verified: bool,
}

impl AuthSuccess {
    fn into_session(self) -> (Session, UserProfile) {
        let profile = UserProfile {
            id: self.id,
            username: self.username,
            email: self.email,
            email_verified: self.email_verified,
        };
        (Session::authenticated(self.token, profile.clone()), profile)
    }
}

fn require(fields: &[&str]) -> Result<(), ValidationError> {
    if fields.iter().any(|field| field.trim().is_empty()) {
        Err(ValidationError::MissingFields)
    } else {
        Ok(())
    }
}

/// Signs in with email and password and stores the resulting session.
///
/// # Errors
/// `AppError::Validation` for missing or malformed input, otherwise any
/// transport error (e.g. 400 with the server's reason).
#[instrument(skip(client, password))]
pub async fn login(
    client: &ApiClient,
    email: &str,
    password: &SecretString,
) -> Result<UserProfile, AppError> {
    require(&[email, password.expose_secret()])?;
    if !valid_email(email) {
        return Err(ValidationError::InvalidEmail.into());
    }

    let success: AuthSuccess = client
        .post_json(
            LOGIN_PATH,
            &LoginRequest {
                email,
                password: password.expose_secret(),
            },
        )
        .await?;

    let (session, profile) = success.into_session();
    client.session().set(session);
    info!(username = %profile.username, "signed in");
    Ok(profile)
}

/// Creates an account and stores the resulting session.
///
/// # Errors
/// `AppError::Validation` for missing or malformed input, otherwise any
/// transport error (e.g. 409 when the email is taken).
#[instrument(skip(client, password))]
pub async fn signup(
    client: &ApiClient,
    username: &str,
    email: &str,
    password: &SecretString,
) -> Result<UserProfile, AppError> {
    require(&[username, email, password.expose_secret()])?;
    if !valid_email(email) {
        return Err(ValidationError::InvalidEmail.into());
    }

    let success: AuthSuccess = client
        .post_json(
            SIGNUP_PATH,
            &SignupRequest {
                username,
                email,
                password: password.expose_secret(),
            },
        )
        .await?;

    let (session, profile) = success.into_session();
    client.session().set(session);
    info!(username = %profile.username, "account created");
    Ok(profile)
}

/// Accepts the OAuth redirect (`/auth/callback?token=...` or `?error=...`).
/// A token yields a session whose profile is not loaded yet.
///
/// # Errors
/// `AppError::Callback` when the redirect carries an error or no token.
pub fn accept_callback(session: &SessionStore, callback: &Url) -> Result<(), AppError> {
    let mut token = None;
    let mut error = None;
    for (key, value) in callback.query_pairs() {
        match key.as_ref() {
            "token" if !value.trim().is_empty() => token = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(error) = error {
        warn!(%error, "sign-in callback reported an error");
        return Err(AppError::Callback(error));
    }
    let token = token.ok_or_else(|| AppError::Callback("missing token".to_string()))?;
    session.set(Session::new(Some(SecretString::from(token)), None));
    Ok(())
}

pub fn logout(session: &SessionStore) {
    session.clear();
    info!("signed out");
}
