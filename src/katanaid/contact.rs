//! Contact form controller. Every submission goes through a
//! `SubmissionGuard`, so identical or rapid resubmissions never reach
//! `/api/contact`. Outcomes are reported as `Notice` values for the UI to
//! render as toasts.

use super::{
    errors::{AppError, ValidationError},
    guard::{Submission, SubmissionGuard, SubmitOutcome},
    transport::ApiClient,
};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument};

pub const CONTACT_PATH: &str = "/api/contact";
pub const MIN_REASON_CHARS: usize = 10;
pub const MAX_REASON_CHARS: usize = 2000;

static EMAIL_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());

#[must_use]
pub fn valid_email(email: &str) -> bool {
    EMAIL_RE.as_ref().is_some_and(|re| re.is_match(email))
}

/// Field values of the contact form. Serialized as the request body.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ContactForm {
    email: String,
    reason: String,
}

impl ContactForm {
    /// # Errors
    /// `ValidationError::TooLong` if `reason` exceeds the input limit.
    pub fn new(email: impl Into<String>, reason: impl Into<String>) -> Result<Self, ValidationError> {
        let mut form = Self {
            email: email.into(),
            reason: String::new(),
        };
        form.set_reason(reason)?;
        Ok(form)
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
    }

    /// Input-level length limit: values longer than `MAX_REASON_CHARS` are
    /// rejected and the previous value is kept.
    ///
    /// # Errors
    /// `ValidationError::TooLong` if `reason` exceeds the limit.
    pub fn set_reason(&mut self, reason: impl Into<String>) -> Result<(), ValidationError> {
        let reason = reason.into();
        if reason.chars().count() > MAX_REASON_CHARS {
            return Err(ValidationError::TooLong {
                max: MAX_REASON_CHARS,
            });
        }
        self.reason = reason;
        Ok(())
    }

    /// Character counter shown under the message field, e.g. `12/2000`.
    #[must_use]
    pub fn reason_counter(&self) -> String {
        format!("{}/{}", self.reason.chars().count(), MAX_REASON_CHARS)
    }
}

impl Submission for ContactForm {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.email.trim().is_empty() || self.reason.trim().is_empty() {
            return Err(ValidationError::MissingFields);
        }
        let length = self.reason.chars().count();
        if length < MIN_REASON_CHARS {
            return Err(ValidationError::TooShort {
                min: MIN_REASON_CHARS,
            });
        }
        if length > MAX_REASON_CHARS {
            return Err(ValidationError::TooLong {
                max: MAX_REASON_CHARS,
            });
        }
        if !valid_email(self.email.trim()) {
            return Err(ValidationError::InvalidEmail);
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ContactResponse {
    pub message: String,
}

/// Toast-style feedback for the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

#[derive(Debug, Default)]
struct DialogState {
    open: bool,
    form: ContactForm,
}

/// Controller behind the "Contact Us" dialog.
#[derive(Debug)]
pub struct ContactDialog {
    client: ApiClient,
    guard: SubmissionGuard<ContactForm>,
    state: Mutex<DialogState>,
}

impl ContactDialog {
    #[must_use]
    pub fn new(client: ApiClient, cooldown: Duration) -> Self {
        Self {
            client,
            guard: SubmissionGuard::new(cooldown),
            state: Mutex::new(DialogState::default()),
        }
    }

    pub fn open(&self) {
        self.state.lock().open = true;
    }

    pub fn close(&self) {
        self.state.lock().open = false;
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state.lock().open
    }

    #[must_use]
    pub fn form(&self) -> ContactForm {
        self.state.lock().form.clone()
    }

    pub fn set_email(&self, email: impl Into<String>) {
        self.state.lock().form.set_email(email);
    }

    /// # Errors
    /// `ValidationError::TooLong` if `reason` exceeds the input limit.
    pub fn set_reason(&self, reason: impl Into<String>) -> Result<(), ValidationError> {
        self.state.lock().form.set_reason(reason)
    }

    /// Whether the submit button is enabled.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.guard.can_submit()
    }

    /// Whether a submission is currently on the wire (spinner state).
    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.guard.is_in_flight()
    }

    /// Submits the current field values. Returns `None` when the attempt was
    /// silently dropped by the guard.
    #[instrument(skip_all)]
    pub async fn submit(&self) -> Option<Notice> {
        let form = self.form();
        let client = self.client.clone();

        let outcome = self
            .guard
            .submit(form, |form| async move {
                client
                    .post_json::<_, ContactResponse>(CONTACT_PATH, &form)
                    .await
            })
            .await;

        match outcome {
            SubmitOutcome::Invalid(err) => Some(Notice::Error(err.to_string())),
            SubmitOutcome::Suppressed(reason) => {
                debug!(?reason, "contact submission dropped");
                None
            }
            SubmitOutcome::Completed(response) => {
                let mut state = self.state.lock();
                state.form = ContactForm::default();
                state.open = false;
                info!("contact submission accepted");
                Some(Notice::Success(response.message))
            }
            SubmitOutcome::Failed(err) => {
                debug!(error = %err, "contact submission failed");
                Some(Notice::Error(failure_message(&err)))
            }
        }
    }

    /// Tears the dialog down; a pending submission settles but is ignored.
    pub fn dispose(&self) {
        self.guard.dispose();
        self.state.lock().open = false;
    }
}

fn failure_message(err: &AppError) -> String {
    match err {
        AppError::RateLimited { .. } => "Too many requests. Please try again later.".to_string(),
        AppError::Unauthorized => "User is not authorized".to_string(),
        AppError::Validation(err) => err.to_string(),
        AppError::Http { message, .. } => message
            .clone()
            .unwrap_or_else(|| "Failed to submit".to_string()),
        AppError::Network(_) | AppError::Timeout(_) => "Failed to submit".to_string(),
        AppError::Parse(_)
        | AppError::Serialization(_)
        | AppError::Config(_)
        | AppError::Callback(_) => "Something went wrong".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_email_matches_simple_addresses() {
        assert!(valid_email("a@b.com"));
        assert!(valid_email("ronin+dojo@katanaid.dev"));
        assert!(!valid_email("a@b"));
        assert!(!valid_email("a b@c.com"));
        assert!(!valid_email("@b.com"));
    }

    #[test]
    fn short_reason_is_rejected() {
        let form = ContactForm::new("a@b.com", "short").expect("within input limit");
        assert_eq!(
            form.validate(),
            Err(ValidationError::TooShort {
                min: MIN_REASON_CHARS
            })
        );
    }

    #[test]
    fn missing_fields_are_rejected_first() {
        let form = ContactForm::new("", "short").expect("within input limit");
        assert_eq!(form.validate(), Err(ValidationError::MissingFields));

        let form = ContactForm::new("a@b.com", "   ").expect("within input limit");
        assert_eq!(form.validate(), Err(ValidationError::MissingFields));
    }

    #[test]
    fn whitespace_reason_over_min_length_is_missing_not_short() {
        // Twelve spaces clear the character minimum but carry no content.
        let form = ContactForm::new("a@b.com", " ".repeat(12)).expect("within input limit");
        assert_eq!(form.validate(), Err(ValidationError::MissingFields));
    }

    #[test]
    fn invalid_email_is_rejected() {
        let form = ContactForm::new("not-an-email", "this is long enough").expect("ok");
        assert_eq!(form.validate(), Err(ValidationError::InvalidEmail));
    }

    #[test]
    fn reason_length_boundaries() {
        let exactly_min = "x".repeat(MIN_REASON_CHARS);
        let form = ContactForm::new("a@b.com", exactly_min).expect("ok");
        assert_eq!(form.validate(), Ok(()));

        let exactly_max = "x".repeat(MAX_REASON_CHARS);
        let form = ContactForm::new("a@b.com", exactly_max).expect("2000 chars is accepted");
        assert_eq!(form.validate(), Ok(()));
        assert_eq!(form.reason_counter(), "2000/2000");

        let too_long = "x".repeat(MAX_REASON_CHARS + 1);
        assert_eq!(
            ContactForm::new("a@b.com", too_long.clone()),
            Err(ValidationError::TooLong {
                max: MAX_REASON_CHARS
            })
        );

        let mut form = ContactForm::new("a@b.com", "keep this value").expect("ok");
        assert!(form.set_reason(too_long).is_err());
        assert_eq!(form.reason(), "keep this value");
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let accented = "é".repeat(MAX_REASON_CHARS);
        assert!(ContactForm::new("a@b.com", accented).is_ok());
    }

    #[test]
    fn failure_messages_follow_status() {
        assert_eq!(
            failure_message(&AppError::RateLimited {
                message: Some("slow down".to_string())
            }),
            "Too many requests. Please try again later."
        );
        assert_eq!(
            failure_message(&AppError::Http {
                status: 400,
                message: Some("Invalid email format".to_string())
            }),
            "Invalid email format"
        );
        assert_eq!(
            failure_message(&AppError::Http {
                status: 500,
                message: None
            }),
            "Failed to submit"
        );
        assert_eq!(
            failure_message(&AppError::Parse("bad".to_string())),
            "Something went wrong"
        );
    }

    mod dialog {
        use super::*;
        use crate::katanaid::{
            config::ClientConfig, navigation::NoopNavigator, session::SessionStore,
        };
        use serde_json::json;
        use std::{net::TcpListener, sync::Arc};
        use wiremock::matchers::{body_json, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        const COOLDOWN: Duration = Duration::from_secs(60);

        fn can_bind_localhost() -> bool {
            TcpListener::bind("127.0.0.1:0").is_ok()
        }

        fn dialog_for(base_url: &str, cooldown: Duration) -> ContactDialog {
            let config = ClientConfig::default().with_api_base_url(base_url);
            let client = ApiClient::new(&config, SessionStore::new(), Arc::new(NoopNavigator))
                .expect("valid client config");
            ContactDialog::new(client, cooldown)
        }

        #[tokio::test]
        async fn short_reason_makes_no_network_call() -> anyhow::Result<()> {
            if !can_bind_localhost() {
                eprintln!("Skipping test: cannot bind localhost");
                return Ok(());
            }
            let server = MockServer::start().await;
            Mock::given(path(CONTACT_PATH))
                .respond_with(ResponseTemplate::new(201))
                .expect(0)
                .mount(&server)
                .await;

            let dialog = dialog_for(&server.uri(), COOLDOWN);
            dialog.open();
            dialog.set_email("a@b.com");
            dialog.set_reason("short")?;

            assert_eq!(
                dialog.submit().await,
                Some(Notice::Error(
                    "Please provide more details (at least 10 characters)".to_string()
                ))
            );
            assert!(dialog.is_open());
            assert!(dialog.can_submit());
            Ok(())
        }

        #[tokio::test]
        async fn accepted_submission_resets_and_closes() -> anyhow::Result<()> {
            if !can_bind_localhost() {
                eprintln!("Skipping test: cannot bind localhost");
                return Ok(());
            }
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path(CONTACT_PATH))
                .and(body_json(json!({
                    "email": "a@b.com",
                    "reason": "this is long enough"
                })))
                .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                    "message": "Your message has been sent successfully"
                })))
                .expect(1)
                .mount(&server)
                .await;

            let dialog = dialog_for(&server.uri(), COOLDOWN);
            dialog.open();
            dialog.set_email("a@b.com");
            dialog.set_reason("this is long enough")?;

            assert_eq!(
                dialog.submit().await,
                Some(Notice::Success(
                    "Your message has been sent successfully".to_string()
                ))
            );
            assert!(!dialog.is_open());
            assert_eq!(dialog.form(), ContactForm::default());
            assert!(!dialog.can_submit(), "cooldown window is open");

            // Same values again: silently dropped, no second call.
            dialog.open();
            dialog.set_email("a@b.com");
            dialog.set_reason("this is long enough")?;
            assert_eq!(dialog.submit().await, None);
            Ok(())
        }

        #[tokio::test]
        async fn identical_resubmit_after_cooldown_is_dropped() -> anyhow::Result<()> {
            if !can_bind_localhost() {
                eprintln!("Skipping test: cannot bind localhost");
                return Ok(());
            }
            let server = MockServer::start().await;
            Mock::given(path(CONTACT_PATH))
                .respond_with(ResponseTemplate::new(500))
                .expect(1)
                .mount(&server)
                .await;

            let dialog = dialog_for(&server.uri(), Duration::ZERO);
            dialog.set_email("a@b.com");
            dialog.set_reason("this is long enough")?;

            assert_eq!(
                dialog.submit().await,
                Some(Notice::Error("Failed to submit".to_string()))
            );
            // A failure keeps the values, so submitting again is unchanged.
            assert_eq!(dialog.submit().await, None);
            Ok(())
        }

        #[tokio::test]
        async fn rate_limit_and_server_messages_surface() -> anyhow::Result<()> {
            if !can_bind_localhost() {
                eprintln!("Skipping test: cannot bind localhost");
                return Ok(());
            }
            let server = MockServer::start().await;
            Mock::given(path(CONTACT_PATH))
                .and(body_json(json!({"email": "a@b.com", "reason": "first message body"})))
                .respond_with(
                    ResponseTemplate::new(429).set_body_json(json!({"error": "Too many requests"})),
                )
                .mount(&server)
                .await;
            Mock::given(path(CONTACT_PATH))
                .and(body_json(json!({"email": "a@b.com", "reason": "second message body"})))
                .respond_with(
                    ResponseTemplate::new(400).set_body_json(json!({"error": "Invalid email format"})),
                )
                .mount(&server)
                .await;

            let dialog = dialog_for(&server.uri(), Duration::ZERO);
            dialog.set_email("a@b.com");
            dialog.set_reason("first message body")?;
            assert_eq!(
                dialog.submit().await,
                Some(Notice::Error(
                    "Too many requests. Please try again later.".to_string()
                ))
            );

            dialog.set_reason("second message body")?;
            assert_eq!(
                dialog.submit().await,
                Some(Notice::Error("Invalid email format".to_string()))
            );
            assert!(!dialog.is_submitting());
            Ok(())
        }

        #[tokio::test]
        async fn disposed_dialog_refuses_submissions() -> anyhow::Result<()> {
            let dialog = dialog_for("http://127.0.0.1:9", COOLDOWN);
            dialog.open();
            dialog.set_email("a@b.com");
            dialog.set_reason("this is long enough")?;
            dialog.dispose();

            assert!(!dialog.is_open());
            assert!(!dialog.can_submit());
            assert_eq!(dialog.submit().await, None);
            Ok(())
        }
    }
}
