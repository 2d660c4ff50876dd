use crate::application::auth_service::AuthService;
use crate::application::contact_service::ContactService;
use crate::data::account_repository::SqliteAccountRepository;
use crate::data::contact_repository::SqliteContactRepository;
use crate::data::database::Database;
use crate::domain::account::{LoginForm, SignupForm};
use crate::domain::contact::ContactForm;
use crate::domain::error::DomainError;
use crate::presentation::flash::{Flash, IncomingFlashes, clear_flash_cookie, flash_cookie};
use crate::presentation::session::{Session, SessionKeys};
use crate::presentation::templates::{self, Page};
use actix_web::http::StatusCode;
use actix_web::http::header::{self, ContentType};
use actix_web::{HttpRequest, HttpResponse, HttpResponseBuilder, ResponseError, web};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

pub struct AppState {
    pub auth_service: AuthService<SqliteAccountRepository>,
    pub contact_service: ContactService<SqliteContactRepository>,
    pub sessions: SessionKeys,
}

impl AppState {
    /// Wires both services onto their stores.
    pub fn new(accounts: Arc<Database>, contacts: Arc<Database>, sessions: SessionKeys) -> Self {
        Self {
            auth_service: AuthService::new(Arc::new(SqliteAccountRepository::new(accounts))),
            contact_service: ContactService::new(Arc::new(SqliteContactRepository::new(contacts))),
            sessions,
        }
    }
}

/// Failures outside the form flows. Form failures are rendered as flashes
/// on the form itself.
#[derive(Error, Debug)]
pub enum WebError {
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Session error: {0}")]
    Session(#[from] jsonwebtoken::errors::Error),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for WebError {
    fn status_code(&self) -> StatusCode {
        match self {
            WebError::BadRequest(_) => StatusCode::BAD_REQUEST,
            WebError::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
            WebError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = match self {
            WebError::BadRequest(_) => {
                warn!(error = %self, status = %status, "Bad request");
                "The submitted form could not be read."
            }
            WebError::Session(_) | WebError::Internal(_) => {
                error!(error = %self, status = %status, "Request failed");
                "Something went wrong on our side. Please try again."
            }
        };

        HttpResponse::build(status)
            .content_type(ContentType::html())
            .body(templates::error(status.as_u16(), message))
    }
}

pub(crate) fn app_state(req: &HttpRequest) -> Result<&web::Data<AppState>, WebError> {
    req.app_data::<web::Data<AppState>>()
        .ok_or_else(|| WebError::Internal("application state not configured".to_string()))
}

fn redirect(location: &str) -> HttpResponseBuilder {
    let mut builder = HttpResponse::Found();
    builder.insert_header((header::LOCATION, location));
    builder
}

/// 200 HTML response; removes the flash cookie when the request carried one.
fn render(state: &AppState, incoming: Option<&IncomingFlashes>, body: String) -> HttpResponse {
    let mut builder = HttpResponse::Ok();
    builder.content_type(ContentType::html());
    if incoming.is_some_and(IncomingFlashes::needs_clearing) {
        builder.cookie(clear_flash_cookie(&state.sessions));
    }
    builder.body(body)
}

/// Flash text for a failed form submission. Domain errors are shown as-is;
/// anything else is logged and replaced by `fallback`.
fn failure_flash(err: &anyhow::Error, fallback: &str) -> Flash {
    match err.downcast_ref::<DomainError>() {
        Some(DomainError::Internal(_)) | None => {
            error!(error = %err, "Form submission failed");
            Flash::danger(fallback)
        }
        Some(domain) => {
            debug!(error = %domain, "Form rejected");
            Flash::danger(domain.to_string())
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    timestamp: String,
}

#[instrument]
pub async fn health_check() -> HttpResponse {
    debug!("Health check requested");
    let response = HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    };
    HttpResponse::Ok().json(response)
}

#[instrument(skip_all)]
pub async fn home(state: web::Data<AppState>, session: Session, flashes: IncomingFlashes) -> HttpResponse {
    match session.username() {
        Some(username) => {
            let page = Page {
                username: Some(username),
                flashes: flashes.messages(),
            };
            render(&state, Some(&flashes), templates::home(&page, username))
        }
        None => {
            debug!("No session, redirecting to login");
            redirect("/login").finish()
        }
    }
}

#[instrument(skip_all)]
pub async fn signup_form(state: web::Data<AppState>, session: Session, flashes: IncomingFlashes) -> HttpResponse {
    let page = Page {
        username: session.username(),
        flashes: flashes.messages(),
    };
    render(&state, Some(&flashes), templates::signup(&page, &SignupForm::default()))
}

#[instrument(skip_all, fields(username = %form.username))]
pub async fn signup(
    state: web::Data<AppState>,
    session: Session,
    form: web::Form<SignupForm>,
) -> Result<HttpResponse, WebError> {
    let form = form.into_inner();
    info!("Signup submitted");

    match state.auth_service.signup(form.clone()).await {
        Ok(account) => {
            info!(account_id = account.id, "Signup complete, redirecting to login");
            let flash = flash_cookie(
                &state.sessions,
                &[Flash::success("Account created. Please log in.")],
            )?;
            Ok(redirect("/login").cookie(flash).finish())
        }
        Err(err) => {
            let flashes = [failure_flash(&err, "Error! Account not created. Please try again.")];
            let page = Page {
                username: session.username(),
                flashes: &flashes,
            };
            Ok(render(&state, None, templates::signup(&page, &form)))
        }
    }
}

#[instrument(skip_all)]
pub async fn login_form(state: web::Data<AppState>, session: Session, flashes: IncomingFlashes) -> HttpResponse {
    let page = Page {
        username: session.username(),
        flashes: flashes.messages(),
    };
    render(&state, Some(&flashes), templates::login(&page, ""))
}

#[instrument(skip_all, fields(username = %form.username))]
pub async fn login(
    state: web::Data<AppState>,
    session: Session,
    form: web::Form<LoginForm>,
) -> Result<HttpResponse, WebError> {
    let form = form.into_inner();
    let username = form.username.clone();

    match state.auth_service.login(form).await {
        Ok(account) => {
            let cookie = state.sessions.issue(&account.username)?;
            info!(account_id = account.id, "Session started");
            Ok(redirect("/").cookie(cookie).finish())
        }
        Err(err) => {
            let flashes = [failure_flash(&err, "Login failed, please try again.")];
            let page = Page {
                username: session.username(),
                flashes: &flashes,
            };
            Ok(render(&state, None, templates::login(&page, &username)))
        }
    }
}

#[instrument(skip_all)]
pub async fn contact_form(state: web::Data<AppState>, session: Session, flashes: IncomingFlashes) -> HttpResponse {
    let page = Page {
        username: session.username(),
        flashes: flashes.messages(),
    };
    render(&state, Some(&flashes), templates::contact(&page, &ContactForm::default()))
}

#[instrument(skip_all, fields(email = %form.email))]
pub async fn contact(
    state: web::Data<AppState>,
    session: Session,
    form: web::Form<ContactForm>,
) -> HttpResponse {
    let form = form.into_inner();

    match state.contact_service.submit(form.clone()).await {
        Ok(message) => {
            info!(message_id = message.id, "Contact message accepted");
            redirect("/sent").finish()
        }
        Err(err) => {
            let flashes = [failure_flash(&err, "Error! Message not saved, please try again.")];
            let page = Page {
                username: session.username(),
                flashes: &flashes,
            };
            render(&state, None, templates::contact(&page, &form))
        }
    }
}

#[instrument(skip_all)]
pub async fn sent(state: web::Data<AppState>, session: Session, flashes: IncomingFlashes) -> HttpResponse {
    let page = Page {
        username: session.username(),
        flashes: flashes.messages(),
    };
    render(&state, Some(&flashes), templates::sent(&page))
}

#[instrument(skip_all)]
pub async fn logout(state: web::Data<AppState>, session: Session) -> Result<HttpResponse, WebError> {
    if let Some(username) = session.username() {
        info!(username = %username, "Logging out");
    }
    let flash = flash_cookie(&state.sessions, &[Flash::info("You have been logged out.")])?;
    Ok(redirect("/login")
        .cookie(state.sessions.clear())
        .cookie(flash)
        .finish())
}
