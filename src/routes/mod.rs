//! HTTP handlers and the helpers they share.

use actix_web::http::{Uri, header};
use actix_web::{HttpRequest, HttpResponse};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages, Level};
use tera::{Context, Tera};

use crate::repository::DieselRepository;
use crate::services::ServiceError;
use crate::services::ledger::Ledger;

pub mod api;
pub mod customer;
pub mod main;

/// Ledger shared by every handler through `web::Data`.
pub type AppLedger = Ledger<DieselRepository>;

/// Maps a flash message level to the CSS class used by the templates.
pub fn alert_level_to_str(level: &Level) -> &'static str {
    match level {
        Level::Error => "danger",
        Level::Warning => "warning",
        Level::Success => "success",
        _ => "info",
    }
}

/// Template context with the pending flash messages and the active page.
pub fn base_context(flash_messages: &IncomingFlashMessages, current_page: &str) -> Context {
    let alerts = flash_messages
        .iter()
        .map(|f| (f.content(), alert_level_to_str(&f.level())))
        .collect::<Vec<_>>();

    let mut context = Context::new();
    context.insert("alerts", &alerts);
    context.insert("current_page", current_page);
    context
}

pub fn render_template(tera: &Tera, template: &str, context: &Context) -> HttpResponse {
    match tera.render(template, context) {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(err) => {
            log::error!("Failed to render template '{template}': {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Local path and query of the page the request came from, if any.
fn referer_path(req: &HttpRequest) -> Option<String> {
    let referer = req.headers().get(header::REFERER)?.to_str().ok()?;
    let uri = referer.parse::<Uri>().ok()?;
    let path = uri.path_and_query()?.as_str();
    (path.starts_with('/') && !path.starts_with("//")).then(|| path.to_string())
}

/// Redirects to the referring page so the list keeps its filters.
pub fn redirect_back(req: &HttpRequest) -> HttpResponse {
    redirect(referer_path(req).as_deref().unwrap_or("/"))
}

/// Sends the error banner for a failed operation. `action` reads like
/// "save customer".
pub fn flash_service_error(action: &str, err: &ServiceError) {
    match err {
        ServiceError::Claim(_) | ServiceError::Validation(_) | ServiceError::Form(_) => {
            FlashMessage::error(err.to_string()).send();
        }
        _ => {
            FlashMessage::error(format!("Failed to {action}: {err}")).send();
        }
    }
}
