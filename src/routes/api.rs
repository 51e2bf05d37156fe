use actix_web::{HttpResponse, Responder, get, web};
use serde_json::json;

use crate::domain::types::CustomerCode;
use crate::dto::api::CustomersResponse;
use crate::forms::main::ListQueryForm;
use crate::models::config::ServerConfig;
use crate::routes::AppLedger;
use crate::services::ServiceError;

fn error_response(err: ServiceError) -> HttpResponse {
    match err {
        ServiceError::NotFound => HttpResponse::NotFound().json(json!({ "error": err.to_string() })),
        ServiceError::Validation(_) | ServiceError::Claim(_) | ServiceError::Form(_) => {
            HttpResponse::BadRequest().json(json!({ "error": err.to_string() }))
        }
        _ => {
            log::error!("API request failed: {err}");
            HttpResponse::InternalServerError().json(json!({ "error": err.to_string() }))
        }
    }
}

#[get("/v1/customers")]
pub async fn api_v1_customers(
    params: web::Query<ListQueryForm>,
    ledger: web::Data<AppLedger>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let query = params.list_query(server_config.default_page_size);

    match ledger.load(&query).await {
        Ok(result) => HttpResponse::Ok().json(CustomersResponse::new(&result, &query)),
        Err(err) => error_response(err),
    }
}

#[get("/v1/customers/{code}/claims")]
pub async fn api_v1_customer_claims(
    code: web::Path<String>,
    ledger: web::Data<AppLedger>,
) -> impl Responder {
    let code = match CustomerCode::new(code.into_inner()) {
        Ok(code) => code,
        Err(err) => return error_response(err.into()),
    };

    match ledger.list_claims(code).await {
        Ok(claims) => HttpResponse::Ok().json(claims),
        Err(err) => error_response(err),
    }
}
