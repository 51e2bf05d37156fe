use actix_web::{HttpRequest, Responder, post, web};
use actix_web_flash_messages::FlashMessage;

use crate::forms::customer::{AddCustomerForm, ClaimForm, DeleteCustomerForm, SaveCustomerForm};
use crate::routes::{AppLedger, flash_service_error, redirect_back};

#[post("/customer/add")]
pub async fn add_customer(
    req: HttpRequest,
    ledger: web::Data<AppLedger>,
    web::Form(form): web::Form<AddCustomerForm>,
) -> impl Responder {
    let new_customer = match form.into_new_customer() {
        Ok(new_customer) => new_customer,
        Err(err) => {
            log::error!("Failed to validate form: {err}");
            FlashMessage::error(format!("Failed to save customer: {err}")).send();
            return redirect_back(&req);
        }
    };

    match ledger.create_customer(new_customer).await {
        Ok(message) => FlashMessage::success(message).send(),
        Err(err) => flash_service_error("save customer", &err),
    }
    redirect_back(&req)
}

#[post("/customer/save")]
pub async fn save_customer(
    req: HttpRequest,
    ledger: web::Data<AppLedger>,
    web::Form(form): web::Form<SaveCustomerForm>,
) -> impl Responder {
    let (code, updates) = match form.into_update() {
        Ok(parts) => parts,
        Err(err) => {
            log::error!("Failed to validate form: {err}");
            FlashMessage::error(format!("Failed to save customer: {err}")).send();
            return redirect_back(&req);
        }
    };

    match ledger.update_customer(code, updates).await {
        Ok(message) => FlashMessage::success(message).send(),
        Err(err) => flash_service_error("save customer", &err),
    }
    redirect_back(&req)
}

#[post("/customer/delete")]
pub async fn delete_customer(
    req: HttpRequest,
    ledger: web::Data<AppLedger>,
    web::Form(form): web::Form<DeleteCustomerForm>,
) -> impl Responder {
    let code = match form.customer_code() {
        Ok(code) => code,
        Err(err) => {
            FlashMessage::error(format!("Failed to delete customer: {err}")).send();
            return redirect_back(&req);
        }
    };

    match ledger.delete_customer(code).await {
        Ok(message) => FlashMessage::success(message).send(),
        Err(err) => flash_service_error("delete customer", &err),
    }
    redirect_back(&req)
}

#[post("/customer/claim")]
pub async fn claim_points(
    req: HttpRequest,
    ledger: web::Data<AppLedger>,
    web::Form(form): web::Form<ClaimForm>,
) -> impl Responder {
    let (request, unclaimed) = match form.to_request() {
        Ok(parts) => parts,
        Err(err) => {
            FlashMessage::error(err.to_string()).send();
            return redirect_back(&req);
        }
    };

    match ledger.claim(request, unclaimed).await {
        Ok(outcome) => FlashMessage::success(outcome.summary()).send(),
        Err(err) => flash_service_error("claim points", &err),
    }
    redirect_back(&req)
}
