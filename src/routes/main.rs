use actix_multipart::form::MultipartForm;
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use chrono::Utc;
use tera::Tera;

use crate::domain::claim::CLAIM_UNIT;
use crate::domain::page::PageResult;
use crate::dto::main::IndexPageData;
use crate::forms::main::{ListQueryForm, UploadCustomersForm};
use crate::models::config::ServerConfig;
use crate::routes::{
    AppLedger, base_context, flash_service_error, redirect, redirect_back, render_template,
};
use crate::services::export::{PrintMode, PrintReport, export_file_name, report_rows, write_csv};
use crate::services::list::PAGE_SIZE_OPTIONS;

#[get("/")]
pub async fn index(
    params: web::Query<ListQueryForm>,
    ledger: web::Data<AppLedger>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let query = params.list_query(server_config.default_page_size);
    let mut context = base_context(&flash_messages, "index");

    let data = match ledger.load(&query).await {
        Ok(result) => IndexPageData::new(&result, &query),
        Err(err) => {
            log::error!("Failed to load customers: {err}");
            context.insert(
                "load_error",
                &format!("Failed to load customer data: {err}"),
            );
            IndexPageData::new(&PageResult::default(), &query)
        }
    };

    context.insert("data", &data);
    context.insert("filters", &params.raw_filters());
    context.insert("filter_params", &params.filter_params());
    context.insert("page_size_options", &PAGE_SIZE_OPTIONS);
    context.insert("claim_unit", &CLAIM_UNIT);

    render_template(&tera, "main/index.html", &context)
}

#[get("/customers/export.csv")]
pub async fn export_csv(
    params: web::Query<ListQueryForm>,
    ledger: web::Data<AppLedger>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let query = params.list_query(server_config.default_page_size);

    let loaded = match ledger.load(&query).await {
        Ok(loaded) => loaded,
        Err(err) => {
            flash_service_error("export customers", &err);
            return redirect("/");
        }
    };

    let report = report_rows(ledger.list(), &query, &loaded).await;
    if !report.complete {
        FlashMessage::warning("Export contains only the currently loaded page.").send();
    }

    match write_csv(&report.rows) {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header((
                header::CONTENT_DISPOSITION,
                format!(
                    "attachment; filename=\"{}\"",
                    export_file_name(Utc::now().date_naive())
                ),
            ))
            .body(body),
        Err(err) => {
            log::error!("Failed to write CSV export: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/customers/print")]
pub async fn print_report(
    params: web::Query<ListQueryForm>,
    ledger: web::Data<AppLedger>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let query = params.list_query(server_config.default_page_size);

    let loaded = match ledger.load(&query).await {
        Ok(loaded) => loaded,
        Err(err) => {
            flash_service_error("print customers", &err);
            return redirect("/");
        }
    };

    let report = report_rows(ledger.list(), &query, &loaded).await;
    let mode = params.mode.unwrap_or(PrintMode::Table);
    let print = PrintReport::new(report, &loaded, mode, Utc::now().naive_utc());

    let mut context = base_context(&flash_messages, "print");
    context.insert("report", &print);
    render_template(&tera, "main/print.html", &context)
}

#[post("/points/refresh")]
pub async fn refresh_points(req: HttpRequest, ledger: web::Data<AppLedger>) -> impl Responder {
    match ledger.refresh_points().await {
        Ok(message) => FlashMessage::success(message).send(),
        Err(err) => flash_service_error("refresh points", &err),
    }
    redirect_back(&req)
}

#[post("/filters/clear")]
pub async fn clear_filters(ledger: web::Data<AppLedger>) -> impl Responder {
    ledger.clear_filters();
    redirect("/")
}

#[post("/customers/upload")]
pub async fn customers_upload(
    req: HttpRequest,
    ledger: web::Data<AppLedger>,
    MultipartForm(mut form): MultipartForm<UploadCustomersForm>,
) -> impl Responder {
    let customers = match form.parse() {
        Ok(customers) => customers,
        Err(err) => {
            log::error!("Failed to parse customers: {err}");
            FlashMessage::error(format!("Failed to parse customers: {err}")).send();
            return redirect_back(&req);
        }
    };

    match ledger.import_customers(customers).await {
        Ok(message) => FlashMessage::success(message).send(),
        Err(err) => flash_service_error("import customers", &err),
    }
    redirect_back(&req)
}
