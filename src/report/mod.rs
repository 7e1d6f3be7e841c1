mod pdf;

use crate::{
    appointment::{workflow, AppointItem},
    database::get_db_conn,
    protocol::SimpleResponse,
    utils::format_date_str,
    AppState,
};
use actix_web::{http::header, post, web, HttpResponse, Responder};
use anyhow::{self, Context};
use chrono::{Local, NaiveDate};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

pub use self::pdf::generate_report_pdf;

pub const REPORT_FILENAME: &str = "appointments_report.pdf";

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(summary)
        .service(appointments)
        .service(export_pdf);
}

#[derive(Deserialize)]
pub struct ReportRequest {}

#[derive(Default, Serialize)]
pub struct SummaryResponse {
    pub success: bool,
    pub err: String,
    pub total_clients: i64,
    pub total_procedures: i64,
    pub today_appointments: Vec<AppointItem>,
}

#[derive(Default, Serialize)]
pub struct AppointmentsReportResponse {
    pub success: bool,
    pub err: String,
    pub appointments: Vec<AppointItem>,
}

crate::impl_err_response! {
    SummaryResponse,
    AppointmentsReportResponse,
}

crate::post_funcs! {
    (summary, "/summary", ReportRequest, SummaryResponse),
    (appointments, "/appointments", ReportRequest, AppointmentsReportResponse),
}

struct Summary {
    total_clients: i64,
    total_procedures: i64,
    today: Vec<AppointItem>,
}

fn load_summary(conn: &mut SqliteConnection, today: NaiveDate) -> anyhow::Result<Summary> {
    use crate::schema::{clients, procedures};

    let total_clients = clients::table
        .count()
        .get_result::<i64>(conn)
        .context("DB error")?;
    let total_procedures = procedures::table
        .count()
        .get_result::<i64>(conn)
        .context("DB error")?;
    let today = workflow::search(
        conn,
        workflow::AppointmentFilter {
            start_date: Some(today),
            end_date: Some(today),
            limit: i64::MAX,
            ..Default::default()
        },
    )?;

    Ok(Summary {
        total_clients,
        total_procedures,
        today: today.into_iter().map(AppointItem::from).collect(),
    })
}

async fn summary_impl(
    state: web::Data<AppState>,
    _info: web::Json<ReportRequest>,
) -> anyhow::Result<SummaryResponse> {
    let today = Local::now().date_naive();
    let loaded = web::block(move || {
        let mut conn = get_db_conn(&state.pool)?;
        load_summary(&mut conn, today)
    })
    .await
    .context("DB error")??;

    Ok(SummaryResponse {
        success: true,
        err: "".to_string(),
        total_clients: loaded.total_clients,
        total_procedures: loaded.total_procedures,
        today_appointments: loaded.today,
    })
}

async fn appointments_impl(
    state: web::Data<AppState>,
    _info: web::Json<ReportRequest>,
) -> anyhow::Result<AppointmentsReportResponse> {
    let appos = web::block(move || {
        let mut conn = get_db_conn(&state.pool)?;
        workflow::list_all(&mut conn)
    })
    .await
    .context("DB error")??;

    Ok(AppointmentsReportResponse {
        success: true,
        err: "".to_string(),
        appointments: appos.into_iter().map(AppointItem::from).collect(),
    })
}

async fn export_pdf_impl(state: web::Data<AppState>) -> anyhow::Result<Vec<u8>> {
    let generated_on = format_date_str(&Local::now().date_naive());
    web::block(move || {
        let mut conn = get_db_conn(&state.pool)?;
        let items: Vec<AppointItem> = workflow::list_all(&mut conn)?
            .into_iter()
            .map(AppointItem::from)
            .collect();
        generate_report_pdf("Appointments Report", &generated_on, &items)
    })
    .await
    .context("DB error")?
}

/// Streams the PDF itself rather than the JSON envelope, so failures only
/// get a generic body.
#[post("/export_pdf")]
async fn export_pdf(state: web::Data<AppState>) -> impl Responder {
    match export_pdf_impl(state).await {
        Ok(bytes) => HttpResponse::Ok()
            .content_type("application/pdf")
            .insert_header((
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", REPORT_FILENAME),
            ))
            .body(bytes),
        Err(err) => {
            log::error!("/export_pdf failed: {:#}", err);
            HttpResponse::InternalServerError().json(SimpleResponse::err("Failed to generate PDF"))
        }
    }
}
