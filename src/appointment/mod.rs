mod requests;
mod responses;
pub mod workflow;

use crate::{
    database::get_db_conn,
    error::ServiceError,
    models::appointments::StatusAction,
    protocol::SimpleResponse,
    utils::{get_page, parse_date_str, parse_time_str},
    AppState,
};
use actix_web::web;
use anyhow::{self, Context};

pub use self::responses::AppointItem;
use self::{
    requests::*,
    responses::*,
    workflow::{AppointmentFilter, AppointmentForm},
};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(submit)
        .service(change_status)
        .service(view)
        .service(search)
        .service(delete);
}

crate::post_funcs! {
    (submit, "/submit", SubmitAppointRequest, AppointStatusResponse),
    (change_status, "/change_status", ChangeStatusRequest, AppointStatusResponse),
    (view, "/view", ViewAppointRequest, ViewAppointResponse),
    (search, "/search", SearchAppointRequest, SearchAppointResponse),
    (delete, "/delete", DeleteAppointRequest, SimpleResponse),
}

async fn submit_impl(
    state: web::Data<AppState>,
    info: web::Json<SubmitAppointRequest>,
) -> anyhow::Result<AppointStatusResponse> {
    let info = info.into_inner();
    let form = AppointmentForm {
        id: info.id,
        client_id: info.client_id,
        procedure_id: info.procedure_id,
        professional_id: info.professional_id,
        consultation_type: info.consultation_type,
        description: info.description,
        date: parse_date_str(&info.date)?,
        time: parse_time_str(&info.time)?,
    };

    let appointment = web::block(move || {
        let mut conn = get_db_conn(&state.pool)?;
        workflow::submit(&mut conn, &state.notifier, form)
    })
    .await
    .context("DB error")??;

    Ok(AppointStatusResponse {
        success: true,
        err: "".to_string(),
        id: appointment.id,
        status: appointment.status,
    })
}

async fn change_status_impl(
    state: web::Data<AppState>,
    info: web::Json<ChangeStatusRequest>,
) -> anyhow::Result<AppointStatusResponse> {
    let info = info.into_inner();
    let action = StatusAction::parse(&info.action).ok_or_else(|| {
        ServiceError::Validation(format!("Unknown status action '{}'", info.action))
    })?;

    let id = info.id;
    let appointment = web::block(move || {
        let mut conn = get_db_conn(&state.pool)?;
        workflow::change_status(&mut conn, &state.notifier, id, action)
    })
    .await
    .context("DB error")??;

    Ok(AppointStatusResponse {
        success: true,
        err: "".to_string(),
        id: appointment.id,
        status: appointment.status,
    })
}

async fn view_impl(
    state: web::Data<AppState>,
    info: web::Json<ViewAppointRequest>,
) -> anyhow::Result<ViewAppointResponse> {
    let id = info.into_inner().id;
    let detail = web::block(move || {
        let mut conn = get_db_conn(&state.pool)?;
        workflow::load_detail(&mut conn, id)
    })
    .await
    .context("DB error")??;

    Ok(ViewAppointResponse {
        success: true,
        err: "".to_string(),
        appointment: detail.into(),
    })
}

async fn search_impl(
    state: web::Data<AppState>,
    info: web::Json<SearchAppointRequest>,
) -> anyhow::Result<SearchAppointResponse> {
    let info = info.into_inner();
    let (first_index, limit) = get_page(info.first_index, info.limit);
    let filter = AppointmentFilter {
        status: info.status.filter(|status| status != "All"),
        start_date: info.start_date.map(parse_date_str).transpose()?,
        end_date: info.end_date.map(parse_date_str).transpose()?,
        client_name: info.client_name,
        first_index,
        limit,
    };

    let appos = web::block(move || {
        let mut conn = get_db_conn(&state.pool)?;
        workflow::search(&mut conn, filter)
    })
    .await
    .context("DB error")??;

    Ok(SearchAppointResponse {
        success: true,
        err: "".to_string(),
        appointments: appos.into_iter().map(AppointItem::from).collect(),
    })
}

async fn delete_impl(
    state: web::Data<AppState>,
    info: web::Json<DeleteAppointRequest>,
) -> anyhow::Result<SimpleResponse> {
    let id = info.into_inner().id;
    web::block(move || {
        let mut conn = get_db_conn(&state.pool)?;
        workflow::delete(&mut conn, id)
    })
    .await
    .context("DB error")??;

    Ok(SimpleResponse::ok())
}
