use serde::Serialize;

use crate::{
    models::appointments::AppointmentDetail,
    utils::{format_date_str, format_time_str},
};

#[derive(Default, Serialize)]
pub struct AppointItem {
    pub id: i32,
    pub client_id: i32,
    pub client_name: String,
    pub procedure_id: i32,
    pub procedure_name: String,
    pub professional_id: i32,
    pub professional_name: String,
    pub consultation_type: String,
    pub description: String,
    pub date: String,
    pub time: String,
    pub status: String,
}

impl From<AppointmentDetail> for AppointItem {
    fn from(detail: AppointmentDetail) -> Self {
        let AppointmentDetail {
            appointment,
            client,
            procedure,
            professional,
        } = detail;
        Self {
            id: appointment.id,
            client_id: client.id,
            client_name: client.name,
            procedure_id: procedure.id,
            procedure_name: procedure.name,
            professional_id: professional.id,
            professional_name: professional.name,
            consultation_type: appointment.consultation_type,
            description: appointment.description,
            date: format_date_str(&appointment.date),
            time: format_time_str(&appointment.time),
            status: appointment.status,
        }
    }
}

#[derive(Default, Serialize)]
pub struct AppointStatusResponse {
    pub success: bool,
    pub err: String,
    pub id: i32,
    pub status: String,
}

#[derive(Default, Serialize)]
pub struct ViewAppointResponse {
    pub success: bool,
    pub err: String,
    pub appointment: AppointItem,
}

#[derive(Default, Serialize)]
pub struct SearchAppointResponse {
    pub success: bool,
    pub err: String,
    pub appointments: Vec<AppointItem>,
}

crate::impl_err_response! {
    AppointStatusResponse,
    ViewAppointResponse,
    SearchAppointResponse,
}
