use crate::schema::appointments;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::{clients::Client, procedures::Procedure, professionals::Professional};

#[derive(Queryable, Identifiable, Clone, Debug)]
#[diesel(table_name = appointments)]
pub struct Appointment {
    pub id: i32,
    pub client_id: i32,
    pub procedure_id: i32,
    pub consultation_type: String,
    pub description: String,
    pub professional_id: i32,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub status: String,
}

impl Appointment {
    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }
}

#[derive(Insertable, AsChangeset)]
#[diesel(table_name = appointments)]
pub struct AppointmentFields {
    pub client_id: i32,
    pub procedure_id: i32,
    pub consultation_type: String,
    pub description: String,
    pub professional_id: i32,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

#[derive(Insertable)]
#[diesel(table_name = appointments)]
pub struct NewAppointment {
    #[diesel(embed)]
    pub fields: AppointmentFields,
    pub status: String,
}

/// An appointment loaded together with every record it references.
#[derive(Clone, Debug)]
pub struct AppointmentDetail {
    pub appointment: Appointment,
    pub client: Client,
    pub procedure: Procedure,
    pub professional: Professional,
}

impl From<(Appointment, Client, Procedure, Professional)> for AppointmentDetail {
    fn from(row: (Appointment, Client, Procedure, Professional)) -> Self {
        let (appointment, client, procedure, professional) = row;
        Self {
            appointment,
            client,
            procedure,
            professional,
        }
    }
}

pub const APPOINT_STATUS_PENDING: &str = "Pending";
pub const APPOINT_STATUS_CONFIRMED: &str = "Confirmed";
pub const APPOINT_STATUS_COMPLETED: &str = "Completed";
pub const APPOINT_STATUS_CANCELLED: &str = "Cancelled";

/// Explicit actions accepted by the status endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusAction {
    Confirm,
    Complete,
    Cancel,
}

impl StatusAction {
    pub fn parse(action: &str) -> Option<Self> {
        match action {
            "confirm" => Some(Self::Confirm),
            "complete" => Some(Self::Complete),
            "cancel" => Some(Self::Cancel),
            _ => None,
        }
    }

    pub fn target_status(self) -> &'static str {
        match self {
            Self::Confirm => APPOINT_STATUS_CONFIRMED,
            Self::Complete => APPOINT_STATUS_COMPLETED,
            Self::Cancel => APPOINT_STATUS_CANCELLED,
        }
    }
}
