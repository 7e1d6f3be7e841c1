use crate::schema::notification_deliveries;
use chrono::NaiveDateTime;

#[derive(Queryable, Identifiable, Clone, Debug)]
#[diesel(table_name = notification_deliveries)]
pub struct Delivery {
    pub id: i32,
    pub kind: String,
    pub recipient: String,
    pub status: String,
    pub attempts: i32,
    pub error: Option<String>,
    pub appointment_id: Option<i32>,
    pub client_id: Option<i32>,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = notification_deliveries)]
pub struct NewDelivery {
    pub kind: String,
    pub recipient: String,
    pub status: String,
    pub attempts: i32,
    pub error: Option<String>,
    pub appointment_id: Option<i32>,
    pub client_id: Option<i32>,
    pub created_at: NaiveDateTime,
}

pub const DELIVERY_STATUS_SENT: &str = "Sent";
pub const DELIVERY_STATUS_FAILED: &str = "Failed";
pub const DELIVERY_STATUS_SKIPPED: &str = "Skipped";
