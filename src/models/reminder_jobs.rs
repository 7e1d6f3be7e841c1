use crate::schema::reminder_jobs;
use chrono::NaiveDateTime;

#[derive(Queryable, Identifiable, Clone, Debug)]
#[diesel(table_name = reminder_jobs)]
pub struct ReminderJob {
    pub id: i32,
    pub appointment_id: i32,
    pub fire_at: NaiveDateTime,
    pub fired: bool,
    pub fired_at: Option<NaiveDateTime>,
}

#[derive(Insertable)]
#[diesel(table_name = reminder_jobs)]
pub struct NewReminderJob {
    pub appointment_id: i32,
    pub fire_at: NaiveDateTime,
}
