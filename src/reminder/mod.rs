//! Durable one-shot reminders.
//!
//! Each appointment has at most one unfired row in `reminder_jobs`. A
//! background task on the actix runtime polls for due rows, claims them and
//! hands the reminder to the notifier.

use actix_web::{rt, web};
use anyhow::Context;
use chrono::{Duration as ChronoDuration, Local, NaiveDateTime};
use diesel::prelude::*;
use std::time::Duration;

use crate::{
    appointment::workflow::load_detail,
    database::{get_db_conn, DbPool},
    models::{
        appointments::{Appointment, APPOINT_STATUS_CONFIRMED, APPOINT_STATUS_PENDING},
        reminder_jobs::{NewReminderJob, ReminderJob},
    },
    notification::{EventKind, MailContext, Notifier},
};

pub const REMINDER_LEAD_HOURS: i64 = 1;

pub fn fire_time(appointment: &Appointment) -> NaiveDateTime {
    appointment.starts_at() - ChronoDuration::hours(REMINDER_LEAD_HOURS)
}

/// Replaces any pending reminder of the appointment with one computed from
/// its current date and time. A fire time in the past is kept as is and
/// fires on the next poll.
pub fn schedule(conn: &mut SqliteConnection, appointment: &Appointment) -> QueryResult<ReminderJob> {
    use crate::schema::reminder_jobs;

    cancel(conn, appointment.id)?;
    diesel::insert_into(reminder_jobs::table)
        .values(NewReminderJob {
            appointment_id: appointment.id,
            fire_at: fire_time(appointment),
        })
        .get_result::<ReminderJob>(conn)
}

/// Schedules a reminder only if the appointment never had one, so a
/// reminder that already went out is not repeated.
pub fn ensure_scheduled(
    conn: &mut SqliteConnection,
    appointment: &Appointment,
) -> QueryResult<Option<ReminderJob>> {
    use crate::schema::reminder_jobs;

    let res = reminder_jobs::table
        .filter(reminder_jobs::appointment_id.eq(appointment.id))
        .count()
        .get_result::<i64>(conn)?;
    if res > 0 {
        return Ok(None);
    }
    schedule(conn, appointment).map(Some)
}

pub fn cancel(conn: &mut SqliteConnection, appointment_id: i32) -> QueryResult<usize> {
    use crate::schema::reminder_jobs;

    diesel::delete(
        reminder_jobs::table
            .filter(reminder_jobs::appointment_id.eq(appointment_id))
            .filter(reminder_jobs::fired.eq(false)),
    )
    .execute(conn)
}

pub fn pending_for(conn: &mut SqliteConnection, appointment_id: i32) -> QueryResult<Vec<ReminderJob>> {
    use crate::schema::reminder_jobs;

    reminder_jobs::table
        .filter(reminder_jobs::appointment_id.eq(appointment_id))
        .filter(reminder_jobs::fired.eq(false))
        .order(reminder_jobs::fire_at.asc())
        .get_results::<ReminderJob>(conn)
}

/// Fires every reminder due at `now`. Jobs are claimed before anything is
/// sent, so a reminder goes out at most once. Returns the number of
/// reminders handed to the notifier.
pub fn run_due(
    conn: &mut SqliteConnection,
    notifier: &Notifier,
    now: NaiveDateTime,
) -> anyhow::Result<usize> {
    use crate::schema::reminder_jobs;

    let due = conn
        .immediate_transaction(|conn| {
            let jobs = reminder_jobs::table
                .filter(reminder_jobs::fired.eq(false))
                .filter(reminder_jobs::fire_at.le(now))
                .order(reminder_jobs::fire_at.asc())
                .get_results::<ReminderJob>(conn)?;
            let ids: Vec<i32> = jobs.iter().map(|job| job.id).collect();
            diesel::update(reminder_jobs::table.filter(reminder_jobs::id.eq_any(ids)))
                .set((
                    reminder_jobs::fired.eq(true),
                    reminder_jobs::fired_at.eq(now),
                ))
                .execute(conn)?;
            Ok::<_, diesel::result::Error>(jobs)
        })
        .context("DB error")?;

    let mut fired = 0;
    for job in due {
        let detail = match load_detail(conn, job.appointment_id) {
            Ok(detail) => detail,
            Err(err) => {
                log::warn!("reminder {} dropped: {}", job.id, err);
                continue;
            }
        };
        let status = detail.appointment.status.as_str();
        if status != APPOINT_STATUS_PENDING && status != APPOINT_STATUS_CONFIRMED {
            log::debug!(
                "reminder {} dropped: appointment {} is {}",
                job.id,
                detail.appointment.id,
                status
            );
            continue;
        }
        notifier.notify_client(
            conn,
            EventKind::AppointmentReminder,
            &MailContext::for_appointment(&detail),
        );
        fired += 1;
    }

    Ok(fired)
}

/// Handle to the polling task. Dropping it leaves the task running; call
/// `shutdown` to stop it.
pub struct ReminderScheduler {
    handle: rt::task::JoinHandle<()>,
}

impl ReminderScheduler {
    pub fn start(pool: DbPool, notifier: Notifier, every: Duration) -> Self {
        log::info!("reminder scheduler polling every {:?}", every);
        let handle = rt::spawn(async move {
            let mut ticker = rt::time::interval(every);
            loop {
                ticker.tick().await;
                let pool = pool.clone();
                let notifier = notifier.clone();
                let res = web::block(move || {
                    let mut conn = get_db_conn(&pool)?;
                    run_due(&mut conn, &notifier, Local::now().naive_local())
                })
                .await;
                match res {
                    Ok(Ok(0)) => {}
                    Ok(Ok(fired)) => log::info!("fired {} reminder(s)", fired),
                    Ok(Err(err)) => log::error!("reminder poll failed: {:#}", err),
                    Err(err) => log::error!("reminder poll failed: {}", err),
                }
            }
        });
        Self { handle }
    }

    pub fn shutdown(self) {
        self.handle.abort();
        log::info!("reminder scheduler stopped");
    }
}
