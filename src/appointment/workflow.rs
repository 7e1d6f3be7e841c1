//! Appointment lifecycle. Every mutation runs in its own transaction
//! together with the matching reminder change; mail goes out only after
//! the commit.

use anyhow::Context;
use chrono::{NaiveDate, NaiveTime};
use diesel::prelude::*;

use crate::{
    database::assert,
    error::ServiceError,
    models::{
        appointments::{
            Appointment, AppointmentDetail, AppointmentFields, NewAppointment, StatusAction,
            APPOINT_STATUS_PENDING,
        },
        clients::Client,
        procedures::Procedure,
        professionals::Professional,
    },
    notification::{EventKind, MailContext, Notifier},
    reminder,
    utils::{assert_not_empty, LIKE_ESCAPE},
};

#[derive(Clone, Debug)]
pub struct AppointmentForm {
    pub id: Option<i32>,
    pub client_id: i32,
    pub procedure_id: i32,
    pub professional_id: i32,
    pub consultation_type: String,
    pub description: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

#[derive(Default)]
pub struct AppointmentFilter {
    pub status: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub client_name: Option<String>,
    pub first_index: i64,
    pub limit: i64,
}

/// Creates the appointment when `form.id` is absent, otherwise overwrites
/// every field but the status.
pub fn submit(
    conn: &mut SqliteConnection,
    notifier: &Notifier,
    form: AppointmentForm,
) -> anyhow::Result<Appointment> {
    use crate::schema::appointments;

    assert_not_empty("Consultation type", &form.consultation_type)?;

    let edit_id = form.id;
    let appointment = conn.immediate_transaction(|conn| -> anyhow::Result<Appointment> {
        if let Some(id) = edit_id {
            assert::assert_appoint(conn, id)?;
        }
        assert::assert_appoint_refs(conn, form.client_id, form.procedure_id, form.professional_id)?;

        let fields = AppointmentFields {
            client_id: form.client_id,
            procedure_id: form.procedure_id,
            consultation_type: form.consultation_type,
            description: form.description,
            professional_id: form.professional_id,
            date: form.date,
            time: form.time,
        };
        let appointment = match edit_id {
            Some(id) => diesel::update(appointments::table.find(id))
                .set(&fields)
                .get_result::<Appointment>(conn)
                .context("DB error")?,
            None => diesel::insert_into(appointments::table)
                .values(NewAppointment {
                    fields,
                    status: APPOINT_STATUS_PENDING.to_string(),
                })
                .get_result::<Appointment>(conn)
                .context("DB error")?,
        };

        reminder::schedule(conn, &appointment).context("DB error")?;
        Ok(appointment)
    })?;

    let kind = match edit_id {
        Some(_) => {
            log::info!("appointment {} updated", appointment.id);
            EventKind::AppointmentAlteration
        }
        None => {
            log::info!("appointment {} created", appointment.id);
            EventKind::AppointmentConfirmation
        }
    };
    notify(
        conn,
        notifier,
        appointment.id,
        Some(kind),
        EventKind::NewOrRescheduledAppointment,
    );

    Ok(appointment)
}

/// Applies a status action. Last action wins. Cancelling drops the pending
/// reminder and tells the clinic; confirming reinstates a reminder for an
/// appointment that has none.
pub fn change_status(
    conn: &mut SqliteConnection,
    notifier: &Notifier,
    id: i32,
    action: StatusAction,
) -> anyhow::Result<Appointment> {
    use crate::schema::appointments;

    let appointment = conn.immediate_transaction(|conn| -> anyhow::Result<Appointment> {
        assert::assert_appoint(conn, id)?;
        let appointment = diesel::update(appointments::table.find(id))
            .set(appointments::status.eq(action.target_status()))
            .get_result::<Appointment>(conn)
            .context("DB error")?;

        match action {
            StatusAction::Cancel => {
                reminder::cancel(conn, id).context("DB error")?;
            }
            StatusAction::Confirm => {
                reminder::ensure_scheduled(conn, &appointment).context("DB error")?;
            }
            StatusAction::Complete => {}
        }
        Ok(appointment)
    })?;

    log::info!("appointment {} is now {}", id, appointment.status);
    if action == StatusAction::Cancel {
        notify(conn, notifier, id, None, EventKind::AppointmentCancellation);
    }

    Ok(appointment)
}

pub fn delete(conn: &mut SqliteConnection, id: i32) -> anyhow::Result<()> {
    use crate::schema::appointments;

    conn.immediate_transaction(|conn| -> anyhow::Result<()> {
        assert::assert_appoint(conn, id)?;
        reminder::cancel(conn, id).context("DB error")?;
        diesel::delete(appointments::table.find(id))
            .execute(conn)
            .context("DB error")?;
        Ok(())
    })?;

    log::info!("appointment {} deleted", id);
    Ok(())
}

/// Mails the client (when `client_kind` is set) and the clinic about the
/// appointment as it is now stored. Nothing here fails the caller.
fn notify(
    conn: &mut SqliteConnection,
    notifier: &Notifier,
    id: i32,
    client_kind: Option<EventKind>,
    clinic_kind: EventKind,
) {
    let detail = match load_detail(conn, id) {
        Ok(detail) => detail,
        Err(err) => {
            log::error!("appointment {} not notified: {:#}", id, err);
            return;
        }
    };
    let ctx = MailContext::for_appointment(&detail);
    if let Some(kind) = client_kind {
        notifier.notify_client(conn, kind, &ctx);
    }
    notifier.notify_clinic(conn, clinic_kind, &ctx);
}

pub fn load_detail(conn: &mut SqliteConnection, id: i32) -> anyhow::Result<AppointmentDetail> {
    use crate::schema::{appointments, clients, procedures, professionals};

    let row = appointments::table
        .inner_join(clients::table)
        .inner_join(procedures::table)
        .inner_join(professionals::table)
        .filter(appointments::id.eq(id))
        .first::<(Appointment, Client, Procedure, Professional)>(conn)
        .optional()
        .context("DB error")?;

    match row {
        Some(row) => Ok(row.into()),
        None => Err(ServiceError::NotFound("appointment").into()),
    }
}

pub fn search(
    conn: &mut SqliteConnection,
    filter: AppointmentFilter,
) -> anyhow::Result<Vec<AppointmentDetail>> {
    use crate::schema::{appointments, clients, procedures, professionals};

    let mut query = appointments::table
        .inner_join(clients::table)
        .inner_join(procedures::table)
        .inner_join(professionals::table)
        .into_boxed();
    if let Some(status) = filter.status {
        query = query.filter(appointments::status.eq(status));
    }
    if let Some(start_date) = filter.start_date {
        query = query.filter(appointments::date.ge(start_date));
    }
    if let Some(end_date) = filter.end_date {
        query = query.filter(appointments::date.le(end_date));
    }
    if let Some(client_name) = filter.client_name {
        query = query.filter(
            clients::name
                .like(crate::utils::get_str_pattern(client_name))
                .escape(LIKE_ESCAPE),
        );
    }

    let rows = query
        .order((appointments::date.asc(), appointments::time.asc()))
        .offset(filter.first_index)
        .limit(filter.limit)
        .get_results::<(Appointment, Client, Procedure, Professional)>(conn)
        .context("DB error")?;

    Ok(rows.into_iter().map(AppointmentDetail::from).collect())
}

pub fn list_all(conn: &mut SqliteConnection) -> anyhow::Result<Vec<AppointmentDetail>> {
    search(
        conn,
        AppointmentFilter {
            limit: i64::MAX,
            ..Default::default()
        },
    )
}
