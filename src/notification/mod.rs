//! Composes and sends every outbound mail, and records the outcome of each
//! dispatch in `notification_deliveries`.
//!
//! A failed send never propagates: the caller's mutation has already been
//! committed when a notification goes out.

pub mod templates;
pub mod transport;

use chrono::{Local, NaiveDate, NaiveTime};
use diesel::prelude::*;
use std::sync::Arc;
use thiserror::Error;

use self::transport::{Mailer, OutgoingMail};
use crate::{
    config::MailSettings,
    models::{
        appointments::AppointmentDetail,
        clients::Client,
        deliveries::{
            NewDelivery, DELIVERY_STATUS_FAILED, DELIVERY_STATUS_SENT, DELIVERY_STATUS_SKIPPED,
        },
    },
};

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Invalid recipient: {0}")]
    Address(String),
    #[error("Failed to build message: {0}")]
    Build(String),
    #[error("Transport error: {0}")]
    Transport(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    RegistrationConfirmation,
    AppointmentConfirmation,
    AppointmentAlteration,
    AppointmentReminder,
    NewRegistration,
    NewOrRescheduledAppointment,
    AppointmentCancellation,
}

impl EventKind {
    pub const ALL: [EventKind; 7] = [
        EventKind::RegistrationConfirmation,
        EventKind::AppointmentConfirmation,
        EventKind::AppointmentAlteration,
        EventKind::AppointmentReminder,
        EventKind::NewRegistration,
        EventKind::NewOrRescheduledAppointment,
        EventKind::AppointmentCancellation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::RegistrationConfirmation => "registration-confirmation",
            EventKind::AppointmentConfirmation => "appointment-confirmation",
            EventKind::AppointmentAlteration => "appointment-alteration",
            EventKind::AppointmentReminder => "appointment-reminder",
            EventKind::NewRegistration => "new-registration",
            EventKind::NewOrRescheduledAppointment => "new-or-rescheduled-appointment",
            EventKind::AppointmentCancellation => "appointment-cancellation",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeliveryStatus {
    Sent,
    Failed,
    Skipped,
}

impl DeliveryStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DeliveryStatus::Sent => DELIVERY_STATUS_SENT,
            DeliveryStatus::Failed => DELIVERY_STATUS_FAILED,
            DeliveryStatus::Skipped => DELIVERY_STATUS_SKIPPED,
        }
    }
}

/// Fields a template may refer to.
#[derive(Clone, Debug, Default)]
pub struct MailContext {
    pub client_name: String,
    pub client_email: String,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub procedure_name: Option<String>,
    pub professional_name: Option<String>,
    pub appointment_id: Option<i32>,
    pub client_id: Option<i32>,
}

impl MailContext {
    pub fn for_client(client: &Client) -> Self {
        Self {
            client_name: client.name.clone(),
            client_email: client.email.clone(),
            client_id: Some(client.id),
            ..Default::default()
        }
    }

    pub fn for_appointment(detail: &AppointmentDetail) -> Self {
        Self {
            date: Some(detail.appointment.date),
            time: Some(detail.appointment.time),
            procedure_name: Some(detail.procedure.name.clone()),
            professional_name: Some(detail.professional.name.clone()),
            appointment_id: Some(detail.appointment.id),
            ..Self::for_client(&detail.client)
        }
    }
}

#[derive(Clone)]
pub struct Notifier {
    mailer: Arc<dyn Mailer>,
    clinic_name: String,
    clinic_email: String,
    max_attempts: u32,
}

impl Notifier {
    pub fn new(mailer: Arc<dyn Mailer>, settings: &MailSettings) -> Self {
        Self {
            mailer,
            clinic_name: settings.clinic_name.clone(),
            clinic_email: settings.clinic_email.clone(),
            max_attempts: settings.max_attempts.max(1),
        }
    }

    pub fn notify_client(
        &self,
        conn: &mut SqliteConnection,
        kind: EventKind,
        ctx: &MailContext,
    ) -> DeliveryStatus {
        self.send(conn, kind, &ctx.client_email, ctx)
    }

    pub fn notify_clinic(
        &self,
        conn: &mut SqliteConnection,
        kind: EventKind,
        ctx: &MailContext,
    ) -> DeliveryStatus {
        self.send(conn, kind, &self.clinic_email, ctx)
    }

    pub fn send(
        &self,
        conn: &mut SqliteConnection,
        kind: EventKind,
        recipient: &str,
        ctx: &MailContext,
    ) -> DeliveryStatus {
        let recipient = recipient.trim();
        if !is_usable_address(recipient) {
            log::debug!("{} skipped: no usable address", kind.as_str());
            self.record(conn, kind, recipient, DeliveryStatus::Skipped, 0, None, ctx);
            return DeliveryStatus::Skipped;
        }

        let rendered = templates::render(kind, ctx, &self.clinic_name);
        let mail = OutgoingMail {
            to: recipient.to_string(),
            subject: rendered.subject,
            body: rendered.body,
        };

        let mut last_err = None;
        for attempt in 1..=self.max_attempts {
            match self.mailer.send(&mail) {
                Ok(()) => {
                    log::info!("{} sent to {}", kind.as_str(), recipient);
                    self.record(conn, kind, recipient, DeliveryStatus::Sent, attempt, None, ctx);
                    return DeliveryStatus::Sent;
                }
                Err(err) => {
                    log::warn!(
                        "{} to {} failed (attempt {}/{}): {}",
                        kind.as_str(),
                        recipient,
                        attempt,
                        self.max_attempts,
                        err
                    );
                    last_err = Some(err.to_string());
                }
            }
        }

        self.record(
            conn,
            kind,
            recipient,
            DeliveryStatus::Failed,
            self.max_attempts,
            last_err,
            ctx,
        );
        DeliveryStatus::Failed
    }

    #[allow(clippy::too_many_arguments)]
    fn record(
        &self,
        conn: &mut SqliteConnection,
        kind: EventKind,
        recipient: &str,
        status: DeliveryStatus,
        attempts: u32,
        error: Option<String>,
        ctx: &MailContext,
    ) {
        use crate::schema::notification_deliveries;

        let data = NewDelivery {
            kind: kind.as_str().to_string(),
            recipient: recipient.to_string(),
            status: status.as_str().to_string(),
            attempts: attempts as i32,
            error,
            appointment_id: ctx.appointment_id,
            client_id: ctx.client_id,
            created_at: Local::now().naive_local(),
        };
        if let Err(err) = diesel::insert_into(notification_deliveries::table)
            .values(data)
            .execute(conn)
        {
            log::error!("failed to record {} delivery: {}", kind.as_str(), err);
        }
    }
}

fn is_usable_address(address: &str) -> bool {
    !address.is_empty() && address.contains('@')
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use crate::config::TransportSecurity;

    pub fn mail_settings() -> MailSettings {
        MailSettings {
            smtp_host: None,
            smtp_port: 587,
            security: TransportSecurity::StartTls,
            username: None,
            password: None,
            from: "Aura Estética <no-reply@aura.test>".to_string(),
            clinic_name: "Aura Estética".to_string(),
            clinic_email: "clinic@aura.test".to_string(),
            max_attempts: 1,
        }
    }

    pub fn notifier(mailer: transport::MockMailer) -> Notifier {
        Notifier::new(Arc::new(mailer), &mail_settings())
    }

    /// A mailer that accepts any number of mails.
    pub fn accepting_mailer() -> transport::MockMailer {
        let mut mailer = transport::MockMailer::new();
        mailer.expect_send().returning(|_| Ok(()));
        mailer
    }
}

#[cfg(test)]
mod tests {
    use super::{testing::*, transport::MockMailer, *};
    use crate::{database::testing::TestDb, models::deliveries::Delivery};

    fn deliveries(db: &TestDb) -> Vec<Delivery> {
        use crate::schema::notification_deliveries;

        notification_deliveries::table
            .order(notification_deliveries::id.asc())
            .load::<Delivery>(&mut db.conn())
            .unwrap()
    }

    fn ctx(email: &str) -> MailContext {
        MailContext {
            client_name: "Ana".to_string(),
            client_email: email.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn sends_and_records() {
        let db = TestDb::new();
        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .withf(|mail: &OutgoingMail| {
                mail.to == "ana@example.com" && mail.subject.starts_with("Welcome")
            })
            .times(1)
            .returning(|_| Ok(()));
        let notifier = notifier(mailer);

        let status = notifier.notify_client(
            &mut db.conn(),
            EventKind::RegistrationConfirmation,
            &ctx("ana@example.com"),
        );

        assert_eq!(status, DeliveryStatus::Sent);
        let rows = deliveries(&db);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, DELIVERY_STATUS_SENT);
        assert_eq!(rows[0].kind, "registration-confirmation");
        assert_eq!(rows[0].attempts, 1);
    }

    #[test]
    fn missing_address_is_skipped_without_transport() {
        let db = TestDb::new();
        let mut mailer = MockMailer::new();
        mailer.expect_send().never();
        let notifier = notifier(mailer);

        for email in ["", "   ", "no-at-sign"] {
            let status = notifier.notify_client(
                &mut db.conn(),
                EventKind::AppointmentReminder,
                &ctx(email),
            );
            assert_eq!(status, DeliveryStatus::Skipped);
        }

        let rows = deliveries(&db);
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|row| row.status == DELIVERY_STATUS_SKIPPED));
    }

    #[test]
    fn failure_is_recorded_not_raised() {
        let db = TestDb::new();
        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .times(1)
            .returning(|_| Err(NotificationError::Transport("connection refused".into())));
        let notifier = notifier(mailer);

        let status = notifier.notify_client(
            &mut db.conn(),
            EventKind::AppointmentConfirmation,
            &ctx("ana@example.com"),
        );

        assert_eq!(status, DeliveryStatus::Failed);
        let rows = deliveries(&db);
        assert_eq!(rows[0].status, DELIVERY_STATUS_FAILED);
        assert!(rows[0].error.as_deref().unwrap().contains("connection refused"));
    }

    #[test]
    fn retries_up_to_max_attempts() {
        let db = TestDb::new();
        let mut mailer = MockMailer::new();
        let mut seq = mockall::Sequence::new();
        mailer
            .expect_send()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_| Err(NotificationError::Transport("busy".into())));
        mailer
            .expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        let mut settings = mail_settings();
        settings.max_attempts = 3;
        let notifier = Notifier::new(Arc::new(mailer), &settings);

        let status = notifier.notify_client(
            &mut db.conn(),
            EventKind::AppointmentConfirmation,
            &ctx("ana@example.com"),
        );

        assert_eq!(status, DeliveryStatus::Sent);
        assert_eq!(deliveries(&db)[0].attempts, 3);
    }

    #[test]
    fn clinic_mail_goes_to_clinic_address() {
        let db = TestDb::new();
        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .withf(|mail: &OutgoingMail| mail.to == "clinic@aura.test")
            .times(1)
            .returning(|_| Ok(()));
        let notifier = notifier(mailer);

        let status =
            notifier.notify_clinic(&mut db.conn(), EventKind::NewRegistration, &ctx(""));

        assert_eq!(status, DeliveryStatus::Sent);
    }

    #[test]
    fn kinds_have_stable_names() {
        assert_eq!(
            EventKind::NewOrRescheduledAppointment.as_str(),
            "new-or-rescheduled-appointment"
        );
        assert_eq!(EventKind::ALL.len(), 7);
    }
}
