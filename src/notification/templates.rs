use super::{EventKind, MailContext};
use crate::utils::{format_date_str, format_time_str};

pub struct Rendered {
    pub subject: String,
    pub body: String,
}

pub fn render(kind: EventKind, ctx: &MailContext, clinic_name: &str) -> Rendered {
    let when = match (&ctx.date, &ctx.time) {
        (Some(date), Some(time)) => format!("{} at {}", format_date_str(date), format_time_str(time)),
        (Some(date), None) => format_date_str(date),
        _ => "-".to_string(),
    };
    let procedure = ctx.procedure_name.as_deref().unwrap_or("Procedure");
    let professional = ctx.professional_name.as_deref().unwrap_or("-");
    let signature = format!("Kind regards,\n{}", clinic_name);

    let (subject, body) = match kind {
        EventKind::RegistrationConfirmation => (
            format!("Welcome to {}!", clinic_name),
            format!(
                "Hello {},\n\nYour registration at {} is complete.\n\n{}",
                ctx.client_name, clinic_name, signature
            ),
        ),
        EventKind::AppointmentConfirmation => (
            format!("Appointment confirmation - {}", clinic_name),
            format!(
                "Hello {},\n\nYour appointment for {} with {} has been registered.\nDate: {}\n\n{}",
                ctx.client_name, procedure, professional, when, signature
            ),
        ),
        EventKind::AppointmentAlteration => (
            format!("Appointment changed - {}", clinic_name),
            format!(
                "Hello {},\n\nYour appointment for {} with {} has been changed.\nNew date: {}\n\n{}",
                ctx.client_name, procedure, professional, when, signature
            ),
        ),
        EventKind::AppointmentReminder => (
            format!("Appointment reminder - {}", clinic_name),
            format!(
                "Hello {},\n\nReminder: you have an appointment for {} with {} on {}.\n\n{}",
                ctx.client_name, procedure, professional, when, signature
            ),
        ),
        EventKind::NewRegistration => (
            format!("New client registration - {}", clinic_name),
            format!(
                "A new client has registered.\nName: {}\nEmail: {}\n",
                ctx.client_name,
                if ctx.client_email.is_empty() { "-" } else { ctx.client_email.as_str() }
            ),
        ),
        EventKind::NewOrRescheduledAppointment => (
            format!("New/rescheduled appointment - {}", clinic_name),
            format!(
                "Client: {}\nProcedure: {}\nProfessional: {}\nDate: {}\n",
                ctx.client_name, procedure, professional, when
            ),
        ),
        EventKind::AppointmentCancellation => (
            format!("Appointment cancelled - {}", clinic_name),
            format!(
                "The following appointment was cancelled.\nClient: {}\nProcedure: {}\nProfessional: {}\nDate: {}\n",
                ctx.client_name, procedure, professional, when
            ),
        ),
    };

    Rendered { subject, body }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn ctx() -> MailContext {
        MailContext {
            client_name: "Ana Souza".to_string(),
            client_email: "ana@example.com".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 10),
            time: NaiveTime::from_hms_opt(15, 0, 0),
            procedure_name: Some("Peeling".to_string()),
            professional_name: Some("Dra. Lima".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn confirmation_mentions_every_field() {
        let mail = render(EventKind::AppointmentConfirmation, &ctx(), "Aura Estética");
        assert_eq!(mail.subject, "Appointment confirmation - Aura Estética");
        for needle in ["Ana Souza", "Peeling", "Dra. Lima", "2024-03-10 at 15:00"] {
            assert!(mail.body.contains(needle), "missing {}", needle);
        }
    }

    #[test]
    fn registration_without_email_uses_placeholder() {
        let ctx = MailContext {
            client_name: "Bia".to_string(),
            ..Default::default()
        };
        let mail = render(EventKind::NewRegistration, &ctx, "Aura");
        assert!(mail.body.contains("Email: -"));
    }

    #[test]
    fn every_kind_has_a_distinct_subject() {
        let subjects: std::collections::HashSet<_> = EventKind::ALL
            .iter()
            .map(|kind| render(*kind, &ctx(), "Aura").subject)
            .collect();
        assert_eq!(subjects.len(), EventKind::ALL.len());
    }
}
