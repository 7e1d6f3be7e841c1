use anyhow::{anyhow, bail, Context, Result};
use std::{str::FromStr, time::Duration};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportSecurity {
    StartTls,
    Tls,
    None,
}

impl FromStr for TransportSecurity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "starttls" => Ok(Self::StartTls),
            "tls" => Ok(Self::Tls),
            "none" => Ok(Self::None),
            other => bail!("unknown transport security '{}'", other),
        }
    }
}

#[derive(Clone, Debug)]
pub struct MailSettings {
    /// Relay host. Without one, mail is written to the log instead.
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub security: TransportSecurity,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
    pub clinic_name: String,
    pub clinic_email: String,
    pub max_attempts: u32,
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub database_url: String,
    pub bind_addr: String,
    pub db_pool_size: u32,
    pub mail: MailSettings,
    pub reminder_poll_interval: Duration,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or_else(|| anyhow!("DATABASE_URL not found"))?;
        let get_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let mail = MailSettings {
            smtp_host: lookup("SMTP_HOST").filter(|host| !host.is_empty()),
            smtp_port: parse_var(&lookup, "SMTP_PORT", 587)?,
            security: parse_var(&lookup, "SMTP_SECURITY", TransportSecurity::StartTls)?,
            username: lookup("SMTP_USERNAME"),
            password: lookup("SMTP_PASSWORD"),
            from: get_or("MAIL_FROM", "Aura Estética <no-reply@localhost>"),
            clinic_name: get_or("CLINIC_NAME", "Aura Estética"),
            clinic_email: get_or("CLINIC_EMAIL", "clinic@localhost"),
            max_attempts: parse_var(&lookup, "MAIL_MAX_ATTEMPTS", 1u32)?.max(1),
        };

        let poll_secs: u64 = parse_var(&lookup, "REMINDER_POLL_SECS", 60)?;
        if poll_secs == 0 {
            bail!("REMINDER_POLL_SECS must be positive");
        }

        let db_pool_size: u32 = parse_var(&lookup, "DB_POOL_SIZE", 8)?;
        if db_pool_size == 0 {
            bail!("DB_POOL_SIZE must be positive");
        }

        Ok(Self {
            database_url,
            bind_addr: get_or("BIND_ADDR", "127.0.0.1:8080"),
            db_pool_size,
            mail,
            reminder_poll_interval: Duration::from_secs(poll_secs),
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(value) => value
            .parse::<T>()
            .map_err(|e| anyhow!("{}", e))
            .with_context(|| format!("invalid value for {}: '{}'", key, value)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let s = settings(&[("DATABASE_URL", "aura.db")]).unwrap();
        assert_eq!(s.database_url, "aura.db");
        assert_eq!(s.bind_addr, "127.0.0.1:8080");
        assert_eq!(s.mail.smtp_host, None);
        assert_eq!(s.mail.smtp_port, 587);
        assert_eq!(s.mail.security, TransportSecurity::StartTls);
        assert_eq!(s.mail.max_attempts, 1);
        assert_eq!(s.reminder_poll_interval, Duration::from_secs(60));
    }

    #[test]
    fn database_url_is_required() {
        let err = settings(&[]).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn overrides() {
        let s = settings(&[
            ("DATABASE_URL", "aura.db"),
            ("SMTP_HOST", "smtp.example.com"),
            ("SMTP_PORT", "465"),
            ("SMTP_SECURITY", "TLS"),
            ("MAIL_MAX_ATTEMPTS", "3"),
            ("REMINDER_POLL_SECS", "5"),
        ])
        .unwrap();
        assert_eq!(s.mail.smtp_host.as_deref(), Some("smtp.example.com"));
        assert_eq!(s.mail.smtp_port, 465);
        assert_eq!(s.mail.security, TransportSecurity::Tls);
        assert_eq!(s.mail.max_attempts, 3);
        assert_eq!(s.reminder_poll_interval, Duration::from_secs(5));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = settings(&[("DATABASE_URL", "aura.db"), ("SMTP_PORT", "smtp")]).unwrap_err();
        assert!(err.to_string().contains("SMTP_PORT"));
        assert!(settings(&[("DATABASE_URL", "aura.db"), ("SMTP_SECURITY", "ssl")]).is_err());
        assert!(settings(&[("DATABASE_URL", "aura.db"), ("REMINDER_POLL_SECS", "0")]).is_err());
        let err = settings(&[("DATABASE_URL", "aura.db"), ("DB_POOL_SIZE", "0")]).unwrap_err();
        assert!(err.to_string().contains("DB_POOL_SIZE"));
    }
}
