#[macro_export]
macro_rules! post_funcs {
    ( $( ( $func_name:ident, $url:expr, $request:ty, $response:ty ) ),+ $(,)? ) => {
        $(
            paste::paste! {
                #[actix_web::post($url)]
                async fn $func_name(
                    state: actix_web::web::Data<$crate::AppState>,
                    info: actix_web::web::Json<$request>
                ) -> impl actix_web::Responder {
                    match [<$func_name _impl>](state, info).await {
                        Ok(response) => actix_web::HttpResponse::Ok().json(response),
                        Err(err) => {
                            let status = $crate::error::status_of(&err);
                            if status.is_server_error() {
                                log::error!("{} failed: {:#}", $url, err);
                            } else {
                                log::debug!("{} rejected: {}", $url, err);
                            }
                            actix_web::HttpResponse::build(status).json(<$response>::err(err))
                        }
                    }
                }
            }
        )+
    };
}

use anyhow::{bail, Result};
use chrono::{NaiveDate, NaiveTime, Timelike};

use crate::error::ServiceError;

pub const DATE_FMT: &str = "%Y-%m-%d";
pub const TIME_FMT: &str = "%H:%M";

pub fn parse_date_str<S: AsRef<str>>(s: S) -> Result<NaiveDate> {
    let s = s.as_ref().trim();
    match NaiveDate::parse_from_str(s, DATE_FMT) {
        Ok(date) => Ok(date),
        Err(_) => bail!(ServiceError::Validation(format!("Invalid date '{}'", s))),
    }
}

/// Accepts `HH:MM` as submitted by the booking form, and `HH:MM:SS`.
pub fn parse_time_str<S: AsRef<str>>(s: S) -> Result<NaiveTime> {
    let s = s.as_ref().trim();
    NaiveTime::parse_from_str(s, TIME_FMT)
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| ServiceError::Validation(format!("Invalid time '{}'", s)).into())
}

pub fn format_date_str(date: &NaiveDate) -> String {
    date.format(DATE_FMT).to_string()
}

/// `HH:MM`, or `HH:MM:SS` when the time carries seconds.
pub fn format_time_str(time: &NaiveTime) -> String {
    if time.second() == 0 {
        time.format(TIME_FMT).to_string()
    } else {
        time.format("%H:%M:%S").to_string()
    }
}

pub fn assert_not_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        bail!(ServiceError::Validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

pub fn assert_price(price: f64) -> Result<()> {
    if !price.is_finite() || price < 0.0 {
        bail!(ServiceError::Validation("Price must be a non-negative number".to_string()));
    }
    Ok(())
}

pub const LIKE_ESCAPE: char = '\\';

/// Substring pattern for `LIKE` with `LIKE_ESCAPE`. Wildcards in the input
/// match literally.
pub fn get_str_pattern<S: AsRef<str>>(s: S) -> String {
    let mut pattern = String::from("%");
    for c in s.as_ref().chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

pub fn get_str_pattern_opt<S: AsRef<str>>(s: Option<S>) -> String {
    match s {
        Some(s) => get_str_pattern(s),
        None => "%".to_string(),
    }
}

pub fn get_page(first_index: Option<i64>, limit: Option<i64>) -> (i64, i64) {
    (first_index.unwrap_or(0).max(0), limit.unwrap_or(30).max(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::status_of;
    use actix_web::http::StatusCode;

    #[test]
    fn parses_form_date_and_time() {
        assert_eq!(
            parse_date_str("2024-03-10").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
        );
        assert_eq!(
            parse_time_str("15:00").unwrap(),
            NaiveTime::from_hms_opt(15, 0, 0).unwrap()
        );
        assert_eq!(
            parse_time_str("09:30:15").unwrap(),
            NaiveTime::from_hms_opt(9, 30, 15).unwrap()
        );
    }

    #[test]
    fn seconds_survive_formatting() {
        assert_eq!(format_time_str(&NaiveTime::from_hms_opt(15, 0, 0).unwrap()), "15:00");
        assert_eq!(
            format_time_str(&parse_time_str("09:30:15").unwrap()),
            "09:30:15"
        );
    }

    #[test]
    fn bad_date_is_a_validation_error() {
        let err = parse_date_str("10/03/2024").unwrap_err();
        assert_eq!(status_of(&err), StatusCode::BAD_REQUEST);
        let err = parse_time_str("25:00").unwrap_err();
        assert_eq!(status_of(&err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn price_must_be_non_negative() {
        assert!(assert_price(0.0).is_ok());
        assert!(assert_price(150.5).is_ok());
        assert!(assert_price(-1.0).is_err());
        assert!(assert_price(f64::NAN).is_err());
    }

    #[test]
    fn page_defaults() {
        assert_eq!(get_page(None, None), (0, 30));
        assert_eq!(get_page(Some(-5), Some(10)), (0, 10));
    }

    #[test]
    fn like_patterns() {
        assert_eq!(get_str_pattern("Ana"), "%Ana%");
        assert_eq!(get_str_pattern("50%_off"), r"%50\%\_off%");
        assert_eq!(get_str_pattern(r"a\b"), r"%a\\b%");
        assert_eq!(get_str_pattern_opt::<&str>(None), "%");
    }
}
