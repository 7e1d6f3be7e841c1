use anyhow::{bail, Context};
use diesel::prelude::*;

use crate::error::ServiceError;

pub fn assert_client(conn: &mut SqliteConnection, id: i32) -> anyhow::Result<()> {
    use crate::schema::clients;

    let res = clients::table
        .filter(clients::id.eq(id))
        .count()
        .get_result::<i64>(conn)
        .context("DB error")?;

    if res == 0 {
        bail!(ServiceError::NotFound("client"));
    }

    Ok(())
}

pub fn assert_procedure(conn: &mut SqliteConnection, id: i32) -> anyhow::Result<()> {
    use crate::schema::procedures;

    let res = procedures::table
        .filter(procedures::id.eq(id))
        .count()
        .get_result::<i64>(conn)
        .context("DB error")?;

    if res == 0 {
        bail!(ServiceError::NotFound("procedure"));
    }

    Ok(())
}

pub fn assert_professional(conn: &mut SqliteConnection, id: i32) -> anyhow::Result<()> {
    use crate::schema::professionals;

    let res = professionals::table
        .filter(professionals::id.eq(id))
        .count()
        .get_result::<i64>(conn)
        .context("DB error")?;

    if res == 0 {
        bail!(ServiceError::NotFound("professional"));
    }

    Ok(())
}

pub fn assert_appoint(conn: &mut SqliteConnection, id: i32) -> anyhow::Result<()> {
    use crate::schema::appointments;

    let res = appointments::table
        .filter(appointments::id.eq(id))
        .count()
        .get_result::<i64>(conn)
        .context("DB error")?;

    if res == 0 {
        bail!(ServiceError::NotFound("appointment"));
    }

    Ok(())
}

/// Resolves the three references of an appointment. A reference that does
/// not resolve is a form error, not a missing resource.
pub fn assert_appoint_refs(
    conn: &mut SqliteConnection,
    client_id: i32,
    procedure_id: i32,
    professional_id: i32,
) -> anyhow::Result<()> {
    as_validation(assert_client(conn, client_id), "client")?;
    as_validation(assert_procedure(conn, procedure_id), "procedure")?;
    as_validation(assert_professional(conn, professional_id), "professional")?;
    Ok(())
}

fn as_validation(res: anyhow::Result<()>, what: &str) -> anyhow::Result<()> {
    match res {
        Err(err)
            if matches!(
                err.downcast_ref::<ServiceError>(),
                Some(ServiceError::NotFound(_))
            ) =>
        {
            bail!(ServiceError::Validation(format!("Unknown {}", what)))
        }
        other => other,
    }
}

macro_rules! assert_unreferenced {
    ( $( ( $func_name:ident, $column:ident, $what:expr ) ),+ $(,)? ) => {
        $(
            /// Deleting a record that appointments still point to is a conflict.
            pub fn $func_name(conn: &mut SqliteConnection, id: i32) -> anyhow::Result<()> {
                use crate::schema::appointments;

                let res = appointments::table
                    .filter(appointments::$column.eq(id))
                    .count()
                    .get_result::<i64>(conn)
                    .context("DB error")?;

                if res > 0 {
                    bail!(ServiceError::Conflict(format!(
                        "{} is referenced by {} appointment(s)",
                        $what, res
                    )));
                }

                Ok(())
            }
        )+
    };
}

assert_unreferenced! {
    (assert_client_unreferenced, client_id, "Client"),
    (assert_procedure_unreferenced, procedure_id, "Procedure"),
    (assert_professional_unreferenced, professional_id, "Professional"),
}
