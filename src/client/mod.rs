mod requests;
mod responses;

use crate::{
    database::{assert, get_db_conn},
    error::ServiceError,
    models::clients::{Client, NewClient, UpdateClient},
    notification::{EventKind, MailContext},
    protocol::{AddResponse, SimpleResponse},
    utils::{assert_not_empty, get_page, get_str_pattern_opt, parse_date_str, LIKE_ESCAPE},
    AppState,
};
use actix_web::web;
use anyhow::{self, bail, Context};
use diesel::prelude::*;

use self::{requests::*, responses::*};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(add)
        .service(search)
        .service(view)
        .service(modify)
        .service(delete);
}

crate::post_funcs! {
    (add, "/add", AddClientRequest, AddResponse),
    (search, "/search", SearchClientRequest, SearchClientResponse),
    (view, "/view", ViewClientRequest, ViewClientResponse),
    (modify, "/modify", ModifyClientRequest, SimpleResponse),
    (delete, "/delete", DeleteClientRequest, SimpleResponse),
}

async fn add_impl(
    state: web::Data<AppState>,
    info: web::Json<AddClientRequest>,
) -> anyhow::Result<AddResponse> {
    use crate::schema::clients;

    let info = info.into_inner();
    assert_not_empty("Name", &info.name)?;
    let data = NewClient {
        name: info.name.trim().to_string(),
        phone: info.phone,
        email: info.email.trim().to_string(),
        birth_date: parse_date_str(&info.birth_date)?,
    };

    let id = web::block(move || -> anyhow::Result<i32> {
        let mut conn = get_db_conn(&state.pool)?;
        let client = diesel::insert_into(clients::table)
            .values(data)
            .get_result::<Client>(&mut conn)
            .context("DB error")?;
        log::info!("client {} registered", client.id);

        let ctx = MailContext::for_client(&client);
        state
            .notifier
            .notify_client(&mut conn, EventKind::RegistrationConfirmation, &ctx);
        state
            .notifier
            .notify_clinic(&mut conn, EventKind::NewRegistration, &ctx);

        Ok(client.id)
    })
    .await
    .context("DB error")??;

    Ok(AddResponse::ok(id))
}

async fn search_impl(
    state: web::Data<AppState>,
    info: web::Json<SearchClientRequest>,
) -> anyhow::Result<SearchClientResponse> {
    use crate::schema::clients;

    let info = info.into_inner();
    let (first_index, limit) = get_page(info.first_index, info.limit);
    let name_pattern = get_str_pattern_opt(info.name);

    let clients = web::block(move || {
        let mut conn = get_db_conn(&state.pool)?;
        clients::table
            .filter(clients::name.like(name_pattern).escape(LIKE_ESCAPE))
            .order(clients::name.asc())
            .offset(first_index)
            .limit(limit)
            .get_results::<Client>(&mut conn)
            .context("DB error")
    })
    .await
    .context("DB error")??;

    Ok(SearchClientResponse {
        success: true,
        err: "".to_string(),
        clients: clients.into_iter().map(ClientItem::from).collect(),
    })
}

async fn view_impl(
    state: web::Data<AppState>,
    info: web::Json<ViewClientRequest>,
) -> anyhow::Result<ViewClientResponse> {
    use crate::schema::clients;

    let id = info.into_inner().id;
    let client = web::block(move || {
        let mut conn = get_db_conn(&state.pool)?;
        clients::table
            .find(id)
            .get_result::<Client>(&mut conn)
            .optional()
            .context("DB error")
    })
    .await
    .context("DB error")??;

    let client = match client {
        Some(client) => client,
        None => bail!(ServiceError::NotFound("client")),
    };

    Ok(ViewClientResponse {
        success: true,
        err: "".to_string(),
        client: client.into(),
    })
}

async fn modify_impl(
    state: web::Data<AppState>,
    info: web::Json<ModifyClientRequest>,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::clients;

    let info = info.into_inner();
    if let Some(name) = &info.name {
        assert_not_empty("Name", name)?;
    }
    let id = info.id;
    let data = UpdateClient {
        name: info.name.map(|name| name.trim().to_string()),
        phone: info.phone,
        email: info.email.map(|email| email.trim().to_string()),
        birth_date: info.birth_date.map(parse_date_str).transpose()?,
    };

    web::block(move || {
        let mut conn = get_db_conn(&state.pool)?;
        conn.immediate_transaction(|conn| {
            assert::assert_client(conn, id)?;
            if !data.is_empty() {
                diesel::update(clients::table.find(id))
                    .set(&data)
                    .execute(conn)
                    .context("DB error")?;
            }
            Ok::<_, anyhow::Error>(())
        })
    })
    .await
    .context("DB error")??;

    log::info!("client {} modified", id);
    Ok(SimpleResponse::ok())
}

async fn delete_impl(
    state: web::Data<AppState>,
    info: web::Json<DeleteClientRequest>,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::clients;

    let id = info.into_inner().id;
    web::block(move || {
        let mut conn = get_db_conn(&state.pool)?;
        conn.immediate_transaction(|conn| {
            assert::assert_client(conn, id)?;
            assert::assert_client_unreferenced(conn, id)?;
            diesel::delete(clients::table.find(id))
                .execute(conn)
                .context("DB error")?;
            Ok::<_, anyhow::Error>(())
        })
    })
    .await
    .context("DB error")??;

    log::info!("client {} deleted", id);
    Ok(SimpleResponse::ok())
}
