mod requests;
mod responses;

use crate::{
    database::{assert, get_db_conn},
    error::ServiceError,
    models::procedures::{NewProcedure, Procedure, UpdateProcedure},
    protocol::{AddResponse, SimpleResponse},
    utils::{assert_not_empty, assert_price, get_page, get_str_pattern_opt, LIKE_ESCAPE},
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
    (add, "/add", AddProcedureRequest, AddResponse),
    (search, "/search", SearchProcedureRequest, SearchProcedureResponse),
    (view, "/view", ViewProcedureRequest, ViewProcedureResponse),
    (modify, "/modify", ModifyProcedureRequest, SimpleResponse),
    (delete, "/delete", DeleteProcedureRequest, SimpleResponse),
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|description| description.trim().to_string())
        .filter(|description| !description.is_empty())
}

async fn add_impl(
    state: web::Data<AppState>,
    info: web::Json<AddProcedureRequest>,
) -> anyhow::Result<AddResponse> {
    use crate::schema::procedures;

    let info = info.into_inner();
    assert_not_empty("Name", &info.name)?;
    assert_price(info.price)?;
    let data = NewProcedure {
        name: info.name.trim().to_string(),
        price: info.price,
        description: normalize_description(info.description),
    };

    let id = web::block(move || {
        let mut conn = get_db_conn(&state.pool)?;
        diesel::insert_into(procedures::table)
            .values(data)
            .returning(procedures::id)
            .get_result::<i32>(&mut conn)
            .context("DB error")
    })
    .await
    .context("DB error")??;

    log::info!("procedure {} added", id);
    Ok(AddResponse::ok(id))
}

async fn search_impl(
    state: web::Data<AppState>,
    info: web::Json<SearchProcedureRequest>,
) -> anyhow::Result<SearchProcedureResponse> {
    use crate::schema::procedures;

    let info = info.into_inner();
    let (first_index, limit) = get_page(info.first_index, info.limit);
    let name_pattern = get_str_pattern_opt(info.name);

    let procedures = web::block(move || {
        let mut conn = get_db_conn(&state.pool)?;
        procedures::table
            .filter(procedures::name.like(name_pattern).escape(LIKE_ESCAPE))
            .order(procedures::name.asc())
            .offset(first_index)
            .limit(limit)
            .get_results::<Procedure>(&mut conn)
            .context("DB error")
    })
    .await
    .context("DB error")??;

    Ok(SearchProcedureResponse {
        success: true,
        err: "".to_string(),
        procedures: procedures.into_iter().map(ProcedureItem::from).collect(),
    })
}

async fn view_impl(
    state: web::Data<AppState>,
    info: web::Json<ViewProcedureRequest>,
) -> anyhow::Result<ViewProcedureResponse> {
    use crate::schema::procedures;

    let id = info.into_inner().id;
    let procedure = web::block(move || {
        let mut conn = get_db_conn(&state.pool)?;
        procedures::table
            .find(id)
            .get_result::<Procedure>(&mut conn)
            .optional()
            .context("DB error")
    })
    .await
    .context("DB error")??;

    let procedure = match procedure {
        Some(procedure) => procedure,
        None => bail!(ServiceError::NotFound("procedure")),
    };

    Ok(ViewProcedureResponse {
        success: true,
        err: "".to_string(),
        procedure: procedure.into(),
    })
}

async fn modify_impl(
    state: web::Data<AppState>,
    info: web::Json<ModifyProcedureRequest>,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::procedures;

    let info = info.into_inner();
    if let Some(name) = &info.name {
        assert_not_empty("Name", name)?;
    }
    if let Some(price) = info.price {
        assert_price(price)?;
    }
    let id = info.id;
    let data = UpdateProcedure {
        name: info.name.map(|name| name.trim().to_string()),
        price: info.price,
        description: info
            .description
            .map(|description| normalize_description(Some(description))),
    };

    web::block(move || {
        let mut conn = get_db_conn(&state.pool)?;
        conn.immediate_transaction(|conn| {
            assert::assert_procedure(conn, id)?;
            if !data.is_empty() {
                diesel::update(procedures::table.find(id))
                    .set(&data)
                    .execute(conn)
                    .context("DB error")?;
            }
            Ok::<_, anyhow::Error>(())
        })
    })
    .await
    .context("DB error")??;

    log::info!("procedure {} modified", id);
    Ok(SimpleResponse::ok())
}

async fn delete_impl(
    state: web::Data<AppState>,
    info: web::Json<DeleteProcedureRequest>,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::procedures;

    let id = info.into_inner().id;
    web::block(move || {
        let mut conn = get_db_conn(&state.pool)?;
        conn.immediate_transaction(|conn| {
            assert::assert_procedure(conn, id)?;
            assert::assert_procedure_unreferenced(conn, id)?;
            diesel::delete(procedures::table.find(id))
                .execute(conn)
                .context("DB error")?;
            Ok::<_, anyhow::Error>(())
        })
    })
    .await
    .context("DB error")??;

    log::info!("procedure {} deleted", id);
    Ok(SimpleResponse::ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        appointment::workflow::{self, testing::*},
        database::testing::TestDb,
        notification::testing::{accepting_mailer, notifier},
    };
    use actix_web::{http::StatusCode, test as actix_test, App};
    use serde_json::{json, Value};

    fn state(db: &TestDb) -> web::Data<AppState> {
        web::Data::new(AppState {
            pool: db.pool.clone(),
            notifier: notifier(accepting_mailer()),
        })
    }

    macro_rules! post {
        ($app:expr, $uri:expr, $body:expr $(,)?) => {{
            let req = actix_test::TestRequest::post().uri($uri).set_json($body).to_request();
            let resp = actix_test::call_service($app, req).await;
            let status = resp.status();
            let body: Value = actix_test::read_body_json(resp).await;
            (status, body)
        }};
    }

    #[test]
    fn blank_description_is_stored_as_null() {
        assert_eq!(normalize_description(Some("  ".to_string())), None);
        assert_eq!(normalize_description(None), None);
        assert_eq!(
            normalize_description(Some(" Deep cleansing ".to_string())),
            Some("Deep cleansing".to_string())
        );
    }

    #[actix_web::test]
    async fn add_validates_price() {
        let db = TestDb::new();
        let app = actix_test::init_service(
            App::new()
                .app_data(state(&db))
                .service(web::scope("/procedure").configure(config)),
        )
        .await;

        let (status, body) = post!(
            &app,
            "/procedure/add",
            json!({ "name": "Botox", "price": -10.0 }),
        );
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["err"].as_str().unwrap().contains("Price"));

        let (status, body) = post!(
            &app,
            "/procedure/add",
            json!({ "name": "Botox", "price": 950.0, "description": "Forehead" }),
        );
        assert_eq!(status, StatusCode::OK);
        let id = body["id"].as_i64().unwrap();

        let (status, _) = post!(
            &app,
            "/procedure/modify",
            json!({ "id": id, "price": 990.5 }),
        );
        assert_eq!(status, StatusCode::OK);
        let (_, body) = post!(&app, "/procedure/view", json!({ "id": id }));
        assert_eq!(body["procedure"]["price"], 990.5);
        assert_eq!(body["procedure"]["description"], "Forehead");

        let (status, _) = post!(
            &app,
            "/procedure/modify",
            json!({ "id": id, "description": "   " }),
        );
        assert_eq!(status, StatusCode::OK);
        let stored = {
            use crate::schema::procedures;

            procedures::table
                .find(id as i32)
                .select(procedures::description)
                .first::<Option<String>>(&mut db.conn())
                .unwrap()
        };
        assert_eq!(stored, None);

        let (_, body) = post!(&app, "/procedure/search", json!({ "name": "bot" }));
        assert_eq!(body["procedures"].as_array().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn delete_referenced_procedure_conflicts() {
        let db = TestDb::new();
        let refs = seed(&mut db.conn());
        let appointment = workflow::submit(
            &mut db.conn(),
            &notifier(accepting_mailer()),
            form(&refs, "2024-03-10", "15:00"),
        )
        .unwrap();
        let app = actix_test::init_service(
            App::new()
                .app_data(state(&db))
                .service(web::scope("/procedure").configure(config)),
        )
        .await;

        let (status, _) = post!(
            &app,
            "/procedure/delete",
            json!({ "id": refs.procedure_id }),
        );
        assert_eq!(status, StatusCode::CONFLICT);

        workflow::delete(&mut db.conn(), appointment.id).unwrap();
        let (status, _) = post!(
            &app,
            "/procedure/delete",
            json!({ "id": refs.procedure_id }),
        );
        assert_eq!(status, StatusCode::OK);
    }
}
