mod requests;
mod responses;

use crate::{
    database::{assert, get_db_conn},
    error::ServiceError,
    models::professionals::{NewProfessional, Professional, UpdateProfessional},
    protocol::{AddResponse, SimpleResponse},
    utils::{assert_not_empty, get_page, get_str_pattern_opt, LIKE_ESCAPE},
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
    (add, "/add", AddProfessionalRequest, AddResponse),
    (search, "/search", SearchProfessionalRequest, SearchProfessionalResponse),
    (view, "/view", ViewProfessionalRequest, ViewProfessionalResponse),
    (modify, "/modify", ModifyProfessionalRequest, SimpleResponse),
    (delete, "/delete", DeleteProfessionalRequest, SimpleResponse),
}

async fn add_impl(
    state: web::Data<AppState>,
    info: web::Json<AddProfessionalRequest>,
) -> anyhow::Result<AddResponse> {
    use crate::schema::professionals;

    let info = info.into_inner();
    assert_not_empty("Name", &info.name)?;
    let data = NewProfessional {
        name: info.name.trim().to_string(),
        national_id: info.national_id,
        license_number: info.license_number,
        license_type: info.license_type,
        email: info.email.trim().to_string(),
        phone: info.phone,
        specialty: info.specialty,
    };

    let id = web::block(move || {
        let mut conn = get_db_conn(&state.pool)?;
        diesel::insert_into(professionals::table)
            .values(data)
            .returning(professionals::id)
            .get_result::<i32>(&mut conn)
            .context("DB error")
    })
    .await
    .context("DB error")??;

    log::info!("professional {} added", id);
    Ok(AddResponse::ok(id))
}

async fn search_impl(
    state: web::Data<AppState>,
    info: web::Json<SearchProfessionalRequest>,
) -> anyhow::Result<SearchProfessionalResponse> {
    use crate::schema::professionals;

    let info = info.into_inner();
    let (first_index, limit) = get_page(info.first_index, info.limit);
    let name_pattern = get_str_pattern_opt(info.name);
    let specialty_pattern = get_str_pattern_opt(info.specialty);

    let professionals = web::block(move || {
        let mut conn = get_db_conn(&state.pool)?;
        professionals::table
            .filter(professionals::name.like(name_pattern).escape(LIKE_ESCAPE))
            .filter(professionals::specialty.like(specialty_pattern).escape(LIKE_ESCAPE))
            .order(professionals::name.asc())
            .offset(first_index)
            .limit(limit)
            .get_results::<Professional>(&mut conn)
            .context("DB error")
    })
    .await
    .context("DB error")??;

    Ok(SearchProfessionalResponse {
        success: true,
        err: "".to_string(),
        professionals: professionals
            .into_iter()
            .map(ProfessionalItem::from)
            .collect(),
    })
}

async fn view_impl(
    state: web::Data<AppState>,
    info: web::Json<ViewProfessionalRequest>,
) -> anyhow::Result<ViewProfessionalResponse> {
    use crate::schema::professionals;

    let id = info.into_inner().id;
    let professional = web::block(move || {
        let mut conn = get_db_conn(&state.pool)?;
        professionals::table
            .find(id)
            .get_result::<Professional>(&mut conn)
            .optional()
            .context("DB error")
    })
    .await
    .context("DB error")??;

    let professional = match professional {
        Some(professional) => professional,
        None => bail!(ServiceError::NotFound("professional")),
    };

    Ok(ViewProfessionalResponse {
        success: true,
        err: "".to_string(),
        professional: professional.into(),
    })
}

async fn modify_impl(
    state: web::Data<AppState>,
    info: web::Json<ModifyProfessionalRequest>,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::professionals;

    let info = info.into_inner();
    if let Some(name) = &info.name {
        assert_not_empty("Name", name)?;
    }
    let id = info.id;
    let data = UpdateProfessional {
        name: info.name.map(|name| name.trim().to_string()),
        national_id: info.national_id,
        license_number: info.license_number,
        license_type: info.license_type,
        email: info.email.map(|email| email.trim().to_string()),
        phone: info.phone,
        specialty: info.specialty,
    };

    web::block(move || {
        let mut conn = get_db_conn(&state.pool)?;
        conn.immediate_transaction(|conn| {
            assert::assert_professional(conn, id)?;
            if !data.is_empty() {
                diesel::update(professionals::table.find(id))
                    .set(&data)
                    .execute(conn)
                    .context("DB error")?;
            }
            Ok::<_, anyhow::Error>(())
        })
    })
    .await
    .context("DB error")??;

    log::info!("professional {} modified", id);
    Ok(SimpleResponse::ok())
}

async fn delete_impl(
    state: web::Data<AppState>,
    info: web::Json<DeleteProfessionalRequest>,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::professionals;

    let id = info.into_inner().id;
    web::block(move || {
        let mut conn = get_db_conn(&state.pool)?;
        conn.immediate_transaction(|conn| {
            assert::assert_professional(conn, id)?;
            assert::assert_professional_unreferenced(conn, id)?;
            diesel::delete(professionals::table.find(id))
                .execute(conn)
                .context("DB error")?;
            Ok::<_, anyhow::Error>(())
        })
    })
    .await
    .context("DB error")??;

    log::info!("professional {} deleted", id);
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
    use actix_web::{http::StatusCode, test, App};
    use serde_json::{json, Value};

    fn state(db: &TestDb) -> web::Data<AppState> {
        web::Data::new(AppState {
            pool: db.pool.clone(),
            notifier: notifier(accepting_mailer()),
        })
    }

    macro_rules! post {
        ($app:expr, $uri:expr, $body:expr $(,)?) => {{
            let req = test::TestRequest::post().uri($uri).set_json($body).to_request();
            let resp = test::call_service($app, req).await;
            let status = resp.status();
            let body: Value = test::read_body_json(resp).await;
            (status, body)
        }};
    }

    #[actix_web::test]
    async fn add_search_modify() {
        let db = TestDb::new();
        let app = test::init_service(
            App::new()
                .app_data(state(&db))
                .service(web::scope("/professional").configure(config)),
        )
        .await;

        let (status, body) = post!(
            &app,
            "/professional/add",
            json!({
                "name": "Dra. Paula Reis",
                "national_id": "123.456.789-00",
                "license_number": "CRM 4455",
                "license_type": "CRM",
                "email": "paula@aura.test",
                "specialty": "Dermatology",
            }),
        );
        assert_eq!(status, StatusCode::OK);
        let id = body["id"].as_i64().unwrap();
        post!(
            &app,
            "/professional/add",
            json!({ "name": "Rafael Dias", "specialty": "Massage" }),
        );

        let (_, body) = post!(
            &app,
            "/professional/search",
            json!({ "specialty": "Derma" }),
        );
        let found = body["professionals"].as_array().unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["license_number"], "CRM 4455");

        let (status, _) = post!(
            &app,
            "/professional/modify",
            json!({ "id": id, "specialty": "Aesthetics" }),
        );
        assert_eq!(status, StatusCode::OK);
        let (_, body) = post!(&app, "/professional/view", json!({ "id": id }));
        assert_eq!(body["professional"]["specialty"], "Aesthetics");
        assert_eq!(body["professional"]["name"], "Dra. Paula Reis");

        let (status, _) = post!(&app, "/professional/add", json!({ "name": "" }));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = post!(&app, "/professional/view", json!({ "id": 99 }));
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn delete_referenced_professional_conflicts() {
        let db = TestDb::new();
        let refs = seed(&mut db.conn());
        workflow::submit(
            &mut db.conn(),
            &notifier(accepting_mailer()),
            form(&refs, "2024-03-10", "15:00"),
        )
        .unwrap();
        let app = test::init_service(
            App::new()
                .app_data(state(&db))
                .service(web::scope("/professional").configure(config)),
        )
        .await;

        let (status, body) = post!(
            &app,
            "/professional/delete",
            json!({ "id": refs.professional_id }),
        );
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["err"].as_str().unwrap().contains("referenced"));

        let (status, _) = post!(&app, "/professional/delete", json!({ "id": 99 }));
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
