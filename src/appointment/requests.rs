use serde::Deserialize;

#[derive(Deserialize)]
pub struct SubmitAppointRequest {
    #[serde(default)]
    pub id: Option<i32>,
    pub client_id: i32,
    pub procedure_id: i32,
    pub professional_id: i32,
    pub consultation_type: String,
    #[serde(default)]
    pub description: String,
    pub date: String,
    pub time: String,
}

#[derive(Deserialize)]
pub struct ChangeStatusRequest {
    pub id: i32,
    pub action: String,
}

#[derive(Deserialize)]
pub struct ViewAppointRequest {
    pub id: i32,
}

#[derive(Deserialize)]
pub struct SearchAppointRequest {
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub client_name: Option<String>,
    pub first_index: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct DeleteAppointRequest {
    pub id: i32,
}
