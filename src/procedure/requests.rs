use serde::Deserialize;

#[derive(Deserialize)]
pub struct AddProcedureRequest {
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct SearchProcedureRequest {
    pub name: Option<String>,
    pub first_index: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct ViewProcedureRequest {
    pub id: i32,
}

#[derive(Deserialize)]
pub struct ModifyProcedureRequest {
    pub id: i32,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct DeleteProcedureRequest {
    pub id: i32,
}
