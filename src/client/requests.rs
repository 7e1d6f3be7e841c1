use serde::Deserialize;

#[derive(Deserialize)]
pub struct AddClientRequest {
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    pub birth_date: String,
}

#[derive(Deserialize)]
pub struct SearchClientRequest {
    pub name: Option<String>,
    pub first_index: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct ViewClientRequest {
    pub id: i32,
}

#[derive(Deserialize)]
pub struct ModifyClientRequest {
    pub id: i32,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub birth_date: Option<String>,
}

#[derive(Deserialize)]
pub struct DeleteClientRequest {
    pub id: i32,
}
