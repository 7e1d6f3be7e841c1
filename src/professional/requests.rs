use serde::Deserialize;

#[derive(Deserialize)]
pub struct AddProfessionalRequest {
    pub name: String,
    #[serde(default)]
    pub national_id: String,
    #[serde(default)]
    pub license_number: String,
    #[serde(default)]
    pub license_type: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub specialty: String,
}

#[derive(Deserialize)]
pub struct SearchProfessionalRequest {
    pub name: Option<String>,
    pub specialty: Option<String>,
    pub first_index: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct ViewProfessionalRequest {
    pub id: i32,
}

#[derive(Deserialize)]
pub struct ModifyProfessionalRequest {
    pub id: i32,
    pub name: Option<String>,
    pub national_id: Option<String>,
    pub license_number: Option<String>,
    pub license_type: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub specialty: Option<String>,
}

#[derive(Deserialize)]
pub struct DeleteProfessionalRequest {
    pub id: i32,
}
