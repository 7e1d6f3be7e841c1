use serde::Serialize;

use crate::models::professionals::Professional;

#[derive(Default, Serialize)]
pub struct ProfessionalItem {
    pub id: i32,
    pub name: String,
    pub national_id: String,
    pub license_number: String,
    pub license_type: String,
    pub email: String,
    pub phone: String,
    pub specialty: String,
}

impl From<Professional> for ProfessionalItem {
    fn from(professional: Professional) -> Self {
        Self {
            id: professional.id,
            name: professional.name,
            national_id: professional.national_id,
            license_number: professional.license_number,
            license_type: professional.license_type,
            email: professional.email,
            phone: professional.phone,
            specialty: professional.specialty,
        }
    }
}

#[derive(Default, Serialize)]
pub struct ViewProfessionalResponse {
    pub success: bool,
    pub err: String,
    pub professional: ProfessionalItem,
}

#[derive(Default, Serialize)]
pub struct SearchProfessionalResponse {
    pub success: bool,
    pub err: String,
    pub professionals: Vec<ProfessionalItem>,
}

crate::impl_err_response! {
    ViewProfessionalResponse,
    SearchProfessionalResponse,
}
