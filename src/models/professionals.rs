use crate::schema::professionals;

#[derive(Queryable, Identifiable, Clone, Debug)]
#[diesel(table_name = professionals)]
pub struct Professional {
    pub id: i32,
    pub name: String,
    pub national_id: String,
    pub license_number: String,
    pub license_type: String,
    pub email: String,
    pub phone: String,
    pub specialty: String,
}

#[derive(Insertable)]
#[diesel(table_name = professionals)]
pub struct NewProfessional {
    pub name: String,
    pub national_id: String,
    pub license_number: String,
    pub license_type: String,
    pub email: String,
    pub phone: String,
    pub specialty: String,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = professionals)]
pub struct UpdateProfessional {
    pub name: Option<String>,
    pub national_id: Option<String>,
    pub license_number: Option<String>,
    pub license_type: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub specialty: Option<String>,
}

impl UpdateProfessional {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.national_id.is_none()
            && self.license_number.is_none()
            && self.license_type.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.specialty.is_none()
    }
}
