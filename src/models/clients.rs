use crate::schema::clients;
use chrono::NaiveDate;

#[derive(Queryable, Identifiable, Clone, Debug)]
#[diesel(table_name = clients)]
pub struct Client {
    pub id: i32,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub birth_date: NaiveDate,
}

#[derive(Insertable)]
#[diesel(table_name = clients)]
pub struct NewClient {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub birth_date: NaiveDate,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = clients)]
pub struct UpdateClient {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

impl UpdateClient {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone.is_none()
            && self.email.is_none()
            && self.birth_date.is_none()
    }
}
