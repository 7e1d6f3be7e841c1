use crate::schema::procedures;

#[derive(Queryable, Identifiable, Clone, Debug)]
#[diesel(table_name = procedures)]
pub struct Procedure {
    pub id: i32,
    pub name: String,
    pub price: f64,
    pub description: Option<String>,
}

#[derive(Insertable)]
#[diesel(table_name = procedures)]
pub struct NewProcedure {
    pub name: String,
    pub price: f64,
    pub description: Option<String>,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = procedures)]
pub struct UpdateProcedure {
    pub name: Option<String>,
    pub price: Option<f64>,
    /// `Some(None)` clears the description.
    pub description: Option<Option<String>>,
}

impl UpdateProcedure {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.description.is_none()
    }
}
