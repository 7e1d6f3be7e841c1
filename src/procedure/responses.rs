use serde::Serialize;

use crate::models::procedures::Procedure;

#[derive(Default, Serialize)]
pub struct ProcedureItem {
    pub id: i32,
    pub name: String,
    pub price: f64,
    pub description: String,
}

impl From<Procedure> for ProcedureItem {
    fn from(procedure: Procedure) -> Self {
        Self {
            id: procedure.id,
            name: procedure.name,
            price: procedure.price,
            description: procedure.description.unwrap_or_default(),
        }
    }
}

#[derive(Default, Serialize)]
pub struct ViewProcedureResponse {
    pub success: bool,
    pub err: String,
    pub procedure: ProcedureItem,
}

#[derive(Default, Serialize)]
pub struct SearchProcedureResponse {
    pub success: bool,
    pub err: String,
    pub procedures: Vec<ProcedureItem>,
}

crate::impl_err_response! {
    ViewProcedureResponse,
    SearchProcedureResponse,
}
