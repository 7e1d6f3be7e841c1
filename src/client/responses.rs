use serde::Serialize;

use crate::{models::clients::Client, utils::format_date_str};

#[derive(Default, Serialize)]
pub struct ClientItem {
    pub id: i32,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub birth_date: String,
}

impl From<Client> for ClientItem {
    fn from(client: Client) -> Self {
        Self {
            id: client.id,
            name: client.name,
            phone: client.phone,
            email: client.email,
            birth_date: format_date_str(&client.birth_date),
        }
    }
}

#[derive(Default, Serialize)]
pub struct ViewClientResponse {
    pub success: bool,
    pub err: String,
    pub client: ClientItem,
}

#[derive(Default, Serialize)]
pub struct SearchClientResponse {
    pub success: bool,
    pub err: String,
    pub clients: Vec<ClientItem>,
}

crate::impl_err_response! {
    ViewClientResponse,
    SearchClientResponse,
}
