use serde::{Deserialize, Serialize};

use crate::value_objects::enums::user_roles::Role;

/// Authenticated caller, decoded from a verified bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i32,
    pub email: String,
    pub role: Role,
}

impl Identity {
    pub fn is_seller(&self) -> bool {
        self.role == Role::Seller
    }
}
