pub mod carts;
pub mod enums;
pub mod iam;
pub mod money;
pub mod orders;
pub mod payments;
pub mod users;
