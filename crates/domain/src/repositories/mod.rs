pub mod carts;
pub mod orders;
pub mod payments;
pub mod products;
pub mod profiles;
pub mod users;
