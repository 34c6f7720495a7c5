pub mod addresses;
pub mod bank_accounts;
pub mod cart_items;
pub mod order_items;
pub mod orders;
pub mod payments;
pub mod products;
pub mod users;
