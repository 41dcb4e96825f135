pub mod admins;
pub mod cart_items;
pub mod donations;
pub mod orders;
pub mod registrations;
pub mod users;
