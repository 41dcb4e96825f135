pub mod admins;
pub mod cart;
pub mod donations;
pub mod orders;
pub mod registrations;
pub mod users;
