pub mod accounts;
pub mod admin;
pub mod cart;
pub mod donations;
pub mod orders;
pub mod registrations;
pub mod webhook;
