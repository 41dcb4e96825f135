pub mod accounts;
pub mod admin_reports;
pub mod cart;
pub mod catalog;
pub mod cpf;
pub mod dates;
pub mod donations;
pub mod enums;
pub mod money;
pub mod orders;
pub mod payments;
pub mod registrations;
