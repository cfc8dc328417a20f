pub mod prelude;

pub mod activity_logs;
pub mod agreements;
pub mod enums;
pub mod invoices;
pub mod users;
