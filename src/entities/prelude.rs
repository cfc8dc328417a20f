pub use super::activity_logs::Entity as ActivityLogs;
pub use super::agreements::Entity as Agreements;
pub use super::enums::{Phase, Role};
pub use super::invoices::Entity as Invoices;
pub use super::users::Entity as Users;
