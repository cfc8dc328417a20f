pub mod analytics;
pub mod auth_service;
pub mod auth_service_impl;
pub mod document_service;
pub mod document_service_impl;

pub use analytics::AnalyticsService;
pub use auth_service::{AuthError, AuthService, Identity};
pub use auth_service_impl::SeaOrmAuthService;
pub use document_service::{DocumentError, DocumentInput, DocumentService, GeneratedDocuments};
pub use document_service_impl::SeaOrmDocumentService;
