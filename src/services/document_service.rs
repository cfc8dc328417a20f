//! Domain service for invoice/agreement generation and history.
//!
//! Reference numbers are sequential within a period: month (`MM/YY`) for
//! invoices, year (`YYYY`) for agreements. The next number is the maximum
//! existing numeric suffix within the period plus one, never the row count, so
//! gaps from failed writes do not cause reuse.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::REF_SEQUENCE_WIDTH;
use crate::entities::{agreements, enums::Phase, invoices};
use crate::services::auth_service::Identity;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for DocumentError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for DocumentError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// User-entered fields of a generation request. Phase and amount are derived
/// server-side from capacity.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentInput {
    pub customer_name: String,
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub consumer_no: String,
    #[serde(default)]
    pub subdivision: String,
    pub capacity: f64,
}

/// Result of one generation: the paired references and the derived fields.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedDocuments {
    pub invoice_ref: String,
    pub agreement_no: String,
    pub phase: Phase,
    pub amount: f64,
}

/// One page of history plus the exact total matching count.
#[derive(Debug, Serialize)]
pub struct HistoryPage<T> {
    pub data: Vec<T>,
    pub total_count: u64,
}

/// Count and amount sum of a page slice, shown under the history table.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PageTotals {
    pub count: usize,
    pub total_amount: f64,
}

/// Domain service trait for document generation and history.
#[async_trait::async_trait]
pub trait DocumentService: Send + Sync {
    /// Next invoice reference for the current month, without consuming it.
    async fn next_invoice_ref(&self) -> Result<String, DocumentError>;

    /// Next agreement number for the current year, without consuming it.
    async fn next_agreement_no(&self) -> Result<String, DocumentError>;

    /// Allocates both references and persists the invoice/agreement pair,
    /// tagged with the caller's username. Allocation and write run under one
    /// lock so concurrent generations cannot take the same number.
    async fn generate(
        &self,
        identity: &Identity,
        input: DocumentInput,
    ) -> Result<GeneratedDocuments, DocumentError>;

    /// Paginated invoice history. Staff see only their own rows; admins see
    /// everything. `page` is 1-based.
    async fn fetch_invoices(
        &self,
        identity: &Identity,
        search: Option<&str>,
        page: u64,
    ) -> Result<HistoryPage<invoices::Model>, DocumentError>;

    /// Paginated agreement history, same scoping as invoices.
    async fn fetch_agreements(
        &self,
        identity: &Identity,
        search: Option<&str>,
        page: u64,
    ) -> Result<HistoryPage<agreements::Model>, DocumentError>;
}

/// Period key embedded in invoice references: `MM/YY`.
#[must_use]
pub fn invoice_period_key(now: &DateTime<Utc>) -> String {
    now.format("%m/%y").to_string()
}

/// Period key embedded in agreement numbers: `YYYY`.
#[must_use]
pub fn agreement_period_key(now: &DateTime<Utc>) -> String {
    now.format("%Y").to_string()
}

/// Trailing numeric segment of a reference, or `None` when it does not parse.
#[must_use]
pub fn parse_ref_sequence(reference: &str) -> Option<u32> {
    reference.rsplit('/').next()?.parse().ok()
}

/// Next sequence number given the existing references of a period: the
/// maximum parsed suffix plus one, or 1 when none parse. Non-numeric suffixes
/// are skipped, not errors.
#[must_use]
pub fn next_sequence(existing: &[String]) -> u32 {
    existing
        .iter()
        .filter_map(|r| {
            let parsed = parse_ref_sequence(r);
            if parsed.is_none() {
                tracing::debug!("Skipping reference with non-numeric suffix: {r}");
            }
            parsed
        })
        .max()
        .map_or(1, |max| max + 1)
}

/// `<prefix>/<period>/<NNNN>` with the sequence zero-padded to width 4.
#[must_use]
pub fn format_reference(prefix: &str, period: &str, sequence: u32) -> String {
    format!("{prefix}/{period}/{sequence:0width$}", width = REF_SEQUENCE_WIDTH)
}

/// Page-slice totals for invoice history.
#[must_use]
pub fn calculate_invoice_totals(invoices: &[invoices::Model]) -> PageTotals {
    PageTotals {
        count: invoices.len(),
        total_amount: invoices.iter().map(|i| i.amount).sum(),
    }
}

/// Page-slice totals for agreement history.
#[must_use]
pub fn calculate_agreement_totals(agreements: &[agreements::Model]) -> PageTotals {
    PageTotals {
        count: agreements.len(),
        total_amount: agreements.iter().map(|a| a.amount).sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn period_keys_use_month_and_year() {
        let now = Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap();
        assert_eq!(invoice_period_key(&now), "01/25");
        assert_eq!(agreement_period_key(&now), "2025");
    }

    #[test]
    fn parse_takes_trailing_segment() {
        assert_eq!(parse_ref_sequence("BE/KNG/PMSG/QTN/01/25/0003"), Some(3));
        assert_eq!(parse_ref_sequence("AG/SG/APDCL/2025/0110"), Some(110));
        assert_eq!(parse_ref_sequence("BE/KNG/PMSG/QTN/01/25/draft"), None);
        assert_eq!(parse_ref_sequence(""), None);
    }

    #[test]
    fn next_sequence_uses_max_not_count() {
        let existing = vec![
            "BE/KNG/PMSG/QTN/01/25/0001".to_string(),
            "BE/KNG/PMSG/QTN/01/25/0003".to_string(),
        ];
        assert_eq!(next_sequence(&existing), 4);
    }

    #[test]
    fn next_sequence_starts_at_one_for_empty_period() {
        assert_eq!(next_sequence(&[]), 1);
    }

    #[test]
    fn next_sequence_skips_unparseable_rows() {
        let existing = vec![
            "BE/KNG/PMSG/QTN/01/25/0002".to_string(),
            "BE/KNG/PMSG/QTN/01/25/draft".to_string(),
        ];
        assert_eq!(next_sequence(&existing), 3);
    }

    #[test]
    fn references_are_zero_padded_to_four() {
        assert_eq!(
            format_reference("BE/KNG/PMSG/QTN", "01/25", 7),
            "BE/KNG/PMSG/QTN/01/25/0007"
        );
        assert_eq!(
            format_reference("AG/SG/APDCL", "2025", 1234),
            "AG/SG/APDCL/2025/1234"
        );
    }
}
