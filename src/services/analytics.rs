//! Dashboard aggregations: date-bounded fetches reduced in memory.
//!
//! Every reduction is a pure function over already-fetched rows so the shapes
//! are unit-testable without a database.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::db::Store;
use crate::entities::{activity_logs, enums::Phase, invoices};
use crate::services::document_service::DocumentError;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RevenueKpis {
    pub total_revenue: f64,
    pub total_invoices: u64,
    /// 0 when there are no invoices, else rounded to 2 decimals.
    pub avg_value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyRevenuePoint {
    pub day: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityPoint {
    pub day: String,
    pub events: u64,
}

pub struct AnalyticsService {
    store: Store,
}

impl AnalyticsService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn revenue_kpis(
        &self,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<RevenueKpis, DocumentError> {
        let invoices = self.invoices_in_range(start, end).await?;
        Ok(reduce_revenue_kpis(&invoices))
    }

    pub async fn daily_revenue(
        &self,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Vec<DailyRevenuePoint>, DocumentError> {
        let invoices = self.invoices_in_range(start, end).await?;
        Ok(reduce_daily_revenue(&invoices))
    }

    pub async fn capacity_distribution(
        &self,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<BTreeMap<String, u64>, DocumentError> {
        let invoices = self.invoices_in_range(start, end).await?;
        Ok(reduce_capacity_distribution(&invoices))
    }

    pub async fn phase_split(
        &self,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<BTreeMap<String, u64>, DocumentError> {
        let invoices = self.invoices_in_range(start, end).await?;
        Ok(reduce_phase_split(&invoices))
    }

    pub async fn staff_performance(
        &self,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<BTreeMap<String, f64>, DocumentError> {
        let invoices = self.invoices_in_range(start, end).await?;
        Ok(reduce_staff_performance(&invoices))
    }

    pub async fn activity_timeline(
        &self,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Vec<ActivityPoint>, DocumentError> {
        let (start, end) = normalize_bounds(start, end);
        let logs = self
            .store
            .activity_in_range(start.as_deref(), end.as_deref())
            .await?;
        Ok(reduce_activity_timeline(&logs))
    }

    async fn invoices_in_range(
        &self,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Vec<invoices::Model>, DocumentError> {
        let (start, end) = normalize_bounds(start, end);
        Ok(self
            .store
            .invoices_in_range(start.as_deref(), end.as_deref())
            .await?)
    }
}

/// Bounds are inclusive dates. Timestamps are RFC3339 strings, so a bare
/// `YYYY-MM-DD` upper bound would sort before every timestamp on that day;
/// widen it to end-of-day before the `lte` comparison.
fn normalize_bounds(
    start: Option<&str>,
    end: Option<&str>,
) -> (Option<String>, Option<String>) {
    let start = start.map(str::trim).filter(|s| !s.is_empty()).map(String::from);
    let end = end.map(str::trim).filter(|s| !s.is_empty()).map(|e| {
        if e.len() == 10 {
            format!("{e}T23:59:59.999")
        } else {
            e.to_string()
        }
    });
    (start, end)
}

fn day_of(created_at: &str) -> &str {
    created_at.get(..10).unwrap_or(created_at)
}

#[must_use]
pub fn reduce_revenue_kpis(invoices: &[invoices::Model]) -> RevenueKpis {
    let total_revenue: f64 = invoices.iter().map(|i| i.amount).sum();
    let total_invoices = invoices.len() as u64;
    let avg_value = if total_invoices == 0 {
        0.0
    } else {
        (total_revenue / total_invoices as f64 * 100.0).round() / 100.0
    };

    RevenueKpis {
        total_revenue,
        total_invoices,
        avg_value,
    }
}

#[must_use]
pub fn reduce_daily_revenue(invoices: &[invoices::Model]) -> Vec<DailyRevenuePoint> {
    let mut series: BTreeMap<String, f64> = BTreeMap::new();
    for invoice in invoices {
        *series.entry(day_of(&invoice.created_at).to_string()).or_default() += invoice.amount;
    }

    series
        .into_iter()
        .map(|(day, revenue)| DailyRevenuePoint { day, revenue })
        .collect()
}

#[must_use]
pub fn reduce_capacity_distribution(invoices: &[invoices::Model]) -> BTreeMap<String, u64> {
    let mut dist: BTreeMap<String, u64> = BTreeMap::new();
    for invoice in invoices {
        *dist.entry(format!("{}", invoice.capacity)).or_default() += 1;
    }
    dist
}

/// Both phase labels are always present, even at zero occurrences.
#[must_use]
pub fn reduce_phase_split(invoices: &[invoices::Model]) -> BTreeMap<String, u64> {
    let mut split: BTreeMap<String, u64> = BTreeMap::new();
    split.insert(Phase::Single.label().to_string(), 0);
    split.insert(Phase::Three.label().to_string(), 0);

    for invoice in invoices {
        *split.entry(invoice.phase.label().to_string()).or_default() += 1;
    }
    split
}

#[must_use]
pub fn reduce_staff_performance(invoices: &[invoices::Model]) -> BTreeMap<String, f64> {
    let mut perf: BTreeMap<String, f64> = BTreeMap::new();
    for invoice in invoices {
        *perf.entry(invoice.created_by.clone()).or_default() += invoice.amount;
    }
    perf
}

#[must_use]
pub fn reduce_activity_timeline(logs: &[activity_logs::Model]) -> Vec<ActivityPoint> {
    let mut timeline: BTreeMap<String, u64> = BTreeMap::new();
    for log in logs {
        *timeline.entry(day_of(&log.created_at).to_string()).or_default() += 1;
    }

    timeline
        .into_iter()
        .map(|(day, events)| ActivityPoint { day, events })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invoice(amount: f64, capacity: f64, created_by: &str, created_at: &str) -> invoices::Model {
        invoices::Model {
            id: 0,
            invoice_ref: String::new(),
            customer_name: "Test Customer".to_string(),
            phone: "555-0000".to_string(),
            address: String::new(),
            consumer_no: String::new(),
            subdivision: String::new(),
            capacity,
            phase: Phase::from_capacity(capacity),
            amount,
            created_by: created_by.to_string(),
            created_at: created_at.to_string(),
        }
    }

    #[test]
    fn kpis_for_empty_range_are_zero() {
        let kpis = reduce_revenue_kpis(&[]);
        assert_eq!(kpis.total_revenue, 0.0);
        assert_eq!(kpis.total_invoices, 0);
        assert_eq!(kpis.avg_value, 0.0);
    }

    #[test]
    fn average_is_rounded_to_two_decimals() {
        let invoices = vec![
            invoice(100.0, 3.0, "a", "2025-01-01T10:00:00+00:00"),
            invoice(101.0, 3.0, "a", "2025-01-01T11:00:00+00:00"),
            invoice(101.0, 3.0, "a", "2025-01-02T09:00:00+00:00"),
        ];
        let kpis = reduce_revenue_kpis(&invoices);
        assert_eq!(kpis.total_revenue, 302.0);
        assert_eq!(kpis.avg_value, 100.67);
    }

    #[test]
    fn daily_revenue_groups_by_day_ascending() {
        let invoices = vec![
            invoice(200.0, 3.0, "a", "2025-01-02T09:00:00+00:00"),
            invoice(100.0, 3.0, "a", "2025-01-01T10:00:00+00:00"),
            invoice(50.0, 3.0, "b", "2025-01-01T18:00:00+00:00"),
        ];
        let series = reduce_daily_revenue(&invoices);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].day, "2025-01-01");
        assert_eq!(series[0].revenue, 150.0);
        assert_eq!(series[1].day, "2025-01-02");
        assert_eq!(series[1].revenue, 200.0);
    }

    #[test]
    fn capacity_keys_drop_trailing_zero() {
        let invoices = vec![
            invoice(1.0, 3.0, "a", "2025-01-01T10:00:00+00:00"),
            invoice(1.0, 4.5, "a", "2025-01-01T10:00:00+00:00"),
            invoice(1.0, 3.0, "a", "2025-01-01T10:00:00+00:00"),
        ];
        let dist = reduce_capacity_distribution(&invoices);
        assert_eq!(dist.get("3"), Some(&2));
        assert_eq!(dist.get("4.5"), Some(&1));
    }

    #[test]
    fn phase_split_always_has_both_labels() {
        let split = reduce_phase_split(&[]);
        assert_eq!(split.get("Single Phase"), Some(&0));
        assert_eq!(split.get("Three Phase"), Some(&0));

        let invoices = vec![invoice(350_000.0, 5.0, "a", "2025-01-01T10:00:00+00:00")];
        let split = reduce_phase_split(&invoices);
        assert_eq!(split.get("Single Phase"), Some(&0));
        assert_eq!(split.get("Three Phase"), Some(&1));
    }

    #[test]
    fn staff_performance_sums_per_creator() {
        let invoices = vec![
            invoice(100.0, 3.0, "alice", "2025-01-01T10:00:00+00:00"),
            invoice(200.0, 5.0, "bob", "2025-01-01T10:00:00+00:00"),
            invoice(300.0, 5.0, "alice", "2025-01-02T10:00:00+00:00"),
        ];
        let perf = reduce_staff_performance(&invoices);
        assert_eq!(perf.get("alice"), Some(&400.0));
        assert_eq!(perf.get("bob"), Some(&200.0));
    }

    #[test]
    fn bare_end_date_is_widened_to_end_of_day() {
        let (start, end) = normalize_bounds(Some("2025-01-01"), Some("2025-01-10"));
        assert_eq!(start.as_deref(), Some("2025-01-01"));
        assert_eq!(end.as_deref(), Some("2025-01-10T23:59:59.999"));

        let (_, end) = normalize_bounds(None, Some("2025-01-10T12:00:00+00:00"));
        assert_eq!(end.as_deref(), Some("2025-01-10T12:00:00+00:00"));
    }
}
