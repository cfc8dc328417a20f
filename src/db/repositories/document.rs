use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::entities::{agreements, enums::Phase, invoices};

/// Field set shared by an invoice and its paired agreement. The reference
/// number is allocated separately and passed alongside.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub customer_name: String,
    pub phone: String,
    pub address: String,
    pub consumer_no: String,
    pub subdivision: String,
    pub capacity: f64,
    pub phase: Phase,
    pub amount: f64,
    pub created_by: String,
    pub created_at: String,
}

pub struct DocumentRepository {
    conn: DatabaseConnection,
}

impl DocumentRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn insert_invoice(
        &self,
        invoice_ref: &str,
        doc: &NewDocument,
    ) -> Result<invoices::Model> {
        let active = invoices::ActiveModel {
            invoice_ref: Set(invoice_ref.to_string()),
            customer_name: Set(doc.customer_name.clone()),
            phone: Set(doc.phone.clone()),
            address: Set(doc.address.clone()),
            consumer_no: Set(doc.consumer_no.clone()),
            subdivision: Set(doc.subdivision.clone()),
            capacity: Set(doc.capacity),
            phase: Set(doc.phase),
            amount: Set(doc.amount),
            created_by: Set(doc.created_by.clone()),
            created_at: Set(doc.created_at.clone()),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .with_context(|| format!("Failed to insert invoice {invoice_ref}"))
    }

    pub async fn insert_agreement(
        &self,
        agreement_no: &str,
        doc: &NewDocument,
    ) -> Result<agreements::Model> {
        let active = agreements::ActiveModel {
            agreement_no: Set(agreement_no.to_string()),
            customer_name: Set(doc.customer_name.clone()),
            phone: Set(doc.phone.clone()),
            address: Set(doc.address.clone()),
            consumer_no: Set(doc.consumer_no.clone()),
            subdivision: Set(doc.subdivision.clone()),
            capacity: Set(doc.capacity),
            phase: Set(doc.phase),
            amount: Set(doc.amount),
            created_by: Set(doc.created_by.clone()),
            created_at: Set(doc.created_at.clone()),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .with_context(|| format!("Failed to insert agreement {agreement_no}"))
    }

    /// All invoice references whose embedded period segment matches `period`
    /// (`MM/YY`). Only the reference column is fetched.
    pub async fn invoice_refs_for_period(&self, period: &str) -> Result<Vec<String>> {
        let refs = invoices::Entity::find()
            .select_only()
            .column(invoices::Column::InvoiceRef)
            .filter(invoices::Column::InvoiceRef.like(format!("%/{period}/%")))
            .into_tuple::<String>()
            .all(&self.conn)
            .await
            .context("Failed to fetch invoice references for period")?;

        Ok(refs)
    }

    /// All agreement numbers whose embedded period segment matches `period`
    /// (`YYYY`).
    pub async fn agreement_nos_for_period(&self, period: &str) -> Result<Vec<String>> {
        let refs = agreements::Entity::find()
            .select_only()
            .column(agreements::Column::AgreementNo)
            .filter(agreements::Column::AgreementNo.like(format!("%/{period}/%")))
            .into_tuple::<String>()
            .all(&self.conn)
            .await
            .context("Failed to fetch agreement numbers for period")?;

        Ok(refs)
    }

    /// Paginated invoice history, newest first. `created_by` scopes the rows
    /// to one creator (staff); `None` sees everything (admin). Search is a
    /// substring OR across customer name, phone, and reference. Returns the
    /// page slice and the exact total matching count.
    pub async fn search_invoices(
        &self,
        created_by: Option<&str>,
        search: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<invoices::Model>, u64)> {
        let mut query = invoices::Entity::find().order_by_desc(invoices::Column::CreatedAt);

        if let Some(username) = created_by {
            query = query.filter(invoices::Column::CreatedBy.eq(username));
        }

        if let Some(term) = search {
            query = query.filter(
                Condition::any()
                    .add(invoices::Column::CustomerName.contains(term))
                    .add(invoices::Column::Phone.contains(term))
                    .add(invoices::Column::InvoiceRef.contains(term)),
            );
        }

        let total = query
            .clone()
            .count(&self.conn)
            .await
            .context("Failed to count invoices")?;

        let items = query
            .offset(offset)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to fetch invoice page")?;

        Ok((items, total))
    }

    /// Paginated agreement history, same scoping and search as invoices.
    pub async fn search_agreements(
        &self,
        created_by: Option<&str>,
        search: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<agreements::Model>, u64)> {
        let mut query = agreements::Entity::find().order_by_desc(agreements::Column::CreatedAt);

        if let Some(username) = created_by {
            query = query.filter(agreements::Column::CreatedBy.eq(username));
        }

        if let Some(term) = search {
            query = query.filter(
                Condition::any()
                    .add(agreements::Column::CustomerName.contains(term))
                    .add(agreements::Column::Phone.contains(term))
                    .add(agreements::Column::AgreementNo.contains(term)),
            );
        }

        let total = query
            .clone()
            .count(&self.conn)
            .await
            .context("Failed to count agreements")?;

        let items = query
            .offset(offset)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to fetch agreement page")?;

        Ok((items, total))
    }

    /// Invoices with `created_at` inside the inclusive bounds. Either bound
    /// may be open.
    pub async fn invoices_in_range(
        &self,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Vec<invoices::Model>> {
        let mut query = invoices::Entity::find();

        if let Some(start) = start {
            query = query.filter(invoices::Column::CreatedAt.gte(start));
        }

        if let Some(end) = end {
            query = query.filter(invoices::Column::CreatedAt.lte(end));
        }

        query
            .all(&self.conn)
            .await
            .context("Failed to fetch invoices in range")
    }
}
