use sea_orm::entity::prelude::*;
use serde::Serialize;

use super::enums::Phase;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Sequential per month, e.g. `BE/KNG/PMSG/QTN/01/25/0004`.
    #[sea_orm(unique)]
    pub invoice_ref: String,

    pub customer_name: String,

    pub phone: String,

    pub address: String,

    pub consumer_no: String,

    pub subdivision: String,

    /// System capacity in kW.
    pub capacity: f64,

    pub phase: Phase,

    /// Total in rupees: capacity * rate per kW.
    pub amount: f64,

    pub created_by: String,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
