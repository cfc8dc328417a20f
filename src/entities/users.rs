use sea_orm::entity::prelude::*;

use super::enums::Role;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub username: String,

    /// Argon2id password hash
    pub password_hash: String,

    pub role: Role,

    /// Deactivated accounts fail login exactly like locked ones.
    pub active: bool,

    /// Consecutive failed password attempts since the last success or unlock.
    pub failed_attempts: i32,

    /// Set once `failed_attempts` reaches the lockout threshold; cleared only
    /// by an explicit admin unlock.
    pub locked: bool,

    pub last_login: Option<String>,

    pub last_logout: Option<String>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
