use async_trait::async_trait;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    FinancialInput, FinancialInputWithOwner, NewFinancialInput, NewUser, RecordPatch, User,
};
use crate::types::Role;

/// Outcome of a mutation that is guarded by the last-admin invariant.
///
/// The admin count and the mutation happen inside one storage operation, so
/// two concurrent demotions can never both observe "two admins left".
#[derive(Debug, Clone, PartialEq)]
pub enum Guarded<T> {
    Applied(T),
    NotFound,
    /// Refused: the target is the only remaining admin
    LastAdmin,
}

/// Persistence for users and financial-input records.
#[async_trait]
pub trait Store: Send + Sync {
    async fn health_check(&self) -> Result<(), DatabaseError>;

    /// Fails with `DatabaseError::Conflict` when the email is taken
    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError>;

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    async fn list_users(&self) -> Result<Vec<User>, DatabaseError>;

    /// Persist name/email/password of an already-merged user. Returns `None`
    /// if the user vanished; `Conflict` if the new email belongs to someone else.
    async fn save_profile(&self, user: &User) -> Result<Option<User>, DatabaseError>;

    async fn set_role_guarded(&self, id: Uuid, role: Role) -> Result<Guarded<User>, DatabaseError>;

    async fn delete_user_guarded(&self, id: Uuid) -> Result<Guarded<()>, DatabaseError>;

    async fn insert_record(&self, record: NewFinancialInput) -> Result<FinancialInput, DatabaseError>;

    /// All records, oldest first, joined with owner name/email
    async fn list_records(&self) -> Result<Vec<FinancialInputWithOwner>, DatabaseError>;

    async fn update_record(
        &self,
        id: Uuid,
        patch: RecordPatch,
    ) -> Result<Option<FinancialInputWithOwner>, DatabaseError>;

    /// `false` when no record had this id
    async fn delete_record(&self, id: Uuid) -> Result<bool, DatabaseError>;
}

/// Decide a role change against the current admin population.
pub(crate) fn role_change_allowed(current: Role, requested: Role, admin_count: i64) -> bool {
    !(current.is_admin() && !requested.is_admin() && admin_count <= 1)
}

pub(crate) fn deletion_allowed(current: Role, admin_count: i64) -> bool {
    !(current.is_admin() && admin_count <= 1)
}
