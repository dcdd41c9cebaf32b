use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    FinancialInput, FinancialInputWithOwner, NewFinancialInput, NewUser, OwnerSummary,
    RecordPatch, User,
};
use crate::database::store::{deletion_allowed, role_change_allowed, Guarded, Store};
use crate::types::Role;

/// Process-local store used when no `DATABASE_URL` is configured and by tests.
///
/// Every mutation runs under the single write lock, which is what makes the
/// guarded operations atomic here.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    // Insertion order doubles as listing order
    users: Vec<User>,
    records: Vec<FinancialInput>,
}

impl Inner {
    fn user(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    fn admin_count(&self) -> i64 {
        self.users.iter().filter(|u| u.role.is_admin()).count() as i64
    }

    fn email_taken_by_other(&self, email: &str, id: Option<Uuid>) -> bool {
        self.users
            .iter()
            .any(|u| u.email == email && Some(u.id) != id)
    }

    fn with_owner(&self, record: &FinancialInput) -> FinancialInputWithOwner {
        let user = self.user(record.user_id).map(|u| OwnerSummary {
            id: u.id,
            name: u.name.clone(),
            email: u.email.clone(),
        });
        FinancialInputWithOwner {
            record: record.clone(),
            user,
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of accounts currently holding the admin role
    pub async fn admin_count(&self) -> i64 {
        self.inner.read().await.admin_count()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut inner = self.inner.write().await;
        if inner.email_taken_by_other(&user.email, None) {
            return Err(DatabaseError::Conflict("Email already exists".to_string()));
        }

        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        inner.users.push(created.clone());
        Ok(created)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        Ok(self.inner.read().await.user(id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, DatabaseError> {
        Ok(self.inner.read().await.users.clone())
    }

    async fn save_profile(&self, user: &User) -> Result<Option<User>, DatabaseError> {
        let mut inner = self.inner.write().await;
        if inner.email_taken_by_other(&user.email, Some(user.id)) {
            return Err(DatabaseError::Conflict("Email already exists".to_string()));
        }

        let Some(stored) = inner.users.iter_mut().find(|u| u.id == user.id) else {
            return Ok(None);
        };
        stored.name = user.name.clone();
        stored.email = user.email.clone();
        stored.password_hash = user.password_hash.clone();
        stored.updated_at = user.updated_at;
        Ok(Some(stored.clone()))
    }

    async fn set_role_guarded(&self, id: Uuid, role: Role) -> Result<Guarded<User>, DatabaseError> {
        let mut inner = self.inner.write().await;
        let admins = inner.admin_count();

        let Some(target) = inner.users.iter_mut().find(|u| u.id == id) else {
            return Ok(Guarded::NotFound);
        };
        if !role_change_allowed(target.role, role, admins) {
            return Ok(Guarded::LastAdmin);
        }

        target.role = role;
        target.updated_at = Utc::now();
        Ok(Guarded::Applied(target.clone()))
    }

    async fn delete_user_guarded(&self, id: Uuid) -> Result<Guarded<()>, DatabaseError> {
        let mut inner = self.inner.write().await;
        let admins = inner.admin_count();

        let Some(index) = inner.users.iter().position(|u| u.id == id) else {
            return Ok(Guarded::NotFound);
        };
        if !deletion_allowed(inner.users[index].role, admins) {
            return Ok(Guarded::LastAdmin);
        }

        inner.users.remove(index);
        Ok(Guarded::Applied(()))
    }

    async fn insert_record(&self, record: NewFinancialInput) -> Result<FinancialInput, DatabaseError> {
        let created = FinancialInput {
            id: Uuid::new_v4(),
            user_id: record.user_id,
            input_data: record.input_data,
            calculated_result: record.calculated_result,
            created_at: Utc::now(),
        };
        self.inner.write().await.records.push(created.clone());
        Ok(created)
    }

    async fn list_records(&self) -> Result<Vec<FinancialInputWithOwner>, DatabaseError> {
        let inner = self.inner.read().await;
        Ok(inner.records.iter().map(|r| inner.with_owner(r)).collect())
    }

    async fn update_record(
        &self,
        id: Uuid,
        patch: RecordPatch,
    ) -> Result<Option<FinancialInputWithOwner>, DatabaseError> {
        let mut inner = self.inner.write().await;
        let Some(index) = inner.records.iter().position(|r| r.id == id) else {
            return Ok(None);
        };

        let updated = inner.records[index].apply(&patch);
        inner.records[index] = updated;
        Ok(Some(inner.with_owner(&inner.records[index])))
    }

    async fn delete_record(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let mut inner = self.inner.write().await;
        let before = inner.records.len();
        inner.records.retain(|r| r.id != id);
        Ok(inner.records.len() != before)
    }
}
