use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::password::hash_password_blocking;
use crate::database::models::{FinancialInputWithOwner, ProfilePatch, PublicUser, RecordPatch};
use crate::database::{DatabaseError, Guarded, Store};
use crate::services::payload::{validate_edited_input, CalculatedResultPayload, InputDataPayload};
use crate::services::validation::{normalize_email, validate_email_format, validate_name, validate_password};
use crate::services::{ServiceError, ServiceResult};
use crate::types::Role;

/// Fields an administrator may edit through the profile route
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RecordUpdateRequest {
    pub input_data: Option<InputDataPayload>,
    pub calculated_result: Option<CalculatedResultPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordUpdateResponse {
    pub message: String,
    pub updated_record: FinancialInputWithOwner,
}

/// Management operations behind the admin routes.
///
/// Callers are expected to have passed the authorization gate already; the
/// service itself only enforces data invariants, most importantly that the
/// last administrator can be neither demoted nor deleted.
pub struct AdminService {
    store: Arc<dyn Store>,
}

fn object_body(body: Value) -> ServiceResult<Map<String, Value>> {
    match body {
        Value::Object(map) => Ok(map),
        _ => Err(ServiceError::invalid_input("Request body must be a JSON object")),
    }
}

fn conflict_or_database(err: DatabaseError) -> ServiceError {
    match err {
        DatabaseError::Conflict(msg) => ServiceError::Conflict(msg),
        other => ServiceError::Database(other),
    }
}

impl AdminService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list_users(&self) -> ServiceResult<Vec<PublicUser>> {
        let users = self.store.list_users().await?;
        Ok(users.iter().map(|u| u.to_public()).collect())
    }

    /// Change a user's role. Demoting the only admin is refused.
    pub async fn change_role(&self, target: Uuid, requested: &Value) -> ServiceResult<PublicUser> {
        let role = requested
            .as_str()
            .and_then(|s| s.parse::<Role>().ok())
            .ok_or_else(|| ServiceError::invalid_input("Invalid role"))?;

        match self.store.set_role_guarded(target, role).await? {
            Guarded::Applied(user) => {
                tracing::info!("User {} role set to {}", user.id, user.role);
                Ok(user.to_public())
            }
            Guarded::NotFound => Err(ServiceError::not_found("User not found")),
            Guarded::LastAdmin => {
                tracing::warn!("Refused to revoke admin role of last admin {}", target);
                Err(ServiceError::LastAdmin("Cannot revoke last admin".to_string()))
            }
        }
    }

    /// Merge allow-listed profile fields. `role` is never accepted here.
    pub async fn edit_profile(&self, target: Uuid, body: Value) -> ServiceResult<PublicUser> {
        let fields = object_body(body)?;
        if fields.contains_key("role") {
            return Err(ServiceError::invalid_input("Use the role-change route to update role"));
        }

        let changes: ProfileChanges = serde_json::from_value(Value::Object(fields))
            .map_err(|e| ServiceError::invalid_input(format!("Invalid profile update: {}", e)))?;

        if let Some(name) = &changes.name {
            validate_name(name).map_err(ServiceError::InvalidInput)?;
        }
        let email = changes.email.as_deref().map(normalize_email);
        if let Some(email) = &email {
            validate_email_format(email).map_err(ServiceError::InvalidInput)?;
        }
        if let Some(password) = &changes.password {
            validate_password(password).map_err(ServiceError::InvalidInput)?;
        }

        let user = self
            .store
            .find_user(target)
            .await?
            .ok_or_else(|| ServiceError::not_found("User not found"))?;

        let password_hash = match changes.password {
            Some(password) => Some(hash_password_blocking(password).await?),
            None => None,
        };

        let patch = ProfilePatch {
            name: changes.name.map(|n| n.trim().to_string()),
            email,
            password_hash,
        };
        if patch.is_empty() {
            return Ok(user.to_public());
        }

        let merged = user.merge_profile(&patch, Utc::now());
        let saved = self
            .store
            .save_profile(&merged)
            .await
            .map_err(conflict_or_database)?
            .ok_or_else(|| ServiceError::not_found("User not found"))?;

        tracing::info!("User {} profile updated", saved.id);
        Ok(saved.to_public())
    }

    /// Delete a user. Deleting the only admin is refused.
    pub async fn delete_user(&self, target: Uuid) -> ServiceResult<()> {
        match self.store.delete_user_guarded(target).await? {
            Guarded::Applied(()) => {
                tracing::info!("User {} deleted", target);
                Ok(())
            }
            Guarded::NotFound => Err(ServiceError::not_found("User not found")),
            Guarded::LastAdmin => {
                tracing::warn!("Refused to delete last admin {}", target);
                Err(ServiceError::LastAdmin("Cannot delete the last admin".to_string()))
            }
        }
    }

    /// Grant the admin role by email. Used for provisioning the first admin.
    pub async fn promote_by_email(&self, email: &str) -> ServiceResult<PublicUser> {
        let email = normalize_email(email);
        let user = self
            .store
            .find_user_by_email(&email)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("No user with email {}", email)))?;

        self.change_role(user.id, &Value::String(Role::Admin.as_str().to_string()))
            .await
    }

    pub async fn list_records(&self) -> ServiceResult<Vec<FinancialInputWithOwner>> {
        Ok(self.store.list_records().await?)
    }

    /// Replace the supplied parts of a record. Totals are stored exactly as
    /// given; they are not re-derived from the inputs.
    pub async fn update_record(&self, id: Uuid, body: Value) -> ServiceResult<RecordUpdateResponse> {
        let fields = object_body(body)?;
        if fields.contains_key("userId") || fields.contains_key("user_id") {
            return Err(ServiceError::invalid_input("Record owner cannot be changed"));
        }

        let request: RecordUpdateRequest = serde_json::from_value(Value::Object(fields))
            .map_err(|e| ServiceError::invalid_input(format!("Invalid record update: {}", e)))?;

        let input_data = match request.input_data {
            Some(payload) => {
                let input = payload.into_input_data()?;
                validate_edited_input(&input)?;
                Some(input)
            }
            None => None,
        };
        let calculated_result = request
            .calculated_result
            .map(CalculatedResultPayload::into_calculated_result)
            .transpose()?;

        let updated_record = self
            .store
            .update_record(id, RecordPatch { input_data, calculated_result })
            .await?
            .ok_or_else(|| ServiceError::not_found("Financial input not found"))?;

        tracing::info!("Financial input {} updated", id);
        Ok(RecordUpdateResponse {
            message: "Financial input updated successfully".to_string(),
            updated_record,
        })
    }

    pub async fn delete_record(&self, id: Uuid) -> ServiceResult<()> {
        if !self.store.delete_record(id).await? {
            return Err(ServiceError::not_found("Record not found"));
        }
        tracing::info!("Financial input {} deleted", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{CalculatedResult, InputData, NewFinancialInput, NewUser};
    use crate::database::MemoryStore;
    use serde_json::json;

    struct Fixture {
        store: Arc<MemoryStore>,
        service: AdminService,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        Fixture {
            service: AdminService::new(store.clone()),
            store,
        }
    }

    impl Fixture {
        async fn user(&self, email: &str, role: Role) -> Uuid {
            self.store
                .insert_user(NewUser {
                    name: "Someone".to_string(),
                    email: email.to_string(),
                    password_hash: "$argon2id$placeholder".to_string(),
                    role,
                })
                .await
                .unwrap()
                .id
        }

        async fn role_of(&self, id: Uuid) -> Option<Role> {
            self.store.find_user(id).await.unwrap().map(|u| u.role)
        }

        async fn record(&self, owner: Uuid) -> Uuid {
            self.store
                .insert_record(NewFinancialInput {
                    user_id: owner,
                    input_data: InputData { units_sold: 10.0, price_per_unit: 5.0, cost: 20.0 },
                    calculated_result: CalculatedResult { total_revenue: 50.0, profit: 30.0 },
                })
                .await
                .unwrap()
                .id
        }
    }

    #[tokio::test]
    async fn demoting_a_non_last_admin_succeeds() {
        let f = fixture();
        let a = f.user("a@example.com", Role::Admin).await;
        f.user("b@example.com", Role::Admin).await;

        let user = f.service.change_role(a, &json!("user")).await.unwrap();
        assert_eq!(user.role, Role::User);
        assert_eq!(f.role_of(a).await, Some(Role::User));
    }

    #[tokio::test]
    async fn demoting_the_last_admin_is_refused() {
        let f = fixture();
        let a = f.user("a@example.com", Role::Admin).await;
        f.user("u@example.com", Role::User).await;

        let err = f.service.change_role(a, &json!("user")).await.unwrap_err();
        assert!(matches!(err, ServiceError::LastAdmin(_)));
        assert_eq!(f.role_of(a).await, Some(Role::Admin));
    }

    #[tokio::test]
    async fn invalid_role_values_are_rejected_before_lookup() {
        let f = fixture();
        for value in [json!("root"), json!(""), json!(null), json!(1), json!("ADMIN")] {
            let err = f.service.change_role(Uuid::new_v4(), &value).await.unwrap_err();
            assert!(matches!(err, ServiceError::InvalidInput(_)), "{value}");
        }
    }

    #[tokio::test]
    async fn role_change_on_missing_user_is_not_found() {
        let f = fixture();
        let err = f.service.change_role(Uuid::new_v4(), &json!("admin")).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn deleting_the_last_admin_is_refused() {
        let f = fixture();
        let a = f.user("a@example.com", Role::Admin).await;

        let err = f.service.delete_user(a).await.unwrap_err();
        assert!(matches!(err, ServiceError::LastAdmin(_)));
        assert!(f.store.find_user(a).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn deleting_users_and_second_admins_succeeds() {
        let f = fixture();
        f.user("a@example.com", Role::Admin).await;
        let b = f.user("b@example.com", Role::Admin).await;
        let u = f.user("u@example.com", Role::User).await;

        f.service.delete_user(u).await.unwrap();
        f.service.delete_user(b).await.unwrap();
        assert_eq!(f.store.admin_count().await, 1);
        assert!(matches!(f.service.delete_user(u).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn profile_edit_with_role_is_rejected_without_mutation() {
        let f = fixture();
        let u = f.user("u@example.com", Role::User).await;
        let before = f.store.find_user(u).await.unwrap();

        let err = f
            .service
            .edit_profile(u, json!({"name": "Changed", "role": "admin"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
        assert_eq!(f.store.find_user(u).await.unwrap(), before);
    }

    #[tokio::test]
    async fn profile_edit_rejects_unknown_fields() {
        let f = fixture();
        let u = f.user("u@example.com", Role::User).await;

        let err = f.service.edit_profile(u, json!({"createdAt": "2020-01-01"})).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn profile_edit_merges_and_normalizes() {
        let f = fixture();
        let u = f.user("u@example.com", Role::User).await;

        let user = f
            .service
            .edit_profile(u, json!({"name": "  New Name ", "email": "NEW@example.com"}))
            .await
            .unwrap();
        assert_eq!(user.name, "New Name");
        assert_eq!(user.email, "new@example.com");
        assert_eq!(user.role, Role::User);
    }

    #[tokio::test]
    async fn profile_edit_password_is_rehashed() {
        let f = fixture();
        let u = f.user("u@example.com", Role::User).await;

        f.service.edit_profile(u, json!({"password": "fresh-secret"})).await.unwrap();
        let stored = f.store.find_user(u).await.unwrap().unwrap();
        assert!(stored.password_hash.starts_with("$argon2"));
        assert!(crate::auth::password::verify_password("fresh-secret", &stored.password_hash).unwrap());
    }

    #[tokio::test]
    async fn profile_edit_email_collision_conflicts() {
        let f = fixture();
        f.user("taken@example.com", Role::User).await;
        let u = f.user("u@example.com", Role::User).await;

        let err = f.service.edit_profile(u, json!({"email": "taken@example.com"})).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn profile_edit_on_missing_user_is_not_found() {
        let f = fixture();
        let err = f.service.edit_profile(Uuid::new_v4(), json!({"name": "x"})).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn promote_by_email_grants_admin() {
        let f = fixture();
        let u = f.user("first@example.com", Role::User).await;

        let user = f.service.promote_by_email(" First@Example.com ").await.unwrap();
        assert_eq!(user.id, u);
        assert_eq!(user.role, Role::Admin);
    }

    #[tokio::test]
    async fn record_update_persists_supplied_parts_without_recomputing() {
        let f = fixture();
        let owner = f.user("o@example.com", Role::User).await;
        let id = f.record(owner).await;

        let response = f
            .service
            .update_record(id, json!({"inputData": {"unitsSold": 2, "pricePerUnit": 3, "cost": 1}}))
            .await
            .unwrap();

        let updated = response.updated_record;
        assert_eq!(updated.record.input_data.units_sold, 2.0);
        assert_eq!(updated.record.calculated_result.total_revenue, 50.0);
        assert_eq!(updated.record.user_id, owner);
        assert_eq!(updated.user.unwrap().email, "o@example.com");
    }

    #[tokio::test]
    async fn record_update_validates_positivity() {
        let f = fixture();
        let owner = f.user("o@example.com", Role::User).await;
        let id = f.record(owner).await;

        let err = f
            .service
            .update_record(id, json!({"inputData": {"unitsSold": 0, "pricePerUnit": 3, "cost": 1}}))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation { .. }));
    }

    #[tokio::test]
    async fn record_owner_cannot_be_reassigned() {
        let f = fixture();
        let owner = f.user("o@example.com", Role::User).await;
        let id = f.record(owner).await;

        let err = f
            .service
            .update_record(id, json!({"userId": Uuid::new_v4()}))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
        assert_eq!(f.store.list_records().await.unwrap()[0].record.user_id, owner);
    }

    #[tokio::test]
    async fn deleting_missing_record_leaves_collection_unchanged() {
        let f = fixture();
        let owner = f.user("o@example.com", Role::User).await;
        f.record(owner).await;

        let err = f.service.delete_record(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert_eq!(f.service.list_records().await.unwrap().len(), 1);
    }
}
