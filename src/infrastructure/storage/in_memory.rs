//! In-memory entity directory
//!
//! One `RwLock`-guarded state holds all three entity maps, so the unit of
//! work can apply a staged multi-entity creation under a single write
//! lock: either every staged write lands or none does.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::category::{Category, CategoryId, CategoryRepository, NewCategory};
use crate::domain::organization::{
    validate_organization_name, NewOrganization, Organization, OrganizationId,
    OrganizationRepository,
};
use crate::domain::storage::{OnboardingTransaction, UnitOfWork};
use crate::domain::user::{NewUser, User, UserId, UserRepository};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct DirectoryState {
    users: HashMap<UserId, User>,
    organizations: HashMap<OrganizationId, Organization>,
    categories: HashMap<CategoryId, Category>,
}

impl DirectoryState {
    fn organization_name_taken(&self, name: &str) -> bool {
        self.organizations.values().any(|o| o.name() == name)
    }
}

/// Shared in-memory store backing the entity repositories and the unit
/// of work
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    state: Arc<RwLock<DirectoryState>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryDirectory {
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let state = self.state.read().await;
        Ok(state.users.get(id).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let mut state = self.state.write().await;
        let user = User::create(UserId::generate(), user);
        state.users.insert(*user.id(), user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Vec<User>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .filter(|u| u.email() == email)
            .cloned()
            .collect())
    }

    async fn email_in_organization(
        &self,
        email: &str,
        organization_id: &OrganizationId,
    ) -> Result<bool, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .any(|u| u.email() == email && u.organization_id() == Some(organization_id)))
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let state = self.state.read().await;
        Ok(state.users.len())
    }
}

#[async_trait]
impl OrganizationRepository for InMemoryDirectory {
    async fn get(&self, id: &OrganizationId) -> Result<Option<Organization>, DomainError> {
        let state = self.state.read().await;
        Ok(state.organizations.get(id).cloned())
    }

    async fn create(
        &self,
        organization: NewOrganization,
    ) -> Result<Organization, DomainError> {
        validate_organization_name(&organization.name)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        let mut state = self.state.write().await;

        if state.organization_name_taken(&organization.name) {
            return Err(DomainError::conflict(format!(
                "Organization '{}' already exists",
                organization.name
            )));
        }

        let organization = Organization::create(OrganizationId::generate(), organization);
        state
            .organizations
            .insert(*organization.id(), organization.clone());
        Ok(organization)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Organization>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .organizations
            .values()
            .find(|o| o.name() == name)
            .cloned())
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let state = self.state.read().await;
        Ok(state.organizations.len())
    }
}

#[async_trait]
impl CategoryRepository for InMemoryDirectory {
    async fn create(&self, category: NewCategory) -> Result<Category, DomainError> {
        let mut state = self.state.write().await;
        let category = Category::create(CategoryId::generate(), category);
        state.categories.insert(*category.id(), category.clone());
        Ok(category)
    }

    async fn list_by_organization(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Vec<Category>, DomainError> {
        let state = self.state.read().await;
        let mut categories: Vec<Category> = state
            .categories
            .values()
            .filter(|c| c.organization_id() == organization_id)
            .cloned()
            .collect();
        categories.sort_by_key(|c| c.created_at());
        Ok(categories)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let state = self.state.read().await;
        Ok(state.categories.len())
    }
}

#[async_trait]
impl UnitOfWork for InMemoryDirectory {
    async fn begin(&self) -> Result<Box<dyn OnboardingTransaction>, DomainError> {
        Ok(Box::new(InMemoryTransaction {
            state: self.state.clone(),
            users: Vec::new(),
            organizations: Vec::new(),
            categories: Vec::new(),
            memberships: Vec::new(),
        }))
    }
}

/// Staged writes against the directory; applied on commit, discarded on
/// drop
struct InMemoryTransaction {
    state: Arc<RwLock<DirectoryState>>,
    users: Vec<User>,
    organizations: Vec<Organization>,
    categories: Vec<Category>,
    memberships: Vec<(UserId, OrganizationId)>,
}

impl InMemoryTransaction {
    fn staged_user(&self, id: &UserId) -> bool {
        self.users.iter().any(|u| u.id() == id)
    }

    fn staged_organization(&self, id: &OrganizationId) -> bool {
        self.organizations.iter().any(|o| o.id() == id)
    }

    fn staged_name_taken(&self, name: &str) -> bool {
        self.organizations.iter().any(|o| o.name() == name)
    }
}

#[async_trait]
impl OnboardingTransaction for InMemoryTransaction {
    async fn create_user(&mut self, user: NewUser) -> Result<User, DomainError> {
        let user = User::create(UserId::generate(), user);
        self.users.push(user.clone());
        Ok(user)
    }

    async fn create_organization(
        &mut self,
        organization: NewOrganization,
    ) -> Result<Organization, DomainError> {
        validate_organization_name(&organization.name)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        let committed_taken = {
            let state = self.state.read().await;
            state.organization_name_taken(&organization.name)
        };

        if committed_taken || self.staged_name_taken(&organization.name) {
            return Err(DomainError::conflict(format!(
                "Organization '{}' already exists",
                organization.name
            )));
        }

        let organization = Organization::create(OrganizationId::generate(), organization);
        self.organizations.push(organization.clone());
        Ok(organization)
    }

    async fn create_category(&mut self, category: NewCategory) -> Result<Category, DomainError> {
        let category = Category::create(CategoryId::generate(), category);
        self.categories.push(category.clone());
        Ok(category)
    }

    async fn add_member(
        &mut self,
        user_id: &UserId,
        organization_id: &OrganizationId,
    ) -> Result<(), DomainError> {
        if !self.staged_user(user_id) {
            let state = self.state.read().await;
            if !state.users.contains_key(user_id) {
                return Err(DomainError::storage(format!(
                    "Cannot add unknown user '{}' as a member",
                    user_id
                )));
            }
        }

        if !self.staged_organization(organization_id) {
            let state = self.state.read().await;
            if !state.organizations.contains_key(organization_id) {
                return Err(DomainError::storage(format!(
                    "Cannot add a member to unknown organization '{}'",
                    organization_id
                )));
            }
        }

        self.memberships.push((*user_id, *organization_id));
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        let Self {
            state,
            mut users,
            organizations,
            categories,
            memberships,
        } = *self;

        let mut state = state.write().await;

        // Every constraint is re-checked under the write lock before the
        // first insert; a concurrent commit may have won a name since
        // staging.
        for organization in &organizations {
            if state.organization_name_taken(organization.name()) {
                return Err(DomainError::conflict(format!(
                    "Organization '{}' already exists",
                    organization.name()
                )));
            }
        }

        for (user_id, _) in &memberships {
            if !users.iter().any(|u| u.id() == user_id) && !state.users.contains_key(user_id) {
                return Err(DomainError::storage(format!(
                    "Cannot commit membership for unknown user '{}'",
                    user_id
                )));
            }
        }

        for (user_id, organization_id) in &memberships {
            if let Some(user) = users.iter_mut().find(|u| u.id() == user_id) {
                user.set_organization(*organization_id);
            } else if let Some(user) = state.users.get_mut(user_id) {
                user.set_organization(*organization_id);
            }
        }

        for user in users {
            state.users.insert(*user.id(), user);
        }

        for organization in organizations {
            state.organizations.insert(*organization.id(), organization);
        }

        for category in categories {
            state.categories.insert(*category.id(), category);
        }

        Ok(())
    }

    async fn rollback(self: Box<Self>) {
        // Staged writes die with the transaction.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::category::DEFAULT_CATEGORIES;

    fn new_user(email: &str, active: bool) -> NewUser {
        NewUser {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            active,
            organization_id: None,
        }
    }

    fn new_organization(name: &str, owner_id: UserId) -> NewOrganization {
        NewOrganization {
            name: name.to_string(),
            description: String::new(),
            owner_id,
        }
    }

    #[tokio::test]
    async fn test_user_create_and_get() {
        let directory = InMemoryDirectory::new();

        let user = UserRepository::create(&directory, new_user("a@x.com", true))
            .await
            .unwrap();

        let fetched = UserRepository::get(&directory, user.id()).await.unwrap();
        assert_eq!(fetched.unwrap().email(), "a@x.com");
    }

    #[tokio::test]
    async fn test_find_by_email_allows_duplicates() {
        let directory = InMemoryDirectory::new();

        UserRepository::create(&directory, new_user("a@x.com", true))
            .await
            .unwrap();
        UserRepository::create(&directory, new_user("a@x.com", false))
            .await
            .unwrap();

        let found = directory.find_by_email("a@x.com").await.unwrap();
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn test_organization_name_conflict() {
        let directory = InMemoryDirectory::new();
        let owner = UserRepository::create(&directory, new_user("a@x.com", true))
            .await
            .unwrap();

        OrganizationRepository::create(&directory, new_organization("Acme", *owner.id()))
            .await
            .unwrap();

        let result =
            OrganizationRepository::create(&directory, new_organization("Acme", *owner.id()))
                .await;
        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_organization_name_validation() {
        let directory = InMemoryDirectory::new();
        let owner = UserId::generate();

        let result =
            OrganizationRepository::create(&directory, new_organization("   ", owner)).await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_email_in_organization() {
        let directory = InMemoryDirectory::new();

        let owner = UserRepository::create(&directory, new_user("owner@x.com", true))
            .await
            .unwrap();
        let org =
            OrganizationRepository::create(&directory, new_organization("Acme", *owner.id()))
                .await
                .unwrap();

        let mut member = new_user("member@x.com", true);
        member.organization_id = Some(*org.id());
        UserRepository::create(&directory, member).await.unwrap();

        assert!(directory
            .email_in_organization("member@x.com", org.id())
            .await
            .unwrap());
        assert!(!directory
            .email_in_organization("stranger@x.com", org.id())
            .await
            .unwrap());
        // Same e-mail, wrong organization.
        assert!(!directory
            .email_in_organization("member@x.com", &OrganizationId::generate())
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_transaction_commits_registration_shape() {
        let directory = InMemoryDirectory::new();

        let mut tx = UnitOfWork::begin(&directory).await.unwrap();
        let user = tx.create_user(new_user("a@x.com", true)).await.unwrap();
        let org = tx
            .create_organization(new_organization("Acme", *user.id()))
            .await
            .unwrap();
        tx.add_member(user.id(), org.id()).await.unwrap();

        for name in DEFAULT_CATEGORIES {
            tx.create_category(NewCategory {
                name: name.to_string(),
                user_id: *user.id(),
                organization_id: *org.id(),
            })
            .await
            .unwrap();
        }

        tx.commit().await.unwrap();

        assert_eq!(UserRepository::count(&directory).await.unwrap(), 1);
        assert_eq!(OrganizationRepository::count(&directory).await.unwrap(), 1);
        assert_eq!(CategoryRepository::count(&directory).await.unwrap(), 6);

        // The membership link landed with the commit.
        let committed = UserRepository::get(&directory, user.id())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(committed.organization_id(), Some(org.id()));

        let categories = directory.list_by_organization(org.id()).await.unwrap();
        let mut names: Vec<&str> = categories.iter().map(|c| c.name()).collect();
        names.sort_unstable();
        let mut expected = DEFAULT_CATEGORIES.to_vec();
        expected.sort_unstable();
        assert_eq!(names, expected);
        assert!(categories.iter().all(|c| c.user_id() == user.id()));
    }

    #[tokio::test]
    async fn test_dropped_transaction_persists_nothing() {
        let directory = InMemoryDirectory::new();

        {
            let mut tx = UnitOfWork::begin(&directory).await.unwrap();
            let user = tx.create_user(new_user("a@x.com", true)).await.unwrap();
            tx.create_organization(new_organization("Acme", *user.id()))
                .await
                .unwrap();
            // No commit.
        }

        assert_eq!(UserRepository::count(&directory).await.unwrap(), 0);
        assert_eq!(OrganizationRepository::count(&directory).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_rollback_persists_nothing() {
        let directory = InMemoryDirectory::new();

        let mut tx = UnitOfWork::begin(&directory).await.unwrap();
        tx.create_user(new_user("a@x.com", true)).await.unwrap();
        tx.rollback().await;

        assert_eq!(UserRepository::count(&directory).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_staging_rejects_committed_name() {
        let directory = InMemoryDirectory::new();
        let owner = UserRepository::create(&directory, new_user("a@x.com", true))
            .await
            .unwrap();
        OrganizationRepository::create(&directory, new_organization("Acme", *owner.id()))
            .await
            .unwrap();

        let mut tx = UnitOfWork::begin(&directory).await.unwrap();
        let result = tx
            .create_organization(new_organization("Acme", *owner.id()))
            .await;
        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_commit_time_conflict_is_all_or_nothing() {
        let directory = InMemoryDirectory::new();

        // Both transactions stage the same name before either commits.
        let mut first = UnitOfWork::begin(&directory).await.unwrap();
        let first_user = first.create_user(new_user("one@x.com", true)).await.unwrap();
        first
            .create_organization(new_organization("Acme", *first_user.id()))
            .await
            .unwrap();

        let mut second = UnitOfWork::begin(&directory).await.unwrap();
        let second_user = second
            .create_user(new_user("two@x.com", true))
            .await
            .unwrap();
        second
            .create_organization(new_organization("Acme", *second_user.id()))
            .await
            .unwrap();

        first.commit().await.unwrap();

        let result = second.commit().await;
        assert!(matches!(result, Err(DomainError::Conflict { .. })));

        // The loser left no trace: one user, one organization.
        assert_eq!(UserRepository::count(&directory).await.unwrap(), 1);
        assert_eq!(OrganizationRepository::count(&directory).await.unwrap(), 1);
        assert!(UserRepository::get(&directory, second_user.id())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_add_member_rejects_unknown_user() {
        let directory = InMemoryDirectory::new();

        let mut tx = UnitOfWork::begin(&directory).await.unwrap();
        let result = tx
            .add_member(&UserId::generate(), &OrganizationId::generate())
            .await;
        assert!(matches!(result, Err(DomainError::Storage { .. })));
    }
}
