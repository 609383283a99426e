//! Batch mutation orchestration over the user store.
//!
//! One service backs every entry point: REST handlers and RPC handlers
//! construct selectors or candidates and hand them here, so the semantics
//! (per-item independence, uniqueness enforcement, failure wording) cannot
//! drift between transports.

use std::sync::Arc;

use tracing::debug;

use crate::domain::ports::{UniqueField, UserStore, UserStoreError};
use crate::domain::resolver::{IdentityResolver, Resolution};
use crate::domain::selector::ParsedSelector;
use crate::domain::{BatchOutcome, Error, NewUser, User, UserId};

/// Outcome of the single-candidate registration path.
#[derive(Debug, Clone, PartialEq)]
pub enum Registration {
    /// The candidate persisted; the record carries its assigned id.
    Registered(User),
    /// The candidate was rejected; all uniqueness failures are listed.
    Rejected(Vec<String>),
}

/// Orchestrates add and delete batches against the user store.
///
/// The loop over batch items is strictly sequential: item N's uniqueness
/// check observes the effect of item N−1's save within the same call.
/// Per-item failures accumulate; only store infrastructure failures abort
/// the request, and items already persisted stay persisted.
#[derive(Clone)]
pub struct RegistryService {
    store: Arc<dyn UserStore>,
    resolver: IdentityResolver,
}

fn map_store_error(error: UserStoreError) -> Error {
    match error {
        UserStoreError::Connection { message } => Error::service_unavailable(message),
        UserStoreError::Query { message } => Error::internal(message),
        UserStoreError::UniqueViolation { .. } => Error::conflict(error.to_string()),
    }
}

fn name_conflict_message(name: &str) -> String {
    format!("User with name '{name}' is already registered")
}

fn email_conflict_message(email: &str) -> String {
    format!("User with email '{email}' is already registered")
}

fn added_message(user: &User) -> String {
    format!("Added user '{}' with ID {}", user.name(), user.id())
}

fn deleted_by_id_message(id: UserId) -> String {
    format!("Deleted user with ID: {id}")
}

fn id_not_found_message(id: UserId) -> String {
    format!("User with ID {id} not found")
}

fn deleted_by_name_message(name: &str) -> String {
    format!("Deleted user(s) with name '{name}'")
}

fn name_not_found_message(name: &str) -> String {
    format!("User(s) '{name}' not found")
}

impl RegistryService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        let resolver = IdentityResolver::new(Arc::clone(&store));
        Self { store, resolver }
    }

    /// All registered users in id order.
    pub async fn list_users(&self) -> Result<Vec<User>, Error> {
        self.store.find_all().await.map_err(map_store_error)
    }

    /// All users carrying this exact name.
    pub async fn lookup_by_name(&self, name: &str) -> Result<Vec<User>, Error> {
        self.store.find_by_name(name).await.map_err(map_store_error)
    }

    /// Add a batch of candidates, one uniqueness check at a time.
    ///
    /// Candidates are independent: a rejected candidate never blocks its
    /// siblings, and a candidate persisted earlier in the batch is visible
    /// to the checks of every later one.
    pub async fn add_users(&self, candidates: Vec<NewUser>) -> Result<BatchOutcome, Error> {
        let mut outcome = BatchOutcome::new();
        for candidate in &candidates {
            match self.try_add(candidate).await? {
                Ok(user) => outcome.record_success(added_message(&user)),
                Err(message) => outcome.record_failure(message),
            }
        }
        Ok(outcome)
    }

    /// Register a single candidate, collecting every uniqueness failure
    /// before deciding.
    pub async fn register_user(&self, candidate: NewUser) -> Result<Registration, Error> {
        let mut errors = Vec::new();
        if self
            .store
            .exists_by_name(candidate.name().as_ref())
            .await
            .map_err(map_store_error)?
        {
            errors.push(name_conflict_message(candidate.name().as_ref()));
        }
        if self
            .store
            .exists_by_email(candidate.email().as_ref())
            .await
            .map_err(map_store_error)?
        {
            errors.push(email_conflict_message(candidate.email().as_ref()));
        }
        if !errors.is_empty() {
            return Ok(Registration::Rejected(errors));
        }

        match self.store.save(&candidate).await {
            Ok(user) => Ok(Registration::Registered(user)),
            Err(UserStoreError::UniqueViolation { field, value }) => Ok(Registration::Rejected(
                vec![constraint_conflict_message(field, &value)],
            )),
            Err(other) => Err(map_store_error(other)),
        }
    }

    /// Delete a batch of selectors, malformed entries included.
    ///
    /// Each item resolves and deletes independently; an id selector removes
    /// one user, a name selector removes every homonym in one operation
    /// under a single success entry. Deletion is not silently idempotent: a
    /// selector that resolves to nothing records a not-found failure.
    pub async fn delete_users(&self, items: Vec<ParsedSelector>) -> Result<BatchOutcome, Error> {
        let mut outcome = BatchOutcome::new();
        for item in items {
            match item {
                Err(parse_error) => outcome.record_failure(parse_error.to_string()),
                Ok(selector) => {
                    let resolution = self
                        .resolver
                        .resolve(&selector)
                        .await
                        .map_err(map_store_error)?;
                    self.apply_delete(resolution, &mut outcome).await?;
                }
            }
        }
        Ok(outcome)
    }

    /// Remove one user by id, reporting whether anything was removed.
    pub async fn remove_by_id(&self, id: UserId) -> Result<bool, Error> {
        if !self.store.exists_by_id(id).await.map_err(map_store_error)? {
            return Ok(false);
        }
        self.store
            .delete_by_id(id)
            .await
            .map_err(map_store_error)?;
        Ok(true)
    }

    async fn try_add(&self, candidate: &NewUser) -> Result<Result<User, String>, Error> {
        if self
            .store
            .exists_by_name(candidate.name().as_ref())
            .await
            .map_err(map_store_error)?
        {
            return Ok(Err(name_conflict_message(candidate.name().as_ref())));
        }
        if self
            .store
            .exists_by_email(candidate.email().as_ref())
            .await
            .map_err(map_store_error)?
        {
            return Ok(Err(email_conflict_message(candidate.email().as_ref())));
        }

        match self.store.save(candidate).await {
            Ok(user) => Ok(Ok(user)),
            // A concurrent writer won the race between our pre-check and the
            // store write; the constraint rejection takes the same shape as
            // the pre-check failure.
            Err(UserStoreError::UniqueViolation { field, value }) => {
                debug!(
                    field = field.as_str(),
                    value, "store rejected candidate on unique constraint"
                );
                Ok(Err(constraint_conflict_message(field, &value)))
            }
            Err(other) => Err(map_store_error(other)),
        }
    }

    async fn apply_delete(
        &self,
        resolution: Resolution,
        outcome: &mut BatchOutcome,
    ) -> Result<(), Error> {
        match resolution {
            Resolution::ById { id, exists: true } => {
                self.store
                    .delete_by_id(id)
                    .await
                    .map_err(map_store_error)?;
                outcome.record_success(deleted_by_id_message(id));
            }
            Resolution::ById { id, exists: false } => {
                outcome.record_failure(id_not_found_message(id));
            }
            Resolution::ByName { name, matches } => {
                if matches.is_empty() {
                    outcome.record_failure(name_not_found_message(&name));
                } else {
                    self.store
                        .delete_all(&matches)
                        .await
                        .map_err(map_store_error)?;
                    outcome.record_success(deleted_by_name_message(&name));
                }
            }
        }
        Ok(())
    }
}

fn constraint_conflict_message(field: UniqueField, value: &str) -> String {
    match field {
        UniqueField::Name => name_conflict_message(value),
        UniqueField::Email => email_conflict_message(value),
    }
}

#[cfg(test)]
#[path = "registry_service_tests.rs"]
mod tests;
