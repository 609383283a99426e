//! Port abstraction for user persistence adapters and their errors.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{NewUser, User, UserId};

/// Column carrying a uniqueness constraint in the user store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Name,
    Email,
}

impl UniqueField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
        }
    }
}

/// Persistence errors raised by user store adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserStoreError {
    /// Store connection could not be established.
    #[error("user store connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("user store query failed: {message}")]
    Query { message: String },
    /// The store rejected a write on a uniqueness constraint.
    ///
    /// This is how a lost race between concurrent writers surfaces: both
    /// passed the pre-check, the constraint stopped the second one.
    #[error("unique constraint violated for {field}: '{value}'", field = field.as_str())]
    UniqueViolation { field: UniqueField, value: String },
}

impl UserStoreError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    pub fn unique_violation(field: UniqueField, value: impl Into<String>) -> Self {
        Self::UniqueViolation {
            field,
            value: value.into(),
        }
    }
}

/// Port for user record persistence.
///
/// Operations are strongly consistent from the caller's point of view: an
/// `exists_*` probe observes the effect of an earlier `save` in the same
/// logical session.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Whether any persisted user carries this exact name.
    async fn exists_by_name(&self, name: &str) -> Result<bool, UserStoreError>;

    /// Whether any persisted user carries this exact email.
    async fn exists_by_email(&self, email: &str) -> Result<bool, UserStoreError>;

    /// Whether a user with this id exists.
    async fn exists_by_id(&self, id: UserId) -> Result<bool, UserStoreError>;

    /// All users sharing this exact name, in id order.
    ///
    /// Name uniqueness is only enforced at add time, so zero, one, or many
    /// matches are all possible.
    async fn find_by_name(&self, name: &str) -> Result<Vec<User>, UserStoreError>;

    /// All persisted users in id order.
    async fn find_all(&self) -> Result<Vec<User>, UserStoreError>;

    /// Persist a candidate, returning the record with its assigned id.
    async fn save(&self, candidate: &NewUser) -> Result<User, UserStoreError>;

    /// Remove the user with this id. Removing an absent id is not an error
    /// at this layer; callers resolve existence first.
    async fn delete_by_id(&self, id: UserId) -> Result<(), UserStoreError>;

    /// Remove every listed user in one operation.
    async fn delete_all(&self, users: &[User]) -> Result<(), UserStoreError>;
}

#[derive(Debug)]
struct InMemoryState {
    users: Vec<User>,
    next_id: UserId,
}

impl Default for InMemoryState {
    fn default() -> Self {
        Self {
            users: Vec::new(),
            next_id: 1,
        }
    }
}

/// In-memory [`UserStore`] used by tests and the dev-mode server.
///
/// Models the same semantics as the PostgreSQL adapter: sequential id
/// assignment from 1 and uniqueness constraints on name and email enforced
/// at save time.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    state: Mutex<InMemoryState>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, InMemoryState>, UserStoreError> {
        self.state
            .lock()
            .map_err(|_| UserStoreError::query("user store state lock poisoned"))
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn exists_by_name(&self, name: &str) -> Result<bool, UserStoreError> {
        let state = self.lock()?;
        Ok(state.users.iter().any(|user| user.name().as_ref() == name))
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, UserStoreError> {
        let state = self.lock()?;
        Ok(state
            .users
            .iter()
            .any(|user| user.email().as_ref() == email))
    }

    async fn exists_by_id(&self, id: UserId) -> Result<bool, UserStoreError> {
        let state = self.lock()?;
        Ok(state.users.iter().any(|user| user.id() == id))
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<User>, UserStoreError> {
        let state = self.lock()?;
        Ok(state
            .users
            .iter()
            .filter(|user| user.name().as_ref() == name)
            .cloned()
            .collect())
    }

    async fn find_all(&self) -> Result<Vec<User>, UserStoreError> {
        let state = self.lock()?;
        Ok(state.users.clone())
    }

    async fn save(&self, candidate: &NewUser) -> Result<User, UserStoreError> {
        let mut state = self.lock()?;
        if state
            .users
            .iter()
            .any(|user| user.name() == candidate.name())
        {
            return Err(UserStoreError::unique_violation(
                UniqueField::Name,
                candidate.name().as_ref(),
            ));
        }
        if state
            .users
            .iter()
            .any(|user| user.email() == candidate.email())
        {
            return Err(UserStoreError::unique_violation(
                UniqueField::Email,
                candidate.email().as_ref(),
            ));
        }

        let id = state.next_id;
        state.next_id += 1;
        let user = User::from_parts(id, candidate.clone());
        state.users.push(user.clone());
        Ok(user)
    }

    async fn delete_by_id(&self, id: UserId) -> Result<(), UserStoreError> {
        let mut state = self.lock()?;
        state.users.retain(|user| user.id() != id);
        Ok(())
    }

    async fn delete_all(&self, users: &[User]) -> Result<(), UserStoreError> {
        let mut state = self.lock()?;
        state
            .users
            .retain(|user| !users.iter().any(|target| target.id() == user.id()));
        Ok(())
    }
}
