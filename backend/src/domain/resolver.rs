//! Identity resolution: from selectors to concrete user identifiers.

use std::sync::Arc;

use crate::domain::ports::{UserStore, UserStoreError};
use crate::domain::{Selector, User, UserId};

/// What a selector resolved to.
///
/// Name selectors may legitimately match several users: uniqueness is only
/// enforced when users are added, so historical or racing data can still
/// contain homonyms and the resolver must carry zero, one, or many matches.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    ById { id: UserId, exists: bool },
    ByName { name: String, matches: Vec<User> },
}

impl Resolution {
    /// Whether the selector matched at least one user.
    pub fn found(&self) -> bool {
        match self {
            Self::ById { exists, .. } => *exists,
            Self::ByName { matches, .. } => !matches.is_empty(),
        }
    }

    /// Identifiers of every matched user.
    pub fn matched_ids(&self) -> Vec<UserId> {
        match self {
            Self::ById { id, exists: true } => vec![*id],
            Self::ById { exists: false, .. } => Vec::new(),
            Self::ByName { matches, .. } => matches.iter().map(User::id).collect(),
        }
    }
}

/// Resolves selectors against the user store without mutating it.
#[derive(Clone)]
pub struct IdentityResolver {
    store: Arc<dyn UserStore>,
}

impl IdentityResolver {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Resolve one selector. Safe to call repeatedly; performs no mutation.
    pub async fn resolve(&self, selector: &Selector) -> Result<Resolution, UserStoreError> {
        match selector {
            Selector::Id(id) => {
                let exists = self.store.exists_by_id(*id).await?;
                Ok(Resolution::ById { id: *id, exists })
            }
            Selector::Name(name) => {
                let matches = self.store.find_by_name(name).await?;
                Ok(Resolution::ByName {
                    name: name.clone(),
                    matches,
                })
            }
        }
    }
}
