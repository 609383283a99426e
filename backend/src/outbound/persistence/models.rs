//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::NaiveDate;
use diesel::prelude::*;

use crate::domain::{NewUser, User, UserId, UserValidationError};

use super::schema::users;

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub birthdate: NaiveDate,
}

impl UserRow {
    /// Reconstitute the domain record, re-validating the stored fields.
    pub(crate) fn into_user(self) -> Result<User, UserValidationError> {
        let candidate = NewUser::try_from_parts(self.name, self.email, self.birthdate)?;
        Ok(User::from_parts(self.id, candidate))
    }
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub birthdate: NaiveDate,
}

impl<'a> NewUserRow<'a> {
    pub(crate) fn from_candidate(candidate: &'a NewUser) -> Self {
        Self {
            name: candidate.name().as_ref(),
            email: candidate.email().as_ref(),
            birthdate: candidate.birthdate(),
        }
    }
}
