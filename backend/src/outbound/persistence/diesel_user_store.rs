//! PostgreSQL-backed `UserStore` implementation using Diesel ORM.
//!
//! All operations run against the pooled async connection. Uniqueness is
//! enforced twice: the registry pre-checks with the `exists_*` probes, and
//! the table's unique constraints stop whatever slips past them under
//! concurrency. A constraint rejection during `save` is therefore surfaced
//! as [`UserStoreError::UniqueViolation`], never as a generic query error.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{UniqueField, UserStore, UserStoreError};
use crate::domain::{NewUser, User, UserId};

use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserStore` port.
#[derive(Clone)]
pub struct DieselUserStore {
    pool: DbPool,
}

impl DieselUserStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserStoreError {
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    UserStoreError::connection(message)
}

/// Map common Diesel error variants to store errors.
///
/// Unique violations are handled separately by `save`; everywhere else a
/// constraint rejection is unexpected and reads as a query failure.
fn map_diesel_error(error: diesel::result::Error) -> UserStoreError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => UserStoreError::query("record not found"),
        DieselError::QueryBuilderError(_) => UserStoreError::query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            UserStoreError::connection("database connection error")
        }
        DieselError::DatabaseError(_, _) => UserStoreError::query("database error"),
        _ => UserStoreError::query("database error"),
    }
}

/// Map a `save` failure, converting a unique-constraint rejection into the
/// violation variant naming the offending field.
fn map_save_error(error: diesel::result::Error, candidate: &NewUser) -> UserStoreError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    if let DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) = &error {
        let constraint = info.constraint_name().unwrap_or_default();
        debug!(constraint, "user insert rejected on unique constraint");
        return if constraint.contains("email") {
            UserStoreError::unique_violation(UniqueField::Email, candidate.email().as_ref())
        } else {
            UserStoreError::unique_violation(UniqueField::Name, candidate.name().as_ref())
        };
    }
    map_diesel_error(error)
}

fn row_to_user(row: UserRow) -> Result<User, UserStoreError> {
    row.into_user()
        .map_err(|err| UserStoreError::query(format!("corrupted user row in database: {err}")))
}

#[async_trait]
impl UserStore for DieselUserStore {
    async fn exists_by_name(&self, name: &str) -> Result<bool, UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            users::table.filter(users::name.eq(name)),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            users::table.filter(users::email.eq(email)),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn exists_by_id(&self, id: UserId) -> Result<bool, UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(users::table.filter(users::id.eq(id))))
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<User>, UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UserRow> = users::table
            .filter(users::name.eq(name))
            .order(users::id.asc())
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_user).collect()
    }

    async fn find_all(&self) -> Result<Vec<User>, UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UserRow> = users::table
            .order(users::id.asc())
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_user).collect()
    }

    async fn save(&self, candidate: &NewUser) -> Result<User, UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: UserRow = diesel::insert_into(users::table)
            .values(NewUserRow::from_candidate(candidate))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_save_error(err, candidate))?;
        row_to_user(row)
    }

    async fn delete_by_id(&self, id: UserId) -> Result<(), UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(users::table.filter(users::id.eq(id)))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn delete_all(&self, targets: &[User]) -> Result<(), UserStoreError> {
        if targets.is_empty() {
            return Ok(());
        }
        let ids: Vec<UserId> = targets.iter().map(User::id).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(users::table.filter(users::id.eq_any(ids)))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn candidate(name: &str, email: &str) -> NewUser {
        NewUser::try_from_parts(
            name,
            email,
            NaiveDate::from_ymd_opt(1990, 1, 1).expect("valid date"),
        )
        .expect("valid candidate")
    }

    #[test]
    fn pool_failures_read_as_connection_errors() {
        let err = map_pool_error(PoolError::checkout("timed out"));
        assert_eq!(err, UserStoreError::connection("timed out"));
    }

    #[test]
    fn closed_connections_read_as_connection_errors() {
        use diesel::result::{DatabaseErrorKind, Error as DieselError};

        let err = map_diesel_error(DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection,
            Box::new("connection closed".to_owned()),
        ));
        assert_eq!(err, UserStoreError::connection("database connection error"));
    }

    #[test]
    fn other_database_errors_read_as_query_errors() {
        use diesel::result::{DatabaseErrorKind, Error as DieselError};

        let err = map_diesel_error(DieselError::DatabaseError(
            DatabaseErrorKind::SerializationFailure,
            Box::new("serialization failure".to_owned()),
        ));
        assert_eq!(err, UserStoreError::query("database error"));
    }

    #[test]
    fn save_rejections_name_the_violated_field() {
        use diesel::result::{DatabaseErrorKind, Error as DieselError};

        let eve = candidate("Eve", "e@x.com");
        // String payloads carry no constraint name, which falls back to the
        // name column, matching the order the pre-checks probe in.
        let err = map_save_error(
            DieselError::DatabaseError(
                DatabaseErrorKind::UniqueViolation,
                Box::new("duplicate key value".to_owned()),
            ),
            &eve,
        );
        assert_eq!(
            err,
            UserStoreError::unique_violation(UniqueField::Name, "Eve")
        );
    }

    #[test]
    fn non_constraint_save_failures_fall_through_to_the_basic_mapping() {
        let eve = candidate("Eve", "e@x.com");
        let err = map_save_error(diesel::result::Error::NotFound, &eve);
        assert_eq!(err, UserStoreError::query("record not found"));
    }
}
