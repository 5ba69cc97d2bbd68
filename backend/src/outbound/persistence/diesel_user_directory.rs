//! PostgreSQL-backed `UserDirectory` implementation using Diesel ORM.
//!
//! Every lookup is an exact-match filter over `parallel_users`, with `OR`
//! combinations for identifier searches. Existence checks use `SELECT
//! EXISTS(...)` so no row data crosses the wire.

use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{UserDirectory, UserDirectoryError};
use crate::domain::{
    CurrentUser, EchelonId, EmailAddress, NewUserRecord, SignInCredentials, WalletAddress,
};

use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::parallel_users;

/// Diesel-backed implementation of the user directory port.
#[derive(Clone)]
pub struct DieselUserDirectory {
    pool: DbPool,
}

impl DieselUserDirectory {
    /// Create a new directory with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserDirectoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            UserDirectoryError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> UserDirectoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    let error_message = error.to_string();
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                error = %error_message,
                "diesel operation failed"
            );
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            error = %error_message,
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            UserDirectoryError::rejected(info.message().to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            UserDirectoryError::connection(info.message().to_owned())
        }
        DieselError::DatabaseError(_, info) => UserDirectoryError::query(info.message().to_owned()),
        _ => UserDirectoryError::query(error_message),
    }
}

fn parse_echelon_id(value: &str) -> Result<EchelonId, UserDirectoryError> {
    EchelonId::new(value)
        .map_err(|error| UserDirectoryError::query(format!("stored row is invalid: {error}")))
}

fn parse_echelon_ids(values: &[String]) -> Result<Vec<EchelonId>, UserDirectoryError> {
    values.iter().map(|value| parse_echelon_id(value)).collect()
}

fn row_to_user(row: UserRow) -> Result<CurrentUser, UserDirectoryError> {
    let echelon_id = parse_echelon_id(&row.echelon_id)?;
    Ok(CurrentUser::new(
        row.id,
        row.name,
        row.email,
        echelon_id,
        row.wallet_address,
    ))
}

#[async_trait]
impl UserDirectory for DieselUserDirectory {
    async fn sign_in_anonymously(&self) -> Result<(), UserDirectoryError> {
        // A successful checkout proves the server accepts the configured role.
        self.pool.get().await.map(drop).map_err(map_pool_error)
    }

    async fn find_by_echelon_id(
        &self,
        echelon_id: &EchelonId,
    ) -> Result<Vec<CurrentUser>, UserDirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UserRow> = parallel_users::table
            .filter(parallel_users::echelon_id.eq(echelon_id.as_ref()))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_user).collect()
    }

    async fn find_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Vec<EchelonId>, UserDirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let ids: Vec<String> = parallel_users::table
            .filter(
                parallel_users::echelon_id
                    .eq(identifier)
                    .or(parallel_users::email.eq(identifier)),
            )
            .select(parallel_users::echelon_id)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        parse_echelon_ids(&ids)
    }

    async fn find_by_credentials(
        &self,
        credentials: &SignInCredentials,
    ) -> Result<Vec<EchelonId>, UserDirectoryError> {
        let identifier = credentials.identifier();
        let password = credentials.password();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let ids: Vec<String> = parallel_users::table
            .filter(
                parallel_users::echelon_id
                    .eq(identifier)
                    .and(parallel_users::password.eq(password))
                    .or(parallel_users::email
                        .eq(identifier)
                        .and(parallel_users::password.eq(password))),
            )
            .select(parallel_users::echelon_id)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        parse_echelon_ids(&ids)
    }

    async fn find_by_wallet(
        &self,
        wallet: &WalletAddress,
    ) -> Result<Vec<EchelonId>, UserDirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let ids: Vec<String> = parallel_users::table
            .filter(parallel_users::wallet_address.eq(wallet.as_ref()))
            .select(parallel_users::echelon_id)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        parse_echelon_ids(&ids)
    }

    async fn echelon_id_exists(&self, echelon_id: &EchelonId) -> Result<bool, UserDirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(exists(
            parallel_users::table.filter(parallel_users::echelon_id.eq(echelon_id.as_ref())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn email_exists(&self, email: &EmailAddress) -> Result<bool, UserDirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(exists(
            parallel_users::table.filter(parallel_users::email.eq(email.as_ref())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn wallet_exists(&self, wallet: &WalletAddress) -> Result<bool, UserDirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(exists(
            parallel_users::table.filter(parallel_users::wallet_address.eq(wallet.as_ref())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn insert(&self, record: &NewUserRecord) -> Result<(), UserDirectoryError> {
        let row = NewUserRow {
            echelon_id: record.echelon_id().as_ref(),
            name: record.name(),
            email: record.email().as_ref(),
            password: record.password(),
            wallet_address: record.wallet_address().as_ref(),
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(parallel_users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(drop)
            .map_err(map_diesel_error)
    }
}
