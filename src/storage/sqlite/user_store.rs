//! SQLite UserStore implementation.

use async_trait::async_trait;
use chrono::NaiveDate;
use sea_query::{Expr, Query, SqliteQueryBuilder};
use sea_query_binder::SqlxBinder;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::interfaces::user_store::{
    NewUser, ProfileUpdate, Result, StoreError, UserProfile, UserRecord, UserStore,
};
use crate::storage::schema::Users;

const DOB_FORMAT: &str = "%Y-%m-%d";

const USER_COLUMNS: [Users; 9] = [
    Users::Id,
    Users::Username,
    Users::PasswordHash,
    Users::Email,
    Users::PhoneNo,
    Users::RAddress,
    Users::Gender,
    Users::Age,
    Users::Dob,
];

/// SQLite implementation of UserStore.
///
/// Every statement is built with sea-query and bound through sqlx; no user
/// input is interpolated into SQL text.
pub struct SqliteUserStore {
    pool: SqlitePool,
}

impl SqliteUserStore {
    /// Create a new SQLite user store.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_user(row: &SqliteRow) -> Result<UserRecord> {
    let dob: String = row.try_get("dob")?;
    let dob = NaiveDate::parse_from_str(&dob, DOB_FORMAT)
        .map_err(|e| StoreError::CorruptRow(format!("dob {dob:?}: {e}")))?;

    Ok(UserRecord {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
        profile: UserProfile {
            email: row.try_get("email")?,
            phone_no: row.try_get("phone_no")?,
            r_address: row.try_get("r_address")?,
            gender: row.try_get("gender")?,
            age: row.try_get("age")?,
            dob,
        },
    })
}

/// Map a UNIQUE violation to `UsernameTaken`, pass everything else through.
fn map_write_error(err: sqlx::Error, username: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::UsernameTaken(username.to_string())
        }
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn init_schema(&self) -> Result<()> {
        sqlx::migrate!("migrations/sqlite").run(&self.pool).await?;
        Ok(())
    }

    async fn find_by_credentials(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<Option<UserRecord>> {
        let (sql, values) = Query::select()
            .columns(USER_COLUMNS)
            .from(Users::Table)
            .and_where(Expr::col(Users::Username).eq(username))
            .and_where(Expr::col(Users::PasswordHash).eq(password_hash))
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>> {
        let (sql, values) = Query::select()
            .columns(USER_COLUMNS)
            .from(Users::Table)
            .and_where(Expr::col(Users::Id).eq(id))
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn insert_user(&self, user: &NewUser) -> Result<i64> {
        let profile = &user.profile;
        let (sql, values) = Query::insert()
            .into_table(Users::Table)
            .columns([
                Users::Username,
                Users::PasswordHash,
                Users::Email,
                Users::PhoneNo,
                Users::RAddress,
                Users::Gender,
                Users::Age,
                Users::Dob,
            ])
            .values_panic([
                user.username.as_str().into(),
                user.password_hash.as_str().into(),
                profile.email.as_str().into(),
                profile.phone_no.as_str().into(),
                profile.r_address.as_str().into(),
                profile.gender.as_str().into(),
                profile.age.into(),
                profile.dob.format(DOB_FORMAT).to_string().into(),
            ])
            .build_sqlx(SqliteQueryBuilder);

        let result = sqlx::query_with(&sql, values)
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error(e, &user.username))?;

        Ok(result.last_insert_rowid())
    }

    async fn update_user(&self, id: i64, update: &ProfileUpdate) -> Result<()> {
        let profile = &update.profile;
        let (sql, values) = Query::update()
            .table(Users::Table)
            .values([
                (Users::Username, update.username.as_str().into()),
                (Users::Email, profile.email.as_str().into()),
                (Users::PhoneNo, profile.phone_no.as_str().into()),
                (Users::RAddress, profile.r_address.as_str().into()),
                (Users::Gender, profile.gender.as_str().into()),
                (Users::Age, profile.age.into()),
                (Users::Dob, profile.dob.format(DOB_FORMAT).to_string().into()),
            ])
            .and_where(Expr::col(Users::Id).eq(id))
            .build_sqlx(SqliteQueryBuilder);

        let result = sqlx::query_with(&sql, values)
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error(e, &update.username))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}
