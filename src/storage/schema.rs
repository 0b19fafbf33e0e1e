//! Database schema definitions using sea-query.
//!
//! These define the table and column identifiers for type-safe query building.

use sea_query::Iden;

/// Users table schema.
///
/// One row per registered account. `username` carries a UNIQUE constraint;
/// rows are never deleted.
#[derive(Iden)]
pub enum Users {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "username"]
    Username,
    #[iden = "password_hash"]
    PasswordHash,
    #[iden = "email"]
    Email,
    #[iden = "phone_no"]
    PhoneNo,
    #[iden = "r_address"]
    RAddress,
    #[iden = "gender"]
    Gender,
    #[iden = "age"]
    Age,
    /// ISO-8601 date (`YYYY-MM-DD`).
    #[iden = "dob"]
    Dob,
}
