//! Storage interfaces.
//!
//! Traits implemented by the storage backends in [`crate::storage`].

pub mod user_store;

pub use user_store::{
    NewUser, ProfileUpdate, Result, StoreError, UserProfile, UserRecord, UserStore,
};
