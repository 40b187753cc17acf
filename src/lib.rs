//! Fan account and rank model: registration, bcrypt credentials and
//! point-derived competitive ranks.

pub mod accounts;
pub mod config;
pub mod db;
pub mod error;

pub use accounts::{AccountService, AccountUpdate, NewAccount, PublicUser, Rank, User, UserStore};
pub use error::{AccountError, UniqueField};
