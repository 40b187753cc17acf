pub mod memory;
pub mod model;
pub mod password;
pub mod pg;
pub mod rank;
pub mod service;
pub mod store;
pub mod validate;

pub use model::{AccountUpdate, NewAccount, PublicUser, User};
pub use rank::Rank;
pub use service::AccountService;
pub use store::UserStore;
