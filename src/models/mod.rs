pub mod cell;
pub mod investor;
pub mod user;
pub mod user_data;

pub use cell::*;
pub use investor::*;
pub use user::*;
pub use user_data::*;
