pub mod enums;
mod dose_log;
mod medicine;
mod prescription;
mod schedule;
mod user;

pub use dose_log::*;
pub use medicine::*;
pub use prescription::*;
pub use schedule::*;
pub use user::*;
