pub mod expense;
pub mod group;
pub mod payment;
pub mod user;

pub use expense::{Expense, Participant, ShareStatus, SplitEntry, SplitPolicy};
pub use group::Group;
pub use payment::{Payment, PaymentMethod, PaymentStatus};
pub use user::User;
