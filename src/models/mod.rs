pub mod customer;
pub mod lead;
pub mod meeting;
pub mod task;
pub mod user;

use serde::{Deserialize, Deserializer};

pub use customer::{Customer, CustomerStatus};
pub use lead::{Lead, LeadStatus};
pub use meeting::{Meeting, MeetingStatus};
pub use task::{Assignee, Priority, Task, TaskStatus};
pub use user::{User, UserRole};

/// The API sends `null` for statuses it never stored; treat it like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
