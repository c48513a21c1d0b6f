use serde::{Deserialize, Deserializer};

mod job;
pub use self::job::{Job, Step, StepResult, StepStatus};

mod token;
pub use self::token::{AccessToken, TokenResponse};

mod transaction;
pub use self::transaction::{SubClass, Transaction, TransactionList};

mod user;
pub use self::user::{Institution, NewConnection, NewUser, User};

/// Decodes an explicit JSON `null` the same way as an absent field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
