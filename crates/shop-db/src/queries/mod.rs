mod catalog;
mod orders;
mod profiles;
mod registrations;
mod users;

use anyhow::Result;

pub use catalog::{NewProduct, ProductFilter};
pub use orders::{NewOrder, NewOrderLine, OrderRejection};
pub use profiles::NewProfile;
pub use registrations::NewRegistration;
pub use users::NewUser;

/// True when `err` came from a UNIQUE or PRIMARY KEY constraint failing.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    match err.downcast_ref::<rusqlite::Error>() {
        Some(rusqlite::Error::SqliteFailure(e, _)) => {
            e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        }
        _ => false,
    }
}

/// `?1, ?2, ...` placeholder list for an `IN (...)` clause.
fn placeholders(start: usize, count: usize) -> String {
    (start..start + count)
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
