//! Core domain types shared across the Taskd crates.

pub mod error;
pub mod task;
pub mod user;

pub use error::CoreError;
pub use task::Task;
pub use user::User;

/// Generates a new entity ID.
#[must_use]
pub fn generate_id() -> uuid::Uuid {
    uuid::Uuid::new_v4()
}

/// Parses an entity ID from its string form.
///
/// # Errors
///
/// Returns `CoreError::InvalidId` if the input is not a valid UUID.
pub fn parse_id(raw: &str) -> Result<uuid::Uuid, CoreError> {
    uuid::Uuid::parse_str(raw).map_err(|_| CoreError::invalid_id(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_round_trips() {
        let id = generate_id();
        assert_eq!(parse_id(&id.to_string()).unwrap(), id);
        assert!(parse_id("not-a-uuid").is_err());
    }
}
