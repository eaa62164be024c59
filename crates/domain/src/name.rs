use derive_more::{AsRef, Display};

/// Maximum number of characters of a routine name.
pub const MAX_NAME_LENGTH: usize = 64;

/// Trimmed, non-empty name of a custom routine.
#[derive(AsRef, Debug, Display, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Name(String);

impl Name {
    pub fn new(name: &str) -> Result<Self, NameError> {
        let name = name.trim();
        match name.chars().count() {
            0 => Err(NameError::Empty),
            length if length > MAX_NAME_LENGTH => Err(NameError::TooLong { length }),
            _ => Ok(Self(name.to_string())),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum NameError {
    #[error("Routine name must not be empty")]
    Empty,
    #[error(
        "Routine name must be at most {max} characters long ({length} given)",
        max = MAX_NAME_LENGTH
    )]
    TooLong { length: usize },
}
