use crate::NameError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum EntityKind {
    Exercise,
    Routine,
    Folder,
    Bundle,
    Index,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ReadError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ReadError {
    pub fn not_found(kind: EntityKind, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CreateError {
    #[error(transparent)]
    InvalidName(#[from] NameError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("no connection")]
    NoConnection,
    #[error("{0}")]
    Other(String),
}
