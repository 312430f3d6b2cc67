use crate::editor::EditState;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Unknown id: {id}")]
    InvalidReference { id: String },

    #[error("Document is not editable (state: {state})")]
    NotEditable { state: EditState },

    #[error("Nothing to undo")]
    NoEarlierState,

    #[error("Nothing to redo")]
    NoLaterState,

    #[error("Malformed document: {message}")]
    MalformedDocument { message: String },

    #[error("Invalid edit: {message}")]
    InvalidEdit { message: String },

    #[error("Invalid configuration: {message}")]
    Config { message: String },
}

impl Error {
    pub(crate) fn invalid_reference(id: impl Into<String>) -> Self {
        Self::InvalidReference { id: id.into() }
    }

    pub(crate) fn invalid_edit(message: impl Into<String>) -> Self {
        Self::InvalidEdit {
            message: message.into(),
        }
    }
}
