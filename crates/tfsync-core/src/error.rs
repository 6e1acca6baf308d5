use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A value shape the serializer has no rule for reached it. Well-formed
    /// state input never produces this.
    #[error("attribute '{key}': cannot render a {kind} value")]
    UnsupportedValue { key: String, kind: &'static str },

    #[error("attribute '{key}': list of scalars contains a {kind} item")]
    NonScalarListItem { key: String, kind: &'static str },

    #[error("attribute '{key}': list starts with an object but contains a {kind} item")]
    MixedBlockList { key: String, kind: &'static str },
}

pub type Result<T> = std::result::Result<T, CoreError>;
