/// Errors produced by the `clowdy-core` crate.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CoreError {
    /// A string did not match any known [`crate::model::HttpMethod`] variant.
    #[error("invalid HTTP method: '{0}'")]
    InvalidHttpMethod(String),
}
