pub mod place;
pub mod ranking;
pub mod roles;
pub mod sample;
pub mod store;

pub use place::*;
pub use ranking::*;
pub use roles::*;
pub use sample::sample_places;
pub use store::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    NotFound,
    Invalid(String),
    Forbidden(String),
    Backend(String),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::NotFound => write!(f, "catalog entry not found"),
            CatalogError::Invalid(msg) => write!(f, "invalid submission: {msg}"),
            CatalogError::Forbidden(msg) => write!(f, "not allowed: {msg}"),
            CatalogError::Backend(msg) => write!(f, "place store error: {msg}"),
        }
    }
}

impl std::error::Error for CatalogError {}
