//! Article Document Store: one Record per canonical URL, with the
//! pending/done/failed/error fetch lifecycle and derived label fields.

pub mod article;
pub mod error;
pub mod pg;
pub mod store;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use article::*;
pub use error::{Result, StoreError};
pub use pg::PgArticleStore;
pub use store::ArticleStore;
