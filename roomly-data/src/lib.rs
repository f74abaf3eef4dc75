pub mod decimal;
pub mod entity;
pub mod envelope;
pub mod error;
pub mod page;

pub use decimal::{normalize_decimals, Decimal};
pub use entity::Entity;
pub use envelope::{normalize_list, normalize_one, normalize_page, WireShape};
pub use error::NormalizeError;
pub use page::{Page, PageRequest, PaginationCursor};

pub mod prelude {
    //! Re-exports of the most commonly used data types.
    pub use crate::{Decimal, Entity, Page, PageRequest, PaginationCursor};
}
