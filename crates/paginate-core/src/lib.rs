pub mod boundary;
pub mod cursor;
pub mod error;
pub mod memory;
pub mod order;
pub mod paginator;
pub mod source;

pub use boundary::boundary_predicate;
pub use cursor::Cursor;
pub use error::{PageError, Result, SourceError};
pub use memory::MemorySource;
pub use order::{Direction, OrderField, OrderSpec, OrderTerm};
pub use paginator::{Page, Paginator};
pub use source::DataSource;
