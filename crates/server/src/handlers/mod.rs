//! HTTP request handlers.

pub mod books;
pub mod health;

pub use books::{delete_book, list_books, stream_book, upload_book};
pub use health::health_check;
