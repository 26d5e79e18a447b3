//! In-memory site structure records.

pub mod atom;
pub mod item;
pub mod language;
pub mod page;
pub mod template;

pub use atom::Atom;
pub use item::Item;
pub use language::Language;
pub use page::{Page, PageKey, Paragraph};
pub use template::Template;
