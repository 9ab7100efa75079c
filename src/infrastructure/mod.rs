pub mod pdf_reader;
pub mod pdf_writer;
pub mod sqlite_store;

pub use pdf_writer::PaperRenderer;
pub use sqlite_store::SqliteQuestionStore;
