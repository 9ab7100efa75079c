pub mod bloom;
pub mod loaders;
pub mod paper;
pub mod question;
pub mod request;
pub mod unit;

pub use bloom::BloomLevel;
pub use loaders::{load_selection_request, parse_selection_request};
pub use paper::{Paper, PaperSection};
pub use question::{MarkBucket, Question, QuestionBank, StoredQuestion, UnitQuestions};
pub use request::{MarkCount, SelectionRequest, UnitRequest};
pub use unit::Unit;
