pub mod generation_flow;
pub mod paper_flow;

pub use generation_flow::{GenerationFlow, GenerationInput, GenerationReport};
pub use paper_flow::PaperFlow;
