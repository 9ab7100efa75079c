pub mod llm_service;
pub mod ollama_client;
pub mod paper_assembler;
pub mod prompt_builder;
pub mod question_repository;
pub mod response_parser;
pub mod selection;
pub mod template_analyzer;
pub mod unit_segmenter;

pub use llm_service::{Generator, LlmService, TextGenerator};
pub use ollama_client::OllamaClient;
pub use paper_assembler::PaperAssembler;
pub use prompt_builder::{PromptBuilder, PromptInput};
pub use question_repository::{InMemoryQuestionRepository, QuestionRepository};
pub use response_parser::{ParseOutcome, ResponseParser};
pub use selection::{InOrder, SelectionStrategy, Shuffled};
pub use template_analyzer::{TemplateAnalyzer, TemplateInfo};
pub use unit_segmenter::UnitSegmenter;
