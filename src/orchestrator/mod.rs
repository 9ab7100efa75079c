//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责资源管理和命令调度，是整个系统的"指挥中心"。
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理命令、并发渲染 Vec<Paper>)
//!     ↓
//! workflow::{GenerationFlow, PaperFlow}
//!     ↓
//! services (能力层：切分 / 提示词 / LLM / 解析 / 题库 / 组卷)
//!     ↓
//! infrastructure (基础设施：PDF 读写、SQLite)
//! ```
//!
//! ## 设计原则
//!
//! 1. **资源隔离**：只有编排层决定使用哪个题库和生成器
//! 2. **向下依赖**：编排层 → workflow → services → infrastructure
//! 3. **无业务逻辑**：只做调度和统计，不做具体业务判断

pub mod batch_processor;

pub use batch_processor::App;
