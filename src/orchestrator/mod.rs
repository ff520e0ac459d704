//! 编排层（Orchestration Layer）
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<Respondent>，顺序复用同一个页面)
//!     ↓
//! respondent_processor (单个受访者 + 墙钟预算)
//!     ↓
//! workflow::SectionRouter (分区状态机) / CarouselDriver (轮播子流程)
//!     ↓
//! services (能力层：resolver / advance / completion / run_logger)
//!     ↓
//! infrastructure (基础设施：JsExecutor)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：batch_processor 管批量，respondent_processor 管单个
//! 2. **资源隔离**：只有编排层持有 Browser 和 JsExecutor
//! 3. **无业务逻辑**：只做调度和统计，不做 DOM 判断

pub mod batch_processor;
pub mod respondent_processor;

pub use batch_processor::App;
pub use respondent_processor::process_respondent;
