//! 业务能力层
//!
//! 描述"我能做什么"，只处理单个题目 / 单次检查：
//! - `AnswerResolver` - 级联策略链应用单个答案
//! - `AdvanceControl` - 定位 / 点击页面推进控件
//! - `CompletionDetector` - 终态证据检测
//! - `RunLogger` - 产物沉淀（日志 / 截图 / 快照）

pub mod advance;
pub mod answer_resolver;
pub mod completion;
pub mod run_logger;

pub use advance::{AdvanceControl, AdvanceState};
pub use answer_resolver::{AnswerResolver, AnswerStrategy};
pub use completion::CompletionDetector;
pub use run_logger::RunLogger;
