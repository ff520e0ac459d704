//! # Survey Auto Submit
//!
//! 一个把预先编写好的答案集批量灌入第三方多页问卷的 Rust 应用程序。
//! 目标问卷由 JavaScript 渲染，DOM 结构既不受控也不稳定，因此核心
//! 设计是"有界尝试 + 软失败"：单题失败只记 miss，推进失效只放弃
//! 当前受访者，批次永远跑完并为每位受访者产出一份结论记录。
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `JsExecutor` - 唯一的 page owner，提供 eval / 截图 / 快照能力
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个题目 / 单次检查
//! - `AnswerResolver` - 固定顺序的级联策略链
//! - `AdvanceControl` - 推进控件定位与有界点击
//! - `CompletionDetector` - 语言标记 + URL 结构兜底的终态检测
//! - `RunLogger` - 日志 / 截图 / 快照沉淀
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个受访者"的完整遍历流程
//! - `TraversalCtx` - 显式遍历状态（替代一切全局计数器）
//! - `CarouselDriver` - 单页内逐卡片出题的轮播子流程
//! - `SectionRouter` - 分区状态机（同意书 → 人口统计 → 轮播 → … → 完成页）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量处理器，顺序复用同一个页面
//! - `orchestrator/respondent_processor` - 单个受访者 + 墙钟预算
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::{connect_to_browser_and_page, launch_headless_browser};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::JsExecutor;
pub use models::{
    load_respondents, Respondent, RunOutcome, Section, SectionKind, SurveyLogEntry,
};
pub use orchestrator::{process_respondent, App};
pub use services::{AdvanceControl, AnswerResolver, CompletionDetector, RunLogger};
pub use workflow::{CarouselDriver, SectionRouter, TraversalCtx};
