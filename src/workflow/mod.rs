//! 流程层
//!
//! 定义"一个受访者"的完整遍历流程：
//! - `TraversalCtx` - 显式遍历状态（当前分区 / 卡片 / 答案游标 / 累积日志）
//! - `CarouselDriver` - 单页内逐卡片出题的轮播子流程
//! - `SectionRouter` - 分区状态机调度

pub mod carousel;
pub mod section_router;
pub mod traversal_ctx;

pub use carousel::CarouselDriver;
pub use section_router::SectionRouter;
pub use traversal_ctx::TraversalCtx;
