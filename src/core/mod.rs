//! 核心模块
//!
//! - `error` - 错误类型定义
//! - `logging` - tracing 日志初始化
//! - `macros` - 减少样板代码的宏

pub mod error;
pub mod logging;
#[macro_use]
pub mod macros;

// 重新导出错误类型
pub use error::{
    EmitterError, EmitterResult, EngineError, EngineResult, RenderError, RenderResult,
};
pub use logging::init_logging;
