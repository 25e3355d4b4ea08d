//! 统一错误处理模块
//!
//! 提供演示程序范围内的统一错误类型定义
//!
//! ## 错误类型分层
//!
//! - **渲染层错误** (`RenderError`): 后端资源创建、句柄失效等
//! - **发射器错误** (`EmitterError`): 构造期配置校验和 GPU 缓冲区创建失败
//! - **配置错误** (`config::ConfigError`): 配置文件读取、解析与校验
//!
//! 每帧的 `update`/`draw` 不返回错误：实时循环不能因为单帧失败而停顿。
//! `EngineError` 汇总以上所有错误，供二进制入口使用。

use crate::config::ConfigError;
use thiserror::Error;

/// 顶层错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Emitter error: {0}")]
    Emitter(#[from] EmitterError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// 渲染系统错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("Failed to create buffer: {0}")]
    BufferCreation(String),

    #[error("Unknown resource handle: {0}")]
    InvalidHandle(u64),

    #[error("Invalid render state: {0}")]
    InvalidState(String),
}

/// 粒子发射器错误
///
/// 只会在构造时出现。发射器一旦创建成功，之后的每帧操作都不会失败。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EmitterError {
    /// 配置参数无法产生有效的发射器（例如发射速率为零）
    #[error("Invalid emitter configuration: {0}")]
    Configuration(String),

    /// 顶点或索引缓冲区创建失败
    #[error("Failed to create emitter resources: {0}")]
    ResourceCreation(#[from] RenderError),
}

/// 结果类型别名
pub type EngineResult<T> = Result<T, EngineError>;
pub type RenderResult<T> = Result<T, RenderError>;
pub type EmitterResult<T> = Result<T, EmitterError>;
