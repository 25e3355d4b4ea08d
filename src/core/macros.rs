//! 核心宏定义

/// 为结构体实现Default trait的宏
///
/// 使用示例:
/// ```ignore
/// impl_default!(SimulationConfig {
///     frames: 600,
///     frame_time: 1.0 / 60.0,
///     seed: None,
/// });
/// ```
#[macro_export]
macro_rules! impl_default {
    ($struct_name:ident {
        $($field:ident: $value:expr),* $(,)?
    }) => {
        impl Default for $struct_name {
            fn default() -> Self {
                Self {
                    $($field: $value),*
                }
            }
        }
    };
}
