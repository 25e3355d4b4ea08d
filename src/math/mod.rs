//! 数学工具
//!
//! 向量、四元数、矩阵运算直接使用 glam，这里只放变换组件。

pub mod transform;

pub use transform::Transform;
