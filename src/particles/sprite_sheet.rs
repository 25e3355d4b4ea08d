//! 精灵表（序列帧）UV 计算
//!
//! 一张纹理按 `columns × rows` 网格切分，粒子按已过生命周期比例选择当前帧。

use glam::Vec2;

/// 不使用精灵表时每个四边形角的默认 UV
pub const DEFAULT_UVS: [Vec2; 4] = [
    Vec2::new(0.0, 0.0),
    Vec2::new(1.0, 0.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(0.0, 1.0),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteSheet {
    columns: u32,
    rows: u32,
    frame_size: Vec2,
}

impl SpriteSheet {
    /// 尺寸为 0 时按 1 处理
    pub fn new(columns: u32, rows: u32) -> Self {
        let columns = columns.max(1);
        let rows = rows.max(1);
        Self {
            columns,
            rows,
            frame_size: Vec2::new(1.0 / columns as f32, 1.0 / rows as f32),
        }
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn frame_count(&self) -> u32 {
        self.columns * self.rows
    }

    /// 单帧在 UV 空间中的宽高
    pub fn frame_size(&self) -> Vec2 {
        self.frame_size
    }

    /// 生命周期比例 `t` 对应的平铺帧序号
    pub fn cell_index(&self, t: f32) -> u32 {
        let index = (t * self.frame_count() as f32).floor();
        if index <= 0.0 {
            0
        } else {
            (index as u32).min(self.frame_count() - 1)
        }
    }

    /// 帧左上角的 UV
    pub fn cell_origin(&self, index: u32) -> Vec2 {
        let column = index % self.columns;
        let row = index / self.columns;
        Vec2::new(
            column as f32 / self.columns as f32,
            row as f32 / self.rows as f32,
        )
    }

    /// 四个角的 UV，顺序与 [`DEFAULT_UVS`] 一致
    pub fn corner_uvs(&self, t: f32) -> [Vec2; 4] {
        let origin = self.cell_origin(self.cell_index(t));
        let size = self.frame_size;
        [
            origin,
            origin + Vec2::new(size.x, 0.0),
            origin + size,
            origin + Vec2::new(0.0, size.y),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_dimensions_clamped() {
        let sheet = SpriteSheet::new(0, 0);
        assert_eq!(sheet.columns(), 1);
        assert_eq!(sheet.rows(), 1);
        assert_eq!(sheet.frame_size(), Vec2::ONE);
        assert_eq!(sheet.corner_uvs(0.7), DEFAULT_UVS);
    }

    #[test]
    fn test_cell_index_boundaries() {
        let sheet = SpriteSheet::new(2, 2);
        assert_eq!(sheet.cell_index(0.0), 0);
        assert_eq!(sheet.cell_index(0.26), 1);
        assert_eq!(sheet.cell_index(0.99), 3);
        // 数值误差导致 t 达到 1 时停在最后一帧
        assert_eq!(sheet.cell_index(1.0), 3);
    }

    #[test]
    fn test_corner_uvs_for_last_cell() {
        let sheet = SpriteSheet::new(2, 2);
        let uvs = sheet.corner_uvs(0.99);
        assert_eq!(uvs[0], Vec2::new(0.5, 0.5));
        assert_eq!(uvs[1], Vec2::new(1.0, 0.5));
        assert_eq!(uvs[2], Vec2::new(1.0, 1.0));
        assert_eq!(uvs[3], Vec2::new(0.5, 1.0));
    }

    #[test]
    fn test_non_square_sheet() {
        let sheet = SpriteSheet::new(4, 2);
        // 第 5 帧位于第二行第二列
        assert_eq!(sheet.cell_origin(5), Vec2::new(0.25, 0.5));
    }
}
