/// 演示程序配置
///
/// 提供TOML/JSON配置文件和环境变量覆盖
use crate::particles::EmitterConfig;
use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 文件读取错误
    #[error("Config file error: {0}")]
    FileError(#[from] std::io::Error),
    /// 解析错误
    #[error("Config parse error: {0}")]
    ParseError(String),
    /// 验证错误
    #[error("Config validation error: {0}")]
    ValidationError(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// 演示主配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// 日志配置
    pub logging: LoggingConfig,

    /// 相机配置
    pub camera: CameraConfig,

    /// 模拟循环配置
    pub simulation: SimulationConfig,

    /// 发射器列表
    pub emitters: Vec<EmitterSettings>,

    /// 场景配置
    pub scene: SceneSettings,
}

impl_default!(DemoConfig {
    logging: LoggingConfig::default(),
    camera: CameraConfig::default(),
    simulation: SimulationConfig::default(),
    emitters: vec![EmitterSettings::default()],
    scene: SceneSettings::default(),
});

impl DemoConfig {
    /// 创建默认配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 从TOML文件加载配置
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_toml_str(&content)
    }

    /// 从TOML字符串解析配置
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 从JSON文件加载配置
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_json_str(&content)
    }

    /// 从JSON字符串解析配置
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 保存为TOML文件
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        fs::write(path, content).map_err(ConfigError::FileError)
    }

    /// 保存为JSON文件
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        fs::write(path, content).map_err(ConfigError::FileError)
    }

    /// 从环境变量覆盖配置
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| env::var(key).ok());
    }

    /// 用任意键值来源覆盖配置，无法解析的值被忽略
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("DEMO_FRAMES") {
            if let Ok(frames) = val.parse() {
                self.simulation.frames = frames;
            }
        }
        if let Some(val) = lookup("DEMO_FRAME_TIME") {
            if let Ok(frame_time) = val.parse() {
                self.simulation.frame_time = frame_time;
            }
        }
        if let Some(val) = lookup("DEMO_SEED") {
            if let Ok(seed) = val.parse() {
                self.simulation.seed = Some(seed);
            }
        }
    }

    /// 验证配置
    ///
    /// 发射器参数不在这里检查，`Emitter::new` 负责。
    pub fn validate(&self) -> ConfigResult<()> {
        self.simulation.validate()?;
        self.camera.validate()?;
        self.scene.validate()?;
        Ok(())
    }

    /// 自动查找并加载配置文件
    ///
    /// 按以下顺序查找：
    /// 1. ./demo.toml
    /// 2. ./demo.json
    /// 3. 使用默认配置
    pub fn load_or_default() -> Self {
        match Self::from_toml_file("demo.toml") {
            Ok(config) => {
                tracing::info!(target: "config", "Loaded config from demo.toml");
                return config;
            }
            Err(ConfigError::FileError(_)) => {}
            Err(err) => tracing::warn!(target: "config", error = %err, "Ignoring demo.toml"),
        }

        match Self::from_json_file("demo.json") {
            Ok(config) => {
                tracing::info!(target: "config", "Loaded config from demo.json");
                return config;
            }
            Err(ConfigError::FileError(_)) => {}
            Err(err) => tracing::warn!(target: "config", error = %err, "Ignoring demo.json"),
        }

        tracing::info!(target: "config", "Using default configuration");
        Self::default()
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: LogLevel,
}

use crate::impl_default;

impl_default!(LoggingConfig {
    level: LogLevel::Info,
});

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// 跟踪
    Trace,
    /// 调试
    Debug,
    /// 信息
    Info,
    /// 警告
    Warn,
    /// 错误
    Error,
}

/// 相机配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    /// (pitch, yaw, roll)，弧度
    pub orientation: [f32; 3],
    pub aspect_ratio: f32,
    /// 垂直视场角（弧度）
    pub fov: f32,
    pub near_clip: f32,
    pub far_clip: f32,
    pub move_speed: f32,
    pub fast_move_speed: f32,
    pub mouse_look_speed: f32,
}

impl_default!(CameraConfig {
    position: [0.0, 0.0, -10.0],
    orientation: [0.0, 0.0, 0.0],
    aspect_ratio: 16.0 / 9.0,
    fov: std::f32::consts::FRAC_PI_4,
    near_clip: 0.01,
    far_clip: 500.0,
    move_speed: 1.0,
    fast_move_speed: 3.0,
    mouse_look_speed: 0.005,
});

impl CameraConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.fov > 0.0 && self.fov < std::f32::consts::PI) {
            return Err(ConfigError::ValidationError(format!(
                "camera fov must be in (0, pi), got {}",
                self.fov
            )));
        }
        if !(self.aspect_ratio > 0.0) {
            return Err(ConfigError::ValidationError(
                "camera aspect_ratio must be positive".to_string(),
            ));
        }
        if !(self.near_clip > 0.0 && self.far_clip > self.near_clip) {
            return Err(ConfigError::ValidationError(format!(
                "camera clip planes invalid: near {} far {}",
                self.near_clip, self.far_clip
            )));
        }
        Ok(())
    }
}

/// 模拟循环配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// 运行帧数
    pub frames: u32,
    /// 固定帧时间（秒）
    pub frame_time: f32,
    /// 所有发射器的基础随机种子，`None` 使用系统熵
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl_default!(SimulationConfig {
    frames: 600,
    frame_time: 1.0 / 60.0,
    seed: None,
});

impl SimulationConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.frame_time.is_finite() || self.frame_time <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "simulation frame_time must be positive, got {}",
                self.frame_time
            )));
        }
        Ok(())
    }
}

/// 发射器配置的可序列化形式
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterSettings {
    pub max_particles: usize,
    pub particles_per_second: f32,
    pub lifetime: f32,
    pub start_size: f32,
    pub end_size: f32,
    pub start_color: [f32; 4],
    pub end_color: [f32; 4],
    pub start_velocity: [f32; 3],
    pub velocity_random_range: [f32; 3],
    pub emitter_position: [f32; 3],
    pub position_random_range: [f32; 3],
    /// [起始最小, 起始最大, 结束最小, 结束最大]
    pub rotation_random_range: [f32; 4],
    pub emitter_acceleration: [f32; 3],
    /// [列, 行]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sprite_sheet: Option<[u32; 2]>,
    pub one_shot: bool,
    pub active: bool,
}

impl Default for EmitterSettings {
    fn default() -> Self {
        Self::from_config(&EmitterConfig::default())
    }
}

impl EmitterSettings {
    pub fn from_config(config: &EmitterConfig) -> Self {
        Self {
            max_particles: config.max_particles,
            particles_per_second: config.particles_per_second,
            lifetime: config.lifetime,
            start_size: config.start_size,
            end_size: config.end_size,
            start_color: config.start_color.to_array(),
            end_color: config.end_color.to_array(),
            start_velocity: config.start_velocity.to_array(),
            velocity_random_range: config.velocity_random_range.to_array(),
            emitter_position: config.emitter_position.to_array(),
            position_random_range: config.position_random_range.to_array(),
            rotation_random_range: config.rotation_random_range.to_array(),
            emitter_acceleration: config.emitter_acceleration.to_array(),
            sprite_sheet: config.sprite_sheet.map(|(columns, rows)| [columns, rows]),
            one_shot: config.one_shot,
            active: config.active,
        }
    }

    /// 转换为发射器配置，`seed` 来自模拟配置
    pub fn to_config(&self, seed: Option<u64>) -> EmitterConfig {
        EmitterConfig {
            max_particles: self.max_particles,
            particles_per_second: self.particles_per_second,
            lifetime: self.lifetime,
            start_size: self.start_size,
            end_size: self.end_size,
            start_color: Vec4::from_array(self.start_color),
            end_color: Vec4::from_array(self.end_color),
            start_velocity: Vec3::from_array(self.start_velocity),
            velocity_random_range: Vec3::from_array(self.velocity_random_range),
            emitter_position: Vec3::from_array(self.emitter_position),
            position_random_range: Vec3::from_array(self.position_random_range),
            rotation_random_range: Vec4::from_array(self.rotation_random_range),
            emitter_acceleration: Vec3::from_array(self.emitter_acceleration),
            sprite_sheet: self.sprite_sheet.map(|[columns, rows]| (columns, rows)),
            one_shot: self.one_shot,
            active: self.active,
            seed,
        }
    }
}

/// 场景配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    /// 巡逻靶子
    pub targets: Vec<TargetSettings>,
    /// 发射子弹的间隔（秒），0 表示不发射
    pub fire_interval: f32,
    pub projectile_speed: f32,
    /// 子弹发射点
    pub muzzle: [f32; 3],
}

impl_default!(SceneSettings {
    targets: vec![
        TargetSettings {
            position: [-2.0, 0.0, 10.0],
            ..TargetSettings::default()
        },
        TargetSettings {
            position: [2.0, 2.0, 12.0],
            speed: 3.0,
            ..TargetSettings::default()
        },
    ],
    fire_interval: 0.5,
    projectile_speed: 8.0,
    muzzle: [0.0, 0.0, -5.0],
});

/// 最短发射间隔（秒）
pub const MIN_FIRE_INTERVAL: f32 = 0.01;

impl SceneSettings {
    pub fn validate(&self) -> ConfigResult<()> {
        let interval = self.fire_interval;
        if !interval.is_finite() || (interval != 0.0 && interval < MIN_FIRE_INTERVAL) {
            return Err(ConfigError::ValidationError(format!(
                "scene fire_interval must be 0 or at least {}, got {}",
                MIN_FIRE_INTERVAL, interval
            )));
        }
        if !self.projectile_speed.is_finite() {
            return Err(ConfigError::ValidationError(
                "scene projectile_speed must be finite".to_string(),
            ));
        }
        for target in &self.targets {
            target.validate()?;
        }
        Ok(())
    }
}

/// 一个沿 X 轴巡逻的靶子
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetSettings {
    pub position: [f32; 3],
    /// 包围盒半尺寸
    pub half_extents: [f32; 3],
    pub speed: f32,
    /// 距出发点的最大距离
    pub range: f32,
    /// 被击中一次得分
    pub points: u32,
}

impl_default!(TargetSettings {
    position: [0.0, 0.0, 10.0],
    half_extents: [0.5, 0.5, 0.5],
    speed: 2.0,
    range: 4.0,
    points: 10,
});

impl TargetSettings {
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.range > 0.0) || self.half_extents.iter().any(|e| !(*e >= 0.0)) {
            return Err(ConfigError::ValidationError(format!(
                "target at {:?} needs positive range and non-negative extents",
                self.position
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = DemoConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.camera.position, [0.0, 0.0, -10.0]);
        assert_eq!(config.simulation.frames, 600);
    }

    #[test]
    fn test_partial_toml() {
        let config = DemoConfig::from_toml_str(
            r#"
            [logging]
            level = "debug"

            [simulation]
            frames = 10

            [[emitters]]
            particles_per_second = 25.0
            sprite_sheet = [4, 2]
            "#,
        )
        .unwrap();
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.simulation.frames, 10);
        assert_eq!(config.simulation.frame_time, 1.0 / 60.0);
        assert_eq!(config.emitters.len(), 1);

        let emitter = config.emitters[0].to_config(Some(3));
        assert_eq!(emitter.particles_per_second, 25.0);
        assert_eq!(emitter.max_particles, EmitterConfig::default().max_particles);
        assert_eq!(emitter.sprite_sheet, Some((4, 2)));
        assert_eq!(emitter.seed, Some(3));
    }

    #[test]
    fn test_toml_serialization() {
        let mut config = DemoConfig::default();
        config.emitters.push(EmitterSettings::default());
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: DemoConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.emitters, parsed.emitters);
        assert_eq!(config.scene, parsed.scene);
    }

    #[test]
    fn test_json_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo.json");

        let mut config = DemoConfig::default();
        config.simulation.seed = Some(99);
        config.save_json(&path).unwrap();

        let loaded = DemoConfig::from_json_file(&path).unwrap();
        assert_eq!(loaded.simulation, config.simulation);
    }

    #[test]
    fn test_missing_file_is_file_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = DemoConfig::from_toml_file(dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::FileError(_))));
    }

    #[test]
    fn test_malformed_is_parse_error() {
        assert!(matches!(
            DemoConfig::from_json_str("{ not json"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("DEMO_FRAMES", "42"),
            ("DEMO_FRAME_TIME", "0.5"),
            ("DEMO_SEED", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let mut config = DemoConfig::default();
        config.apply_overrides_from(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.simulation.frames, 42);
        assert_eq!(config.simulation.frame_time, 0.5);
        assert_eq!(config.simulation.seed, None);
    }

    #[test]
    fn test_validation_errors() {
        let mut config = DemoConfig::default();
        config.simulation.frame_time = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));

        let mut config = DemoConfig::default();
        config.camera.far_clip = 0.001;
        assert!(config.validate().is_err());

        let mut config = DemoConfig::default();
        config.scene.targets[0].range = 0.0;
        assert!(config.validate().is_err());

        let mut config = DemoConfig::default();
        config.scene.fire_interval = 1.0e-6;
        assert!(config.validate().is_err());
        config.scene.fire_interval = -1.0;
        assert!(config.validate().is_err());
        config.scene.fire_interval = 0.0;
        assert!(config.validate().is_ok());
    }
}
