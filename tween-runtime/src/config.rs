//! # Config 模块
//!
//! 补间系统的可调参数。
//!
//! ## 配置优先级
//!
//! 1. 命令行参数（最高）
//! 2. 配置文件 (tween.json)
//! 3. 默认值（最低）

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::easing::EasingFunction;

/// 复合动画默认循环上限
pub const DEFAULT_MAX_LOOPS: u32 = i32::MAX as u32;

/// 补间系统配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TweenConfig {
    /// 软停止过渡时长（秒）
    #[serde(default = "default_soft_stop_duration")]
    pub soft_stop_duration: f32,

    /// 复合动画循环次数上限
    #[serde(default = "default_max_loops")]
    pub max_loops: u32,

    /// 请求未给出时长时使用的默认值（秒）
    #[serde(default = "default_duration")]
    pub default_duration: f32,

    /// 复合动画默认参数
    #[serde(default)]
    pub flash: FlashDefaults,
}

/// 复合动画默认参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlashDefaults {
    #[serde(default = "default_phase_time")]
    pub go_time: f32,
    #[serde(default = "default_phase_time")]
    pub back_time: f32,
    #[serde(default)]
    pub middle_wait: f32,
    #[serde(default)]
    pub loop_wait: f32,
    #[serde(default)]
    pub go_easing: EasingFunction,
    #[serde(default)]
    pub back_easing: EasingFunction,
}

// 默认值函数

fn default_soft_stop_duration() -> f32 {
    0.25
}

fn default_max_loops() -> u32 {
    DEFAULT_MAX_LOOPS
}

fn default_duration() -> f32 {
    1.0
}

fn default_phase_time() -> f32 {
    0.5
}

impl Default for TweenConfig {
    fn default() -> Self {
        Self {
            soft_stop_duration: default_soft_stop_duration(),
            max_loops: default_max_loops(),
            default_duration: default_duration(),
            flash: FlashDefaults::default(),
        }
    }
}

impl Default for FlashDefaults {
    fn default() -> Self {
        Self {
            go_time: default_phase_time(),
            back_time: default_phase_time(),
            middle_wait: 0.0,
            loop_wait: 0.0,
            go_easing: EasingFunction::default(),
            back_easing: EasingFunction::default(),
        }
    }
}

impl TweenConfig {
    /// 加载配置文件
    ///
    /// 如果文件不存在或解析失败，返回默认配置并输出警告。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = ?path, "配置文件不存在，使用默认配置");
            return Self::default();
        }

        match Self::try_load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "配置文件加载失败，使用默认配置");
                Self::default()
            }
        }
    }

    /// 严格加载配置文件，读取、解析或验证失败都返回错误
    pub fn try_load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| ConfigError::SerializationFailed(e.to_string()))?;
        config.validate()?;
        info!(path = ?path, "配置文件加载成功");
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = self.to_json()?;
        fs::write(path, json).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }

    /// 序列化为格式化的 JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializationFailed(e.to_string()))
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_non_negative(self.soft_stop_duration) {
            return Err(ConfigError::ValidationFailed(
                "soft_stop_duration 必须是非负数".to_string(),
            ));
        }
        if self.max_loops == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_loops 至少为 1".to_string(),
            ));
        }
        if !is_non_negative(self.default_duration) {
            return Err(ConfigError::ValidationFailed(
                "default_duration 必须是非负数".to_string(),
            ));
        }

        let flash = &self.flash;
        for (name, value) in [
            ("flash.go_time", flash.go_time),
            ("flash.back_time", flash.back_time),
            ("flash.middle_wait", flash.middle_wait),
            ("flash.loop_wait", flash.loop_wait),
        ] {
            if !is_non_negative(value) {
                return Err(ConfigError::ValidationFailed(format!(
                    "{name} 必须是非负数"
                )));
            }
        }

        Ok(())
    }
}

/// NaN 视为无效
fn is_non_negative(value: f32) -> bool {
    value >= 0.0
}

/// 配置错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// 序列化失败
    #[error("配置序列化失败: {0}")]
    SerializationFailed(String),

    /// IO 错误
    #[error("配置 IO 错误: {0}")]
    IoError(String),

    /// 验证失败
    #[error("配置验证失败: {0}")]
    ValidationFailed(String),
}
