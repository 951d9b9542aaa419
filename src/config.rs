use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::skeleton::JointKind;

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub motion: MotionConfig,
}

/// キャリブレーション・検証エンジンの設定
#[derive(Debug, Deserialize, Clone)]
pub struct MotionConfig {
    /// 肢長を学習するキャリブレーションフレーム数
    #[serde(default = "default_calibration_frames")]
    pub calibration_frames: usize,
    /// 肢長検証の相対パーセント差の許容値
    #[serde(default = "default_length_tolerance")]
    pub length_tolerance: f32,
    /// 許容値超過でもフレーム全体の棄却を引き起こさない関節種
    /// （トラッキング精度の低い末端部位）
    #[serde(default = "default_lenient_joints")]
    pub lenient_joints: Vec<JointKind>,
}

fn default_calibration_frames() -> usize { 50 }
fn default_length_tolerance() -> f32 { 0.3 }
fn default_lenient_joints() -> Vec<JointKind> {
    vec![
        JointKind::HandLeft,
        JointKind::HandTipLeft,
        JointKind::HandRight,
        JointKind::HandTipRight,
        JointKind::ThumbLeft,
        JointKind::ThumbRight,
        JointKind::FootLeft,
        JointKind::FootRight,
        JointKind::Head,
    ]
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            calibration_frames: default_calibration_frames(),
            length_tolerance: default_length_tolerance(),
            lenient_joints: default_lenient_joints(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::load(path).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = MotionConfig::default();
        assert_eq!(config.calibration_frames, 50);
        assert!((config.length_tolerance - 0.3).abs() < 1e-6);
        assert_eq!(config.lenient_joints.len(), 9);
        assert!(config.lenient_joints.contains(&JointKind::Head));
        assert!(!config.lenient_joints.contains(&JointKind::KneeLeft));
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
            [motion]
            calibration_frames = 10
            length_tolerance = 0.5
            lenient_joints = ["HandLeft", "Head"]
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.motion.calibration_frames, 10);
        assert!((config.motion.length_tolerance - 0.5).abs() < 1e-6);
        assert_eq!(
            config.motion.lenient_joints,
            vec![JointKind::HandLeft, JointKind::Head]
        );
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.motion.calibration_frames, 50);
    }
}
