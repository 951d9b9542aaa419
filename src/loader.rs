use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::config::MotionConfig;
use crate::math::Vec3;
use crate::skeleton::{FramePositions, JointKind, SkeletonHierarchy};

/// センサーログの1行分: タイムスタンプと25関節位置
#[derive(Debug, Clone)]
pub struct MotionFrame {
    pub time: i64,
    pub positions: FramePositions,
}

/// タブ区切り行を1フレームに解析する
///
/// 列0は整数タイムスタンプ、列1以降は関節ごとに3列ずつ
/// (x, y, z)。センサーのX軸は鏡像のため符号を反転して取り込む
pub fn parse_row(line: &str) -> Result<MotionFrame> {
    let columns: Vec<&str> = line.split('\t').collect();
    if columns.len() < 1 + JointKind::COUNT * 3 {
        bail!(
            "expected {} columns, got {}",
            1 + JointKind::COUNT * 3,
            columns.len()
        );
    }

    let time: i64 = columns[0]
        .trim()
        .parse()
        .with_context(|| format!("invalid timestamp '{}'", columns[0]))?;

    let mut positions = [Vec3::zeros(); JointKind::COUNT];
    for (joint, position) in positions.iter_mut().enumerate() {
        let base = 1 + joint * 3;
        let mut components = [0.0f32; 3];
        for (axis, component) in components.iter_mut().enumerate() {
            *component = columns[base + axis].trim().parse().with_context(|| {
                format!("invalid value '{}' in column {}", columns[base + axis], base + axis)
            })?;
        }
        *position = Vec3::new(-components[0], components[1], components[2]);
    }

    Ok(MotionFrame { time, positions })
}

/// リーダーから全フレームを読み込む
/// 空行とタイムスタンプ0の行（センサー起動前）はスキップする
pub fn read_frames<R: BufRead>(reader: R) -> Result<Vec<MotionFrame>> {
    let mut frames = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read row {}", index + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let frame =
            parse_row(&line).with_context(|| format!("failed to parse row {}", index + 1))?;
        if frame.time == 0 {
            continue;
        }
        frames.push(frame);
    }
    Ok(frames)
}

/// モーションログを読み込み、階層へ順に供給する
///
/// キャリブレーション完了まで init、以降は extend_motion で検証する
pub fn load_motion<P: AsRef<Path>>(path: P, config: &MotionConfig) -> Result<SkeletonHierarchy> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("failed to open motion log {:?}", path))?;
    let frames = read_frames(BufReader::new(file))?;

    let mut hierarchy = SkeletonHierarchy::from_config(config);
    for frame in &frames {
        if !hierarchy.is_calibrated() {
            hierarchy.init(&frame.positions);
        } else {
            hierarchy.extend_motion(frame.time, &frame.positions);
        }
    }
    Ok(hierarchy)
}
