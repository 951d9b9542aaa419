use crate::config::MotionConfig;
use crate::math::{within_percentage_diff, Vec3};
use crate::skeleton::joint::{FramePositions, Joint, JointKind};
use crate::skeleton::stream::JointStream;

/// 縮退フレーム判定のバウンディングボックス閾値（メートル）
/// 全関節がほぼ1点に潰れたグリッチフレームを検出する
const STILL_EXTENT_X: f32 = 0.1;
const STILL_EXTENT_Y: f32 = 0.01;
const STILL_EXTENT_Z: f32 = 0.1;

/// 2フェーズ状態機械の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// キャリブレーション中（受理済みフレーム数を保持）
    Collecting { frames_seen: usize },
    /// 校正確定後のトラッキングフェーズ（終端状態）
    Calibrated,
}

/// 1フレーム処理の結果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    /// キャリブレーションフレームとして受理、まだ収集中
    Collecting,
    /// このフレームでキャリブレーションが確定した
    Calibrated,
    /// トラッキングフレームとして受理
    Accepted,
    /// 縮退フレーム（静止判定）として破棄、状態変化なし
    Degenerate,
    /// 肢長違反によりフレーム全体を棄却、状態変化なし
    Rejected {
        /// 最初に違反を検出した関節種
        kind: JointKind,
        /// 基準肢長と計測肢長の差（メートル）
        deviation: f32,
    },
}

/// 25本の関節ストリームを固定トポロジーに結線した骨格階層
///
/// キャプチャセッションごとに1つ生成され、フレーム列を順に消費する。
/// キャリブレーション中は観測を蓄積して肢長の中央値を学習し、
/// 確定後は各フレームを学習済み肢長に対して検証する。
/// init / extend_motion は原子的で、25本全てのストリームに1件ずつ
/// 追加されるか、1件も追加されないかのどちらか（履歴長は常に全本一致）
pub struct SkeletonHierarchy {
    streams: [JointStream; JointKind::COUNT],
    /// 受理したトラッキングフレームのタイムスタンプ列
    times: Vec<i64>,
    phase: Phase,
    calibration_frames: usize,
    length_tolerance: f32,
    lenient: [bool; JointKind::COUNT],
}

impl SkeletonHierarchy {
    pub fn new() -> Self {
        Self::from_config(&MotionConfig::default())
    }

    pub fn from_config(config: &MotionConfig) -> Self {
        let mut streams: [JointStream; JointKind::COUNT] =
            std::array::from_fn(|i| JointStream::new(JointKind::from_index(i).unwrap()));

        // 親テーブルから子リンク（序数参照のみ）を構築
        for kind in JointKind::all() {
            if let Some(parent) = kind.parent() {
                streams[parent as usize].add_child(kind);
            }
        }

        let mut lenient = [false; JointKind::COUNT];
        for kind in &config.lenient_joints {
            lenient[*kind as usize] = true;
        }

        Self {
            streams,
            times: Vec::new(),
            phase: Phase::Collecting { frames_seen: 0 },
            calibration_frames: config.calibration_frames,
            length_tolerance: config.length_tolerance,
            lenient,
        }
    }

    pub fn is_calibrated(&self) -> bool {
        self.phase == Phase::Calibrated
    }

    /// キャリブレーション中に受理したフレーム数
    pub fn frames_collected(&self) -> usize {
        match self.phase {
            Phase::Collecting { frames_seen } => frames_seen,
            Phase::Calibrated => self.calibration_frames,
        }
    }

    /// キャリブレーションフレームを取り込む
    ///
    /// 収集数が設定値に達したフレームで各ストリームの肢長を確定し、
    /// トラッキングフェーズへ遷移する（確定は一度だけ起こる）。
    /// 校正確定後に呼ぶのは状態機械の誤用であり panic する
    pub fn init(&mut self, positions: &FramePositions) -> FrameOutcome {
        let Phase::Collecting { frames_seen } = self.phase else {
            panic!("init called after calibration completed");
        };

        if Self::is_degenerate(positions) {
            return FrameOutcome::Degenerate;
        }

        self.commit_frame(positions);

        let seen = frames_seen + 1;
        if seen < self.calibration_frames {
            self.phase = Phase::Collecting { frames_seen: seen };
            return FrameOutcome::Collecting;
        }

        // 閾値到達: 各ストリームでオフセット長の中央値を代表として肢長を確定
        for stream in &mut self.streams {
            stream.finalize_calibration();
        }
        self.phase = Phase::Calibrated;
        FrameOutcome::Calibrated
    }

    /// トラッキングフレームを検証して受理または棄却する
    ///
    /// 全トポロジーエッジの計測肢長を基準肢長と比較し、許容値を超える
    /// エッジが1つでもあれば（末端許容リスト該当を除き）フレーム全体を
    /// 棄却する。検証は候補フレームのバッファのみで行い、棄却時は
    /// どのストリームにも一切触れない。
    /// キャリブレーション未完了で呼ぶのは状態機械の誤用であり panic する
    pub fn extend_motion(&mut self, time: i64, positions: &FramePositions) -> FrameOutcome {
        assert!(
            self.is_calibrated(),
            "extend_motion called before calibration completed"
        );

        if Self::is_degenerate(positions) {
            return FrameOutcome::Degenerate;
        }

        for kind in JointKind::all() {
            let Some(parent) = kind.parent() else { continue };

            let current_offset = positions[kind as usize] - positions[parent as usize];
            let current_length = current_offset.norm();
            let reference_length = self.streams[kind as usize].limb_length();

            if !within_percentage_diff(reference_length, current_length, self.length_tolerance)
                && !self.lenient[kind as usize]
            {
                return FrameOutcome::Rejected {
                    kind,
                    deviation: (reference_length - current_length).abs(),
                };
            }
        }

        self.commit_frame(positions);
        self.times.push(time);
        FrameOutcome::Accepted
    }

    /// 25関節を一括追加し、各子関節のオフセットを親位置との差分で設定する
    fn commit_frame(&mut self, positions: &FramePositions) {
        for kind in JointKind::all() {
            let mut joint = Joint::new(kind, positions[kind as usize]);
            if let Some(parent) = kind.parent() {
                joint.set_offset(positions[kind as usize] - positions[parent as usize]);
            }
            self.streams[kind as usize].append(joint);
        }
    }

    /// 静止判定: 全関節のAABBが閾値未満に潰れているか
    fn is_degenerate(positions: &FramePositions) -> bool {
        let mut min = Vec3::repeat(f32::MAX);
        let mut max = Vec3::repeat(f32::MIN);
        for position in positions {
            min = min.inf(position);
            max = max.sup(position);
        }
        let extent = max - min;
        extent.x < STILL_EXTENT_X && extent.y < STILL_EXTENT_Y && extent.z < STILL_EXTENT_Z
    }

    pub fn stream(&self, kind: JointKind) -> &JointStream {
        &self.streams[kind as usize]
    }

    pub fn streams(&self) -> &[JointStream] {
        &self.streams
    }

    /// 校正済みの肢長（基準オフセットの大きさ）
    pub fn limb_length(&self, kind: JointKind) -> f32 {
        self.streams[kind as usize].limb_length()
    }

    /// 全関節種の校正済み肢長（キャリブレーション結果の一覧表示用）
    pub fn limb_lengths(&self) -> Vec<(JointKind, f32)> {
        JointKind::all()
            .map(|kind| (kind, self.limb_length(kind)))
            .collect()
    }

    /// 受理済みトラッキングフレームのタイムスタンプ
    pub fn time(&self, index: usize) -> i64 {
        self.times[index]
    }

    /// 受理済みトラッキングフレーム数
    pub fn tracked_frames(&self) -> usize {
        self.times.len()
    }
}

impl Default for SkeletonHierarchy {
    fn default() -> Self {
        Self::new()
    }
}
