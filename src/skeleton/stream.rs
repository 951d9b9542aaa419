use crate::math::{equals, Vec3};
use crate::skeleton::joint::{Joint, JointKind};

/// 基準オフセットが未設定とみなされる長さの閾値
const ZERO_OFFSET_EPSILON: f32 = 1e-4;

/// 1つの関節種の観測履歴と校正済み基準オフセットを保持するストリーム
///
/// キャリブレーション中は受理フレームごとに履歴が1件ずつ伸び、
/// 校正確定後は代表関節1件に縮約される。子ストリームへのリンクは
/// 序数参照（JointKind）のみで、所有関係を持たない
#[derive(Debug, Clone)]
pub struct JointStream {
    kind: JointKind,
    history: Vec<Joint>,
    children: Vec<JointKind>,
    reference_offset: Vec3,
}

impl JointStream {
    pub fn new(kind: JointKind) -> Self {
        Self {
            kind,
            history: Vec::new(),
            children: Vec::new(),
            reference_offset: Vec3::zeros(),
        }
    }

    pub fn kind(&self) -> JointKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn add_child(&mut self, kind: JointKind) {
        self.children.push(kind);
    }

    pub fn children(&self) -> &[JointKind] {
        &self.children
    }

    /// 観測関節を履歴へ追加
    /// 呼び出し側が joint.kind == self.kind を保証する
    pub fn append(&mut self, joint: Joint) {
        debug_assert_eq!(joint.kind(), self.kind);
        self.history.push(joint);
    }

    pub fn history(&self) -> &[Joint] {
        &self.history
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// 最新の関節。履歴が空の場合は呼び出し側の状態機械誤用であり panic する
    pub fn last_joint(&self) -> &Joint {
        self.history.last().expect("joint stream is empty")
    }

    /// 最新から2番目の関節。履歴が2件未満なら panic する
    pub fn penultimate_joint(&self) -> &Joint {
        &self.history[self.history.len() - 2]
    }

    pub fn reference_offset(&self) -> Vec3 {
        self.reference_offset
    }

    /// 校正済みの肢長（基準オフセットの大きさ）
    pub fn limb_length(&self) -> f32 {
        self.reference_offset.norm()
    }

    /// 基準オフセットを設定する
    ///
    /// 未設定（大きさ≈0）なら新しいオフセットをそのまま採用。
    /// 既に基準がある場合は方向を保ったまま長さのみ平均する
    /// （新サンプルの方向は取り込まない）
    pub fn set_reference_offset(&mut self, offset: Vec3) {
        if equals(self.reference_offset.norm(), 0.0, ZERO_OFFSET_EPSILON) {
            self.reference_offset = offset;
        } else {
            let measured_length = offset.norm();
            let current_length = self.reference_offset.norm();
            let new_length = (measured_length + current_length) / 2.0;
            self.reference_offset = self.reference_offset.normalize() * new_length;
        }
    }

    /// キャリブレーション確定: 履歴をオフセット長でソートし、
    /// 中央値の関節を代表として基準オフセットを設定、履歴を代表1件に縮約する
    pub fn finalize_calibration(&mut self) {
        self.history
            .sort_by(|a, b| a.offset().norm().total_cmp(&b.offset().norm()));
        let representative = self.history[self.history.len() / 2];
        self.set_reference_offset(representative.offset());
        self.history.clear();
        self.history.push(representative);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joint_with_offset(kind: JointKind, offset: Vec3) -> Joint {
        let mut joint = Joint::new(kind, Vec3::zeros());
        joint.set_offset(offset);
        joint
    }

    #[test]
    fn test_reference_offset_set_when_zero() {
        let mut stream = JointStream::new(JointKind::KneeLeft);
        stream.set_reference_offset(Vec3::new(0.0, -0.4, 0.0));
        assert_eq!(stream.reference_offset(), Vec3::new(0.0, -0.4, 0.0));
        assert!((stream.limb_length() - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_reference_offset_blends_magnitude_only() {
        let mut stream = JointStream::new(JointKind::KneeLeft);
        stream.set_reference_offset(Vec3::new(0.0, -0.4, 0.0));
        // 直交方向の新サンプル: 方向は既存のまま、長さのみ平均される
        stream.set_reference_offset(Vec3::new(0.6, 0.0, 0.0));
        let reference = stream.reference_offset();
        assert!((stream.limb_length() - 0.5).abs() < 1e-6);
        assert!(reference.x.abs() < 1e-6);
        assert!((reference.y + 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_last_and_penultimate() {
        let mut stream = JointStream::new(JointKind::Head);
        stream.append(Joint::new(JointKind::Head, Vec3::new(0.0, 1.0, 0.0)));
        stream.append(Joint::new(JointKind::Head, Vec3::new(0.0, 2.0, 0.0)));
        assert_eq!(stream.last_joint().position().y, 2.0);
        assert_eq!(stream.penultimate_joint().position().y, 1.0);
    }

    #[test]
    #[should_panic]
    fn test_last_joint_empty_panics() {
        let stream = JointStream::new(JointKind::Head);
        stream.last_joint();
    }

    #[test]
    #[should_panic]
    fn test_penultimate_single_panics() {
        let mut stream = JointStream::new(JointKind::Head);
        stream.append(Joint::new(JointKind::Head, Vec3::zeros()));
        stream.penultimate_joint();
    }

    #[test]
    fn test_finalize_picks_median_by_offset_magnitude() {
        let mut stream = JointStream::new(JointKind::KneeLeft);
        // 長さ 0.1, 0.4, 0.4, 0.4, 5.0 → 中央値は 0.4
        for len in [0.4, 5.0, 0.1, 0.4, 0.4] {
            stream.append(joint_with_offset(JointKind::KneeLeft, Vec3::new(0.0, -len, 0.0)));
        }
        stream.finalize_calibration();
        assert_eq!(stream.len(), 1);
        assert!((stream.limb_length() - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_finalize_resists_outliers() {
        let mut stream = JointStream::new(JointKind::ElbowLeft);
        // 大半が0.3、少数のスパイクが混じる（センサーウォームアップ想定）
        for len in [0.3, 0.3, 2.5, 0.3, 0.31, 0.29, 3.0] {
            stream.append(joint_with_offset(JointKind::ElbowLeft, Vec3::new(len, 0.0, 0.0)));
        }
        stream.finalize_calibration();
        assert!(stream.limb_length() < 0.5, "median should ignore spikes, got {}", stream.limb_length());
    }
}
