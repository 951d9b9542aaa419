use serde::{Deserialize, Serialize};

use crate::math::Vec3;

/// Kinect v2 の 25 関節インデックス
///
/// 値はセンサー出力の列順と一致する（固定、実行時に拡張されない）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(usize)]
pub enum JointKind {
    SpineBase = 0,
    SpineMid = 1,
    Neck = 2,
    Head = 3,
    ShoulderLeft = 4,
    ElbowLeft = 5,
    WristLeft = 6,
    HandLeft = 7,
    ShoulderRight = 8,
    ElbowRight = 9,
    WristRight = 10,
    HandRight = 11,
    HipLeft = 12,
    KneeLeft = 13,
    AnkleLeft = 14,
    FootLeft = 15,
    HipRight = 16,
    KneeRight = 17,
    AnkleRight = 18,
    FootRight = 19,
    SpineShoulder = 20,
    HandTipLeft = 21,
    ThumbLeft = 22,
    HandTipRight = 23,
    ThumbRight = 24,
}

impl JointKind {
    pub const COUNT: usize = 25;

    /// 全関節種を序数順に列挙
    pub fn all() -> impl Iterator<Item = Self> {
        (0..Self::COUNT).map(|i| Self::from_index(i).unwrap())
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::SpineBase),
            1 => Some(Self::SpineMid),
            2 => Some(Self::Neck),
            3 => Some(Self::Head),
            4 => Some(Self::ShoulderLeft),
            5 => Some(Self::ElbowLeft),
            6 => Some(Self::WristLeft),
            7 => Some(Self::HandLeft),
            8 => Some(Self::ShoulderRight),
            9 => Some(Self::ElbowRight),
            10 => Some(Self::WristRight),
            11 => Some(Self::HandRight),
            12 => Some(Self::HipLeft),
            13 => Some(Self::KneeLeft),
            14 => Some(Self::AnkleLeft),
            15 => Some(Self::FootLeft),
            16 => Some(Self::HipRight),
            17 => Some(Self::KneeRight),
            18 => Some(Self::AnkleRight),
            19 => Some(Self::FootRight),
            20 => Some(Self::SpineShoulder),
            21 => Some(Self::HandTipLeft),
            22 => Some(Self::ThumbLeft),
            23 => Some(Self::HandTipRight),
            24 => Some(Self::ThumbRight),
            _ => None,
        }
    }

    /// 骨格トポロジー上の親関節（SpineBase がルート）
    pub fn parent(self) -> Option<Self> {
        match self {
            Self::SpineBase => None,
            Self::SpineMid => Some(Self::SpineBase),
            Self::Neck => Some(Self::SpineShoulder),
            Self::Head => Some(Self::Neck),
            Self::ShoulderLeft => Some(Self::SpineShoulder),
            Self::ElbowLeft => Some(Self::ShoulderLeft),
            Self::WristLeft => Some(Self::ElbowLeft),
            Self::HandLeft => Some(Self::WristLeft),
            Self::ShoulderRight => Some(Self::SpineShoulder),
            Self::ElbowRight => Some(Self::ShoulderRight),
            Self::WristRight => Some(Self::ElbowRight),
            Self::HandRight => Some(Self::WristRight),
            Self::HipLeft => Some(Self::SpineBase),
            Self::KneeLeft => Some(Self::HipLeft),
            Self::AnkleLeft => Some(Self::KneeLeft),
            Self::FootLeft => Some(Self::AnkleLeft),
            Self::HipRight => Some(Self::SpineBase),
            Self::KneeRight => Some(Self::HipRight),
            Self::AnkleRight => Some(Self::KneeRight),
            Self::FootRight => Some(Self::AnkleRight),
            Self::SpineShoulder => Some(Self::SpineMid),
            Self::HandTipLeft => Some(Self::HandLeft),
            Self::ThumbLeft => Some(Self::HandLeft),
            Self::HandTipRight => Some(Self::HandRight),
            Self::ThumbRight => Some(Self::HandRight),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::SpineBase => "SpineBase",
            Self::SpineMid => "SpineMid",
            Self::Neck => "Neck",
            Self::Head => "Head",
            Self::ShoulderLeft => "ShoulderLeft",
            Self::ElbowLeft => "ElbowLeft",
            Self::WristLeft => "WristLeft",
            Self::HandLeft => "HandLeft",
            Self::ShoulderRight => "ShoulderRight",
            Self::ElbowRight => "ElbowRight",
            Self::WristRight => "WristRight",
            Self::HandRight => "HandRight",
            Self::HipLeft => "HipLeft",
            Self::KneeLeft => "KneeLeft",
            Self::AnkleLeft => "AnkleLeft",
            Self::FootLeft => "FootLeft",
            Self::HipRight => "HipRight",
            Self::KneeRight => "KneeRight",
            Self::AnkleRight => "AnkleRight",
            Self::FootRight => "FootRight",
            Self::SpineShoulder => "SpineShoulder",
            Self::HandTipLeft => "HandTipLeft",
            Self::ThumbLeft => "ThumbLeft",
            Self::HandTipRight => "HandTipRight",
            Self::ThumbRight => "ThumbRight",
        }
    }
}

/// 1フレーム分の25関節位置（JointKind の序数順）
pub type FramePositions = [Vec3; JointKind::COUNT];

/// ある瞬間に観測された1つの関節
///
/// position は生成時に確定。offset（親関節位置からこの関節位置へのベクトル）は
/// 階層へ組み込まれる際に一度だけ設定される
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Joint {
    kind: JointKind,
    position: Vec3,
    offset: Vec3,
}

impl Joint {
    pub fn new(kind: JointKind, position: Vec3) -> Self {
        Self {
            kind,
            position,
            offset: Vec3::zeros(),
        }
    }

    pub fn kind(&self) -> JointKind {
        self.kind
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    pub fn set_offset(&mut self, offset: Vec3) {
        self.offset = offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_index_roundtrip() {
        for i in 0..JointKind::COUNT {
            let kind = JointKind::from_index(i).unwrap();
            assert_eq!(kind as usize, i);
        }
        assert_eq!(JointKind::from_index(25), None);
    }

    #[test]
    fn test_root_has_no_parent() {
        assert_eq!(JointKind::SpineBase.parent(), None);
        for kind in JointKind::all().filter(|k| *k != JointKind::SpineBase) {
            assert!(kind.parent().is_some(), "{} should have a parent", kind.name());
        }
    }

    #[test]
    fn test_topology_chains() {
        // 左脚: SpineBase → HipLeft → KneeLeft → AnkleLeft → FootLeft
        assert_eq!(JointKind::FootLeft.parent(), Some(JointKind::AnkleLeft));
        assert_eq!(JointKind::AnkleLeft.parent(), Some(JointKind::KneeLeft));
        assert_eq!(JointKind::KneeLeft.parent(), Some(JointKind::HipLeft));
        assert_eq!(JointKind::HipLeft.parent(), Some(JointKind::SpineBase));
        // 頭部: SpineMid → SpineShoulder → Neck → Head
        assert_eq!(JointKind::Head.parent(), Some(JointKind::Neck));
        assert_eq!(JointKind::Neck.parent(), Some(JointKind::SpineShoulder));
        assert_eq!(JointKind::SpineShoulder.parent(), Some(JointKind::SpineMid));
        // 右手指: HandRight → {ThumbRight, HandTipRight}
        assert_eq!(JointKind::ThumbRight.parent(), Some(JointKind::HandRight));
        assert_eq!(JointKind::HandTipRight.parent(), Some(JointKind::HandRight));
    }

    #[test]
    fn test_topology_acyclic() {
        // 全関節からルートまで辿れること（サイクルなし）
        for kind in JointKind::all() {
            let mut current = kind;
            let mut steps = 0;
            while let Some(parent) = current.parent() {
                current = parent;
                steps += 1;
                assert!(steps <= JointKind::COUNT, "cycle detected at {}", kind.name());
            }
            assert_eq!(current, JointKind::SpineBase);
        }
    }

    #[test]
    fn test_joint_offset_starts_zero() {
        let joint = Joint::new(JointKind::Head, Vec3::new(0.1, 1.7, 0.2));
        assert_eq!(joint.offset(), Vec3::zeros());
        assert_eq!(joint.position(), Vec3::new(0.1, 1.7, 0.2));
    }
}
