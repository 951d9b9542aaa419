use crate::skeleton::SkeletonHierarchy;

/// 表示座標系への平行移動オフセット
const DISPLAY_SHIFT_X: f32 = 0.05;
const DISPLAY_SHIFT_Y: f32 = 0.3;
const DISPLAY_SHIFT_Z: f32 = 0.1;

/// 関節種ごとの保持履歴を表示用座標へ変換する
///
/// エンジンはセンサー座標をそのまま保持するため、表示側で
/// X/Z の符号反転と平行移動を行う。戻り値は序数順に25本の軌跡
pub fn display_positions(hierarchy: &SkeletonHierarchy) -> Vec<Vec<[f32; 3]>> {
    hierarchy
        .streams()
        .iter()
        .map(|stream| {
            stream
                .history()
                .iter()
                .map(|joint| {
                    let p = joint.position();
                    [
                        -p.x + DISPLAY_SHIFT_X,
                        p.y + DISPLAY_SHIFT_Y,
                        -p.z + DISPLAY_SHIFT_Z,
                    ]
                })
                .collect()
        })
        .collect()
}
