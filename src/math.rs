use nalgebra::Vector3;

/// エンジン全体で使う3次元ベクトル型（メートル単位）
pub type Vec3 = Vector3<f32>;

/// 絶対誤差による近似比較
pub fn equals(a: f32, b: f32, precision: f32) -> bool {
    (a - b).abs() < precision
}

/// 相対パーセント差が許容範囲内か
///
/// |a - b| / ((a + b) / 2) < tolerance
/// 平均値を分母に取るため、どちらを基準値にしても結果は同じ
pub fn within_percentage_diff(a: f32, b: f32, tolerance: f32) -> bool {
    ((a - b) / ((a + b) / 2.0)).abs() < tolerance
}
