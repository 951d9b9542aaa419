pub mod hierarchy;
pub mod joint;
pub mod stream;

pub use hierarchy::{FrameOutcome, SkeletonHierarchy};
pub use joint::{FramePositions, Joint, JointKind};
pub use stream::JointStream;
