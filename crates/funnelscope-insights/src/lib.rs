pub mod bottleneck;
pub mod error;
pub mod plan;

pub use bottleneck::{
    Bottleneck, BottleneckRule, BottleneckRules, Severity, identify_bottlenecks,
    identify_bottlenecks_checked,
};
pub use error::{Error, Result};
pub use plan::{ActionItem, Impact, build_action_plan};
