use super::{code::Register, indicators::{IndicatorName, IndicatorSet}};
use crate::advisory::AdvisoryRequest;
use std::time::Duration;

/// Side effects the kernel hands to its host instead of carrying timers itself.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    /// Switch `indicator` off again after `duration`.
    Flash { indicator: IndicatorName, duration: Duration },
    /// Restore the pre-test display after `duration`.
    EndLampTest { duration: Duration, snapshot: LampTestSnapshot },
    /// Ask the advisory collaborator for guidance and append the answer to the log.
    Advise(AdvisoryRequest),
}

/// Display contents captured when a lamp test started.
#[derive(Debug, Clone, PartialEq)]
pub struct LampTestSnapshot {
    /// Sequence number of the lamp test this snapshot belongs to.
    pub seq: u64,
    pub indicators: IndicatorSet,
    pub registers: [Register; 3],
}
