//! Query and conditional-render types.

use bitflags::bitflags;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum QueryTarget {
    SamplesPassed,
    AnySamplesPassed,
    AnySamplesPassedConservative,
    TimeElapsed,
    Timestamp,
    PrimitivesGenerated,
    TransformFeedbackPrimitivesWritten,
}

bitflags! {
    /// Options of a query result readback.
    pub struct QueryResultFlags: u8 {
        /// Read 64-bit results; 32-bit otherwise.
        const RESULT_64 = 0b001;
        /// Wait for the result instead of returning the latest available.
        const WAIT = 0b010;
        /// Interleave an availability word after each result.
        const WITH_AVAILABILITY = 0b100;
    }
}

/// Flavor of a conditional-render scope.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ConditionalRenderMode {
    QueryWait,
    QueryNoWait,
    QueryByRegionWait,
    QueryByRegionNoWait,
    QueryWaitInverted,
    QueryNoWaitInverted,
    QueryByRegionWaitInverted,
    QueryByRegionNoWaitInverted,
}
