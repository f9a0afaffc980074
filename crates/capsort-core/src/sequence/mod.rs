pub mod plan;
pub mod session;

pub use plan::{Bucket, BucketSummary, DeliveryGroup, DeliveryPlan, SequenceSummary, Sequencer};
pub use session::{BeginOutcome, SessionStore};
