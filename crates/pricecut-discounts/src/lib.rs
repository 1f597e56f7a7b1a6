//! The discount pipeline: eligibility, pricing, per-rule collection,
//! rule orchestration, and the SKU-keyed merge.

pub mod collector;
pub mod eligibility;
pub mod error;
pub mod merge;
pub mod orchestrator;
pub mod output;
pub mod price;

pub use collector::{CollectorStats, VariantCollector};
pub use eligibility::{exclusion_for, is_excluded, ClaimedCollections, Exclusion};
pub use error::DiscountError;
pub use merge::{MergeConflict, MergedPayload, PayloadArtifacts, PayloadMerger};
pub use orchestrator::{DiscountOrchestrator, DiscountRun, RulePlan, SkipReason};
pub use price::discounted_price;
