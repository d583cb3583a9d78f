pub mod classifier;
pub mod dashboard;
pub mod filter;
pub mod scorer;
pub mod sort;

pub use classifier::{backend_classification, stage_level, LeadClassifier, ThreadRow};
pub use dashboard::{IntegrationHealth, IntegrationHealthEntry, LeadDistribution, SalesOverview};
pub use filter::{ContactFilter, ThreadFilter};
pub use scorer::{KeywordScorer, LeadScorer};
pub use sort::{
    sort_by_last_activity, sort_contacts, sort_threads, ContactSortKey, SortDirection, SortState,
    ThreadSortKey,
};
