pub mod context;
pub mod crossfield;
pub mod engine;
pub mod input;
pub mod locate;
pub mod openrtb;
pub mod rules;
pub mod summary;
pub mod tables;

pub use context::{Context, InventoryType, PartnerProfile};
pub use engine::{AnalysisResult, AnalyzeOptions, Analyzer};
pub use input::{split_documents, SplitError};
pub use rules::{Issue, Severity};
pub use summary::AnalysisSummary;
