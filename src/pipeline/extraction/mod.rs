pub mod preprocess;
pub mod sentences;
pub mod patterns;
pub mod normalize;
pub mod vocabulary;
pub mod context;
pub mod extractor;
pub mod flavor;

pub use context::ExtractionContext;
pub use extractor::{extract_index, extract_report, match_category, MatchTier, PatternExtraction};
pub use flavor::{detect_report_flavor, parse_period_label};
pub use normalize::{normalize_industry_list, normalize_single_industry};
pub use preprocess::preprocess_index_text;
pub use vocabulary::IndustryVocabulary;
