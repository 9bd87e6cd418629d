//! Extractive summarization of conversation histories.
//!
//! - `importance`: salience score of one interaction within a history
//! - `compressor`: token estimation and proportional truncation
//! - `topics`: frequency-based key topic extraction
//! - `period`: hourly/daily/weekly bucketing
//! - `summarizer`: budgeted selection and rendering

pub mod compressor;
pub mod importance;
pub mod period;
pub mod summarizer;
pub mod topics;

pub use compressor::{compress, estimate_tokens};
pub use importance::score;
pub use period::{PeriodSummary, SummarizationPeriod, end_of_period, start_of_period};
pub use summarizer::{ConversationSummary, Summarizer};
pub use topics::extract_topics;
