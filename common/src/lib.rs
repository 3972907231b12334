//! Address Eval Common Library
//!
//! 住所レコードの型、照合・比較エンジン、AIレスポンスのパーサー

pub mod types;
pub mod error;
pub mod similarity;
pub mod comparator;
pub mod parser;
pub mod prompts;

pub use types::{AddressField, AddressRecord, normalize_postcode, parse_records};
pub use error::{Error, Result};
pub use similarity::{IndelRatio, LevenshteinRatio, Similarity};
pub use comparator::{
    compare, Comparator, CompareOptions, ComparisonOutcome, DiscrepancyEntry, FieldDifference,
};
pub use parser::{clean_text_response, extract_json, parse_address_response};
pub use prompts::{PromptBook, PromptKind, DEFAULT_PROMPT_VERSION};
