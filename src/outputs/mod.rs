//! Snapshot output for the cleaning and translation stages.
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── all_cleaned_data_2025-05-06_143000.json     # --debug only
//! └── all_translated_data_2025-05-06_143012.json  # rewritten after every item
//! ```

pub mod json;
