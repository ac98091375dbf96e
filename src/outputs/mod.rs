//! Output artifacts of the aggregate and export stages.
//!
//! # Submodules
//!
//! - [`json`]: the per-year weekly summary
//! - [`workbook`]: `.xlsx` export, one sheet per term or synonym group
//!
//! # Output Structure
//!
//! ```text
//! data/text/summary/
//! ├── 2014.json       # weekly counts per tracked term
//! ├── terms.xlsx      # one sheet per tracked term
//! └── synonyms.xlsx   # merged groups, then uncovered terms
//! ```

pub mod json;
pub mod workbook;
