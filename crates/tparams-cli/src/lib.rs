//! # tparams-cli — Command-Line Front End
//!
//! Provides the `tparams` binary, a thin shell around the processing
//! pipeline for checking documents against schema definitions from the
//! command line or CI.
//!
//! ## Subcommands
//!
//! - `tparams check`: process one input document and print the result.
//!
//! ```bash
//! tparams check --schema user.yaml --input request.json
//! echo '{"name": "Ada"}' | tparams check --schema user.yaml --format none
//! ```
//!
//! ## Exit Codes
//!
//! `0` when the input is accepted, `1` when it is rejected with a parameter
//! error, `2` on any operational error (unreadable files, bad schema
//! definitions, bad configuration).

pub mod check;
