//! # gs1syntax — GS1 AI Syntax Engine
//!
//! Conversion and validation of GS1 Application Identifier (AI) data
//! between its representations, driven by an embedded AI syntax
//! dictionary:
//!
//! - **Bracketed AI data strings**: `(01)12312312312333(10)ABC123`
//! - **Raw data strings**: `^011231231231233310ABC123` with `^` for FNC1
//! - **GS1 Digital Link URIs**: `https://id.gs1.org/01/12312312312333/10/ABC123`
//! - **Barcode scan data**: `]Q3011231231231233310ABC123` + GS separators
//!
//! All inputs converge on one canonical element buffer held by a
//! [`Gs1Encoder`] session; every output representation is generated from
//! it. Parsing validates AI syntax (character sets, lengths, check
//! digits, dates) and the cross-AI association rules (mutually exclusive,
//! requisite and repeated AIs), reporting failures as [`Gs1Error`] with a
//! position-accurate markup of the offending input.
//!
//! ## Usage
//!
//! ```
//! use gs1syntax::{Gs1Encoder, Symbology};
//!
//! let mut enc = Gs1Encoder::new();
//! enc.set_ai_data_str("(01)12312312312333(10)ABC123")?;
//!
//! assert_eq!(enc.data_str(), "^011231231231233310ABC123");
//! assert_eq!(
//!     enc.dl_uri(None)?,
//!     "https://id.gs1.org/01/12312312312333/10/ABC123",
//! );
//!
//! enc.set_sym(Symbology::Qr);
//! assert_eq!(enc.scan_data()?, "]Q3011231231231233310ABC123");
//! # Ok::<(), gs1syntax::Gs1Error>(())
//! ```

pub mod ai;
pub mod dictionary;
mod dl;
pub mod encoder;
pub mod error;
pub mod lint;
pub mod scandata;

pub use ai::{AiValue, ElementKind};
pub use dictionary::{AiEntry, Component};
pub use encoder::{Gs1Encoder, Validation};
pub use error::{Diagnostic, Gs1Error};
pub use lint::{Cset, LintFailure, LintReason, Linter};
pub use scandata::Symbology;
