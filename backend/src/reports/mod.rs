//! Report assembly over the CRM store.

pub mod assembler;
pub mod decode;
pub mod duration;
pub mod enrichment;
pub mod escalation;
pub mod filter;
pub mod identity;
pub mod localtime;
pub mod related;
pub mod stage;

pub use assembler::{EnrichmentSettings, ReportAssembler};
pub use identity::CustomerKind;
