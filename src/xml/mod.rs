//! @acp:module "XML"
//! @acp:summary "Minimal owned XML tree used to merge ACBF documents"
//! @acp:domain xml
//! @acp:layer service
//!
//! ACBF documents are edited in place: unknown elements (text layers, frames,
//! references) must survive a rewrite, so documents are parsed into a full
//! element tree rather than deserialized into fixed structs.

pub mod element;
pub mod io;

pub use element::Element;
pub use io::{parse, to_bytes, to_string};
