//! URL source: reading the input file and feeding the queue.

mod encoding;
mod producer;

pub use encoding::{decode, detect_bom, DecodeError, SourceEncoding};
pub use producer::{Producer, ProducerStats};
