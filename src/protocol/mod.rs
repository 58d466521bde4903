//! Protocol definitions for co-processor communication.
//!
//! This module contains:
//! - Record encoding/decoding
//! - Operator codes
//! - Exchange sequencing for both transports

pub mod exchange;
pub mod record;

pub use exchange::{Exchange, round_trip, two_phase};
pub use record::{Op, RECORD_LEN, Record};
