pub mod envelope;

pub use envelope::{EnvelopeError, ListPath, check_status_code, extract_list};
