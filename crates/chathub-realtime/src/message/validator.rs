//! Message validation rules.

use super::serializer::InboundError;

/// Checks the raw size and content of an inbound text frame before parsing.
pub fn validate_inbound(raw: &str, max_bytes: usize) -> Result<(), InboundError> {
    if raw.len() > max_bytes {
        return Err(InboundError::TooLarge {
            size: raw.len(),
            limit: max_bytes,
        });
    }

    if raw.trim().is_empty() {
        return Err(InboundError::Empty);
    }

    Ok(())
}
