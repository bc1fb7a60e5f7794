//! The three-valued acknowledgment contract between handlers and the
//! delivery loop.

use std::fmt;

/// Outcome a [`MessageHandler`](crate::MessageHandler) returns for each
/// delivery, driving exactly one acknowledgment primitive.
///
/// The enum is closed: the compiler's exhaustiveness check guarantees the
/// delivery loop handles every value, so there is no runtime fallback for an
/// "unknown" disposition — a fourth value cannot exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Disposition {
    /// Processing succeeded; remove the message permanently.
    Ack,
    /// Transient failure; put the message back on the queue for redelivery.
    NackRequeue,
    /// Unrecoverable or poison message; remove it with dead-letter routing.
    NackDiscard,
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Disposition::Ack => "ack",
            Disposition::NackRequeue => "nack-requeue",
            Disposition::NackDiscard => "nack-discard",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names() {
        assert_eq!(Disposition::Ack.to_string(), "ack");
        assert_eq!(Disposition::NackRequeue.to_string(), "nack-requeue");
        assert_eq!(Disposition::NackDiscard.to_string(), "nack-discard");
    }
}
