//! Transport-neutral view of one inbound chat message.

/// One inbound message, reduced to the fields the relay core needs.
///
/// Transports build this from their own update types so handlers never
/// touch transport structs directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Stable sender identifier, matched against the allow-list.
    pub sender_id: String,
    /// Display name recorded on created records.
    pub sender_name: String,
    /// Raw message text.
    pub text: String,
}
