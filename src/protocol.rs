/// Represents the basic elements of a protocol
pub trait Protocol {
    /// Type of message returned when decoding
    type Message;

    /// Protocol name string
    fn name() -> &'static str;
}
