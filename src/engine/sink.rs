use anyhow::Result;

/// Destination for emitted events.
///
/// `Err` means the receiving side is gone; producers stop emitting.
pub trait EventSink<E>: Send {
    fn emit(&mut self, event: E) -> Result<()>;
}
