pub mod channel;
#[cfg(test)]
pub mod collecting;
pub mod writer;

pub use channel::FrameSink;
#[cfg(test)]
pub use collecting::CollectingEventSink;
pub use writer::WriterSink;
