mod matcher;
mod traceback;

pub use matcher::AncestorMatcher;
pub use traceback::{Traceback, TracebackSegment};
