use std::collections::{BTreeMap, VecDeque};
use std::io;

use crate::data::Value;

/// One decoded frame: field name to raw value
pub type Frame = BTreeMap<String, Value>;

/// Producer of decoded frames. `Ok(None)` marks the end of the stream.
///
/// Implementations may block until the next frame is available.
pub trait FrameSource {
    fn next_frame(&mut self) -> io::Result<Option<Frame>>;
}

/// In-memory frame source
#[derive(Debug, Clone, Default)]
pub struct VecSource {
    frames: VecDeque<Frame>,
}

impl VecSource {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames: frames.into(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for VecSource {
    fn next_frame(&mut self) -> io::Result<Option<Frame>> {
        Ok(self.frames.pop_front())
    }
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame(&mut self) -> io::Result<Option<Frame>> {
        (**self).next_frame()
    }
}
