//! Binary frame codec
//!
//! A frame is one 4-byte big-endian word per schema field, in schema order:
//! `integer` fields are two's-complement i32, `float` fields IEEE-754 f32.
//! There is no header or delimiter between frames.

use std::io::{self, Read, Write};

use super::source::Frame;
use crate::data::{FieldKind, Schema, Value};

/// Command a client sends to open a stream
pub const START_COMMAND: &[u8] = b"start\n";

/// Bytes per encoded field
pub const WORD_SIZE: usize = 4;

/// Encoded size of one frame
pub fn frame_size(schema: &Schema) -> usize {
    schema.len() * WORD_SIZE
}

/// Encode a frame in schema order
pub fn write_frame<W: Write>(writer: &mut W, schema: &Schema, frame: &Frame) -> io::Result<()> {
    for field in schema.fields() {
        let value = frame.get(&field.name).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("frame missing field '{}'", field.name),
            )
        })?;
        let word = match (field.kind, value) {
            (FieldKind::Int, Value::Int(v)) => v.to_be_bytes(),
            (FieldKind::Float, Value::Float(v)) => v.to_be_bytes(),
            (kind, other) => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("field '{}' expects {}, got {}", field.name, kind, other.kind()),
                ))
            }
        };
        writer.write_all(&word)?;
    }
    Ok(())
}

/// Decode the next frame. Returns `Ok(None)` on a clean end of stream at a
/// frame boundary and `UnexpectedEof` when the stream stops mid-frame.
pub fn read_frame<R: Read>(reader: &mut R, schema: &Schema) -> io::Result<Option<Frame>> {
    let mut frame = Frame::new();

    for (position, field) in schema.fields().iter().enumerate() {
        let mut word = [0u8; WORD_SIZE];
        let filled = fill(reader, &mut word)?;
        if filled == 0 && position == 0 {
            return Ok(None);
        }
        if filled < WORD_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("stream ended inside field '{}'", field.name),
            ));
        }

        let value = match field.kind {
            FieldKind::Int => Value::Int(i32::from_be_bytes(word)),
            FieldKind::Float => Value::Float(f32::from_be_bytes(word)),
        };
        frame.insert(field.name.clone(), value);
    }

    Ok(Some(frame))
}

/// Read until `buf` is full or the stream ends; returns bytes read
fn fill<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
