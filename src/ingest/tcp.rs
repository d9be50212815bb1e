//! TCP transport for a frame producer

use std::io::{BufReader, Write};
use std::net::{TcpStream, ToSocketAddrs};

use super::source::{Frame, FrameSource};
use super::wire::{read_frame, START_COMMAND};
use crate::data::Schema;

/// Frame source reading from a producer over TCP.
///
/// Connecting sends the start command; frames are then decoded with the
/// configured schema until the producer closes the connection.
#[derive(Debug)]
pub struct TcpFrameSource {
    reader: BufReader<TcpStream>,
    schema: Schema,
}

impl TcpFrameSource {
    pub fn connect<A: ToSocketAddrs>(addr: A, schema: Schema) -> std::io::Result<Self> {
        let mut stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        stream.write_all(START_COMMAND)?;
        stream.flush()?;
        tracing::info!("Connected to producer at {}", stream.peer_addr()?);

        Ok(Self {
            reader: BufReader::new(stream),
            schema,
        })
    }
}

impl FrameSource for TcpFrameSource {
    fn next_frame(&mut self) -> std::io::Result<Option<Frame>> {
        read_frame(&mut self.reader, &self.schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Value;
    use crate::ingest::wire::write_frame;
    use std::io::Read;
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn test_loopback_stream() {
        let schema = Schema::parse("hour:integer;minute:integer;second:integer").unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server_schema = schema.clone();
        let server = thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();
            let mut command = [0u8; 6];
            socket.read_exact(&mut command).unwrap();
            assert_eq!(&command, START_COMMAND);

            for second in 0..3 {
                let mut frame = Frame::new();
                frame.insert("hour".into(), Value::Int(12));
                frame.insert("minute".into(), Value::Int(0));
                frame.insert("second".into(), Value::Int(second));
                write_frame(&mut socket, &server_schema, &frame).unwrap();
            }
        });

        let mut source = TcpFrameSource::connect(addr, schema).unwrap();
        let mut seconds = Vec::new();
        while let Some(frame) = source.next_frame().unwrap() {
            seconds.push(frame["second"]);
        }
        server.join().unwrap();

        assert_eq!(seconds, vec![Value::Int(0), Value::Int(1), Value::Int(2)]);
    }
}
