//! Newline-delimited framing for TCP messages.
//!
//! Wire format: one JSON document per line, terminated by `\n`.

use std::io::{self, BufRead, Read, Write};

use serde::{de::DeserializeOwned, Serialize};

/// Maximum bytes a single frame may occupy. A peer that streams this much
/// without a newline is not speaking the protocol, and buffering its line
/// forever would grow without bound.
pub const MAX_FRAME_BYTES: usize = 64 * 1024;

/// Write one message as a JSON line to a stream.
pub fn write_message<W: Write, T: Serialize>(writer: &mut W, msg: &T) -> io::Result<()> {
    let mut payload = serde_json::to_vec(msg)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    payload.push(b'\n');

    writer.write_all(&payload)?;
    writer.flush()?;

    Ok(())
}

/// Read one JSON line from a stream and decode it.
///
/// Returns `UnexpectedEof` when the stream closes before or inside a
/// frame, and `InvalidData` for malformed JSON or a line that exceeds
/// [`MAX_FRAME_BYTES`].
pub fn read_message<R: BufRead, T: DeserializeOwned>(reader: &mut R) -> io::Result<T> {
    let mut line = Vec::new();
    let n = reader
        .by_ref()
        .take(MAX_FRAME_BYTES as u64 + 1)
        .read_until(b'\n', &mut line)?;

    if n == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "connection closed",
        ));
    }
    if line.last() != Some(&b'\n') {
        if line.len() > MAX_FRAME_BYTES {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("frame too large: {} bytes without a newline", line.len()),
            ));
        }
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "connection closed mid-frame",
        ));
    }

    serde_json::from_slice(&line).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn roundtrip_string() {
        let mut buf = Vec::new();
        write_message(&mut buf, &"hello world".to_string()).unwrap();

        let mut cursor = Cursor::new(buf);
        let result: String = read_message(&mut cursor).unwrap();
        assert_eq!(result, "hello world");
    }

    #[test]
    fn roundtrip_struct() {
        #[derive(Debug, PartialEq, Serialize, serde::Deserialize)]
        struct TestMsg {
            id: u32,
            name: String,
        }

        let msg = TestMsg {
            id: 42,
            name: "test".to_string(),
        };

        let mut buf = Vec::new();
        write_message(&mut buf, &msg).unwrap();

        let mut cursor = Cursor::new(buf);
        let result: TestMsg = read_message(&mut cursor).unwrap();
        assert_eq!(result, msg);
    }

    #[test]
    fn multiple_messages_in_sequence() {
        let mut buf = Vec::new();
        for i in 0..3u32 {
            write_message(&mut buf, &i).unwrap();
        }

        let mut cursor = Cursor::new(buf);
        for expected in 0..3u32 {
            let got: u32 = read_message(&mut cursor).unwrap();
            assert_eq!(got, expected);
        }
    }

    #[test]
    fn clean_eof() {
        let mut cursor = Cursor::new(Vec::new());
        let err = read_message::<_, u32>(&mut cursor).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn eof_mid_frame() {
        let mut cursor = Cursor::new(b"{\"id\":1".to_vec());
        let err = read_message::<_, serde_json::Value>(&mut cursor).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn rejects_oversized_frame() {
        let mut buf = vec![b'x'; MAX_FRAME_BYTES + 10];
        buf.push(b'\n');
        let mut cursor = Cursor::new(buf);
        let err = read_message::<_, String>(&mut cursor).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn rejects_malformed_json() {
        let mut cursor = Cursor::new(b"not json at all\n".to_vec());
        let err = read_message::<_, u32>(&mut cursor).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
