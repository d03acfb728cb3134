//! The binary container: a `u16` frame-rate header followed by frame
//! segments, each a run of `(u16 x, u16 y, u16 w, u16 h)` records closed by
//! the all-zero sentinel. Little-endian, no frame count, no length prefix;
//! the write and read paths share only this format and must stay
//! bit-compatible.

use std::io::{ErrorKind, Read, Write};

use rectcast_types::{Rect, wire};
use thiserror::Error;

pub type ContainerResult<T> = Result<T, ContainerError>;

#[derive(Debug, Error)]
pub enum ContainerError {
    /// A rectangle field does not fit the 16-bit wire format. Failing fast
    /// here beats silently wrapping coordinates into corrupt geometry.
    #[error("frame {frame}: rectangle {field}={value} exceeds the u16 wire format")]
    OutOfRange {
        field: &'static str,
        value: u32,
        frame: u64,
    },

    /// The extractor upholds width/height >= 1; a sentinel-shaped rectangle
    /// reaching the writer would corrupt the framing.
    #[error("frame {frame}: refusing to write a sentinel-shaped rectangle")]
    SentinelCollision { frame: u64 },

    /// The stream ended inside a fixed-width record, which no well-formed
    /// writer produces. Distinct from running out of frames at a record
    /// boundary.
    #[error("container truncated mid-record at byte offset {offset}")]
    TruncatedStream { offset: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct ContainerWriter<W: Write> {
    inner: W,
    frames_written: u64,
    rects_written: u64,
}

impl<W: Write> ContainerWriter<W> {
    /// Writes the frame-rate header immediately.
    pub fn new(mut inner: W, frame_rate: u16) -> ContainerResult<Self> {
        inner.write_all(&frame_rate.to_le_bytes())?;
        Ok(Self {
            inner,
            frames_written: 0,
            rects_written: 0,
        })
    }

    /// Appends one frame segment: every rectangle, then the sentinel. An
    /// empty slice is a valid, fully-background frame.
    pub fn write_frame(&mut self, rects: &[Rect]) -> ContainerResult<()> {
        for rect in rects {
            if rect.is_sentinel() {
                return Err(ContainerError::SentinelCollision {
                    frame: self.frames_written,
                });
            }
            self.write_record(rect)?;
            self.rects_written += 1;
        }
        self.write_record(&Rect::SENTINEL)?;
        self.frames_written += 1;
        Ok(())
    }

    fn write_record(&mut self, rect: &Rect) -> ContainerResult<()> {
        let mut record = [0u8; wire::RECT_RECORD_SIZE];
        let fields = [
            ("x", rect.x),
            ("y", rect.y),
            ("width", rect.width),
            ("height", rect.height),
        ];
        for (slot, (field, value)) in fields.iter().enumerate() {
            let narrow = u16::try_from(*value).map_err(|_| ContainerError::OutOfRange {
                field,
                value: *value,
                frame: self.frames_written,
            })?;
            record[slot * 2..slot * 2 + 2].copy_from_slice(&narrow.to_le_bytes());
        }
        self.inner.write_all(&record)?;
        Ok(())
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    pub fn rects_written(&self) -> u64 {
        self.rects_written
    }

    /// Flushes and returns the number of frames written.
    pub fn finish(mut self) -> ContainerResult<u64> {
        self.inner.flush()?;
        Ok(self.frames_written)
    }
}

#[derive(Debug)]
pub struct ContainerReader<R: Read> {
    inner: R,
    frame_rate: u16,
    offset: u64,
    done: bool,
}

impl<R: Read> ContainerReader<R> {
    /// Reads the frame-rate header. An empty or header-truncated stream is
    /// malformed, not merely short.
    pub fn new(mut inner: R) -> ContainerResult<Self> {
        let mut header = [0u8; wire::FRAME_RATE_SIZE];
        read_full(&mut inner, &mut header, 0)?
            .ok_or(ContainerError::TruncatedStream { offset: 0 })?;
        Ok(Self {
            inner,
            frame_rate: u16::from_le_bytes(header),
            offset: wire::DATA_START as u64,
            done: false,
        })
    }

    pub fn frame_rate(&self) -> u16 {
        self.frame_rate
    }

    /// Next frame's rectangle list, or `Ok(None)` at end of stream.
    ///
    /// EOF at a record boundary ends the stream; a frame missing its
    /// sentinel is dropped rather than surfaced, matching the reference
    /// decoder. EOF inside a record is `TruncatedStream`.
    pub fn next_frame(&mut self) -> ContainerResult<Option<Vec<Rect>>> {
        if self.done {
            return Ok(None);
        }
        let mut rects = Vec::new();
        loop {
            let mut record = [0u8; wire::RECT_RECORD_SIZE];
            match read_full(&mut self.inner, &mut record, self.offset)? {
                None => {
                    self.done = true;
                    return Ok(None);
                }
                Some(()) => {
                    self.offset += wire::RECT_RECORD_SIZE as u64;
                    let rect = decode_record(&record);
                    if rect.is_sentinel() {
                        return Ok(Some(rects));
                    }
                    rects.push(rect);
                }
            }
        }
    }

    /// Drains the whole container; handy for debug tooling and tests.
    pub fn read_all(mut self) -> ContainerResult<(u16, Vec<Vec<Rect>>)> {
        let mut frames = Vec::new();
        while let Some(frame) = self.next_frame()? {
            frames.push(frame);
        }
        Ok((self.frame_rate, frames))
    }
}

fn decode_record(record: &[u8; wire::RECT_RECORD_SIZE]) -> Rect {
    let field = |slot: usize| {
        u16::from_le_bytes([record[slot * 2], record[slot * 2 + 1]]) as u32
    };
    Rect::new(field(0), field(1), field(2), field(3))
}

/// Fills `buf` completely, or returns `None` on EOF before the first byte.
/// EOF after a partial read is a truncation error at `offset`.
fn read_full<R: Read>(
    reader: &mut R,
    buf: &mut [u8],
    offset: u64,
) -> ContainerResult<Option<()>> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => return Err(ContainerError::TruncatedStream { offset }),
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        }
    }
    Ok(Some(()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn encode(frame_rate: u16, frames: &[Vec<Rect>]) -> Vec<u8> {
        let mut bytes = Vec::new();
        let mut writer = ContainerWriter::new(&mut bytes, frame_rate).unwrap();
        for frame in frames {
            writer.write_frame(frame).unwrap();
        }
        writer.finish().unwrap();
        bytes
    }

    #[test]
    fn golden_single_rect_container_decodes() {
        // frame_rate=30, one rect (10,20,5,5), frame end, immediate EOF.
        let bytes: Vec<u8> = vec![
            30, 0, //
            10, 0, 20, 0, 5, 0, 5, 0, //
            0, 0, 0, 0, 0, 0, 0, 0,
        ];
        let mut reader = ContainerReader::new(Cursor::new(bytes)).unwrap();
        assert_eq!(reader.frame_rate(), 30);
        let frame = reader.next_frame().unwrap().unwrap();
        assert_eq!(frame, vec![Rect::new(10, 20, 5, 5)]);
        assert!(reader.next_frame().unwrap().is_none());
        assert!(reader.next_frame().unwrap().is_none());
    }

    #[test]
    fn round_trip_preserves_frames_and_order() {
        let frames = vec![
            vec![Rect::new(0, 0, 3, 2), Rect::new(5, 1, 1, 7)],
            vec![],
            vec![Rect::new(65535, 65535, 65535, 65535)],
        ];
        let bytes = encode(24, &frames);
        let reader = ContainerReader::new(Cursor::new(bytes)).unwrap();
        let (frame_rate, decoded) = reader.read_all().unwrap();
        assert_eq!(frame_rate, 24);
        assert_eq!(decoded, frames);
    }

    #[test]
    fn empty_frame_is_just_a_sentinel() {
        let bytes = encode(60, &[vec![]]);
        assert_eq!(bytes.len(), wire::FRAME_RATE_SIZE + wire::RECT_RECORD_SIZE);
    }

    #[test]
    fn out_of_range_rect_fails_fast() {
        let mut bytes = Vec::new();
        let mut writer = ContainerWriter::new(&mut bytes, 30).unwrap();
        let err = writer
            .write_frame(&[Rect::new(70_000, 0, 4, 4)])
            .unwrap_err();
        match err {
            ContainerError::OutOfRange { field, value, .. } => {
                assert_eq!(field, "x");
                assert_eq!(value, 70_000);
            }
            other => panic!("expected OutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn sentinel_shaped_rect_is_rejected() {
        let mut bytes = Vec::new();
        let mut writer = ContainerWriter::new(&mut bytes, 30).unwrap();
        let err = writer.write_frame(&[Rect::SENTINEL]).unwrap_err();
        assert!(matches!(err, ContainerError::SentinelCollision { .. }));
    }

    #[test]
    fn truncation_mid_record_is_an_error() {
        let mut bytes = encode(30, &[vec![Rect::new(1, 2, 3, 4)]]);
        bytes.truncate(bytes.len() - 3);
        let mut reader = ContainerReader::new(Cursor::new(bytes)).unwrap();
        let err = reader.next_frame().unwrap_err();
        assert!(matches!(err, ContainerError::TruncatedStream { .. }));
    }

    #[test]
    fn missing_header_is_truncation() {
        let err = ContainerReader::new(Cursor::new(vec![30u8])).unwrap_err();
        assert!(matches!(
            err,
            ContainerError::TruncatedStream { offset: 0 }
        ));
    }

    #[test]
    fn unterminated_final_frame_is_dropped() {
        // Records but no sentinel before EOF: the partial frame vanishes,
        // matching the reference decoder.
        let mut bytes = encode(30, &[vec![Rect::new(1, 1, 2, 2)]]);
        bytes.extend_from_slice(&[9, 0, 9, 0, 1, 0, 1, 0]);
        let mut reader = ContainerReader::new(Cursor::new(bytes)).unwrap();
        assert_eq!(reader.next_frame().unwrap().unwrap().len(), 1);
        assert!(reader.next_frame().unwrap().is_none());
    }

    /// Fails every other `read` call with `Interrupted`, like a signal
    /// landing mid-read.
    struct InterruptingReader {
        inner: Cursor<Vec<u8>>,
        interrupt_next: bool,
    }

    impl Read for InterruptingReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.interrupt_next = !self.interrupt_next;
            if self.interrupt_next {
                return Err(std::io::Error::new(ErrorKind::Interrupted, "signal"));
            }
            self.inner.read(buf)
        }
    }

    #[test]
    fn interrupted_reads_are_retried() {
        let frames = vec![vec![Rect::new(4, 5, 6, 7)], vec![]];
        let bytes = encode(30, &frames);
        let reader = ContainerReader::new(InterruptingReader {
            inner: Cursor::new(bytes),
            interrupt_next: false,
        })
        .unwrap();
        let (frame_rate, decoded) = reader.read_all().unwrap();
        assert_eq!(frame_rate, 30);
        assert_eq!(decoded, frames);
    }

    #[test]
    fn zero_origin_rect_is_not_a_sentinel_on_the_wire() {
        let frames = vec![vec![Rect::new(0, 0, 1, 1)]];
        let bytes = encode(30, &frames);
        let (_, decoded) = ContainerReader::new(Cursor::new(bytes))
            .unwrap()
            .read_all()
            .unwrap();
        assert_eq!(decoded, frames);
    }
}
