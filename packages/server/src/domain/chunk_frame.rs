//! Binary chunk frame layout.
//!
//! ```text
//! offset  size  field
//! 0       4     chunk index (u32, little-endian)
//! 4       4     declared chunk size (u32, little-endian)
//! 8       1     last-chunk flag (nonzero = true)
//! 9       36    file id (NUL-padded UTF-8)
//! 45      19    reserved
//! 64      ..    payload
//! ```
//!
//! The relay only inspects the header to reject truncated frames; the frame
//! itself is forwarded byte-for-byte.

use super::FrameError;

/// Fixed size of the chunk header
pub const CHUNK_HEADER_LEN: usize = 64;

/// Largest inbound frame (text or binary) the relay accepts
pub const MAX_FRAME_LEN: usize = 2 << 20;

const FILE_ID_OFFSET: usize = 9;
const FILE_ID_LEN: usize = 36;

/// Reject frames above [`MAX_FRAME_LEN`] before any parsing happens.
pub fn check_frame_len(length: usize) -> Result<(), FrameError> {
    if length > MAX_FRAME_LEN {
        return Err(FrameError::TooLarge {
            length,
            max: MAX_FRAME_LEN,
        });
    }
    Ok(())
}

/// Decoded header of one file chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkHeader {
    pub chunk_index: u32,
    pub chunk_size: u32,
    pub is_last: bool,
    pub file_id: String,
}

impl ChunkHeader {
    /// Decode the header of `frame`.
    ///
    /// The file id ends at the first NUL byte or at the end of its field.
    pub fn parse(frame: &[u8]) -> Result<Self, FrameError> {
        let Some(header) = frame.get(..CHUNK_HEADER_LEN) else {
            return Err(FrameError::TooShort {
                length: frame.len(),
                header: CHUNK_HEADER_LEN,
            });
        };

        let file_id_field = &header[FILE_ID_OFFSET..FILE_ID_OFFSET + FILE_ID_LEN];
        let file_id_end = file_id_field
            .iter()
            .position(|&byte| byte == 0)
            .unwrap_or(FILE_ID_LEN);

        Ok(Self {
            chunk_index: read_u32_le(&header[0..4]),
            chunk_size: read_u32_le(&header[4..8]),
            is_last: header[8] != 0,
            file_id: String::from_utf8_lossy(&file_id_field[..file_id_end]).into_owned(),
        })
    }

    /// Build a complete frame from this header and `payload`.
    ///
    /// File ids longer than 36 bytes are truncated.
    pub fn encode(&self, payload: &[u8]) -> Vec<u8> {
        let mut frame = vec![0u8; CHUNK_HEADER_LEN];
        frame[0..4].copy_from_slice(&self.chunk_index.to_le_bytes());
        frame[4..8].copy_from_slice(&self.chunk_size.to_le_bytes());
        frame[8] = u8::from(self.is_last);

        let file_id = self.file_id.as_bytes();
        let file_id_len = file_id.len().min(FILE_ID_LEN);
        frame[FILE_ID_OFFSET..FILE_ID_OFFSET + file_id_len]
            .copy_from_slice(&file_id[..file_id_len]);

        frame.extend_from_slice(payload);
        frame
    }
}

fn read_u32_le(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(bytes);
    u32::from_le_bytes(buf)
}

/// A validated chunk frame borrowing the received bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkFrame<'a> {
    pub header: ChunkHeader,
    pub payload: &'a [u8],
}

impl<'a> ChunkFrame<'a> {
    pub fn parse(frame: &'a [u8]) -> Result<Self, FrameError> {
        check_frame_len(frame.len())?;
        let header = ChunkHeader::parse(frame)?;
        Ok(Self {
            header,
            payload: &frame[CHUNK_HEADER_LEN..],
        })
    }
}
