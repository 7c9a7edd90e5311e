//! PNG: metadata chunks become a private ancillary chunk with zeroed data.

use img_parts::png::{Png, PngChunk};

use super::{Neutralized, ScrubError};

const FORMAT: &str = "png";

pub(super) const SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Ancillary, private, safe-to-copy: ignored by every conforming decoder.
const NEUTRAL_CHUNK: [u8; 4] = *b"blNk";

const METADATA_CHUNKS: &[[u8; 4]] = &[
    *b"eXIf", *b"iCCP", *b"tEXt", *b"zTXt", *b"iTXt", *b"tIME",
];

pub(super) fn neutralize(data: &[u8]) -> Result<Neutralized, ScrubError> {
    let mut png =
        Png::from_bytes(data.to_vec().into()).map_err(|e| ScrubError::malformed(FORMAT, e))?;

    let mut blocks = 0;
    for chunk in png.chunks_mut().iter_mut() {
        if METADATA_CHUNKS.contains(&chunk.kind()) {
            let len = chunk.contents().len();
            // PngChunk::new recomputes the CRC
            *chunk = PngChunk::new(NEUTRAL_CHUNK, vec![0u8; len].into());
            blocks += 1;
        }
    }

    Ok(Neutralized {
        bytes: png.encoder().bytes().to_vec(),
        blocks,
    })
}
