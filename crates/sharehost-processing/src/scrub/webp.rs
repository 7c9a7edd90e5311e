//! WebP: EXIF, XMP and ICCP chunks become zero-filled JUNK chunks and their
//! VP8X feature flags are cleared.

use img_parts::riff::{RiffChunk, RiffContent};
use img_parts::webp::WebP;

use super::{Neutralized, ScrubError};

const FORMAT: &str = "webp";

const NEUTRAL_CHUNK: [u8; 4] = *b"JUNK";
const VP8X: [u8; 4] = *b"VP8X";

const FLAG_ICC: u8 = 0x20;
const FLAG_EXIF: u8 = 0x08;
const FLAG_XMP: u8 = 0x04;

fn metadata_flag(id: &[u8; 4]) -> Option<u8> {
    match id {
        b"ICCP" => Some(FLAG_ICC),
        b"EXIF" => Some(FLAG_EXIF),
        b"XMP " => Some(FLAG_XMP),
        _ => None,
    }
}

pub(super) fn neutralize(data: &[u8]) -> Result<Neutralized, ScrubError> {
    let mut webp =
        WebP::from_bytes(data.to_vec().into()).map_err(|e| ScrubError::malformed(FORMAT, e))?;

    let mut cleared_flags = 0u8;
    let mut blocks = 0;
    for chunk in webp.chunks_mut().iter_mut() {
        let Some(flag) = metadata_flag(&chunk.id()) else {
            continue;
        };
        let len = match chunk.content() {
            RiffContent::Data(data) => data.len(),
            _ => continue,
        };
        *chunk = RiffChunk::new(NEUTRAL_CHUNK, RiffContent::Data(vec![0u8; len].into()));
        cleared_flags |= flag;
        blocks += 1;
    }

    if cleared_flags != 0 {
        if let Some(vp8x) = webp.chunks_mut().iter_mut().find(|c| c.id() == VP8X) {
            let flags = match vp8x.content() {
                RiffContent::Data(data) => Some(data.to_vec()),
                _ => None,
            };
            if let Some(mut flags) = flags {
                if let Some(first) = flags.first_mut() {
                    *first &= !cleared_flags;
                }
                *vp8x = RiffChunk::new(VP8X, RiffContent::Data(flags.into()));
            }
        }
    }

    Ok(Neutralized {
        bytes: webp.encoder().bytes().to_vec(),
        blocks,
    })
}
