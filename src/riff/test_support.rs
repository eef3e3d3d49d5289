//! Byte builders for hand-made RIFF fixtures.

/// Chunk header, payload and pad byte for odd payloads
pub(crate) fn chunk(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(8 + payload.len() + 1);
    out.extend_from_slice(tag);
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(payload);
    if payload.len() % 2 == 1 {
        out.push(0);
    }
    out
}

/// RIFF or LIST container holding already-encoded chunks
pub(crate) fn container(tag: &[u8; 4], form_type: &[u8; 4], chunks: &[Vec<u8>]) -> Vec<u8> {
    let body: usize = chunks.iter().map(Vec::len).sum();
    let mut out = Vec::with_capacity(12 + body);
    out.extend_from_slice(tag);
    out.extend_from_slice(&((body + 4) as u32).to_le_bytes());
    out.extend_from_slice(form_type);
    for c in chunks {
        out.extend_from_slice(c);
    }
    out
}

pub(crate) fn list(form_type: &[u8; 4], chunks: &[Vec<u8>]) -> Vec<u8> {
    container(b"LIST", form_type, chunks)
}
