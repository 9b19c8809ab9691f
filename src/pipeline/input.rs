//! Input wrapping: raw upload bytes plus an inferred media type.
//!
//! The media type is sniffed from leading magic bytes, never taken from a
//! filename or a declared content-type — uploads lie, file contents mostly
//! don't. Unrecognised signatures fall back to a generic binary type instead
//! of failing: the upload endpoint has already allow-listed the MIME types it
//! accepts, and the hint only has to be good enough for the vision backend.

/// Media type inferred from an upload's leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Jpeg,
    Png,
    Gif,
    Webp,
    Pdf,
    /// Unrecognised signature; treated as opaque binary.
    Octet,
}

impl MediaType {
    /// Sniff the media type from leading magic bytes. Never fails.
    pub fn sniff(bytes: &[u8]) -> Self {
        if bytes.len() < 2 {
            return MediaType::Octet;
        }
        // RIFF container with a WEBP fourcc at offset 8.
        if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            return MediaType::Webp;
        }
        match (bytes[0], bytes[1]) {
            (0xFF, 0xD8) => MediaType::Jpeg,
            (0x89, 0x50) => MediaType::Png,
            (0x47, 0x49) => MediaType::Gif,
            (0x25, 0x50) => MediaType::Pdf,
            _ => MediaType::Octet,
        }
    }

    /// MIME string sent to the backend as the encoding hint.
    pub fn as_mime(&self) -> &'static str {
        match self {
            MediaType::Jpeg => "image/jpeg",
            MediaType::Png => "image/png",
            MediaType::Gif => "image/gif",
            MediaType::Webp => "image/webp",
            MediaType::Pdf => "application/pdf",
            MediaType::Octet => "application/octet-stream",
        }
    }
}

/// One upload's bytes, wrapped once and never mutated.
#[derive(Debug, Clone)]
pub struct RawImageInput {
    bytes: Vec<u8>,
    media_type: MediaType,
}

impl RawImageInput {
    pub fn new(bytes: Vec<u8>) -> Self {
        let media_type = MediaType::sniff(&bytes);
        RawImageInput { bytes, media_type }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }
}
