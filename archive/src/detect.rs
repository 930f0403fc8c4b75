//! Magic-byte sniffing used to pick a decompressor or container reader
//! without trusting the file extension alone.

use std::fmt;

/// A recognized compressed-stream or archive-container format.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Format {
    /// Not compressed or archived; search the bytes directly.
    Plain,
    /// gzip (RFC 1952).
    Gzip,
    /// bzip2.
    Bzip2,
    /// xz / LZMA2.
    Xz,
    /// LZ4 frame format.
    Lz4,
    /// Zstandard.
    Zstd,
    /// classic Unix `compress` (LZW, `.Z`).
    Compress,
    /// zip container.
    Zip,
    /// POSIX tar container.
    Tar,
    /// cpio container.
    Cpio,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match *self {
            Format::Plain => "plain",
            Format::Gzip => "gzip",
            Format::Bzip2 => "bzip2",
            Format::Xz => "xz",
            Format::Lz4 => "lz4",
            Format::Zstd => "zstd",
            Format::Compress => "compress",
            Format::Zip => "zip",
            Format::Tar => "tar",
            Format::Cpio => "cpio",
        };
        f.write_str(name)
    }
}

/// Detects the format of `header`, the first few dozen bytes of a stream.
/// Falls back to `Format::Plain` when nothing matches, which is the
/// correct behavior for a stream that is simply uncompressed text.
///
/// Tar has no reliable magic in its first bytes (the `ustar` marker sits
/// at offset 257), so callers that need to recognize headerless or
/// non-ustar tarballs should fall back to `path` ending in `.tar`; this
/// function only recognizes the `ustar`/`ustar  ` markers when enough of
/// the header is available.
pub fn detect(header: &[u8]) -> Format {
    if header.len() >= 2 && header[0] == 0x1f && header[1] == 0x8b {
        return Format::Gzip;
    }
    if header.len() >= 3 && &header[0..3] == b"BZh" {
        return Format::Bzip2;
    }
    if header.len() >= 6 && &header[0..6] == [0xFD, b'7', b'z', b'X', b'Z', 0x00] {
        return Format::Xz;
    }
    if header.len() >= 4 && &header[0..4] == [0x04, 0x22, 0x4D, 0x18] {
        return Format::Lz4;
    }
    if header.len() >= 4 && &header[0..4] == [0x28, 0xB5, 0x2F, 0xFD] {
        return Format::Zstd;
    }
    if header.len() >= 2 && header[0] == 0x1f && header[1] == 0x9d {
        return Format::Compress;
    }
    if header.len() >= 4 && &header[0..4] == b"PK\x03\x04" {
        return Format::Zip;
    }
    if header.len() >= 6 && (&header[0..6] == b"070701" || &header[0..6] == b"070702") {
        return Format::Cpio;
    }
    if header.len() >= 265 && &header[257..262] == b"ustar" {
        return Format::Tar;
    }
    Format::Plain
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_gzip() {
        assert_eq!(detect(&[0x1f, 0x8b, 0x08, 0x00]), Format::Gzip);
    }

    #[test]
    fn detects_zip() {
        assert_eq!(detect(b"PK\x03\x04rest"), Format::Zip);
    }

    #[test]
    fn falls_back_to_plain() {
        assert_eq!(detect(b"hello world"), Format::Plain);
    }
}
