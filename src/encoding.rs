//! RFB encoding tags.
//!
//! Encoding numbers form an open set: clients routinely send vendor and
//! pseudo-encodings beyond RFC 6143, so the tag is a thin wrapper over the
//! signed 32-bit wire value. Unknown tags round-trip verbatim through
//! `SetEncodings`. Only [`Encoding::RAW`] payloads are produced by typical
//! hosts of this crate; the rest are named so hosts can recognize client
//! capabilities.

use std::fmt;

/// An encoding tag as carried in `SetEncodings` and rectangle headers.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Encoding(
    /// The signed 32-bit wire value.
    pub i32,
);

impl Encoding {
    /// Raw pixel data, uncompressed. Universally supported.
    pub const RAW: Self = Self(0);
    /// Copy a rectangle from elsewhere on the screen.
    pub const COPY_RECT: Self = Self(1);
    /// Rise-and-run-length encoding.
    pub const RRE: Self = Self(2);
    /// 16x16-tile encoding.
    pub const HEXTILE: Self = Self(5);
    /// Tiled run-length encoding.
    pub const TRLE: Self = Self(15);
    /// Zlib-compressed TRLE.
    pub const ZRLE: Self = Self(16);
    /// Pseudo-encoding: client accepts cursor shape updates.
    pub const CURSOR: Self = Self(-239);
    /// Pseudo-encoding: client accepts desktop size changes.
    pub const DESKTOP_SIZE: Self = Self(-223);

    fn name(self) -> Option<&'static str> {
        Some(match self {
            Self::RAW => "Raw",
            Self::COPY_RECT => "CopyRect",
            Self::RRE => "RRE",
            Self::HEXTILE => "Hextile",
            Self::TRLE => "TRLE",
            Self::ZRLE => "ZRLE",
            Self::CURSOR => "Cursor",
            Self::DESKTOP_SIZE => "DesktopSize",
            _ => return None,
        })
    }
}

impl From<i32> for Encoding {
    fn from(raw: i32) -> Self {
        Self(raw)
    }
}

impl From<Encoding> for i32 {
    fn from(encoding: Encoding) -> Self {
        encoding.0
    }
}

impl fmt::Debug for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "Encoding({})", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_known_values() {
        assert_eq!(Encoding::RAW.0, 0);
        assert_eq!(Encoding::COPY_RECT.0, 1);
        assert_eq!(Encoding::RRE.0, 2);
        assert_eq!(Encoding::HEXTILE.0, 5);
        assert_eq!(Encoding::TRLE.0, 15);
        assert_eq!(Encoding::ZRLE.0, 16);
        assert_eq!(Encoding::CURSOR.0, -239);
        assert_eq!(Encoding::DESKTOP_SIZE.0, -223);
    }

    #[test]
    fn unknown_tags_survive() {
        let tag = Encoding::from(-312); // TightPng quality region, not named here
        assert_eq!(i32::from(tag), -312);
        assert_eq!(format!("{tag:?}"), "Encoding(-312)");
    }
}
