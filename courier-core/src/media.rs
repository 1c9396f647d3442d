//! Media ranges and quality weights used for content negotiation.

use mime::Mime;
use std::{fmt, sync::LazyLock};

/// `application/xml`, which `mime` has no constant for.
pub static APPLICATION_XML: LazyLock<Mime> = LazyLock::new(|| {
    "application/xml"
        .parse()
        .expect("`application/xml` is a valid media type")
});

/// A quality weight attached to a [`MediaRange`], measured in thousandths.
///
/// Weights parsed from an `Accept` header span `0..=1000` (`q=0` to `q=1`).
/// [`Quality::MAX`] lies above that range so that ranges injected by the
/// server always take precedence over anything a client can express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quality(u16);

impl Quality {
    /// `q=0`: not acceptable.
    pub const MIN: Quality = Quality(0);
    /// `q=1`: the weight of a range without an explicit `q` parameter.
    pub const DEFAULT: Quality = Quality(1000);
    /// Outranks every weight a client can express.
    pub const MAX: Quality = Quality(u16::MAX);

    /// Convert a `q` value as written in a header.
    ///
    /// Values are clamped into `[0, 1]`; `NaN` is treated as `1`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_q(q: f32) -> Self {
        let q = if q.is_nan() { 1.0 } else { q.clamp(0.0, 1.0) };
        Quality((q * 1000.0).round() as u16)
    }

    /// The raw weight in thousandths.
    pub const fn thousandths(self) -> u16 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Quality::DEFAULT
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Quality::MAX {
            f.write_str("max")
        } else {
            write!(f, "{}.{:03}", self.0 / 1000, self.0 % 1000)
        }
    }
}

/// A content type the client is willing to accept, with its weight.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaRange {
    media_type: Mime,
    quality: Quality,
}

impl MediaRange {
    /// Create a media range from its parts.
    pub fn new(media_type: Mime, quality: Quality) -> Self {
        Self {
            media_type,
            quality,
        }
    }

    /// The media type (possibly a wildcard such as `text/*`).
    pub fn media_type(&self) -> &Mime {
        &self.media_type
    }

    /// The quality weight.
    pub fn quality(&self) -> Quality {
        self.quality
    }

    /// Parse one comma-separated entry of an `Accept` header.
    ///
    /// Returns `None` for empty or malformed entries.
    pub fn parse(entry: &str) -> Option<Self> {
        let entry = entry.trim();
        if entry.is_empty() {
            return None;
        }

        let mut parts = entry.split(';');
        let media_type = parts.next()?.trim().parse::<Mime>().ok()?;
        let quality = parts
            .find_map(|p| p.trim().strip_prefix("q=")?.trim().parse::<f32>().ok())
            .map_or(Quality::DEFAULT, Quality::from_q);

        Some(Self::new(media_type, quality))
    }

    /// Parse a full `Accept` header value.
    ///
    /// Entries keep the order in which they appear in the header.
    pub fn parse_accept(header: &str) -> Vec<Self> {
        header.split(',').filter_map(Self::parse).collect()
    }
}

impl fmt::Display for MediaRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};q={}", self.media_type, self.quality)
    }
}
