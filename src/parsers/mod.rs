pub mod istanbul;
pub mod summary;

use crate::error::Result;

/// Every report parser implements this trait.
pub trait Parser {
    type Output;

    /// Parse the input bytes into a typed report.
    fn parse(&self, input: &[u8]) -> Result<Self::Output>;
}

/// The first few KB of `content`, lossily decoded, for format sniffing.
pub(crate) fn sniff_head(content: &[u8]) -> String {
    let head_len = content.len().min(4096);
    String::from_utf8_lossy(&content[..head_len]).into_owned()
}
