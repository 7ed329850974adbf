//! HTTP Range request parsing module
//!
//! Single byte-range support (RFC 7233) for the file primitive.

/// A satisfiable byte range, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    #[inline]
    pub const fn byte_count(self) -> usize {
        self.end - self.start + 1
    }
}

/// Outcome of inspecting a request's Range header
#[derive(Debug, PartialEq, Eq)]
pub enum RangeParseResult {
    /// Serve only this slice with 206
    Valid(ByteRange),
    /// Serve 416
    NotSatisfiable,
    /// No usable Range header: serve the whole file
    None,
}

/// Parse a Range header against a file of `file_size` bytes
///
/// Accepted forms are `bytes=start-end`, `bytes=start-` and `bytes=-suffix`.
/// Other units and multi-range requests are ignored.
///
/// # Examples
/// ```
/// use pagekit::http::range::{parse_range_header, ByteRange, RangeParseResult};
///
/// assert_eq!(
///     parse_range_header(Some("bytes=0-9"), 100),
///     RangeParseResult::Valid(ByteRange { start: 0, end: 9 })
/// );
/// assert_eq!(parse_range_header(None, 100), RangeParseResult::None);
/// ```
pub fn parse_range_header(range_header: Option<&str>, file_size: usize) -> RangeParseResult {
    let Some(spec) = range_header.and_then(|h| h.trim().strip_prefix("bytes=")) else {
        return RangeParseResult::None;
    };

    if spec.contains(',') {
        return RangeParseResult::None;
    }

    let Some((first, last)) = spec.split_once('-') else {
        return RangeParseResult::None;
    };
    let (first, last) = (first.trim(), last.trim());

    if file_size == 0 {
        return RangeParseResult::NotSatisfiable;
    }

    if first.is_empty() {
        suffix_range(last, file_size)
    } else {
        bounded_range(first, last, file_size)
    }
}

/// `-N`: the final N bytes
fn suffix_range(suffix: &str, file_size: usize) -> RangeParseResult {
    let Ok(suffix) = suffix.parse::<usize>() else {
        return RangeParseResult::None;
    };
    if suffix == 0 {
        return RangeParseResult::NotSatisfiable;
    }

    RangeParseResult::Valid(ByteRange {
        start: file_size.saturating_sub(suffix),
        end: file_size - 1,
    })
}

/// `N-` or `N-M`
fn bounded_range(first: &str, last: &str, file_size: usize) -> RangeParseResult {
    let Ok(start) = first.parse::<usize>() else {
        return RangeParseResult::None;
    };
    if start >= file_size {
        return RangeParseResult::NotSatisfiable;
    }

    let end = if last.is_empty() {
        file_size - 1
    } else {
        let Ok(end) = last.parse::<usize>() else {
            return RangeParseResult::None;
        };
        end.min(file_size - 1)
    };

    if start > end {
        return RangeParseResult::NotSatisfiable;
    }
    RangeParseResult::Valid(ByteRange { start, end })
}
