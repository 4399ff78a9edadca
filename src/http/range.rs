//! Single byte-range support (RFC 7233 subset)

/// How a `Range` header applies to a body of known length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteRange {
    /// No usable range: send the whole body
    Full,
    /// Inclusive byte span `start..=end`
    Partial { start: usize, end: usize },
    /// Range lies beyond the body; answer 416
    Unsatisfiable,
}

impl ByteRange {
    /// Resolve a `Range` header against a body length
    ///
    /// Only the `bytes` unit with a single span is honored. Anything malformed,
    /// or a multi-range request, degrades to [`ByteRange::Full`].
    ///
    /// # Examples
    /// ```
    /// use spa_server::http::range::ByteRange;
    /// assert_eq!(ByteRange::resolve(Some("bytes=0-3"), 10), ByteRange::Partial { start: 0, end: 3 });
    /// assert_eq!(ByteRange::resolve(Some("bytes=-4"), 10), ByteRange::Partial { start: 6, end: 9 });
    /// assert_eq!(ByteRange::resolve(None, 10), ByteRange::Full);
    /// ```
    pub fn resolve(header: Option<&str>, len: usize) -> Self {
        let Some(spec) = header.and_then(|h| h.trim().strip_prefix("bytes=")) else {
            return Self::Full;
        };
        if spec.contains(',') {
            return Self::Full;
        }
        let Some((first, last)) = spec.split_once('-') else {
            return Self::Full;
        };
        let (first, last) = (first.trim(), last.trim());

        match (first.is_empty(), last.is_empty()) {
            // "-N": final N bytes
            (true, false) => match last.parse::<usize>() {
                Ok(0) => Self::Unsatisfiable,
                Ok(_) if len == 0 => Self::Unsatisfiable,
                Ok(n) => Self::Partial {
                    start: len.saturating_sub(n),
                    end: len - 1,
                },
                Err(_) => Self::Full,
            },
            // "N-" or "N-M"
            (false, _) => {
                let Ok(start) = first.parse::<usize>() else {
                    return Self::Full;
                };
                let end = if last.is_empty() {
                    None
                } else {
                    match last.parse::<usize>() {
                        Ok(e) => Some(e),
                        Err(_) => return Self::Full,
                    }
                };
                if end.is_some_and(|e| e < start) {
                    return Self::Full;
                }
                if start >= len {
                    return Self::Unsatisfiable;
                }
                Self::Partial {
                    start,
                    end: end.map_or(len - 1, |e| e.min(len - 1)),
                }
            }
            (true, true) => Self::Full,
        }
    }
}
