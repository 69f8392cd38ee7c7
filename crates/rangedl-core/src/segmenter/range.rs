//! ByteRange type and partitioning.

/// One segment of the resource: inclusive byte span `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    /// 0-based ordinal; also the merge order.
    pub index: usize,
    /// First byte offset (inclusive).
    pub start: u64,
    /// Last byte offset (inclusive).
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes in the range. Never zero for ranges built by `partition`.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// HTTP Range header value: `bytes=start-end`.
    pub fn range_header_value(&self) -> String {
        format!("bytes={}", self.curl_range())
    }

    /// The `start-end` form libcurl expects for `CURLOPT_RANGE`.
    pub(crate) fn curl_range(&self) -> String {
        format!("{}-{}", self.start, self.end)
    }
}

/// Splits `[0, total_size - 1]` into `concurrency` ranges.
///
/// Every range but the last has length `total_size / concurrency`; the last one
/// ends at `total_size - 1` and absorbs the remainder. When `concurrency`
/// exceeds `total_size` it is clamped to `total_size`, so each range holds one
/// byte and no empty range is ever produced.
///
/// Returns an empty vec if `total_size` is 0 or `concurrency` is 0.
pub fn partition(total_size: u64, concurrency: usize) -> Vec<ByteRange> {
    if total_size == 0 || concurrency == 0 {
        return Vec::new();
    }

    let count = (concurrency as u64).min(total_size);
    let base = total_size / count;

    (0..count)
        .map(|i| {
            let start = i * base;
            let end = if i == count - 1 {
                total_size - 1
            } else {
                start + base - 1
            };
            ByteRange {
                index: i as usize,
                start,
                end,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_exact_cover(ranges: &[ByteRange], total_size: u64) {
        assert!(!ranges.is_empty());
        assert_eq!(ranges[0].start, 0);
        assert_eq!(ranges.last().unwrap().end, total_size - 1);
        for (i, pair) in ranges.windows(2).enumerate() {
            assert_eq!(pair[0].end + 1, pair[1].start, "gap/overlap after range {}", i);
        }
        for (i, r) in ranges.iter().enumerate() {
            assert_eq!(r.index, i);
            assert!(r.end >= r.start);
        }
        assert_eq!(ranges.iter().map(ByteRange::len).sum::<u64>(), total_size);
    }

    #[test]
    fn ten_thousand_by_three() {
        let ranges = partition(10_000, 3);
        let spans: Vec<(u64, u64)> = ranges.iter().map(|r| (r.start, r.end)).collect();
        assert_eq!(spans, vec![(0, 3332), (3333, 6665), (6666, 9999)]);
        let lens: Vec<u64> = ranges.iter().map(ByteRange::len).collect();
        assert_eq!(lens, vec![3333, 3333, 3334]);
    }

    #[test]
    fn even_split() {
        let ranges = partition(1000, 4);
        assert_eq!(ranges.len(), 4);
        assert!(ranges.iter().all(|r| r.len() == 250));
        assert_exact_cover(&ranges, 1000);
    }

    #[test]
    fn single_range_covers_everything() {
        let ranges = partition(100, 1);
        assert_eq!(
            ranges,
            vec![ByteRange {
                index: 0,
                start: 0,
                end: 99
            }]
        );
    }

    #[test]
    fn exact_cover_for_many_shapes() {
        for total_size in 1..=200u64 {
            for concurrency in 1..=12usize {
                let ranges = partition(total_size, concurrency);
                assert_exact_cover(&ranges, total_size);
                if total_size >= concurrency as u64 {
                    assert_eq!(ranges.len(), concurrency);
                }
            }
        }
    }

    #[test]
    fn concurrency_clamped_to_size() {
        let ranges = partition(5, 8);
        assert_eq!(ranges.len(), 5);
        assert!(ranges.iter().all(|r| r.len() == 1));
        assert_exact_cover(&ranges, 5);
    }

    #[test]
    fn deterministic() {
        assert_eq!(partition(12_345, 7), partition(12_345, 7));
    }

    #[test]
    fn empty_inputs() {
        assert!(partition(0, 4).is_empty());
        assert!(partition(100, 0).is_empty());
    }

    #[test]
    fn range_header() {
        let r = ByteRange {
            index: 0,
            start: 0,
            end: 98,
        };
        assert_eq!(r.range_header_value(), "bytes=0-98");
        assert_eq!(r.len(), 99);
        let one = ByteRange {
            index: 3,
            start: 42,
            end: 42,
        };
        assert_eq!(one.range_header_value(), "bytes=42-42");
        assert_eq!(one.len(), 1);
    }
}
