//! Splitting a candidate URL set into size-bounded submission batches.

use std::num::NonZeroUsize;

/// Largest batch the report service accepts in one request.
pub const DEFAULT_MAX_BATCH_SIZE: NonZeroUsize = match NonZeroUsize::new(1000) {
    Some(n) => n,
    None => unreachable!(),
};

/// Partitions `urls` into consecutive batches of at most `max` entries.
///
/// The result has `ceil(urls.len() / max)` batches, preserves input order
/// within and across batches, and is empty for empty input.
#[must_use]
pub fn split_batches(urls: &[String], max: NonZeroUsize) -> Vec<Vec<String>> {
    urls.chunks(max.get()).map(<[String]>::to_vec).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn urls(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("http://host{i}.example")).collect()
    }

    fn max(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_split_empty_input_yields_no_batches() {
        assert!(split_batches(&[], DEFAULT_MAX_BATCH_SIZE).is_empty());
    }

    #[test]
    fn test_split_1500_with_default_max_yields_1000_and_500() {
        let input = urls(1500);
        let batches = split_batches(&input, DEFAULT_MAX_BATCH_SIZE);
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].len(), 1000);
        assert_eq!(batches[1].len(), 500);
    }

    #[test]
    fn test_split_exact_multiple() {
        let batches = split_batches(&urls(2000), DEFAULT_MAX_BATCH_SIZE);
        assert_eq!(batches.len(), 2);
        assert!(batches.iter().all(|b| b.len() == 1000));
    }

    #[test]
    fn test_split_partitions_input_for_many_sizes() {
        for n in 0..40 {
            for m in 1..12 {
                let input = urls(n);
                let batches = split_batches(&input, max(m));

                assert_eq!(batches.len(), n.div_ceil(m), "n={n} m={m}");
                assert!(batches.iter().all(|b| !b.is_empty() && b.len() <= m));

                let flattened: Vec<String> = batches.concat();
                assert_eq!(flattened, input, "order and content must survive n={n} m={m}");

                let unique: HashSet<&String> = flattened.iter().collect();
                assert_eq!(unique.len(), n, "batches must be disjoint n={n} m={m}");
            }
        }
    }

    #[test]
    fn test_split_is_deterministic() {
        let input = urls(25);
        assert_eq!(split_batches(&input, max(7)), split_batches(&input, max(7)));
    }
}
