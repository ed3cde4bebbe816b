use bulkswap_types::{Batch, BuiltTransaction};

/// Result of packing built transactions into size-bounded batches.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Packing {
    /// Batches in input order, each within the byte ceiling.
    pub batches: Vec<Batch>,

    /// Request indices of transactions that alone exceed the ceiling and
    /// can never be submitted, with their actual byte length.
    pub rejected: Vec<(usize, usize)>,
}

/// Greedy single-pass packer. Order preserving: transactions land in
/// batches in input order, and a batch closes as soon as the next
/// transaction would push it over `max_batch_bytes`. Deterministic for
/// identical input.
pub fn pack(built: Vec<BuiltTransaction>, max_batch_bytes: usize) -> Packing {
    let mut packing = Packing::default();
    let mut current = Batch::default();
    let mut current_bytes = 0usize;

    for tx in built {
        let len = tx.byte_len();

        if len > max_batch_bytes {
            tracing::warn!(
                request_index = tx.request_index,
                bytes = len,
                limit = max_batch_bytes,
                "Transaction exceeds batch ceiling"
            );
            packing.rejected.push((tx.request_index, len));
            continue;
        }

        if current_bytes + len > max_batch_bytes && !current.is_empty() {
            packing.batches.push(std::mem::take(&mut current));
            current_bytes = 0;
        }

        current_bytes += len;
        current.transactions.push(tx);
    }

    if !current.is_empty() {
        packing.batches.push(current);
    }

    packing
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(index: usize, bytes: usize) -> BuiltTransaction {
        BuiltTransaction::new(index, vec![0u8; bytes])
    }

    #[test]
    fn test_closes_batch_on_overflow() {
        let packing = pack(vec![tx(0, 400), tx(1, 400), tx(2, 500)], 1000);

        assert_eq!(packing.batches.len(), 2);
        assert_eq!(
            packing.batches[0].request_indices().collect::<Vec<_>>(),
            vec![0, 1]
        );
        assert_eq!(
            packing.batches[1].request_indices().collect::<Vec<_>>(),
            vec![2]
        );
        assert!(packing.rejected.is_empty());
    }

    #[test]
    fn test_exact_fit_stays_in_batch() {
        let packing = pack(vec![tx(0, 600), tx(1, 400)], 1000);
        assert_eq!(packing.batches.len(), 1);
        assert_eq!(packing.batches[0].total_bytes(), 1000);
    }

    #[test]
    fn test_oversized_singleton_rejected() {
        let packing = pack(vec![tx(0, 400), tx(1, 1500), tx(2, 400)], 1000);

        assert_eq!(packing.rejected, vec![(1, 1500)]);
        assert_eq!(packing.batches.len(), 1);
        assert_eq!(
            packing.batches[0].request_indices().collect::<Vec<_>>(),
            vec![0, 2]
        );
    }

    #[test]
    fn test_empty_input_yields_zero_batches() {
        let packing = pack(Vec::new(), 1000);
        assert!(packing.batches.is_empty());
        assert!(packing.rejected.is_empty());
    }

    #[test]
    fn test_deterministic_for_identical_input() {
        let input = vec![tx(0, 300), tx(1, 300), tx(2, 300), tx(3, 300)];
        let first = pack(input.clone(), 700);
        let second = pack(input, 700);
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_batch_exceeds_ceiling() {
        let input = (0..20).map(|i| tx(i, 137 + i * 13)).collect::<Vec<_>>();
        let packing = pack(input, 1232);

        for batch in &packing.batches {
            assert!(batch.total_bytes() <= 1232);
            assert!(!batch.is_empty());
        }
    }
}
