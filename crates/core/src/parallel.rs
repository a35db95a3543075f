#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;

#[cfg(not(target_arch = "wasm32"))]
const PARALLEL_THRESHOLD: usize = 1024;

/// Maps every item, keeping input order. Large inputs fan out over rayon.
pub fn map_ordered<T, R, F>(items: &[T], f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    #[cfg(not(target_arch = "wasm32"))]
    {
        if items.len() >= PARALLEL_THRESHOLD {
            return items.par_iter().map(&f).collect();
        }
    }

    items.iter().map(f).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_order_below_and_above_threshold() {
        let small: Vec<u32> = (0..10).collect();
        assert_eq!(map_ordered(&small, |v| v * 2), (0..10).map(|v| v * 2).collect::<Vec<_>>());

        let large: Vec<u32> = (0..5000).collect();
        let mapped = map_ordered(&large, |v| v + 1);
        assert_eq!(mapped.len(), 5000);
        assert!(mapped.windows(2).all(|pair| pair[0] + 1 == pair[1]));
    }
}
