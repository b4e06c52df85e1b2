//! Ordering strategies for search results.
//!
//! Native sorts are delegated to storage. Title and random sorts load
//! `(id, title)` rows in ascending ID order and reorder them here.

use std::cmp::Ordering;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::models::SearchRow;
use crate::query::Query;
use crate::sorting::{Order, Sort};

/// How a search result list is ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortPlan {
    /// Storage orders by the column (ties by ID in the same direction).
    Native { sort: Sort, order: Order },
    /// Natural, case-insensitive title order.
    Title { order: Order },
    /// Seeded shuffle.
    Random { seed: u64, order: Order },
}

impl SortPlan {
    pub fn for_query(query: &Query) -> Self {
        match query.sort {
            Sort::Title => Self::Title { order: query.order },
            Sort::Random => Self::Random {
                seed: seed_from_str(&query.seed),
                order: query.order,
            },
            sort => Self::Native {
                sort,
                order: query.order,
            },
        }
    }

    /// Storage ordering for this plan; `None` means ascending ID.
    pub fn native(&self) -> Option<(Sort, Order)> {
        match self {
            Self::Native { sort, order } => Some((*sort, *order)),
            _ => None,
        }
    }

    /// Apply the in-memory part of the plan and return the ordered IDs.
    pub fn apply(&self, mut rows: Vec<SearchRow>) -> Vec<i64> {
        match self {
            Self::Native { .. } => {}
            Self::Title { order } => {
                rows.sort_by(|a, b| natural_cmp(&a.title, &b.title));
                if order.is_descending() {
                    rows.reverse();
                }
            }
            Self::Random { seed, order } => {
                seeded_shuffle(&mut rows, *seed);
                if order.is_descending() {
                    rows.reverse();
                }
            }
        }
        rows.into_iter().map(|r| r.id).collect()
    }
}

/// Stable 64-bit seed: the first eight bytes of the MD5 digest, big-endian.
pub fn seed_from_str(seed: &str) -> u64 {
    let digest = md5::compute(seed.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest.0[..8]);
    u64::from_be_bytes(bytes)
}

/// Shuffle in place; the same seed and input always give the same order.
pub fn seeded_shuffle<T>(items: &mut [T], seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    items.shuffle(&mut rng);
}

/// Natural, case-insensitive comparison: digit runs compare by numeric
/// value, so `"vol 2" < "vol 10"`.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let a: Vec<char> = a.chars().flat_map(char::to_lowercase).collect();
    let b: Vec<char> = b.chars().flat_map(char::to_lowercase).collect();
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        if a[i].is_ascii_digit() && b[j].is_ascii_digit() {
            let a_end = digit_run_end(&a, i);
            let b_end = digit_run_end(&b, j);
            let ord = compare_digit_runs(&a[i..a_end], &b[j..b_end]);
            if ord != Ordering::Equal {
                return ord;
            }
            i = a_end;
            j = b_end;
        } else {
            match a[i].cmp(&b[j]) {
                Ordering::Equal => {
                    i += 1;
                    j += 1;
                }
                ord => return ord,
            }
        }
    }

    (a.len() - i).cmp(&(b.len() - j))
}

fn digit_run_end(chars: &[char], start: usize) -> usize {
    chars[start..]
        .iter()
        .position(|c| !c.is_ascii_digit())
        .map_or(chars.len(), |offset| start + offset)
}

/// Numeric comparison of two digit runs without parsing (no overflow).
/// Equal values with different zero padding order the shorter run first.
fn compare_digit_runs(a: &[char], b: &[char]) -> Ordering {
    let a_trimmed = strip_leading_zeros(a);
    let b_trimmed = strip_leading_zeros(b);
    a_trimmed
        .len()
        .cmp(&b_trimmed.len())
        .then_with(|| a_trimmed.cmp(b_trimmed))
        .then_with(|| a.len().cmp(&b.len()))
}

fn strip_leading_zeros(run: &[char]) -> &[char] {
    let zeros = run.iter().take_while(|&&c| c == '0').count();
    &run[zeros..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;

    fn rows(titles: &[&str]) -> Vec<SearchRow> {
        titles
            .iter()
            .enumerate()
            .map(|(i, t)| SearchRow::new(i as i64 + 1, *t))
            .collect()
    }

    #[test]
    fn test_natural_cmp_numbers() {
        assert_eq!(natural_cmp("vol 2", "vol 10"), Ordering::Less);
        assert_eq!(natural_cmp("vol 10", "vol 2"), Ordering::Greater);
        assert_eq!(natural_cmp("a9b", "a10a"), Ordering::Less);
        assert_eq!(natural_cmp("x007", "x7"), Ordering::Greater);
        assert_eq!(natural_cmp("x7", "x7"), Ordering::Equal);
    }

    #[test]
    fn test_natural_cmp_case_insensitive() {
        assert_eq!(natural_cmp("Alpha", "alpha"), Ordering::Equal);
        assert_eq!(natural_cmp("beta", "Alpha"), Ordering::Greater);
        assert_eq!(natural_cmp("abc", "abcd"), Ordering::Less);
    }

    #[test]
    fn test_natural_cmp_huge_numbers() {
        let a = "n 99999999999999999999999999";
        let b = "n 100000000000000000000000000";
        assert_eq!(natural_cmp(a, b), Ordering::Less);
    }

    #[test]
    fn test_title_sort_asc_and_desc() {
        let input = rows(&["Vol 10", "vol 2", "Apple"]);
        let asc = SortPlan::Title { order: Order::Asc }.apply(input.clone());
        assert_eq!(asc, vec![3, 2, 1]);
        let desc = SortPlan::Title { order: Order::Desc }.apply(input);
        assert_eq!(desc, vec![1, 2, 3]);
    }

    #[test]
    fn test_seed_from_str_is_stable() {
        assert_eq!(seed_from_str("abc"), seed_from_str("abc"));
        assert_ne!(seed_from_str("abc"), seed_from_str("abd"));
        // md5("") = d41d8cd98f00b204...
        assert_eq!(seed_from_str(""), 0xd41d8cd98f00b204);
    }

    #[test]
    fn test_random_is_reproducible() {
        let input = rows(&["a", "b", "c", "d", "e", "f", "g", "h"]);
        let plan = SortPlan::Random {
            seed: seed_from_str("seed"),
            order: Order::Asc,
        };
        let first = plan.apply(input.clone());
        let second = plan.apply(input.clone());
        assert_eq!(first, second);

        let mut sorted = first.clone();
        sorted.sort();
        assert_eq!(sorted, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_different_seeds_give_different_orders() {
        let titles: Vec<String> = (0..20).map(|i| format!("t{}", i)).collect();
        let titles: Vec<&str> = titles.iter().map(String::as_str).collect();
        let input = rows(&titles);
        let first = SortPlan::Random {
            seed: seed_from_str("alpha"),
            order: Order::Asc,
        }
        .apply(input.clone());
        let second = SortPlan::Random {
            seed: seed_from_str("beta"),
            order: Order::Asc,
        }
        .apply(input);
        assert_ne!(first, second);
    }

    #[test]
    fn test_random_desc_is_reverse_of_asc() {
        let input = rows(&["a", "b", "c", "d", "e"]);
        let seed = seed_from_str("x");
        let mut asc = SortPlan::Random {
            seed,
            order: Order::Asc,
        }
        .apply(input.clone());
        let desc = SortPlan::Random {
            seed,
            order: Order::Desc,
        }
        .apply(input);
        asc.reverse();
        assert_eq!(asc, desc);
    }

    #[test]
    fn test_native_keeps_storage_order() {
        let input = rows(&["b", "a", "c"]);
        let plan = SortPlan::Native {
            sort: Sort::Pages,
            order: Order::Desc,
        };
        assert_eq!(plan.apply(input), vec![1, 2, 3]);
        assert_eq!(plan.native(), Some((Sort::Pages, Order::Desc)));
    }

    #[test]
    fn test_for_query() {
        let config = SiteConfig::builtin();
        let query = Query::new(&config)
            .with_sort(Sort::Random, Order::Asc)
            .with_seed("s");
        assert_eq!(
            SortPlan::for_query(&query),
            SortPlan::Random {
                seed: seed_from_str("s"),
                order: Order::Asc
            }
        );
        let query = Query::new(&config).with_sort(Sort::Title, Order::Desc);
        assert_eq!(SortPlan::for_query(&query).native(), None);
    }
}
