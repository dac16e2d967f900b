//! `FxRateService` (§6): converts an amount between currencies over a
//! hard-coded path graph, BFS-finding a ≤2-hop path and multiplying mid
//! prices along the way. Used by the market maker (§4.4 step 2) to convert
//! FV into the quoted instrument's currency when it differs from the FV
//! instrument's.

use rust_decimal::Decimal;
use std::collections::{HashMap, VecDeque};

pub type Currency = String;

/// Read-only FX conversion lookup (§6). A `None` return means no path
/// exists within the configured hop limit — callers treat this as
/// `PriceUnavailable` (§7) and skip the requote rather than guessing.
pub trait FxRateService: Send + Sync {
    fn convert(&self, amount: Decimal, from: &Currency, to: &Currency) -> Option<Decimal>;
}

#[derive(Debug, Clone, Copy)]
struct Edge {
    to: usize,
    /// Multiply an amount in the edge's `from` currency by this to get `to`.
    rate: Decimal,
}

/// Reference [`FxRateService`]: a small adjacency-list path graph (e.g.
/// BTC↔USDT@Binance, USDT↔KRW@Bithumb), BFS-bounded to `max_hops` (default
/// 2), with USD/USDT optionally treated as identity (§9 Open Question).
///
/// Resolved paths are cached so repeated conversions for the same
/// `(from, to)` pair skip the BFS after the first lookup.
pub struct BfsFxRateService {
    index: HashMap<Currency, usize>,
    adjacency: Vec<Vec<Edge>>,
    max_hops: usize,
    equivalences: Vec<(Currency, Currency)>,
    path_cache: parking_lot::RwLock<HashMap<(Currency, Currency), Vec<usize>>>,
}

impl BfsFxRateService {
    /// `edges` are undirected mid-price quotes: `(base, quote, base_per_quote)`
    /// meaning `1 quote = base_per_quote base`. Both directions are added.
    /// `equivalences` lists currency pairs (e.g. `("USD", "USDT")`) treated
    /// as a 1:1 identity conversion regardless of the graph.
    pub fn new(edges: &[(&str, &str, Decimal)], equivalences: Vec<(Currency, Currency)>) -> Self {
        Self::with_max_hops(edges, equivalences, 2)
    }

    pub fn with_max_hops(edges: &[(&str, &str, Decimal)], equivalences: Vec<(Currency, Currency)>, max_hops: usize) -> Self {
        let mut index = HashMap::new();
        let mut adjacency: Vec<Vec<Edge>> = Vec::new();

        let mut id_of = |c: &str, index: &mut HashMap<Currency, usize>, adjacency: &mut Vec<Vec<Edge>>| -> usize {
            if let Some(&i) = index.get(c) {
                return i;
            }
            let i = adjacency.len();
            adjacency.push(Vec::new());
            index.insert(c.to_string(), i);
            i
        };

        for &(base, quote, base_per_quote) in edges {
            let b = id_of(base, &mut index, &mut adjacency);
            let q = id_of(quote, &mut index, &mut adjacency);
            adjacency[q].push(Edge { to: b, rate: base_per_quote });
            adjacency[b].push(Edge { to: q, rate: Decimal::ONE / base_per_quote });
        }

        Self { index, adjacency, max_hops, equivalences, path_cache: parking_lot::RwLock::new(HashMap::new()) }
    }

    fn equivalent(&self, a: &str, b: &str) -> bool {
        self.equivalences.iter().any(|(x, y)| (x == a && y == b) || (x == b && y == a))
    }

    /// BFS from `from` to `to`, bounded by `max_hops`, returning the chain
    /// of node indices walked (including endpoints), or `None` if no path
    /// within the hop limit exists.
    fn find_path(&self, from: usize, to: usize) -> Option<Vec<usize>> {
        if from == to {
            return Some(vec![from]);
        }
        let mut visited = vec![false; self.adjacency.len()];
        visited[from] = true;
        let mut queue = VecDeque::new();
        queue.push_back(vec![from]);

        while let Some(path) = queue.pop_front() {
            let node = *path.last().unwrap();
            if path.len() - 1 >= self.max_hops {
                continue;
            }
            for edge in &self.adjacency[node] {
                if visited[edge.to] {
                    continue;
                }
                let mut next = path.clone();
                next.push(edge.to);
                if edge.to == to {
                    return Some(next);
                }
                visited[edge.to] = true;
                queue.push_back(next);
            }
        }
        None
    }

    fn rate_along(&self, path: &[usize]) -> Option<Decimal> {
        let mut rate = Decimal::ONE;
        for window in path.windows(2) {
            let (from, to) = (window[0], window[1]);
            let edge = self.adjacency[from].iter().find(|e| e.to == to)?;
            rate *= edge.rate;
        }
        Some(rate)
    }
}

impl FxRateService for BfsFxRateService {
    fn convert(&self, amount: Decimal, from: &Currency, to: &Currency) -> Option<Decimal> {
        if from == to || self.equivalent(from, to) {
            return Some(amount);
        }

        let from_idx = *self.index.get(from)?;
        let to_idx = *self.index.get(to)?;

        if let Some(path) = self.path_cache.read().get(&(from.clone(), to.clone())) {
            return self.rate_along(path).map(|r| amount * r);
        }

        let path = self.find_path(from_idx, to_idx)?;
        let rate = self.rate_along(&path)?;
        self.path_cache.write().insert((from.clone(), to.clone()), path);
        Some(amount * rate)
    }
}
