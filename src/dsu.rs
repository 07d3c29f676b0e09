//! Union-find over `0..n`, used as scratch space by the contraction query.

#[derive(Debug, Clone)]
pub struct DisjointSetUnion {
    parent: Vec<usize>,
    rank: Vec<u32>,
    sets: usize,
}

impl DisjointSetUnion {
    /// `n` singleton sets.
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
            sets: n,
        }
    }

    /// Representative of the set containing `u`. Two passes: find the root,
    /// then point every node on the path at it.
    pub fn find(&mut self, u: usize) -> usize {
        let mut root = u;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut cur = u;
        while self.parent[cur] != root {
            cur = std::mem::replace(&mut self.parent[cur], root);
        }
        root
    }

    /// Merges the sets of `u` and `v`. Returns whether they were different.
    pub fn union(&mut self, u: usize, v: usize) -> bool {
        let (mut u, mut v) = (self.find(u), self.find(v));
        if u == v {
            return false;
        }
        if self.rank[u] > self.rank[v] {
            std::mem::swap(&mut u, &mut v);
        }
        // v survives
        if self.rank[u] == self.rank[v] {
            self.rank[v] += 1;
        }
        self.parent[u] = v;
        self.sets -= 1;
        true
    }

    pub fn same(&mut self, u: usize, v: usize) -> bool {
        self.find(u) == self.find(v)
    }

    /// Number of disjoint sets.
    pub fn count(&self) -> usize {
        self.sets
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }
}
