//! Disjoint-set forest over entity indices.

/// Union-find over the indices `0..n`, with path compression and union by
/// size.
///
/// # Examples
///
/// ```
/// use u_grouping::constraints::UnionFind;
///
/// let mut uf = UnionFind::new(4);
/// uf.union(0, 1);
/// uf.union(2, 3);
/// assert!(uf.connected(0, 1));
/// assert!(!uf.connected(1, 2));
/// assert_eq!(uf.groups(), vec![vec![0, 1], vec![2, 3]]);
/// ```
#[derive(Debug, Clone)]
pub struct UnionFind {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl UnionFind {
    /// Creates `n` singleton sets.
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    /// Returns `true` if there are no elements.
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Representative of the set containing `x`.
    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut cur = x;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    /// Merges the sets of `a` and `b`. Returns `false` if they were already
    /// joined.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }
        let (big, small) = if self.size[ra] >= self.size[rb] {
            (ra, rb)
        } else {
            (rb, ra)
        };
        self.parent[small] = big;
        self.size[big] += self.size[small];
        true
    }

    /// Returns `true` if `a` and `b` are in the same set.
    pub fn connected(&mut self, a: usize, b: usize) -> bool {
        self.find(a) == self.find(b)
    }

    /// Size of the set containing `x`.
    pub fn set_size(&mut self, x: usize) -> usize {
        let r = self.find(x);
        self.size[r]
    }

    /// All sets, members ascending, ordered by their smallest member.
    pub fn groups(&mut self) -> Vec<Vec<usize>> {
        let n = self.len();
        let mut slot = vec![usize::MAX; n];
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for x in 0..n {
            let r = self.find(x);
            if slot[r] == usize::MAX {
                slot[r] = groups.len();
                groups.push(Vec::new());
            }
            groups[slot[r]].push(x);
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singletons() {
        let mut uf = UnionFind::new(3);
        assert_eq!(uf.len(), 3);
        assert!(!uf.connected(0, 1));
        assert_eq!(uf.groups(), vec![vec![0], vec![1], vec![2]]);
    }

    #[test]
    fn test_path_compression() {
        let mut uf = UnionFind::new(5);
        uf.union(0, 1);
        uf.union(1, 2);
        uf.union(2, 3);
        uf.union(3, 4);
        let root = uf.find(4);
        for x in 0..5 {
            assert_eq!(uf.find(x), root);
        }
        // Every node points straight at the root after compression.
        assert!(uf.parent.iter().all(|&p| p == root));
    }

    #[test]
    fn test_union_by_size() {
        let mut uf = UnionFind::new(4);
        uf.union(1, 2);
        uf.union(1, 3);
        // Joining a singleton keeps the larger tree's root.
        let big_root = uf.find(1);
        uf.union(0, 1);
        assert_eq!(uf.find(0), big_root);
        assert_eq!(uf.set_size(0), 4);
    }

    #[test]
    fn test_union_returns_false_when_joined() {
        let mut uf = UnionFind::new(2);
        assert!(uf.union(0, 1));
        assert!(!uf.union(1, 0));
    }

    #[test]
    fn test_groups_ordered() {
        let mut uf = UnionFind::new(6);
        uf.union(5, 1);
        uf.union(4, 0);
        uf.union(3, 5);
        assert_eq!(uf.groups(), vec![vec![0, 4], vec![1, 3, 5], vec![2]]);
    }
}
