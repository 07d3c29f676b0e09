use std::collections::BTreeMap;
use std::fmt::Formatter;

use derivative::Derivative;
use rand::rngs::StdRng;

use crate::{
    config::SketchConfig,
    dsu::DisjointSetUnion,
    error::{Error, Result},
    l0_sampling::{Index, L0Sampler},
};

pub trait DynamicConnectivity {
    /// New instance for an empty graph on n nodes
    fn new(n: usize) -> Result<Self>
    where
        Self: Sized;
    /// Add an edge between u and v.
    fn add_edge(&mut self, u: usize, v: usize) -> Result<()>;
    /// Remove an edge between u and v.
    fn remove_edge(&mut self, u: usize, v: usize) -> Result<()>;
    /// Number of connected components. 0 for the empty graph.
    fn component_count(&mut self) -> usize;
}

#[allow(clippy::ptr_arg)]
fn levels_fmt(levels: &Vec<Vec<L0Sampler>>, f: &mut Formatter) -> std::fmt::Result {
    write!(
        f,
        "{} levels x {} vertices",
        levels.len(),
        levels.first().map_or(0, Vec::len)
    )
}

/// Fully dynamic connectivity from l0-sampling sketches, without storing edges.
///
/// Every vertex keeps, per contraction level, an [`L0Sampler`] of its
/// incidence vector over edge ids `u * n + v` (`u < v`): `+1` at `u` and `-1`
/// at `v` for every present edge. Summing the sketches of a vertex set cancels
/// the edges inside it, so sampling the sum yields an edge leaving the set.
/// [`SketchConnectivity::components`] runs one Borůvka round per level on
/// those sums.
///
/// Answers are correct with high probability, not always: a round where a
/// component's sample fails contributes no merge for that component, and with
/// probability depending on `delta` the final partition is too fine.
///
/// All vertices of one level share the same random sketch parameters, which
/// is what makes their sketches addable. Levels are independent.
///
/// Sketches index edges in `0..n^2` and subsample through a hash over
/// `(n^2)^3`, whose field must stay below 2^64: construction fails with
/// [`Error::Overflow`] for more than 1149 vertices. The field's prime is found
/// by trial division, so construction is already slow for a few hundred
/// vertices.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct SketchConnectivity {
    n: usize,
    /// levels[i][v] is the sketch of v used in round i
    #[derivative(Debug(format_with = "levels_fmt"))]
    levels: Vec<Vec<L0Sampler>>,
    config: SketchConfig,
    #[derivative(Debug = "ignore")]
    rng: StdRng,
}

impl SketchConnectivity {
    pub fn with_config(n: usize, config: SketchConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = config.rng();
        let size = (n as u64)
            .checked_mul(n as u64)
            .ok_or_else(|| Error::overflow("edge id space"))?;
        // 1 + ceil(log2 n) rounds halve the component count down to the true partition.
        let rounds = if n == 0 {
            0
        } else {
            (n.next_power_of_two().trailing_zeros() as usize) + 1
        };
        let mut levels = Vec::with_capacity(rounds);
        for _ in 0..rounds {
            let proto = L0Sampler::new(size, config.delta, &mut rng)?;
            levels.push(vec![proto; n]);
        }
        log::debug!(
            "Sketch connectivity on {n} vertices: {rounds} rounds, delta {}",
            config.delta
        );
        if let Some(s) = levels.first().and_then(|l| l.first()) {
            log::debug!(
                "Each sketch: {} levels, s = {}, {} tables",
                s.levels().len(),
                s.s_value(),
                s.levels().first().map_or(0, |l| l.k())
            );
        }
        Ok(Self {
            n,
            levels,
            config,
            rng,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.n
    }

    /// Number of contraction rounds a query runs.
    pub fn rounds(&self) -> usize {
        self.levels.len()
    }

    pub fn config(&self) -> &SketchConfig {
        &self.config
    }

    /// Representative vertex of each vertex's component, indexed by vertex.
    pub fn components(&mut self) -> Vec<usize> {
        let mut dsu = self.contract();
        (0..self.n).map(|v| dsu.find(v)).collect()
    }

    fn edge_id(&self, mut u: usize, mut v: usize) -> Result<Index> {
        for vertex in [u, v] {
            if vertex >= self.n {
                return Err(Error::VertexOutOfRange {
                    vertex,
                    vertex_count: self.n,
                });
            }
        }
        if u == v {
            return Err(Error::SelfLoop { vertex: u });
        }
        if u > v {
            std::mem::swap(&mut u, &mut v);
        }
        Ok((u * self.n + v) as Index)
    }

    fn update_edge(&mut self, u: usize, v: usize, sign: i64) -> Result<()> {
        let e = self.edge_id(u, v)?;
        let (u, v) = (u.min(v), u.max(v));
        log::trace!("Edge {u} {v} (id {e}) += {sign}");
        for level in &mut self.levels {
            level[u].update(e, sign);
            level[v].update(e, -sign);
        }
        Ok(())
    }

    /// Randomized Borůvka contraction: in round i, sum the level-i sketches of
    /// every current component, sample an outgoing edge from each sum and merge
    /// along it.
    fn contract(&mut self) -> DisjointSetUnion {
        let n = self.n;
        let edge_ids = n as Index * n as Index;
        let mut dsu = DisjointSetUnion::new(n);
        let mut components: BTreeMap<usize, Vec<usize>> =
            (0..n).map(|v| (v, vec![v])).collect();
        for (round, sketches) in self.levels.iter().enumerate() {
            if components.len() <= 1 {
                break;
            }
            let sums: BTreeMap<usize, L0Sampler> = components
                .iter()
                .map(|(&repr, members)| {
                    let mut sum = sketches[members[0]].clone();
                    for &v in &members[1..] {
                        sum += &sketches[v];
                    }
                    (repr, sum)
                })
                .collect();
            for (repr, sum) in &sums {
                match sum.sample(&mut self.rng) {
                    Some((e, _)) if e < edge_ids => {
                        let (a, b) = ((e / n as Index) as usize, (e % n as Index) as usize);
                        log::trace!("Round {round}: component of {repr} leaves through {a} {b}");
                        dsu.union(a, b);
                    }
                    Some((e, value)) => {
                        log::warn!("Round {round}: discarding bogus sample ({e}, {value})")
                    }
                    None => {}
                }
            }
            components.clear();
            for v in 0..n {
                components.entry(dsu.find(v)).or_default().push(v);
            }
            log::trace!(
                "Round {round}: {} -> {} components",
                sums.len(),
                components.len()
            );
        }
        log::debug!("{} components", dsu.count());
        dsu
    }
}

impl DynamicConnectivity for SketchConnectivity {
    fn new(n: usize) -> Result<Self> {
        Self::with_config(n, SketchConfig::default())
    }

    fn add_edge(&mut self, u: usize, v: usize) -> Result<()> {
        self.update_edge(u, v, 1)
    }

    fn remove_edge(&mut self, u: usize, v: usize) -> Result<()> {
        self.update_edge(u, v, -1)
    }

    fn component_count(&mut self) -> usize {
        self.contract().count()
    }
}
