use std::collections::BTreeSet;
use std::sync::{LazyLock, Mutex};

use dynamic_connectivity::{DynamicConnectivity, Error, Result};
use flexi_logger::{Logger, LoggerHandle};

#[allow(dead_code)]
pub static LOGGER: LazyLock<Mutex<LoggerHandle>> = LazyLock::new(|| {
    Mutex::new(
        Logger::try_with_env_or_str("info")
            .unwrap()
            .write_mode(flexi_logger::WriteMode::SupportCapture)
            .log_to_stdout()
            .set_palette("196;208;3;7;8".to_owned())
            .format(|w, now, record| {
                let style = flexi_logger::style(record.level());
                write!(
                    w,
                    "{} {pref}[{}] {}{suf}",
                    now.format("%H:%M:%S"),
                    &record.level().as_str()[0..1],
                    record.args(),
                    pref = style.prefix(),
                    suf = style.suffix(),
                )
            })
            .start()
            .unwrap(),
    )
});

#[allow(dead_code)]
pub fn init_logger() {
    let _ = &*LOGGER;
}

/// Exact connectivity by graph search over stored adjacency sets.
#[derive(Debug)]
pub struct Dumb {
    adj: Vec<BTreeSet<usize>>,
}

#[allow(dead_code)]
impl Dumb {
    /// Component id per vertex, numbered from 1 in order of smallest vertex.
    pub fn groups(&self) -> Vec<usize> {
        let mut groups = vec![0; self.adj.len()];
        let mut group_id = 0;
        for u in 0..self.adj.len() {
            if groups[u] == 0 {
                group_id += 1;
                groups[u] = group_id;
                let mut stack = vec![u];
                while let Some(u) = stack.pop() {
                    stack.extend(self.adj[u].iter().copied().filter(|&v| {
                        if groups[v] == 0 {
                            groups[v] = group_id;
                            true
                        } else {
                            false
                        }
                    }));
                }
            }
        }
        groups
    }

    fn check(&self, u: usize, v: usize) -> Result<()> {
        let n = self.adj.len();
        if let Some(&vertex) = [u, v].iter().find(|&&x| x >= n) {
            return Err(Error::VertexOutOfRange {
                vertex,
                vertex_count: n,
            });
        }
        if u == v {
            return Err(Error::SelfLoop { vertex: u });
        }
        Ok(())
    }
}

impl DynamicConnectivity for Dumb {
    fn new(n: usize) -> Result<Self> {
        Ok(Self {
            adj: vec![BTreeSet::new(); n],
        })
    }

    fn add_edge(&mut self, u: usize, v: usize) -> Result<()> {
        self.check(u, v)?;
        self.adj[u].insert(v);
        self.adj[v].insert(u);
        Ok(())
    }

    fn remove_edge(&mut self, u: usize, v: usize) -> Result<()> {
        self.check(u, v)?;
        self.adj[u].remove(&v);
        self.adj[v].remove(&u);
        Ok(())
    }

    fn component_count(&mut self) -> usize {
        self.groups().into_iter().max().unwrap_or(0)
    }
}

/// Whether two labelings describe the same partition.
#[allow(dead_code)]
pub fn same_partition(a: &[usize], b: &[usize]) -> bool {
    a.len() == b.len()
        && (0..a.len()).all(|u| (0..a.len()).all(|v| (a[u] == a[v]) == (b[u] == b[v])))
}
