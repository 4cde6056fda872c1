use crate::ts::builder::TreeSequenceBuilder;
use crate::variants::Allele;
use std::io;
use std::io::Write;
use std::path::Path;

/// The node table of an inferred tree sequence: one entry per ancestor and
/// sample, in node id order.
#[derive(Clone, Debug)]
pub struct NodeTable {
    /// 1 for sample nodes, 0 for internal (ancestor) nodes
    pub flags: Vec<u32>,
    /// node time, the integer epoch age as a float
    pub time: Vec<f64>,
}

/// The edgeset table of an inferred tree sequence: parallel arrays of
/// intervals (genome positions), parents, and flattened child lists.
#[derive(Clone, Debug)]
pub struct EdgesetTable {
    pub left: Vec<f64>,
    pub right: Vec<f64>,
    pub parent: Vec<usize>,
    /// concatenated child lists of all edgesets
    pub children: Vec<usize>,
    /// number of children of each edgeset, indexing into `children`
    pub children_length: Vec<u32>,
}

/// The mutation table of an inferred tree sequence.
#[derive(Clone, Debug)]
pub struct MutationTable {
    pub site: Vec<usize>,
    pub node: Vec<usize>,
    pub derived_state: Vec<Allele>,
}

/// An inferred tree sequence as parallel-array tables, ready for an external
/// serializer.
#[derive(Clone, Debug)]
pub struct TreeSequence {
    pub nodes: NodeTable,
    pub edgesets: EdgesetTable,
    pub mutations: MutationTable,
}

impl TreeSequence {
    /// Assemble the output tables from a finished builder.
    pub(crate) fn from_builder(builder: &TreeSequenceBuilder) -> Self {
        let (flags, time) = builder.dump_nodes();
        let (left, right, parent, children, children_length) = builder.dump_edgesets();
        let (site, node, derived_state) = builder.dump_mutations();

        Self {
            nodes: NodeTable { flags, time },
            edgesets: EdgesetTable {
                left,
                right,
                parent,
                children,
                children_length,
            },
            mutations: MutationTable {
                site,
                node,
                derived_state,
            },
        }
    }

    /// The number of nodes in the tree sequence.
    pub fn num_nodes(&self) -> usize {
        self.nodes.time.len()
    }

    /// The number of edgesets in the tree sequence.
    pub fn num_edgesets(&self) -> usize {
        self.edgesets.parent.len()
    }

    /// The number of mutations in the tree sequence.
    pub fn num_mutations(&self) -> usize {
        self.mutations.site.len()
    }

    /// Iterate over the edgesets as `(left, right, parent, children)` tuples.
    pub fn edgeset_iter(&self) -> impl Iterator<Item = (f64, f64, usize, &[usize])> + '_ {
        let mut offset = 0;
        self.edgesets
            .children_length
            .iter()
            .enumerate()
            .map(move |(index, &length)| {
                let children = &self.edgesets.children[offset..offset + length as usize];
                offset += length as usize;
                (
                    self.edgesets.left[index],
                    self.edgesets.right[index],
                    self.edgesets.parent[index],
                    children,
                )
            })
    }

    /// Export the tree sequence as tab-separated tables (`nodes.tsv`,
    /// `edgesets.tsv`, `mutations.tsv`) into the given directory.
    pub fn tskit_export(&self, path: &Path) -> io::Result<()> {
        let mut node_file = path.to_path_buf();
        node_file.push("nodes.tsv");
        let mut writer = std::fs::File::create(node_file)?;

        writer.write_fmt(format_args!("id\tis_sample\ttime\n"))?;
        for node in 0..self.num_nodes() {
            writer.write_fmt(format_args!(
                "{id}\t{is_sample}\t{time}\n",
                id = node,
                is_sample = self.nodes.flags[node],
                time = self.nodes.time[node],
            ))?;
        }

        let mut edgeset_file = path.to_path_buf();
        edgeset_file.push("edgesets.tsv");
        let mut writer = std::fs::File::create(edgeset_file)?;

        writer.write_fmt(format_args!("left\tright\tparent\tchildren\n"))?;
        for (left, right, parent, children) in self.edgeset_iter() {
            let children = children
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(",");
            writer.write_fmt(format_args!("{left}\t{right}\t{parent}\t{children}\n"))?;
        }

        let mut mutation_file = path.to_path_buf();
        mutation_file.push("mutations.tsv");
        let mut writer = std::fs::File::create(mutation_file)?;

        writer.write_fmt(format_args!("site\tnode\tderived_state\n"))?;
        for index in 0..self.num_mutations() {
            writer.write_fmt(format_args!(
                "{site}\t{node}\t{derived_state}\n",
                site = self.mutations.site[index],
                node = self.mutations.node[index],
                derived_state = self.mutations.derived_state[index],
            ))?;
        }

        Ok(())
    }
}
