//! Huffman code tree
//!
//! The tree lives in an arena, nodes refer to their children by index.
//! The builder is the classic greedy algorithm, merging the two lightest nodes
//! until one is left.  Ties are broken by an order key, which is the symbol
//! value for leaves, and 256 plus the creation count for internal nodes.
//! So for equal weights leaves come before internal nodes, low symbols before
//! high ones, and older internal nodes before newer ones.  The node extracted
//! first becomes the left (0) branch.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use super::freq::FreqTable;

/// Order key of the first internal node
const FIRST_INTERNAL_ORDER: usize = 256;
/// Upper bound on arena size, 256 leaves and 255 internal nodes
pub const MAX_NODES: usize = 511;

#[derive(Clone,PartialEq,Debug)]
pub enum Node {
    Leaf {
        symbol: u8,
        weight: u64
    },
    Internal {
        weight: u64,
        left: usize,
        right: usize
    }
}

impl Node {
    pub fn weight(&self) -> u64 {
        match self {
            Node::Leaf { weight, .. } => *weight,
            Node::Internal { weight, .. } => *weight
        }
    }
}

/// Strict binary tree, every internal node has two children.
#[derive(Clone,PartialEq,Debug)]
pub struct Tree {
    nodes: Vec<Node>,
    root: usize
}

impl Tree {
    /// Build the Huffman tree for the given frequencies.
    /// Returns `None` if the table is empty.
    /// If there is only one symbol, the tree is an internal root with the symbol
    /// on the left and a placeholder leaf of weight 0 on the right, so that the
    /// symbol still gets a 1 bit code.
    pub fn build(freq: &FreqTable) -> Option<Self> {
        let mut nodes = Vec::new();
        let mut heap = BinaryHeap::new();
        for (symbol,weight) in freq.iter() {
            heap.push(Reverse((weight,symbol as usize,nodes.len())));
            nodes.push(Node::Leaf { symbol, weight });
        }
        if nodes.len() == 1 {
            let (symbol,weight) = match nodes[0] {
                Node::Leaf { symbol, weight } => (symbol,weight),
                Node::Internal { .. } => return None
            };
            log::debug!("single symbol {}, adding placeholder",symbol);
            nodes.push(Node::Leaf { symbol: symbol.wrapping_add(1), weight: 0 });
            nodes.push(Node::Internal { weight, left: 0, right: 1 });
            return Some(Self { nodes, root: 2 });
        }
        let mut order = FIRST_INTERNAL_ORDER;
        loop {
            let Reverse((w0,_,left)) = heap.pop()?;
            let Reverse((w1,_,right)) = match heap.pop() {
                Some(item) => item,
                None => {
                    log::debug!("built tree with {} nodes",nodes.len());
                    return Some(Self { nodes, root: left });
                }
            };
            let weight = w0 + w1;
            heap.push(Reverse((weight,order,nodes.len())));
            nodes.push(Node::Internal { weight, left, right });
            order += 1;
        }
    }
    /// Wrap an arena assembled elsewhere, caller is responsible for the structure.
    pub(crate) fn from_arena(nodes: Vec<Node>,root: usize) -> Self {
        Self {
            nodes,
            root
        }
    }
    pub fn root(&self) -> usize {
        self.root
    }
    /// panics if `idx` is not from this tree
    pub fn node(&self,idx: usize) -> &Node {
        &self.nodes[idx]
    }
    /// number of nodes in the arena
    pub fn len(&self) -> usize {
        self.nodes.len()
    }
    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| matches!(n,Node::Leaf{..})).count()
    }
    /// weight of the root, which is the symbol count the tree was built from
    pub fn weight(&self) -> u64 {
        self.nodes[self.root].weight()
    }
}

// *************** TESTS *****************

#[test]
fn aabc_shape() {
    let tree = Tree::build(&FreqTable::scan("AABC".as_bytes())).expect("no tree");
    assert_eq!(tree.len(),5);
    assert_eq!(tree.weight(),4);
    let (left,right) = match tree.node(tree.root()) {
        Node::Internal { left, right, .. } => (*left,*right),
        _ => panic!("root should be internal")
    };
    assert_eq!(tree.node(left),&Node::Leaf { symbol: b'A', weight: 2 });
    match tree.node(right) {
        Node::Internal { weight, left, right } => {
            assert_eq!(*weight,2);
            assert_eq!(tree.node(*left),&Node::Leaf { symbol: b'B', weight: 1 });
            assert_eq!(tree.node(*right),&Node::Leaf { symbol: b'C', weight: 1 });
        },
        _ => panic!("expected internal node")
    }
}

#[test]
fn single_symbol_gets_placeholder() {
    let tree = Tree::build(&FreqTable::scan(&[0xff;10])).expect("no tree");
    assert_eq!(tree.len(),3);
    assert_eq!(tree.leaf_count(),2);
    match tree.node(tree.root()) {
        Node::Internal { weight, left, right } => {
            assert_eq!(*weight,10);
            assert_eq!(tree.node(*left),&Node::Leaf { symbol: 0xff, weight: 10 });
            assert_eq!(tree.node(*right),&Node::Leaf { symbol: 0x00, weight: 0 });
        },
        _ => panic!("root should be internal")
    }
}

#[test]
fn empty_table_has_no_tree() {
    assert!(Tree::build(&FreqTable::scan(&[])).is_none());
}

#[test]
fn deterministic() {
    let test_data = "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes();
    let t1 = Tree::build(&FreqTable::scan(test_data));
    let t2 = Tree::build(&FreqTable::scan(test_data));
    assert_eq!(t1,t2);
}

#[test]
fn full_alphabet() {
    let dat: Vec<u8> = (0..=255).collect();
    let tree = Tree::build(&FreqTable::scan(&dat)).expect("no tree");
    assert_eq!(tree.len(),MAX_NODES);
    assert_eq!(tree.leaf_count(),256);
    assert_eq!(tree.weight(),256);
}
