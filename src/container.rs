//! Container format
//!
//! The compressed file is laid out as follows:
//!
//! offset | size | field
//! -------|------|------
//! 0      | 4    | magic `48 55 46 01`, i.e. `HUF` followed by the format version
//! 4      | 8    | length of the expanded data, little endian
//! 12     | t    | tree description, zero padded to a byte boundary
//! 12+t   | p    | payload, zero padded to a byte boundary
//!
//! If the expanded length is 0 the file ends after the header.
//!
//! The tree description is a pre-order walk with one bit per node, 0 for an
//! internal node (followed by its left and right subtrees), 1 for a leaf
//! (followed by the 8 bit symbol).  All bits are packed MSB first.

use crate::Error;
use crate::tools::bit_pack::{BitPacker,BitUnpacker};
use crate::tools::code_tree::{Tree,Node};
use crate::tools::code_table::CodeTable;

pub const MAGIC: [u8;4] = [0x48,0x55,0x46,0x01];
pub const HEADER_LEN: usize = 12;
/// an internal node for each leaf but one
const MAX_INTERNAL: usize = 255;

#[derive(Clone,Copy,PartialEq,Debug)]
pub struct Header {
    /// number of bytes in the expanded data
    pub original_length: u64
}

/// Information about a container, as reported by the `info` subcommand
#[derive(Clone,PartialEq,Debug)]
pub struct Summary {
    pub original_length: u64,
    /// number of leaves in the tree, includes the placeholder of a single symbol tree
    pub codes: usize,
    pub max_code_len: usize,
    pub tree_bytes: usize,
    pub payload_bytes: usize
}

pub fn write_header(hdr: &Header,obuf: &mut Vec<u8>) {
    obuf.extend_from_slice(&MAGIC);
    obuf.extend_from_slice(&u64::to_le_bytes(hdr.original_length));
}

/// Parse the header.  Wrong magic means this is not our container at all,
/// right magic but missing length means the container was cut short.
pub fn read_header(ibuf: &[u8]) -> Result<Header,Error> {
    if ibuf.len() < MAGIC.len() || ibuf[0..4] != MAGIC {
        return Err(Error::FileFormatMismatch);
    }
    if ibuf.len() < HEADER_LEN {
        return Err(Error::CorruptData("header truncated"));
    }
    let mut len_bytes = [0;8];
    len_bytes.copy_from_slice(&ibuf[4..HEADER_LEN]);
    Ok(Header {
        original_length: u64::from_le_bytes(len_bytes)
    })
}

/// Write the tree shape in pre-order, weights are not stored
pub fn write_tree(tree: &Tree,packer: &mut BitPacker) {
    let mut stack = vec![tree.root()];
    while let Some(idx) = stack.pop() {
        match tree.node(idx) {
            Node::Leaf { symbol, .. } => {
                packer.put_bit(true);
                packer.put_byte(*symbol);
            },
            Node::Internal { left, right, .. } => {
                packer.put_bit(false);
                stack.push(*right);
                stack.push(*left);
            }
        }
    }
}

/// Rebuild the tree from its description, all weights come back as 0.
/// The root has to be an internal node and no symbol can appear twice.
pub fn read_tree(unpacker: &mut BitUnpacker) -> Result<Tree,Error> {
    const TRUNCATED: Error = Error::CorruptData("tree description truncated");
    let mut nodes = Vec::new();
    let mut seen = [false;256];
    let mut internal_count = 1;
    match unpacker.get_bit() {
        Some(false) => nodes.push(Node::Internal { weight: 0, left: 0, right: 0 }),
        Some(true) => return Err(Error::CorruptData("tree root is a leaf")),
        None => return Err(TRUNCATED)
    }
    // internal nodes still waiting for children, and whether the left one is done
    let mut pending: Vec<(usize,bool)> = vec![(0,false)];
    while let Some((parent,left_done)) = pending.pop() {
        let idx = nodes.len();
        let is_leaf = unpacker.get_bit().ok_or(TRUNCATED)?;
        if is_leaf {
            let symbol = unpacker.get_byte().ok_or(TRUNCATED)?;
            if seen[symbol as usize] {
                return Err(Error::CorruptData("tree has duplicate symbol"));
            }
            seen[symbol as usize] = true;
            nodes.push(Node::Leaf { symbol, weight: 0 });
        } else {
            internal_count += 1;
            if internal_count > MAX_INTERNAL {
                return Err(Error::CorruptData("tree too large"));
            }
            nodes.push(Node::Internal { weight: 0, left: 0, right: 0 });
        }
        if let Node::Internal { left, right, .. } = &mut nodes[parent] {
            match left_done {
                false => *left = idx,
                true => *right = idx
            }
        }
        if !left_done {
            pending.push((parent,true));
        }
        if !is_leaf {
            pending.push((idx,false));
        }
    }
    log::debug!("read tree with {} nodes",nodes.len());
    Ok(Tree::from_arena(nodes,0))
}

/// Parse header and tree without decoding the payload
pub fn inspect(ibuf: &[u8]) -> Result<Summary,Error> {
    let hdr = read_header(ibuf)?;
    if hdr.original_length == 0 {
        return Ok(Summary {
            original_length: 0,
            codes: 0,
            max_code_len: 0,
            tree_bytes: 0,
            payload_bytes: ibuf.len() - HEADER_LEN
        });
    }
    let mut unpacker = BitUnpacker::new(&ibuf[HEADER_LEN..]);
    let tree = read_tree(&mut unpacker)?;
    unpacker.align();
    let tree_bytes = unpacker.consumed_bytes();
    Ok(Summary {
        original_length: hdr.original_length,
        codes: tree.leaf_count(),
        max_code_len: CodeTable::derive(&tree).max_len(),
        tree_bytes,
        payload_bytes: ibuf.len() - HEADER_LEN - tree_bytes
    })
}

// *************** TESTS *****************

#[cfg(test)]
use crate::tools::freq::FreqTable;

#[test]
fn header_works() {
    let mut obuf = Vec::new();
    write_header(&Header { original_length: 0x0102 },&mut obuf);
    assert_eq!(obuf,hex::decode("485546010201000000000000").unwrap());
    assert_eq!(read_header(&obuf),Ok(Header { original_length: 0x0102 }));
}

#[test]
fn bad_header() {
    assert_eq!(read_header(&[]),Err(Error::FileFormatMismatch));
    assert_eq!(read_header("HUF".as_bytes()),Err(Error::FileFormatMismatch));
    assert_eq!(read_header("PK\x03\x04\x00\x00\x00\x00\x00\x00\x00\x00".as_bytes()),Err(Error::FileFormatMismatch));
    assert_eq!(read_header(&hex::decode("4855460102").unwrap()),Err(Error::CorruptData("header truncated")));
}

#[test]
fn tree_description() {
    let tree = Tree::build(&FreqTable::scan("AABC".as_bytes())).expect("no tree");
    let mut packer = BitPacker::new();
    write_tree(&tree,&mut packer);
    assert_eq!(packer.len(),29);
    let desc = packer.finish();
    assert_eq!(desc,hex::decode("50542a18").unwrap());

    let mut unpacker = BitUnpacker::new(&desc);
    let rebuilt = read_tree(&mut unpacker).expect("could not read tree");
    assert_eq!(unpacker.consumed_bytes(),4);
    assert_eq!(rebuilt.len(),tree.len());
    let before: Vec<(u8,Vec<bool>)> = CodeTable::derive(&tree).iter().map(|(s,c)| (s,c.iter().collect())).collect();
    let after: Vec<(u8,Vec<bool>)> = CodeTable::derive(&rebuilt).iter().map(|(s,c)| (s,c.iter().collect())).collect();
    assert_eq!(before,after);
}

#[test]
fn full_tree_description() {
    let dat: Vec<u8> = (0..=255).collect();
    let tree = Tree::build(&FreqTable::scan(&dat)).expect("no tree");
    let mut packer = BitPacker::new();
    write_tree(&tree,&mut packer);
    // 511 node bits and 256 symbols
    assert_eq!(packer.len(),511 + 256*8);
    let desc = packer.finish();
    let rebuilt = read_tree(&mut BitUnpacker::new(&desc)).expect("could not read tree");
    assert_eq!(rebuilt.leaf_count(),256);
}

#[test]
fn bad_tree_description() {
    // root is a leaf
    let mut packer = BitPacker::new();
    packer.put_bit(true);
    packer.put_byte(b'A');
    assert_eq!(read_tree(&mut BitUnpacker::new(&packer.finish())),Err(Error::CorruptData("tree root is a leaf")));
    // nothing at all
    assert_eq!(read_tree(&mut BitUnpacker::new(&[])),Err(Error::CorruptData("tree description truncated")));
    // right branch missing
    let mut packer = BitPacker::new();
    packer.put_bit(false);
    packer.put_bit(true);
    packer.put_byte(b'A');
    let desc = packer.finish();
    assert_eq!(read_tree(&mut BitUnpacker::new(&desc[0..1])),Err(Error::CorruptData("tree description truncated")));
    // same symbol twice
    let mut packer = BitPacker::new();
    packer.put_bit(false);
    packer.put_bit(true);
    packer.put_byte(b'A');
    packer.put_bit(true);
    packer.put_byte(b'A');
    assert_eq!(read_tree(&mut BitUnpacker::new(&packer.finish())),Err(Error::CorruptData("tree has duplicate symbol")));
    // only internal nodes
    assert_eq!(read_tree(&mut BitUnpacker::new(&[0;64])),Err(Error::CorruptData("tree too large")));
}
