//! Building blocks for static Huffman coding.
//! These are put together by the `huff` module.

pub mod freq;
pub mod code_tree;
pub mod code_table;
pub mod bit_pack;
