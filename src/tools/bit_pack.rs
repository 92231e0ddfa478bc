//! Bit packing for codes and tree descriptions.
//!
//! Bits are packed most significant bit first.  A partial final byte is padded
//! with zeros, the padding is never interpreted, the decoder stops when it has
//! the number of symbols recorded in the header.

use bit_vec::BitVec;
use crate::Error;
use super::code_tree::{Tree,Node};

/// Accumulates bits and hands back padded bytes
pub struct BitPacker {
    bits: BitVec
}

/// Reads bits from a buffer of packed bytes
pub struct BitUnpacker {
    bits: BitVec,
    ptr: usize
}

impl BitPacker {
    pub fn new() -> Self {
        Self {
            bits: BitVec::new()
        }
    }
    pub fn put_bit(&mut self,bit: bool) {
        self.bits.push(bit);
    }
    pub fn put_code(&mut self,code: &BitVec) {
        self.bits.extend(code.iter());
    }
    /// output all 8 bits of `byte` starting from the MSB
    pub fn put_byte(&mut self,mut byte: u8) {
        for _i in 0..8 {
            self.bits.push(byte & 0x80 > 0);
            byte <<= 1;
        }
    }
    /// number of bits written so far
    pub fn len(&self) -> usize {
        self.bits.len()
    }
    /// consume the packer, the last byte is zero padded
    pub fn finish(self) -> Vec<u8> {
        self.bits.to_bytes()
    }
}

impl BitUnpacker {
    pub fn new(dat: &[u8]) -> Self {
        Self {
            bits: BitVec::from_bytes(dat),
            ptr: 0
        }
    }
    /// Get the next bit, or `None` if the buffer is exhausted
    pub fn get_bit(&mut self) -> Option<bool> {
        let bit = self.bits.get(self.ptr)?;
        self.ptr += 1;
        Some(bit)
    }
    /// get 8 bits, MSB first
    pub fn get_byte(&mut self) -> Option<u8> {
        let mut ans: u8 = 0;
        for _i in 0..8 {
            ans <<= 1;
            ans |= self.get_bit()? as u8;
        }
        Some(ans)
    }
    /// skip the padding up to the next byte boundary
    pub fn align(&mut self) {
        self.ptr = 8 * self.consumed_bytes();
    }
    /// number of bytes touched so far, counting a partial byte
    pub fn consumed_bytes(&self) -> usize {
        (self.ptr + 7) / 8
    }
    pub fn remaining_bits(&self) -> usize {
        self.bits.len() - self.ptr
    }
    /// Decode exactly `count` symbols by walking `tree` from the root,
    /// 0 goes left and 1 goes right.  Running out of bits before `count`
    /// symbols are complete is an error.
    pub fn decode(&mut self,tree: &Tree,count: usize) -> Result<Vec<u8>,Error> {
        // every symbol takes at least one bit, don't trust `count` for the allocation
        let mut ans = Vec::with_capacity(count.min(self.remaining_bits()));
        while ans.len() < count {
            let mut idx = tree.root();
            loop {
                match tree.node(idx) {
                    Node::Leaf { symbol, .. } => {
                        ans.push(*symbol);
                        break;
                    },
                    Node::Internal { left, right, .. } => {
                        idx = match self.get_bit() {
                            Some(false) => *left,
                            Some(true) => *right,
                            None => {
                                log::debug!("payload ran out after {} of {} symbols",ans.len(),count);
                                return Err(Error::CorruptData("payload truncated"));
                            }
                        };
                    }
                }
            }
        }
        Ok(ans)
    }
}

// *************** TESTS *****************

#[cfg(test)]
use super::freq::FreqTable;

#[test]
fn pack_msb_first() {
    let mut packer = BitPacker::new();
    for b in [false,false,true,false,true,true] {
        packer.put_bit(b);
    }
    assert_eq!(packer.len(),6);
    assert_eq!(packer.finish(),vec![0x2c]);

    let mut packer = BitPacker::new();
    packer.put_bit(true);
    packer.put_byte(0x41);
    assert_eq!(packer.len(),9);
    assert_eq!(packer.finish(),vec![0xa0,0x80]);
}

#[test]
fn unpack_bits_and_bytes() {
    let mut unpacker = BitUnpacker::new(&[0xa0,0x80,0xff]);
    assert_eq!(unpacker.get_bit(),Some(true));
    assert_eq!(unpacker.get_byte(),Some(0x41));
    assert_eq!(unpacker.consumed_bytes(),2);
    unpacker.align();
    assert_eq!(unpacker.remaining_bits(),8);
    assert_eq!(unpacker.get_byte(),Some(0xff));
    assert_eq!(unpacker.get_bit(),None);
    assert_eq!(unpacker.get_byte(),None);
}

#[test]
fn decode_aabc() {
    let tree = Tree::build(&FreqTable::scan("AABC".as_bytes())).expect("no tree");
    let mut unpacker = BitUnpacker::new(&[0x2c]);
    assert_eq!(unpacker.decode(&tree,4),Ok("AABC".as_bytes().to_vec()));
    // padding bits are left alone
    assert_eq!(unpacker.remaining_bits(),2);
}

#[test]
fn decode_runs_out() {
    let tree = Tree::build(&FreqTable::scan("AABC".as_bytes())).expect("no tree");
    // 8 bits can hold at most 8 symbols
    let mut unpacker = BitUnpacker::new(&[0x00]);
    assert_eq!(unpacker.decode(&tree,9),Err(Error::CorruptData("payload truncated")));
    // stops in the middle of a code
    let mut unpacker = BitUnpacker::new(&[0x01]);
    assert_eq!(unpacker.decode(&tree,8),Err(Error::CorruptData("payload truncated")));
}
