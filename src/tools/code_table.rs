//! Code table derived from the Huffman tree.
//! The tree remains the source of truth, this is a lookup cache for the encoder.

use bit_vec::BitVec;
use super::code_tree::{Tree,Node};
use super::freq::FreqTable;

/// Map from symbols to their bit strings.
/// Left branches contribute a 0, right branches a 1, starting from the root.
pub struct CodeTable {
    codes: Vec<Option<BitVec>>
}

impl CodeTable {
    /// Walk the tree depth first, every leaf gets an entry
    pub fn derive(tree: &Tree) -> Self {
        let mut codes = vec![None;256];
        let mut stack = vec![(tree.root(),BitVec::new())];
        while let Some((idx,path)) = stack.pop() {
            match tree.node(idx) {
                Node::Leaf { symbol, .. } => {
                    log::trace!("code for {:02X}: {:?}",symbol,path);
                    codes[*symbol as usize] = Some(path);
                },
                Node::Internal { left, right, .. } => {
                    let mut right_path = path.clone();
                    right_path.push(true);
                    stack.push((*right,right_path));
                    let mut left_path = path;
                    left_path.push(false);
                    stack.push((*left,left_path));
                }
            }
        }
        Self {
            codes
        }
    }
    pub fn get(&self,sym: u8) -> Option<&BitVec> {
        self.codes[sym as usize].as_ref()
    }
    /// number of symbols with a code
    pub fn len(&self) -> usize {
        self.codes.iter().filter(|c| c.is_some()).count()
    }
    /// (symbol,code) in ascending symbol order
    pub fn iter(&self) -> impl Iterator<Item=(u8,&BitVec)> + '_ {
        self.codes.iter().enumerate()
            .filter_map(|(s,c)| c.as_ref().map(|code| (s as u8,code)))
    }
    /// length of the longest code
    pub fn max_len(&self) -> usize {
        self.iter().map(|(_,code)| code.len()).max().unwrap_or(0)
    }
    /// Total bits needed to encode data with these frequencies.
    /// Symbols with no code are not counted.
    pub fn encoded_bits(&self,freq: &FreqTable) -> u64 {
        freq.iter()
            .filter_map(|(s,count)| self.get(s).map(|code| count * code.len() as u64))
            .sum()
    }
}

// *************** TESTS *****************

#[cfg(test)]
fn table_for(dat: &[u8]) -> CodeTable {
    CodeTable::derive(&Tree::build(&FreqTable::scan(dat)).expect("no tree"))
}

#[cfg(test)]
fn is_prefix(a: &BitVec,b: &BitVec) -> bool {
    a.len() <= b.len() && a.iter().zip(b.iter()).all(|(x,y)| x==y)
}

#[test]
fn aabc_codes() {
    let table = table_for("AABC".as_bytes());
    assert_eq!(table.len(),3);
    let bits = |s: u8| table.get(s).expect("missing code").iter().collect::<Vec<bool>>();
    assert_eq!(bits(b'A'),vec![false]);
    assert_eq!(bits(b'B'),vec![true,false]);
    assert_eq!(bits(b'C'),vec![true,true]);
    assert!(table.get(b'D').is_none());
    assert_eq!(table.encoded_bits(&FreqTable::scan("AABC".as_bytes())),6);
}

#[test]
fn single_symbol_one_bit() {
    let table = table_for(&[7;100]);
    let code = table.get(7).expect("missing code");
    assert_eq!(code.len(),1);
    assert_eq!(code.get(0),Some(false));
    assert_eq!(table.encoded_bits(&FreqTable::scan(&[7;100])),100);
}

#[test]
fn prefix_free() {
    let mut dat: Vec<u8> = "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes().to_vec();
    dat.extend((0..=255u8).cycle().take(1000).map(|x| x.wrapping_mul(x)));
    let table = table_for(&dat);
    for (a,code_a) in table.iter() {
        assert!(code_a.len() >= 1);
        for (b,code_b) in table.iter() {
            if a != b {
                assert!(!is_prefix(code_a,code_b),"{:02X} is a prefix of {:02X}",a,b);
            }
        }
    }
}

#[test]
fn uniform_alphabet_is_balanced() {
    let dat: Vec<u8> = (0..=255).collect();
    let table = table_for(&dat);
    assert_eq!(table.len(),256);
    assert!(table.iter().all(|(_,code)| code.len()==8));
}

#[test]
fn skewed_distribution() {
    // 8 symbols with geometric counts
    let mut dat = Vec::new();
    for (i,sym) in b"abcdefgh".iter().enumerate() {
        dat.extend(std::iter::repeat(*sym).take(1 << (8 - i)));
    }
    let freq = FreqTable::scan(&dat);
    let table = table_for(&dat);
    let avg = table.encoded_bits(&freq) as f64 / freq.total() as f64;
    assert!(avg <= 3.0);
    assert_eq!(table.get(b'a').map(|c| c.len()),Some(1));
    assert_eq!(table.max_len(),7);
}
