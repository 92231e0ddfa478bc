//! Byte frequency analysis

/// Count of each byte value in a buffer.
/// Built once per compression and not changed thereafter.
#[derive(Clone,PartialEq,Debug)]
pub struct FreqTable {
    counts: [u64;256]
}

impl FreqTable {
    /// Count every byte in `ibuf`, an empty buffer gives an empty table
    pub fn scan(ibuf: &[u8]) -> Self {
        let mut counts = [0;256];
        for c in ibuf {
            counts[*c as usize] += 1;
        }
        Self {
            counts
        }
    }
    pub fn count(&self,sym: u8) -> u64 {
        self.counts[sym as usize]
    }
    /// number of symbols that actually occur
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|c| **c > 0).count()
    }
    pub fn is_empty(&self) -> bool {
        self.distinct() == 0
    }
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
    /// (symbol,count) for symbols that occur, in ascending symbol order
    pub fn iter(&self) -> impl Iterator<Item=(u8,u64)> + '_ {
        self.counts.iter().enumerate()
            .filter(|(_,c)| **c > 0)
            .map(|(s,c)| (s as u8,*c))
    }
}

// *************** TESTS *****************

#[test]
fn counts_present_symbols() {
    let freq = FreqTable::scan("AABC".as_bytes());
    assert_eq!(freq.count(b'A'),2);
    assert_eq!(freq.count(b'B'),1);
    assert_eq!(freq.count(b'C'),1);
    assert_eq!(freq.count(b'D'),0);
    assert_eq!(freq.distinct(),3);
    assert_eq!(freq.total(),4);
    let v: Vec<(u8,u64)> = freq.iter().collect();
    assert_eq!(v,vec![(b'A',2),(b'B',1),(b'C',1)]);
}

#[test]
fn empty_input() {
    let freq = FreqTable::scan(&[]);
    assert!(freq.is_empty());
    assert_eq!(freq.total(),0);
    assert_eq!(freq.iter().count(),0);
}

#[test]
fn binary_input() {
    let dat: Vec<u8> = (0..=255).chain(0..=255).collect();
    let freq = FreqTable::scan(&dat);
    assert_eq!(freq.distinct(),256);
    assert_eq!(freq.count(0),2);
    assert_eq!(freq.count(255),2);
}
