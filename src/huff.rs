//! Static Huffman Compression
//!
//! The whole input is scanned to get symbol frequencies, from which an optimal
//! prefix code is built.  The code tree is stored in the container so the
//! expander can rebuild it, see the `container` module for the layout.
//!
//! * This transforms buffers, not files (we expect files that are easily buffered)
//! * Empty input is allowed, and produces a bare header

use std::io::{Read,Write,Seek,SeekFrom};
use crate::container::{self,Header,HEADER_LEN};
use crate::tools::freq::FreqTable;
use crate::tools::code_tree::Tree;
use crate::tools::code_table::CodeTable;
use crate::tools::bit_pack::{BitPacker,BitUnpacker};
use crate::{DYNERR,Error,Options};

/// Main compression function, works on any data and does not fail.
pub fn compress_slice(ibuf: &[u8]) -> Vec<u8> {
    let mut ans = Vec::new();
    container::write_header(&Header { original_length: ibuf.len() as u64 },&mut ans);
    let freq = FreqTable::scan(ibuf);
    let tree = match Tree::build(&freq) {
        Some(tree) => tree,
        None => {
            log::debug!("empty input, header only");
            return ans;
        }
    };
    let table = CodeTable::derive(&tree);
    log::debug!("{} distinct symbols, longest code is {} bits",freq.distinct(),table.max_len());

    let mut tree_bits = BitPacker::new();
    container::write_tree(&tree,&mut tree_bits);
    log::debug!("tree description uses {} bits",tree_bits.len());
    ans.append(&mut tree_bits.finish());

    let mut payload = BitPacker::new();
    for c in ibuf {
        // every symbol in the input has a leaf
        if let Some(code) = table.get(*c) {
            payload.put_code(code);
        }
    }
    log::debug!("payload uses {} bits for {} symbols",payload.len(),ibuf.len());
    ans.append(&mut payload.finish());
    ans
}

/// Main decompression function.
/// The container has to be exactly what `compress_slice` produces,
/// including the absence of anything after the payload.
pub fn expand_slice(ibuf: &[u8]) -> Result<Vec<u8>,Error> {
    let hdr = container::read_header(ibuf)?;
    if hdr.original_length == 0 {
        if ibuf.len() > HEADER_LEN {
            return Err(Error::CorruptData("trailing data"));
        }
        return Ok(Vec::new());
    }
    let count = usize::try_from(hdr.original_length).map_err(|_| Error::CorruptData("length out of range"))?;
    let mut unpacker = BitUnpacker::new(&ibuf[HEADER_LEN..]);
    let tree = container::read_tree(&mut unpacker)?;
    unpacker.align();
    log::debug!("payload starts at offset {}",HEADER_LEN + unpacker.consumed_bytes());
    let ans = unpacker.decode(&tree,count)?;
    if HEADER_LEN + unpacker.consumed_bytes() < ibuf.len() {
        log::debug!("{} bytes follow the payload",ibuf.len() - HEADER_LEN - unpacker.consumed_bytes());
        return Err(Error::CorruptData("trailing data"));
    }
    Ok(ans)
}

/// Measure the stream and read all of it, subject to `opt.max_file_size`
fn read_all<R: Read + Seek>(reader: &mut R,opt: &Options) -> Result<Vec<u8>,DYNERR> {
    let start = reader.stream_position()?;
    let len = reader.seek(SeekFrom::End(0))? - start;
    if len > opt.max_file_size {
        return Err(Box::new(Error::FileTooLarge));
    }
    reader.seek(SeekFrom::Start(start))?;
    let mut ans = Vec::new();
    reader.read_to_end(&mut ans)?;
    Ok(ans)
}

/// Compress a stream.
/// `expanded_in` is an object with `Read` and `Seek` traits, usually `std::fs::File`, or `std::io::Cursor<&[u8]>`.
/// `compressed_out` is an object with `Write` and `Seek` traits, usually `std::fs::File`, or `std::io::Cursor<Vec<u8>>`.
/// Returns (in_size,out_size) or error.
pub fn compress<R,W>(expanded_in: &mut R, compressed_out: &mut W, opt: &Options) -> Result<(u64,u64),DYNERR>
where R: Read + Seek, W: Write + Seek {
    let ibuf = read_all(expanded_in,opt)?;
    let obuf = compress_slice(&ibuf);
    compressed_out.write_all(&obuf)?;
    compressed_out.flush()?;
    Ok((ibuf.len() as u64,obuf.len() as u64))
}

/// Expand a stream.
/// `compressed_in` is an object with `Read` and `Seek` traits, usually `std::fs::File`, or `std::io::Cursor<&[u8]>`.
/// `expanded_out` is an object with `Write` and `Seek` traits, usually `std::fs::File`, or `std::io::Cursor<Vec<u8>>`.
/// Returns (in_size,out_size) or error.
pub fn expand<R,W>(compressed_in: &mut R, expanded_out: &mut W, opt: &Options) -> Result<(u64,u64),DYNERR>
where R: Read + Seek, W: Write + Seek {
    let ibuf = read_all(compressed_in,opt)?;
    let obuf = expand_slice(&ibuf)?;
    expanded_out.write_all(&obuf)?;
    expanded_out.flush()?;
    Ok((ibuf.len() as u64,obuf.len() as u64))
}

// *************** TESTS *****************

#[cfg(test)]
use std::io::Cursor;

/// deterministic pseudo-random bytes
#[cfg(test)]
fn noise(len: usize,seed: u32) -> Vec<u8> {
    let mut state = seed;
    (0..len).map(|_| {
        state = state.wrapping_mul(1664525).wrapping_add(1013904223);
        (state >> 24) as u8
    }).collect()
}

#[test]
fn compression_works() {
    let compressed = compress_slice("AABC".as_bytes());
    assert_eq!(compressed,hex::decode("48554601 0400000000000000 50542a18 2c".replace(" ","")).unwrap());
}

#[test]
fn single_symbol() {
    // tree is 0, 1 'A', 1 'B' (placeholder), payload is 20 zero bits
    let compressed = compress_slice(&[b'A';20]);
    assert_eq!(compressed,hex::decode("48554601 1400000000000000 506840 000000".replace(" ","")).unwrap());
    assert_eq!(expand_slice(&compressed),Ok(vec![b'A';20]));
}

#[test]
fn single_symbol_payload_size() {
    for n in [1usize,7,8,9,1000] {
        let compressed = compress_slice(&vec![0x5a;n]);
        let summary = container::inspect(&compressed).expect("inspect failed");
        assert_eq!(summary.payload_bytes,(n + 7) / 8);
        assert_eq!(summary.max_code_len,1);
        assert_eq!(expand_slice(&compressed),Ok(vec![0x5a;n]));
    }
}

#[test]
fn empty_input() {
    let compressed = compress_slice(&[]);
    assert_eq!(compressed,hex::decode("485546010000000000000000").unwrap());
    assert_eq!(expand_slice(&compressed),Ok(Vec::new()));
}

#[test]
fn invertibility() {
    let test_data = "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes();
    let compressed = compress_slice(test_data);
    assert_eq!(expand_slice(&compressed),Ok(test_data.to_vec()));

    let test_data = [0x00];
    assert_eq!(expand_slice(&compress_slice(&test_data)),Ok(test_data.to_vec()));

    let test_data = [0xff,0x00];
    assert_eq!(expand_slice(&compress_slice(&test_data)),Ok(test_data.to_vec()));
}

#[test]
fn invertibility_binary() {
    for (len,seed) in [(1,1),(2,2),(255,3),(256,4),(4097,5),(65536,6)] {
        let test_data = noise(len,seed);
        let compressed = compress_slice(&test_data);
        assert_eq!(expand_slice(&compressed),Ok(test_data));
    }
    let test_data: Vec<u8> = (0..=255).cycle().take(10000).collect();
    assert_eq!(expand_slice(&compress_slice(&test_data)),Ok(test_data));
}

#[test]
fn deterministic() {
    let test_data = noise(5000,42);
    assert_eq!(compress_slice(&test_data),compress_slice(&test_data));
}

#[test]
fn skewed_input_compresses() {
    // mostly zeros with sparse noise
    let test_data: Vec<u8> = noise(8000,7).iter().map(|x| if *x < 224 { 0 } else { *x }).collect();
    let compressed = compress_slice(&test_data);
    assert!(compressed.len() < test_data.len() / 2);
    assert_eq!(expand_slice(&compressed),Ok(test_data));
}

#[test]
fn bad_magic() {
    assert_eq!(expand_slice("not a container".as_bytes()),Err(Error::FileFormatMismatch));
    assert_eq!(expand_slice(&[]),Err(Error::FileFormatMismatch));
}

#[test]
fn truncation_detected() {
    let test_data = "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes();
    let compressed = compress_slice(test_data);
    for cut in 1..compressed.len() - container::MAGIC.len() {
        let truncated = &compressed[0..compressed.len() - cut];
        assert!(matches!(expand_slice(truncated),Err(Error::CorruptData(_))),"cut {} not detected",cut);
    }
    let compressed = compress_slice("AABC".as_bytes());
    assert_eq!(expand_slice(&compressed[0..compressed.len()-1]),Err(Error::CorruptData("payload truncated")));
}

#[test]
fn trailing_data_detected() {
    let mut compressed = compress_slice("AABC".as_bytes());
    compressed.push(0);
    assert_eq!(expand_slice(&compressed),Err(Error::CorruptData("trailing data")));
    let mut compressed = compress_slice(&[]);
    compressed.push(0);
    assert_eq!(expand_slice(&compressed),Err(Error::CorruptData("trailing data")));
}

#[test]
fn stream_functions() {
    let test_data = "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes();
    let mut src = Cursor::new(test_data);
    let mut compressed: Cursor<Vec<u8>> = Cursor::new(Vec::new());
    let (in_size,out_size) = compress(&mut src,&mut compressed,&crate::STD_OPTIONS).expect("compression failed");
    assert_eq!(in_size,test_data.len() as u64);
    assert_eq!(out_size,compressed.get_ref().len() as u64);
    let mut src = Cursor::new(compressed.into_inner());
    let mut expanded: Cursor<Vec<u8>> = Cursor::new(Vec::new());
    let (_,out_size) = expand(&mut src,&mut expanded,&crate::STD_OPTIONS).expect("expansion failed");
    assert_eq!(out_size,test_data.len() as u64);
    assert_eq!(expanded.into_inner(),test_data.to_vec());
}

#[test]
fn stream_too_large() {
    let opt = Options { max_file_size: 4 };
    let mut src = Cursor::new("12345".as_bytes());
    let mut ans: Cursor<Vec<u8>> = Cursor::new(Vec::new());
    let err = compress(&mut src,&mut ans,&opt).expect_err("size limit ignored");
    assert_eq!(err.downcast_ref::<Error>(),Some(&Error::FileTooLarge));
}
