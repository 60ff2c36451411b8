//! Whiteboard container format
//!
//! A `.wb` file holds a Huffman coded quadtree character stream behind a
//! 35 bit header: 16 bit width, 16 bit height, and a 3 bit count of the
//! zero bits that pad the final byte, all MSB first. The code table
//! travels beside it in a `.sym` file with one `character code` line per
//! symbol, in character order.
//!
//! Compression reads the textual tree artifact produced by the quadtree
//! serializer; every character after the two dimension integers is a
//! symbol, the `|` branch markers included, since decoding must rebuild
//! the tree shape. Expansion reproduces the textual artifact byte for
//! byte. Failures abort the phase; a partial output file is not valid.

use bit_vec::BitVec;
use std::collections::HashMap;
use std::io::{Cursor,Read,Write};
use crate::tools::{bitio,huffman};
use crate::quad;
use crate::{Error,Options,DYNERR};

/// width, height, and pad count
const HEADER_BITS: usize = 35;

/// Code the textual tree from `qd_in` into a container on `wb_out`,
/// persisting the symbol table to `sym_out`.
/// Returns (text size, container size) in bytes.
pub fn compress<R,W,S>(qd_in: &mut R,wb_out: &mut W,sym_out: &mut S,opt: &Options) -> Result<(u64,u64),DYNERR>
where R: Read, W: Write, S: Write {
    let mut text = String::new();
    qd_in.read_to_string(&mut text)?;
    let (width,height,stream) = quad::split_text(&text)?;
    let freq = huffman::count(stream.iter().copied());
    let codes = huffman::build_codes(&freq)?;
    let total_bits: u64 = freq.iter().map(|(c,n)| n * codes[c].len() as u64).sum();
    // historical pad formula; congruent to byte alignment of header plus
    // stream because 13 + 35 is a multiple of 8
    let pad_bits = (13 - total_bits as i64).rem_euclid(8) as usize;
    log::debug!("{} symbols, {} code bits, {} pad bits",stream.len(),total_bits,pad_bits);
    let mut writer = bitio::BitWriter::new(wb_out,opt.chunk_size);
    writer.put_uint(width as usize,16)?;
    writer.put_uint(height as usize,16)?;
    writer.put_uint(pad_bits,3)?;
    for c in &stream {
        writer.put_code(&codes[c])?;
    }
    writer.finish()?;
    for (c,code) in &codes {
        writeln!(sym_out,"{} {}",c,code)?;
    }
    sym_out.flush()?;
    Ok((text.len() as u64,(HEADER_BITS as u64 + total_bits + pad_bits as u64) / 8))
}

/// Decode the container on `wb_in` using the symbol table from `sym_in`,
/// writing the textual tree to `qd_out`.
/// Returns (container size, text size) in bytes.
pub fn expand<R,S,W>(wb_in: &mut R,sym_in: &mut S,qd_out: &mut W,opt: &Options) -> Result<(u64,u64),DYNERR>
where R: Read, S: Read, W: Write {
    let table = read_symbols(sym_in)?;
    let mut reader = bitio::BitReader::new(wb_in,opt.chunk_size);
    let mut in_size: u64 = 0;
    let mut bits: BitVec = reader.next_chunk()?;
    in_size += bits.len() as u64 / 8;
    while bits.len() < HEADER_BITS && reader.ready()? {
        let mut more = reader.next_chunk()?;
        in_size += more.len() as u64 / 8;
        bits.append(&mut more);
    }
    if bits.len() < HEADER_BITS {
        return Err(Box::new(Error::MalformedHeader));
    }
    let width = bitio::peek_uint(&bits,0,16);
    let height = bitio::peek_uint(&bits,16,16);
    let pad_bits = bitio::peek_uint(&bits,32,3);
    log::debug!("container is {}x{} with {} pad bits",width,height,pad_bits);
    let mut text = format!("{} {}",width,height);
    let mut candidate = String::new();
    let mut start = HEADER_BITS;
    loop {
        let more = reader.ready()?;
        // pad bits at the very end of the stream are not data
        let stop = match more {
            true => bits.len(),
            false => bits.len() - pad_bits
        };
        for i in start..stop {
            candidate.push(match bits[i] {
                true => '1',
                false => '0'
            });
            if let Some(c) = table.get(&candidate) {
                text.push(*c);
                candidate.clear();
            }
        }
        if !more {
            break;
        }
        bits = reader.next_chunk()?;
        in_size += bits.len() as u64 / 8;
        start = 0;
    }
    if !candidate.is_empty() {
        return Err(Box::new(Error::TruncatedStream));
    }
    qd_out.write_all(text.as_bytes())?;
    qd_out.flush()?;
    Ok((in_size,text.len() as u64))
}

/// parse `.sym` lines into the reverse code lookup
fn read_symbols<S: Read>(sym_in: &mut S) -> Result<HashMap<String,char>,DYNERR> {
    let mut text = String::new();
    sym_in.read_to_string(&mut text)?;
    let mut table = HashMap::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.as_slice() {
            [sym,code] if sym.chars().count() == 1 && code.chars().all(|c| c == '0' || c == '1') => {
                table.insert(code.to_string(),sym.chars().next().unwrap());
            },
            _ => {
                log::error!("bad symbol table line `{}`",line);
                return Err(Box::new(Error::MalformedSymbolTable));
            }
        }
    }
    Ok(table)
}

/// Convenience function, calls `compress` on a textual tree in a slice,
/// returning the container and symbol table as byte vectors.
pub fn compress_slice(slice: &[u8],opt: &Options) -> Result<(Vec<u8>,Vec<u8>),DYNERR> {
    let mut src = Cursor::new(slice);
    let mut wb: Cursor<Vec<u8>> = Cursor::new(Vec::new());
    let mut sym: Cursor<Vec<u8>> = Cursor::new(Vec::new());
    compress(&mut src,&mut wb,&mut sym,opt)?;
    Ok((wb.into_inner(),sym.into_inner()))
}

/// Convenience function, calls `expand` with container and symbol table
/// slices, returning the textual tree as a byte vector.
pub fn expand_slice(wb: &[u8],sym: &[u8],opt: &Options) -> Result<Vec<u8>,DYNERR> {
    let mut container = Cursor::new(wb);
    let mut table = Cursor::new(sym);
    let mut qd: Cursor<Vec<u8>> = Cursor::new(Vec::new());
    expand(&mut container,&mut table,&mut qd,opt)?;
    Ok(qd.into_inner())
}

// *************** TESTS *****************

#[test]
fn single_leaf_container_bytes() {
    // one symbol coded "0": header 35 bits + 1 code bit + 4 pad bits
    let (wb,sym) = compress_slice(b"4 4w",&crate::STD_OPTIONS).expect("compression failed");
    assert_eq!(wb,hex::decode("0004000480").unwrap());
    assert_eq!(sym,b"w 0\n".to_vec());
}

#[test]
fn four_quadrant_container_round_trips() {
    let text = b"16 16|kbgr";
    let (wb,sym) = compress_slice(text,&crate::STD_OPTIONS).expect("compression failed");
    let expanded = expand_slice(&wb,&sym,&crate::STD_OPTIONS).expect("expansion failed");
    assert_eq!(expanded,text.to_vec());
}

#[test]
fn weighted_stream_round_trips() {
    // 9 white leaves against 1 black: w codes in a single bit
    let text = b"16 16|w|wwww|wwwwk";
    let (wb,sym) = compress_slice(text,&crate::STD_OPTIONS).expect("compression failed");
    assert_eq!(sym,b"k 00\nw 1\n| 01\n".to_vec());
    // 35 header bits + 17 code bits + 4 pad bits
    assert_eq!(wb.len(),7);
    let expanded = expand_slice(&wb,&sym,&crate::STD_OPTIONS).expect("expansion failed");
    assert_eq!(expanded,text.to_vec());
}

#[test]
fn multi_chunk_container_round_trips() {
    // long enough to spill the bit stream across several 8 byte chunks;
    // the container codes the character stream without parsing tree shape
    let mut text = String::from("640 480");
    for _i in 0..20 {
        text.push_str("|kbgr");
        text.push_str("|wwgr");
    }
    text.push_str("wwww");
    let (wb,sym) = compress_slice(text.as_bytes(),&crate::STD_OPTIONS).expect("compression failed");
    assert!(wb.len() > 24);
    let expanded = expand_slice(&wb,&sym,&crate::STD_OPTIONS).expect("expansion failed");
    assert_eq!(expanded,text.as_bytes().to_vec());
}

#[test]
fn pad_bit_total_is_byte_aligned() {
    for text in ["4 4w","16 16|kbgr","16 16|w|wwww|wwwwk","2 2|kbgr"] {
        let (wb,sym) = compress_slice(text.as_bytes(),&crate::STD_OPTIONS).expect("compression failed");
        let bits = BitVec::from_bytes(&wb);
        let pad = bitio::peek_uint(&bits,32,3);
        // trailing pad bits are zero and the total is whole bytes
        for i in bits.len() - pad..bits.len() {
            assert!(!bits[i]);
        }
        let expanded = expand_slice(&wb,&sym,&crate::STD_OPTIONS).expect("expansion failed");
        assert_eq!(expanded,text.as_bytes().to_vec());
    }
}

#[test]
fn dimension_limit_round_trips() {
    let (wb,sym) = compress_slice(b"65535 65535w",&crate::STD_OPTIONS).expect("compression failed");
    assert_eq!(wb,hex::decode("ffffffff80").unwrap());
    let expanded = expand_slice(&wb,&sym,&crate::STD_OPTIONS).expect("expansion failed");
    assert_eq!(expanded,b"65535 65535w".to_vec());
}

#[test]
fn oversized_dimensions_are_malformed() {
    let err = compress_slice(b"70000 4w",&crate::STD_OPTIONS).unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(),Some(Error::MalformedHeader)));
}

#[test]
fn short_container_is_malformed() {
    let err = expand_slice(&[0x00,0x04,0x00],b"w 0\n",&crate::STD_OPTIONS).unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(),Some(Error::MalformedHeader)));
}

#[test]
fn empty_stream_is_degenerate() {
    let err = compress_slice(b"4 4",&crate::STD_OPTIONS).unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(),Some(Error::DegenerateAlphabet)));
}

#[test]
fn bad_symbol_table_lines_are_rejected() {
    let wb = hex::decode("0004000480").unwrap();
    let err = expand_slice(&wb,b"w zero\n",&crate::STD_OPTIONS).unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(),Some(Error::MalformedSymbolTable)));
    let err = expand_slice(&wb,b"w\n",&crate::STD_OPTIONS).unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(),Some(Error::MalformedSymbolTable)));
}

#[test]
fn truncated_stream_is_detected() {
    // container claims zero pad bits, then ends inside a code word:
    // five ones never complete the six-bit `w` code
    let mut bits = BitVec::new();
    for _i in 0..35 {
        bits.push(false);
    }
    for _i in 0..5 {
        bits.push(true);
    }
    let err = expand_slice(&bits.to_bytes(),b"k 0\nw 111111\n",&crate::STD_OPTIONS).unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(),Some(Error::TruncatedStream)));
}

#[test]
fn compressed_output_beats_the_text_for_large_trees() {
    let mut text = String::from("512 512");
    for _i in 0..50 {
        text.push_str("|kbgrw");
    }
    text.push_str("www");
    let (in_size,out_size) = {
        let mut src = Cursor::new(text.as_bytes());
        let mut wb: Cursor<Vec<u8>> = Cursor::new(Vec::new());
        let mut sym: Cursor<Vec<u8>> = Cursor::new(Vec::new());
        compress(&mut src,&mut wb,&mut sym,&crate::STD_OPTIONS).expect("compression failed")
    };
    assert_eq!(in_size,text.len() as u64);
    assert!(out_size < in_size);
}
