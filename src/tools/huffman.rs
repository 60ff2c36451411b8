//! Frequency-driven Huffman code construction.
//!
//! Codes are grown bottom-up over symbol groups: stable-sort the groups
//! descending by frequency, prepend `0` to every code in the lowest group
//! and `1` to every code in the second lowest, merge the two, and repeat
//! until one group remains. The resulting table is prefix free, and the
//! stable sort makes tie handling deterministic: equal frequencies keep
//! their prior relative order, which starts out as character order.

use std::collections::BTreeMap;
use crate::Error;

/// Count symbol occurrences. `BTreeMap` keys iterate in character order,
/// which fixes the initial group order and keeps the symbol table
/// artifact deterministic.
pub fn count<I: IntoIterator<Item = char>>(stream: I) -> BTreeMap<char,u64> {
    let mut freq = BTreeMap::new();
    for c in stream {
        *freq.entry(c).or_insert(0) += 1;
    }
    freq
}

/// Build prefix-free codes from a frequency table.
///
/// A single-symbol alphabet gets the explicit code `0`; a zero-length
/// code could never be decoded. An empty table is `DegenerateAlphabet`.
pub fn build_codes(freq: &BTreeMap<char,u64>) -> Result<BTreeMap<char,String>,Error> {
    if freq.is_empty() {
        return Err(Error::DegenerateAlphabet);
    }
    let mut codes: BTreeMap<char,String> = freq.keys().map(|c| (*c,String::new())).collect();
    if freq.len() == 1 {
        for code in codes.values_mut() {
            code.push('0');
        }
        return Ok(codes);
    }
    let mut groups: Vec<(Vec<char>,u64)> = freq.iter().map(|(c,n)| (vec![*c],*n)).collect();
    while groups.len() > 1 {
        // stable, so equal frequencies keep their prior relative order
        groups.sort_by(|a,b| b.1.cmp(&a.1));
        let (low_chars,low_freq) = groups.pop().unwrap(); // len checked above
        let next = groups.last_mut().unwrap();
        for c in &low_chars {
            codes.get_mut(c).unwrap().insert(0,'0');
        }
        for c in &next.0 {
            codes.get_mut(c).unwrap().insert(0,'1');
        }
        next.0.extend(low_chars);
        next.1 += low_freq;
    }
    Ok(codes)
}

// *************** TESTS *****************

#[cfg(test)]
fn table_for(text: &str) -> BTreeMap<char,String> {
    build_codes(&count(text.chars())).expect("code build failed")
}

#[test]
fn counting_sees_every_character() {
    let freq = count("|kbgr".chars());
    assert_eq!(freq.len(),5);
    assert_eq!(freq[&'|'],1);
    assert_eq!(freq[&'k'],1);
    let freq = count("wwwk".chars());
    assert_eq!(freq[&'w'],3);
    assert_eq!(freq[&'k'],1);
}

#[test]
fn two_symbols_get_one_bit_each() {
    let codes = table_for("wwwwwwwwwk");
    assert_eq!(codes[&'w'],"1");
    assert_eq!(codes[&'k'],"0");
}

#[test]
fn single_symbol_gets_an_explicit_zero() {
    let codes = table_for("wwww");
    assert_eq!(codes[&'w'],"0");
}

#[test]
fn empty_alphabet_is_degenerate() {
    assert!(matches!(build_codes(&BTreeMap::new()),Err(Error::DegenerateAlphabet)));
}

#[test]
fn all_ties_merge_in_character_order() {
    // five symbols of frequency 1, as in the four-quadrant tree |kbgr
    let codes = table_for("|kbgr");
    assert_eq!(codes[&'b'],"10");
    assert_eq!(codes[&'g'],"111");
    assert_eq!(codes[&'k'],"110");
    assert_eq!(codes[&'r'],"01");
    assert_eq!(codes[&'|'],"00");
}

#[test]
fn codes_are_mutually_prefix_free() {
    let codes = table_for("|w|wwww|wwwwkkbgr");
    for (a,code_a) in &codes {
        for (b,code_b) in &codes {
            if a != b {
                assert!(!code_b.starts_with(code_a.as_str()),"{} prefixes {}",code_a,code_b);
            }
        }
    }
}

#[test]
fn higher_frequency_never_means_a_longer_code() {
    let freq = count("kkkkkkkkkkwwwwwb".chars());
    let codes = build_codes(&freq).expect("code build failed");
    let mut pairs: Vec<(u64,usize)> = freq.iter().map(|(c,n)| (*n,codes[c].len())).collect();
    pairs.sort();
    for window in pairs.windows(2) {
        assert!(window[1].1 <= window[0].1);
    }
}
