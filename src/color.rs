//! Five-color palette model.
//!
//! Every leaf region is quantized to one of five reference colors. Each
//! color has a canonical RGB triplet used by the renderer and a single
//! printable character used by the textual tree form and the symbol table.

use num_traits::FromPrimitive;

/// The fixed palette. Variant order is the tie-break order for
/// nearest-color quantization.
#[derive(num_derive::FromPrimitive,Clone,Copy,Debug,PartialEq,Eq)]
pub enum Color {
    Black,
    Blue,
    Green,
    Red,
    White
}

/// reference triplets in variant order
const PALETTE: [[u8;3];5] = [
    [0,0,0],
    [0,0,255],
    [0,255,0],
    [255,0,0],
    [255,255,255]
];

impl Color {
    /// character code used in the textual tree and the symbol table
    pub fn to_char(&self) -> char {
        match self {
            Self::Black => 'k',
            Self::Blue => 'b',
            Self::Green => 'g',
            Self::Red => 'r',
            Self::White => 'w'
        }
    }
    /// inverse of `to_char`, None for characters outside the palette
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'k' => Some(Self::Black),
            'b' => Some(Self::Blue),
            'g' => Some(Self::Green),
            'r' => Some(Self::Red),
            'w' => Some(Self::White),
            _ => None
        }
    }
    /// canonical RGB triplet
    pub fn rgb(&self) -> [u8;3] {
        PALETTE[*self as usize]
    }
    /// Quantize a mean color to the nearest reference color under the
    /// Chebyshev metric. Candidates are tried in variant order and only a
    /// strictly smaller distance displaces the running best, so exact ties
    /// go to the earliest variant.
    pub fn nearest(mean: [f64;3]) -> Self {
        let mut best = 0;
        let mut best_dist = f64::MAX;
        for (i,reference) in PALETTE.iter().enumerate() {
            let dist = chebyshev(mean,reference);
            if dist < best_dist {
                best = i;
                best_dist = dist;
            }
        }
        Self::from_usize(best).unwrap() // best indexes PALETTE
    }
}

/// maximum absolute per-channel difference
fn chebyshev(mean: [f64;3],reference: &[u8;3]) -> f64 {
    let mut ans: f64 = 0.0;
    for ch in 0..3 {
        ans = ans.max((mean[ch] - reference[ch] as f64).abs());
    }
    ans
}

#[test]
fn exact_references_map_to_themselves() {
    assert_eq!(Color::nearest([0.0,0.0,0.0]),Color::Black);
    assert_eq!(Color::nearest([0.0,0.0,255.0]),Color::Blue);
    assert_eq!(Color::nearest([0.0,255.0,0.0]),Color::Green);
    assert_eq!(Color::nearest([255.0,0.0,0.0]),Color::Red);
    assert_eq!(Color::nearest([255.0,255.0,255.0]),Color::White);
}

#[test]
fn near_white_maps_to_white() {
    assert_eq!(Color::nearest([240.0,235.0,241.5]),Color::White);
}

#[test]
fn ties_go_to_the_earliest_variant() {
    // mid gray is 127.5 away from every reference
    assert_eq!(Color::nearest([127.5,127.5,127.5]),Color::Black);
}

#[test]
fn char_codes_round_trip() {
    for c in ['k','b','g','r','w'] {
        assert_eq!(Color::from_char(c).unwrap().to_char(),c);
    }
    assert_eq!(Color::from_char('|'),None);
    assert_eq!(Color::from_char('x'),None);
}
