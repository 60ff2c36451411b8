//! Quadtree decomposition of a raster into flat-color regions.
//!
//! A region splits into four quadrants while its samples spread more than
//! the configured threshold; otherwise it becomes a leaf holding the
//! nearest palette color to the region mean. Nodes never store their own
//! bounds, every traversal re-derives them top-down with the same
//! floor-split rule, so builder, renderer, and the binary container all
//! agree on region geometry.
//!
//! The textual form is the interchange artifact for the container codec:
//! width and height as decimal integers, then the preorder character
//! stream, `|` opening a branch and one palette character per leaf.

use crate::color::Color;
use crate::raster::Raster;
use crate::{Error,Options};

/// four exclusively owned children in NW, NE, SW, SE order
pub struct Quad {
    pub nw: Node,
    pub ne: Node,
    pub sw: Node,
    pub se: Node
}

/// a flat-color region or a subdivided one
pub enum Node {
    Leaf(Color),
    Branch(Box<Quad>)
}

/// Quadtree over a width x height image. Owns the root exclusively;
/// dropping the tree releases every descendant.
pub struct QuadTree {
    root: Node,
    width: usize,
    height: usize
}

/// pixel rectangle, derived during traversal
#[derive(Clone,Copy)]
struct Region {
    x: usize,
    y: usize,
    w: usize,
    h: usize
}

impl Region {
    /// Floor-split into NW, NE, SW, SE. Odd dimensions give the larger
    /// half to the south and east quadrants.
    fn quarters(&self) -> [Region;4] {
        let r = self.h / 2;
        let c = self.w / 2;
        [
            Region { x: self.x, y: self.y, w: c, h: r },
            Region { x: self.x + c, y: self.y, w: self.w - c, h: r },
            Region { x: self.x, y: self.y + r, w: c, h: self.h - r },
            Region { x: self.x + c, y: self.y + r, w: self.w - c, h: self.h - r }
        ]
    }
}

impl QuadTree {
    /// Decompose a raster. Splitting stops once a region is a single
    /// pixel in either dimension, or its sample spread is within the
    /// threshold in `opt`.
    pub fn from_raster(img: &Raster,opt: &Options) -> Result<Self,Error> {
        if img.width == 0 || img.height == 0 {
            return Err(Error::EmptyImage);
        }
        let full = Region { x: 0, y: 0, w: img.width, h: img.height };
        let root = build_node(img,full,opt.split_threshold);
        let ans = Self { root, width: img.width, height: img.height };
        log::debug!("decomposed {}x{} raster into {} leaves",ans.width,ans.height,ans.leaf_count());
        Ok(ans)
    }
    /// Parse the textual form. Fails with `UnknownSymbol` on a character
    /// outside the palette and `TruncatedStream` if the stream ends
    /// mid-traversal; characters past a complete tree are ignored.
    pub fn parse(text: &str) -> Result<Self,Error> {
        let (width,height,stream) = split_text(text)?;
        let mut chars = stream.into_iter();
        let root = parse_node(&mut chars)?;
        Ok(Self { root, width: width as usize, height: height as usize })
    }
    /// textual form: both dimensions, then the preorder character stream
    pub fn to_text(&self) -> String {
        let mut ans = format!("{} {}",self.width,self.height);
        write_node(&self.root,&mut ans);
        ans
    }
    /// Render the tree back into a raster. With `grid` set, a 1-pixel
    /// blue separator is drawn along each internal split boundary, a
    /// visualization aid the decompression path never uses.
    pub fn compose(&self,grid: bool) -> Raster {
        let mut img = Raster::new(self.width,self.height);
        let full = Region { x: 0, y: 0, w: self.width, h: self.height };
        compose_node(&self.root,&mut img,full,grid);
        img
    }
    pub fn width(&self) -> usize {
        self.width
    }
    pub fn height(&self) -> usize {
        self.height
    }
    pub fn leaf_count(&self) -> usize {
        count_leaves(&self.root)
    }
}

/// Split a textual tree artifact into width, height, and the preorder
/// character stream. Dimensions must fit the container's 16 bit fields.
pub fn split_text(text: &str) -> Result<(u16,u16,Vec<char>),Error> {
    let mut chars = text.chars().peekable();
    let width = scan_u16(&mut chars)?;
    let height = scan_u16(&mut chars)?;
    let stream: Vec<char> = chars.filter(|c| !c.is_whitespace()).collect();
    Ok((width,height,stream))
}

fn scan_u16(chars: &mut std::iter::Peekable<std::str::Chars>) -> Result<u16,Error> {
    while chars.peek().map_or(false,|c| c.is_whitespace()) {
        chars.next();
    }
    let mut digits = String::new();
    while chars.peek().map_or(false,|c| c.is_ascii_digit()) {
        digits.push(chars.next().unwrap()); // peek saw a digit
    }
    match digits.parse::<u16>() {
        Ok(val) => Ok(val),
        Err(_) => Err(Error::MalformedHeader)
    }
}

fn build_node(img: &Raster,reg: Region,threshold: f64) -> Node {
    let (mean,min,max) = survey(img,reg);
    if reg.h / 2 != 0 && reg.w / 2 != 0 && (max - min) as f64 > threshold {
        let [nw,ne,sw,se] = reg.quarters();
        Node::Branch(Box::new(Quad {
            nw: build_node(img,nw,threshold),
            ne: build_node(img,ne,threshold),
            sw: build_node(img,sw,threshold),
            se: build_node(img,se,threshold)
        }))
    } else {
        Node::Leaf(Color::nearest(mean))
    }
}

/// per-channel mean and pooled sample extrema over a region
fn survey(img: &Raster,reg: Region) -> ([f64;3],u8,u8) {
    let mut sum = [0u64;3];
    let mut min = u8::MAX;
    let mut max = u8::MIN;
    for y in reg.y..reg.y + reg.h {
        for x in reg.x..reg.x + reg.w {
            let px = img.get(x,y);
            for ch in 0..3 {
                sum[ch] += px[ch] as u64;
                min = min.min(px[ch]);
                max = max.max(px[ch]);
            }
        }
    }
    let n = (reg.w * reg.h) as f64;
    ([sum[0] as f64 / n,sum[1] as f64 / n,sum[2] as f64 / n],min,max)
}

fn parse_node(chars: &mut impl Iterator<Item = char>) -> Result<Node,Error> {
    match chars.next() {
        None => Err(Error::TruncatedStream),
        Some('|') => Ok(Node::Branch(Box::new(Quad {
            nw: parse_node(chars)?,
            ne: parse_node(chars)?,
            sw: parse_node(chars)?,
            se: parse_node(chars)?
        }))),
        Some(c) => match Color::from_char(c) {
            Some(color) => Ok(Node::Leaf(color)),
            None => Err(Error::UnknownSymbol(c))
        }
    }
}

fn write_node(node: &Node,out: &mut String) {
    match node {
        Node::Leaf(color) => out.push(color.to_char()),
        Node::Branch(q) => {
            out.push('|');
            write_node(&q.nw,out);
            write_node(&q.ne,out);
            write_node(&q.sw,out);
            write_node(&q.se,out);
        }
    }
}

fn compose_node(node: &Node,img: &mut Raster,reg: Region,grid: bool) {
    match node {
        Node::Leaf(color) => img.fill(reg.x,reg.y,reg.w,reg.h,color.rgb()),
        Node::Branch(q) => {
            let [nw,ne,sw,se] = reg.quarters();
            compose_node(&q.nw,img,nw,grid);
            compose_node(&q.ne,img,ne,grid);
            compose_node(&q.sw,img,sw,grid);
            compose_node(&q.se,img,se,grid);
            if grid {
                let rgb = Color::Blue.rgb();
                for x in reg.x..reg.x + reg.w {
                    img.set(x,reg.y + reg.h / 2,rgb);
                }
                for y in reg.y..reg.y + reg.h {
                    img.set(reg.x + reg.w / 2,y,rgb);
                }
            }
        }
    }
}

fn count_leaves(node: &Node) -> usize {
    match node {
        Node::Leaf(_) => 1,
        Node::Branch(q) => {
            count_leaves(&q.nw) + count_leaves(&q.ne) + count_leaves(&q.sw) + count_leaves(&q.se)
        }
    }
}

// *************** TESTS *****************

#[cfg(test)]
fn quadrant_raster() -> Raster {
    // NW black, NE blue, SW green, SE red
    let mut img = Raster::new(16,16);
    img.fill(8,0,8,8,[0,0,255]);
    img.fill(0,8,8,8,[0,255,0]);
    img.fill(8,8,8,8,[255,0,0]);
    img
}

#[test]
fn uniform_region_is_a_single_leaf() {
    let img = Raster::filled(4,4,[250,248,251]);
    let tree = QuadTree::from_raster(&img,&crate::STD_OPTIONS).expect("build failed");
    assert_eq!(tree.to_text(),"4 4w");
    assert_eq!(tree.leaf_count(),1);
}

#[test]
fn quadrants_become_four_leaves() {
    let tree = QuadTree::from_raster(&quadrant_raster(),&crate::STD_OPTIONS).expect("build failed");
    assert_eq!(tree.to_text(),"16 16|kbgr");
}

#[test]
fn spread_below_threshold_is_not_split() {
    // spread of 40 stays below the default threshold of 45
    let mut img = Raster::filled(4,4,[215,215,215]);
    img.fill(0,0,2,2,[255,255,255]);
    let tree = QuadTree::from_raster(&img,&crate::STD_OPTIONS).expect("build failed");
    assert_eq!(tree.to_text(),"4 4w");
}

#[test]
fn single_pixel_dimension_is_never_split() {
    let mut img = Raster::new(1,4);
    img.fill(0,0,1,2,[255,255,255]);
    let tree = QuadTree::from_raster(&img,&crate::STD_OPTIONS).expect("build failed");
    assert_eq!(tree.leaf_count(),1);
}

#[test]
fn odd_dimensions_give_the_larger_half_east() {
    // 5x3, left 2 columns white, right 3 black: every quadrant is uniform
    let mut img = Raster::filled(5,3,[255,255,255]);
    img.fill(2,0,3,3,[0,0,0]);
    let tree = QuadTree::from_raster(&img,&crate::STD_OPTIONS).expect("build failed");
    assert_eq!(tree.to_text(),"5 3|wkwk");
}

#[test]
fn empty_raster_is_rejected() {
    let img = Raster::new(0,4);
    assert!(matches!(QuadTree::from_raster(&img,&crate::STD_OPTIONS),Err(Error::EmptyImage)));
}

#[test]
fn serialization_round_trip_is_pixel_identical() {
    let mut img = quadrant_raster();
    // make the NW quadrant itself split
    img.fill(4,0,4,4,[255,255,255]);
    let tree = QuadTree::from_raster(&img,&crate::STD_OPTIONS).expect("build failed");
    let reparsed = QuadTree::parse(&tree.to_text()).expect("parse failed");
    assert_eq!(tree.compose(false),reparsed.compose(false));
    assert_eq!(tree.to_text(),reparsed.to_text());
}

#[test]
fn compose_fills_leaf_rectangles() {
    let tree = QuadTree::parse("16 16|kbgr").expect("parse failed");
    let img = tree.compose(false);
    assert_eq!(img.get(0,0),[0,0,0]);
    assert_eq!(img.get(15,0),[0,0,255]);
    assert_eq!(img.get(0,15),[0,255,0]);
    assert_eq!(img.get(15,15),[255,0,0]);
}

#[test]
fn grid_draws_split_boundaries() {
    let tree = QuadTree::parse("4 4|kbgr").expect("parse failed");
    let img = tree.compose(true);
    assert_eq!(img.get(0,2),[0,0,255]);
    assert_eq!(img.get(2,0),[0,0,255]);
    // grid is a visualization aid only
    assert_eq!(tree.compose(false).get(0,2),[0,255,0]);
}

#[test]
fn parse_rejects_unknown_characters() {
    assert!(matches!(QuadTree::parse("4 4x"),Err(Error::UnknownSymbol('x'))));
}

#[test]
fn parse_rejects_truncated_streams() {
    assert!(matches!(QuadTree::parse("4 4|kb"),Err(Error::TruncatedStream)));
    assert!(matches!(QuadTree::parse("4 4"),Err(Error::TruncatedStream)));
}

#[test]
fn dimensions_beyond_16_bits_are_rejected() {
    assert!(matches!(QuadTree::parse("70000 4w"),Err(Error::MalformedHeader)));
    assert!(matches!(QuadTree::parse("4 -4w"),Err(Error::MalformedHeader)));
    assert!(matches!(QuadTree::parse("w"),Err(Error::MalformedHeader)));
}

#[test]
fn header_values_round_trip_at_the_16_bit_limit() {
    let (w,h,stream) = split_text("65535 65535w").expect("split failed");
    assert_eq!((w,h),(65535,65535));
    assert_eq!(stream,vec!['w']);
}
