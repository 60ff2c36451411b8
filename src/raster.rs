//! RGB raster buffer exchanged with the image pipeline.
//!
//! This is the whole contract with the upstream localization and
//! rectification stages: they hand over a decoded image as a `Raster`,
//! and the renderer gives one back for display or export.

/// Decoded image, row-major with 3 interleaved channels per pixel.
#[derive(Clone,Debug,PartialEq,Eq)]
pub struct Raster {
    pub width: usize,
    pub height: usize,
    /// len = width * height * 3
    pub data: Vec<u8>
}

impl Raster {
    /// all-black raster of the given dimensions
    pub fn new(width: usize,height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0;width * height * 3]
        }
    }
    /// raster filled with one color
    pub fn filled(width: usize,height: usize,rgb: [u8;3]) -> Self {
        let mut ans = Self::new(width,height);
        ans.fill(0,0,width,height,rgb);
        ans
    }
    pub fn get(&self,x: usize,y: usize) -> [u8;3] {
        let i = (y * self.width + x) * 3;
        [self.data[i],self.data[i + 1],self.data[i + 2]]
    }
    pub fn set(&mut self,x: usize,y: usize,rgb: [u8;3]) {
        let i = (y * self.width + x) * 3;
        self.data[i..i + 3].copy_from_slice(&rgb);
    }
    /// fill a rectangle, caller keeps it within bounds
    pub fn fill(&mut self,x: usize,y: usize,w: usize,h: usize,rgb: [u8;3]) {
        for row in y..y + h {
            for col in x..x + w {
                self.set(col,row,rgb);
            }
        }
    }
}

#[test]
fn pixels_round_trip() {
    let mut img = Raster::new(3,2);
    img.set(2,1,[9,8,7]);
    assert_eq!(img.get(2,1),[9,8,7]);
    assert_eq!(img.get(0,0),[0,0,0]);
}

#[test]
fn fill_covers_exactly_the_rectangle() {
    let mut img = Raster::new(4,4);
    img.fill(1,2,2,2,[255,0,0]);
    assert_eq!(img.get(1,2),[255,0,0]);
    assert_eq!(img.get(2,3),[255,0,0]);
    assert_eq!(img.get(0,2),[0,0,0]);
    assert_eq!(img.get(3,1),[0,0,0]);
}
