use std::fmt;

/// The kinds of pile a game may own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RegionKind {
    Row,
    Column,
    Foundation,
    Reserve,
    Discard,
}

impl RegionKind {
    pub const ALL: [RegionKind; 5] = [
        RegionKind::Row,
        RegionKind::Column,
        RegionKind::Foundation,
        RegionKind::Reserve,
        RegionKind::Discard,
    ];
}

/// Address of a pile, independent of where it is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Region {
    pub kind: RegionKind,
    pub index: usize,
}

impl Region {
    pub fn new(kind: RegionKind, index: usize) -> Self {
        Region { kind, index }
    }

    pub fn row(index: usize) -> Self {
        Region::new(RegionKind::Row, index)
    }

    pub fn foundation(index: usize) -> Self {
        Region::new(RegionKind::Foundation, index)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            RegionKind::Row => "row",
            RegionKind::Column => "column",
            RegionKind::Foundation => "foundation",
            RegionKind::Reserve => "reserve",
            RegionKind::Discard => "discard",
        };
        write!(f, "{} {}", kind, self.index)
    }
}

/// An attempted or completed relocation from one pile to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Region,
    pub to: Region,
}

impl Move {
    pub fn new(from: Region, to: Region) -> Self {
        Move { from, to }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}
