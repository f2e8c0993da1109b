// Copyright 2026 Tobin Edwards
//
//    Licensed under the Apache License, Version 2.0 (the "License");
//    you may not use this file except in compliance with the License.
//    You may obtain a copy of the License at
//
//        http://www.apache.org/licenses/LICENSE-2.0
//
//    Unless required by applicable law or agreed to in writing, software
//    distributed under the License is distributed on an "AS IS" BASIS,
//    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//    See the License for the specific language governing permissions and
//    limitations under the License.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;
use strum::IntoEnumIterator;
use strum_macros::Display;
use strum_macros::EnumIter;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MaterialError {
    #[error("unknown piece code `{0}`")]
    UnknownCode(String),
}

/// A piece type of a specific side, e.g. a white pawn.
///
/// Materials are written as a two letter code: the piece letter followed
/// by the side letter (`PW` is a white pawn, `KB` the black king).
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Material {
    kind: PieceKind,
    side: Side,
}

impl Material {
    pub const WK: Self = Self::new(White, King);
    pub const WQ: Self = Self::new(White, Queen);
    pub const WR: Self = Self::new(White, Rook);
    pub const WB: Self = Self::new(White, Bishop);
    pub const WN: Self = Self::new(White, Knight);
    pub const WP: Self = Self::new(White, Pawn);

    pub const BK: Self = Self::new(Black, King);
    pub const BQ: Self = Self::new(Black, Queen);
    pub const BR: Self = Self::new(Black, Rook);
    pub const BB: Self = Self::new(Black, Bishop);
    pub const BN: Self = Self::new(Black, Knight);
    pub const BP: Self = Self::new(Black, Pawn);

    #[inline]
    pub const fn new(side: Side, kind: PieceKind) -> Self {
        Self { kind, side }
    }

    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }

    #[inline]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    /// Same side, different kind. Used when a pawn is promoted.
    #[inline]
    pub fn with_kind(self, kind: PieceKind) -> Self {
        Self::new(self.side, kind)
    }

    pub fn code(&self) -> String {
        format!("{}{}", self.kind.letter(), self.side.letter())
    }

    /// Every material, white first.
    pub fn all() -> impl Iterator<Item = Material> {
        Side::iter().flat_map(|side| PieceKind::iter().map(move |kind| Material::new(side, kind)))
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.letter(), self.side.letter())
    }
}

impl FromStr for Material {
    type Err = MaterialError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        let mut chars = code.trim().chars();
        let parsed = match (chars.next(), chars.next(), chars.next()) {
            (Some(k), Some(s), None) => PieceKind::from_letter(k).zip(Side::from_letter(s)),
            _ => None,
        };
        parsed
            .map(|(kind, side)| Material::new(side, kind))
            .ok_or_else(|| MaterialError::UnknownCode(code.to_string()))
    }
}

use Side::{Black, White};

#[derive(Debug, Serialize, Deserialize, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub const fn to_index(&self) -> usize {
        *self as usize
    }

    pub const fn letter(&self) -> char {
        match self {
            White => 'W',
            Black => 'B',
        }
    }

    pub fn from_letter(c: char) -> Option<Self> {
        match c {
            'W' | 'w' => Some(White),
            'B' | 'b' => Some(Black),
            _ => None,
        }
    }

    /// Row direction in which pawns of this side advance.
    #[inline]
    pub const fn forward(&self) -> i32 {
        match self {
            White => -1,
            Black => 1,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pair<T>((T, T));

impl<T> Pair<T> {
    pub const fn new(white: T, black: T) -> Self {
        Self((white, black))
    }
}

impl<T> Pair<T> {
    pub fn white(&self) -> &T {
        &self.0 .0
    }
    pub fn white_mut(&mut self) -> &mut T {
        &mut self.0 .0
    }
    pub fn black(&self) -> &T {
        &self.0 .1
    }
    pub fn black_mut(&mut self) -> &mut T {
        &mut self.0 .1
    }
}

impl<T> Index<Side> for Pair<T> {
    type Output = T;

    #[inline(always)]
    fn index(&self, index: Side) -> &Self::Output {
        match index {
            White => self.white(),
            Black => self.black(),
        }
    }
}

impl<T> IndexMut<Side> for Pair<T> {
    #[inline(always)]
    fn index_mut(&mut self, index: Side) -> &mut Self::Output {
        match index {
            White => self.white_mut(),
            Black => self.black_mut(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}
use PieceKind::{Bishop, King, Knight, Pawn, Queen, Rook};

impl PieceKind {
    pub fn to_index(&self) -> usize {
        *self as usize
    }

    pub const fn letter(&self) -> char {
        match self {
            Pawn => 'P',
            Knight => 'N',
            Bishop => 'B',
            Rook => 'R',
            Queen => 'Q',
            King => 'K',
        }
    }

    pub fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'P' => Some(Pawn),
            'N' => Some(Knight),
            'B' => Some(Bishop),
            'R' => Some(Rook),
            'Q' => Some(Queen),
            'K' => Some(King),
            _ => None,
        }
    }

    /// Points awarded for capturing a piece of this kind.
    pub const fn value(&self) -> u32 {
        match self {
            Pawn => 1,
            Knight | Bishop => 3,
            Rook => 5,
            Queen => 9,
            King => 0,
        }
    }

    pub fn is_king(&self) -> bool {
        matches!(*self, King)
    }
    pub fn is_pawn(&self) -> bool {
        matches!(*self, Pawn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!("PW".parse::<Material>().unwrap(), Material::WP);
        assert_eq!("kb".parse::<Material>().unwrap(), Material::BK);
        assert_eq!(Material::BN.code(), "NB");
        assert_eq!(Material::WQ.to_string(), "QW");
    }
    #[test]
    fn test_bad_codes() {
        assert!("".parse::<Material>().is_err());
        assert!("P".parse::<Material>().is_err());
        assert!("XW".parse::<Material>().is_err());
        assert!("PWX".parse::<Material>().is_err());
    }
    #[test]
    fn test_all_materials() {
        let all: Vec<Material> = Material::all().collect();
        assert_eq!(all.len(), 12);
        assert!(all.contains(&Material::BQ));
    }
    #[test]
    fn test_promoted_material_keeps_side() {
        assert_eq!(Material::BP.with_kind(Queen), Material::BQ);
        assert_eq!(Material::WP.with_kind(Queen), Material::WQ);
    }
    #[test]
    fn test_pair_indexing() {
        let mut pair = Pair::new(0u32, 0u32);
        pair[Black] += 3;
        assert_eq!(*pair.white(), 0);
        assert_eq!(pair[Black], 3);
    }
}
