use serde::Deserialize;
use serde::Serialize;
use std::cmp::max;
use std::cmp::min;
use std::ops::Add;
use std::ops::AddAssign;

/// A half-open byte range within a single source file.
///
/// A location is not guaranteed to point at real text: nodes synthesized by
/// later stages copy the location of whatever they were derived from.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Debug, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Loc(pub usize, pub usize);

impl Loc {
  pub fn len(&self) -> usize {
    self.1.saturating_sub(self.0)
  }

  pub fn is_empty(&self) -> bool {
    self.0 >= self.1
  }

  pub fn extend(&mut self, other: Loc) {
    self.0 = min(self.0, other.0);
    self.1 = max(self.1, other.1);
  }
}

impl Add for Loc {
  type Output = Loc;

  fn add(self, rhs: Self) -> Self::Output {
    let mut new = self;
    new.extend(rhs);
    new
  }
}

impl AddAssign for Loc {
  fn add_assign(&mut self, rhs: Self) {
    self.extend(rhs);
  }
}

#[cfg(test)]
mod tests {
  use super::Loc;

  #[test]
  fn adding_locs_covers_both() {
    assert_eq!(Loc(4, 6) + Loc(1, 2), Loc(1, 6));
    let mut loc = Loc(3, 3);
    assert!(loc.is_empty());
    loc += Loc(3, 9);
    assert_eq!(loc.len(), 6);
  }
}
