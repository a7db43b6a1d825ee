use std::collections::HashSet;
use std::sync::Arc;

use h5wire_error::{H5WireResult, h5wire_bail};

use crate::DType;

/// The name of a compound member
pub type MemberName = Arc<str>;

/// One named member of a compound layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompoundMember {
    name: MemberName,
    offset: usize,
    dtype: DType,
}

impl CompoundMember {
    /// Create a new member at byte `offset` of the enclosing compound.
    pub fn new(name: impl Into<MemberName>, offset: usize, dtype: DType) -> Self {
        Self {
            name: name.into(),
            offset,
            dtype,
        }
    }

    /// The name of the member
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The byte offset of the member within the compound
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The layout of the member
    pub fn dtype(&self) -> &DType {
        &self.dtype
    }
}

/// A struct layout: a total byte size and a list of members ordered by ascending offset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompoundDType {
    size: usize,
    members: Arc<[CompoundMember]>,
}

impl CompoundDType {
    /// Create a compound layout of `size` bytes.
    ///
    /// Members are sorted by ascending offset. Fails with a layout error if there are no
    /// members, a name is empty or used twice, or a member overlaps another member or reaches
    /// past `size`.
    pub fn try_new(size: usize, mut members: Vec<CompoundMember>) -> H5WireResult<Self> {
        if members.is_empty() {
            h5wire_bail!(Layout: "compound has no members");
        }
        if size == 0 {
            h5wire_bail!(Layout: "compound has a size of zero bytes");
        }

        let mut names = HashSet::with_capacity(members.len());
        for member in &members {
            if member.name.is_empty() {
                h5wire_bail!(Layout: "compound member at offset {} has an empty name", member.offset);
            }
            if !names.insert(member.name.clone()) {
                h5wire_bail!(Layout: "compound member name '{}' is used more than once", member.name);
            }
        }

        members.sort_by_key(|m| m.offset);

        let mut end = 0;
        for member in &members {
            if member.offset < end {
                h5wire_bail!(
                    Layout: "compound member '{}' at offset {} overlaps the previous member",
                    member.name,
                    member.offset
                );
            }
            let Some(member_end) = member.offset.checked_add(member.dtype.byte_size()) else {
                h5wire_bail!(
                    Layout: "compound member '{}' at offset {} reaches past the address space",
                    member.name,
                    member.offset
                );
            };
            end = member_end;
            if end > size {
                h5wire_bail!(
                    Layout: "compound member '{}' ends at byte {} past the compound size of {}",
                    member.name,
                    end,
                    size
                );
            }
        }

        log::debug!(
            "built compound layout of {} bytes with {} members",
            size,
            members.len()
        );

        Ok(Self {
            size,
            members: members.into(),
        })
    }

    /// The total byte size of the compound, including padding
    pub fn size(&self) -> usize {
        self.size
    }

    /// The members, ordered by ascending offset
    pub fn members(&self) -> &[CompoundMember] {
        &self.members
    }

    /// The number of members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always false: a compound has at least one member
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// The member names, ordered by ascending offset
    pub fn names(&self) -> impl DoubleEndedIterator<Item = &str> + ExactSizeIterator + '_ {
        self.members.iter().map(CompoundMember::name)
    }

    /// Find the position of a member by name
    pub fn find(&self, name: &str) -> Option<usize> {
        self.members.iter().position(|m| m.name() == name)
    }

    /// Get a member by name
    pub fn member(&self, name: &str) -> Option<&CompoundMember> {
        self.members.iter().find(|m| m.name() == name)
    }

    /// Get the member at a position
    pub fn member_at(&self, index: usize) -> Option<&CompoundMember> {
        self.members.get(index)
    }
}

/// The names of the first `n` members of a compound layout.
///
/// If `dtype` is not a compound or has fewer than `n` members, all names are empty, which lets
/// a caller fall back to its default member names.
pub fn type_names(dtype: &DType, n: usize) -> Vec<String> {
    match dtype.as_compound() {
        Some(compound) if compound.len() >= n => {
            compound.names().take(n).map(str::to_string).collect()
        }
        _ => vec![String::new(); n],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScalarKind;

    fn f64_member(name: &str, offset: usize) -> CompoundMember {
        CompoundMember::new(name, offset, ScalarKind::F64.into())
    }

    #[test]
    fn members_are_sorted_by_offset() {
        let compound = CompoundDType::try_new(
            24,
            vec![f64_member("c", 16), f64_member("a", 0), f64_member("b", 8)],
        )
        .unwrap();
        assert_eq!(compound.names().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(compound.find("c"), Some(2));
        assert_eq!(compound.member("b").unwrap().offset(), 8);
        assert!(compound.member("z").is_none());
    }

    #[test]
    fn rejects_empty_compound() {
        assert!(CompoundDType::try_new(8, vec![]).unwrap_err().is_layout());
        assert!(
            CompoundDType::try_new(0, vec![f64_member("a", 0)])
                .unwrap_err()
                .is_layout()
        );
    }

    #[test]
    fn rejects_bad_names() {
        let empty = CompoundDType::try_new(8, vec![f64_member("", 0)]);
        assert!(empty.unwrap_err().is_layout());

        let duplicate = CompoundDType::try_new(16, vec![f64_member("a", 0), f64_member("a", 8)]);
        assert!(duplicate.unwrap_err().is_layout());
    }

    #[test]
    fn rejects_overlap_and_overflow() {
        let overlap = CompoundDType::try_new(16, vec![f64_member("a", 0), f64_member("b", 4)]);
        assert!(overlap.unwrap_err().is_layout());

        let overflow = CompoundDType::try_new(12, vec![f64_member("a", 0), f64_member("b", 8)]);
        assert!(overflow.unwrap_err().is_layout());
    }

    #[test]
    fn rejects_members_past_the_address_space() {
        let huge = DType::array(ScalarKind::F64.into(), [u64::MAX]).unwrap();
        let members = vec![f64_member("a", 0), CompoundMember::new("b", 8, huge)];
        assert!(CompoundDType::try_new(16, members).unwrap_err().is_layout());
    }

    #[test]
    fn names_from_layout() {
        let dtype: DType = CompoundDType::try_new(16, vec![f64_member("x", 0), f64_member("y", 8)])
            .unwrap()
            .into();
        assert_eq!(type_names(&dtype, 2), vec!["x", "y"]);
        assert_eq!(type_names(&dtype, 1), vec!["x"]);
        assert_eq!(type_names(&dtype, 3), vec!["", "", ""]);
        assert_eq!(type_names(&ScalarKind::I8.into(), 1), vec![""]);
    }
}
