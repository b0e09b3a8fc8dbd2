//! Name-indexed member storage that preserves registration order.

use rustc_hash::FxHashMap;

pub(crate) trait Member {
    fn name(&self) -> &str;
}

pub(crate) struct MemberTable<M> {
    items: Vec<M>,
    by_name: FxHashMap<String, usize>,
}

impl<M: Member> MemberTable<M> {
    pub(crate) fn new() -> Self {
        Self {
            items: Vec::new(),
            by_name: FxHashMap::default(),
        }
    }

    /// Index the next inserted member will receive.
    #[inline]
    pub(crate) fn next_index(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Appends `member`; returns it back if the name is taken.
    pub(crate) fn insert(&mut self, member: M) -> Result<(), M> {
        if self.contains(member.name()) {
            return Err(member);
        }
        self.by_name
            .insert(member.name().to_string(), self.items.len());
        self.items.push(member);
        Ok(())
    }

    #[inline]
    pub(crate) fn find(&self, name: &str) -> Option<&M> {
        self.by_name.get(name).map(|&index| &self.items[index])
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub(crate) fn iter(&self) -> std::slice::Iter<'_, M> {
        self.items.iter()
    }
}
