//! The special-function cache.
//!
//! Memoizes, per AST type, whether the program declares a matching
//! `__pass__`, `__defer__`, or `__assign__`. Fixed-capacity closed
//! addressing: each bucket is either empty or the inline head of a
//! singly linked chain. Keys are compared and hashed structurally, and
//! the cache owns clones of them.
//!
//! The cache is monotonic. Entries are only ever added, and the three
//! answers only move from unknown to a definite yes or no, so an entry
//! reference stays truthful for the cache's whole lifetime.

use crate::ast::ast_types::AstType;
use crate::settings::SF_CACHE_SIZE;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Trilean {
    #[default]
    Unknown,
    Yes,
    No,
}

impl Trilean {
    pub fn from_bool(value: bool) -> Trilean {
        if value { Trilean::Yes } else { Trilean::No }
    }
}

#[derive(Debug)]
pub struct CacheEntry {
    pub ast_type: AstType,
    pub has_pass: Trilean,
    pub has_defer: Trilean,
    pub has_assign: Trilean,
    next: Option<Box<CacheEntry>>,
}

impl CacheEntry {
    fn new(ast_type: AstType) -> CacheEntry {
        CacheEntry {
            ast_type,
            has_pass: Trilean::Unknown,
            has_defer: Trilean::Unknown,
            has_assign: Trilean::Unknown,
            next: None,
        }
    }
}

#[derive(Debug)]
pub struct SpecialFunctionCache {
    buckets: Vec<Option<CacheEntry>>,
}

impl SpecialFunctionCache {
    pub fn new() -> Self {
        let mut buckets = Vec::with_capacity(SF_CACHE_SIZE);
        buckets.resize_with(SF_CACHE_SIZE, || None);
        Self { buckets }
    }

    /// Find the entry for a structurally equal type, or append a fresh
    /// all-unknown entry (cloning the key) on miss.
    pub fn locate_or_insert(&mut self, query: &AstType) -> &mut CacheEntry {
        let index = (query.structural_hash() as usize) & (self.buckets.len() - 1);
        let bucket = &mut self.buckets[index];

        if bucket.is_none() {
            *bucket = Some(CacheEntry::new(query.clone()));
            return bucket.as_mut().unwrap();
        }

        // First pass finds where the entry is (or where the chain
        // ends); second pass walks there mutably.
        let mut depth = 0usize;
        let mut found = false;
        {
            let mut entry = bucket.as_ref().unwrap();
            loop {
                if entry.ast_type == *query {
                    found = true;
                    break;
                }
                match &entry.next {
                    Some(next) => {
                        entry = next;
                        depth += 1;
                    }
                    None => break,
                }
            }
        }

        let mut entry = bucket.as_mut().unwrap();
        for _ in 0..depth {
            entry = entry.next.as_mut().unwrap();
        }

        if !found {
            entry.next = Some(Box::new(CacheEntry::new(query.clone())));
            entry = entry.next.as_mut().unwrap();
        }

        entry
    }

    /// Total number of cached types, across all chains
    pub fn entry_count(&self) -> usize {
        self.buckets
            .iter()
            .map(|bucket| {
                let mut count = 0;
                let mut entry = bucket.as_ref();
                while let Some(current) = entry {
                    count += 1;
                    entry = current.next.as_deref();
                }
                count
            })
            .sum()
    }
}

impl Default for SpecialFunctionCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::string_interning::StringTable;
    use crate::tokens::tokens::SourceLocation;

    #[test]
    fn repeated_lookups_return_the_same_entry() {
        let mut table = StringTable::new();
        let foo = table.intern("Foo");
        let query = AstType::base(foo, SourceLocation::NONE);

        let mut cache = SpecialFunctionCache::new();

        cache.locate_or_insert(&query).has_defer = Trilean::Yes;
        assert_eq!(cache.entry_count(), 1);

        // A structurally equal key, written elsewhere, hits the same entry
        let equal_query = AstType::base(foo, SourceLocation::new(7, 77));
        let entry = cache.locate_or_insert(&equal_query);
        assert_eq!(entry.has_defer, Trilean::Yes);
        assert_eq!(entry.has_pass, Trilean::Unknown);
        assert_eq!(cache.entry_count(), 1);
    }

    #[test]
    fn distinct_types_get_distinct_entries() {
        let mut table = StringTable::new();
        let mut cache = SpecialFunctionCache::new();

        // More types than buckets, so chains must form and stay intact
        for i in 0..(SF_CACHE_SIZE * 2 + 5) {
            let name = table.intern(&format!("Type{i}"));
            let entry = cache.locate_or_insert(&AstType::base(name, SourceLocation::NONE));
            entry.has_pass = Trilean::No;
        }

        assert_eq!(cache.entry_count(), SF_CACHE_SIZE * 2 + 5);

        // Every previously inserted type is still reachable and keeps
        // its recorded answer
        for i in 0..(SF_CACHE_SIZE * 2 + 5) {
            let name = table.intern(&format!("Type{i}"));
            let entry = cache.locate_or_insert(&AstType::base(name, SourceLocation::NONE));
            assert_eq!(entry.has_pass, Trilean::No);
        }
        assert_eq!(cache.entry_count(), SF_CACHE_SIZE * 2 + 5);
    }

    #[test]
    fn pointer_and_pointee_are_different_keys() {
        let mut table = StringTable::new();
        let foo = table.intern("Foo");
        let mut cache = SpecialFunctionCache::new();

        cache
            .locate_or_insert(&AstType::base(foo, SourceLocation::NONE))
            .has_assign = Trilean::Yes;

        let pointer_entry =
            cache.locate_or_insert(&AstType::base_ptr(foo, SourceLocation::NONE));
        assert_eq!(pointer_entry.has_assign, Trilean::Unknown);
        assert_eq!(cache.entry_count(), 2);
    }
}
