//! Reconciliation module.
//!
//! This module merges the entries computed from the cache with the
//! folders currently visible upstream, producing the execution list
//! of one request.

use log::trace;
use std::collections::HashSet;

use super::{ExecutionList, FolderEntry, Instruction, LeaseCheck, Result};

/// Builds the execution list.
///
/// Given the cache entries × the live folders, checks every 2² = 4
/// possibilities:
///
/// - 00: nothing to do
/// - 01: the folder is new, it needs an initial insert if the lease
///   is held, otherwise it is served from the (empty) cache
/// - 10: the folder disappeared upstream, its cache is deleted
/// - 11: the cache entry is kept as it is
///
/// Finally, updates of folders outside the requested scope are
/// dropped: only folders actually read are refetched, while first
/// loads and deletions always happen.
pub fn build_execution_list<'a, I, R, L>(
    mut persisted: ExecutionList,
    live: impl IntoIterator<Item = &'a str>,
    requested: &HashSet<R>,
    refresh_interval: I,
    lease: &mut L,
) -> Result<ExecutionList>
where
    I: Fn(&str) -> i64,
    R: std::borrow::Borrow<str> + Eq + std::hash::Hash,
    L: LeaseCheck + ?Sized,
{
    let mut list = ExecutionList::default();

    for folder_id in live {
        match persisted.remove(folder_id) {
            // 11
            Some(entry) => {
                list.insert(entry);
            }
            // 01
            None => {
                let instruction = if lease.is_held()? {
                    Instruction::InitialInsert
                } else {
                    Instruction::ReadDb
                };
                trace!("new folder {folder_id} classified as {instruction}");
                list.insert(
                    FolderEntry::new(folder_id, instruction)
                        .refresh_interval(refresh_interval(folder_id)),
                );
            }
        }
    }

    // 10
    for entry in persisted {
        trace!("folder {} disappeared upstream", entry.folder_id);
        list.insert(entry.with_instruction(Instruction::Delete));
    }

    list.retain(|entry| {
        entry.instruction != Instruction::Update || requested.contains(entry.folder_id.as_str())
    });

    Ok(list)
}

#[cfg(test)]
mod reconciliation {
    use std::collections::HashSet;

    use super::super::{ExecutionList, FolderEntry, Instruction};

    fn build(
        persisted: &[(&str, Instruction)],
        live: &[&str],
        requested: &[&str],
        mut lease: bool,
    ) -> ExecutionList {
        let persisted = persisted
            .iter()
            .map(|(id, instruction)| FolderEntry::new(id, *instruction).last_update(Some(1)))
            .collect();
        let requested: HashSet<&str> = requested.iter().copied().collect();

        super::build_execution_list(
            persisted,
            live.iter().copied(),
            &requested,
            |_| 60,
            &mut lease,
        )
        .unwrap()
    }

    #[test]
    fn new_account() {
        let list = build(&[], &["f1", "f2"], &["f1", "f2"], true);
        assert_eq!(list.len(), 2);
        assert_eq!(list.instruction("f1"), Some(Instruction::InitialInsert));
        assert_eq!(list.instruction("f2"), Some(Instruction::InitialInsert));
        assert_eq!(list["f1"].refresh_interval, 60);
        assert_eq!(list["f1"].last_update, None);

        let list = build(&[], &["f1", "f2"], &["f1", "f2"], false);
        assert_eq!(list.count(Instruction::ReadDb), 2);
    }

    #[test]
    fn fresh_folder_is_kept() {
        let list = build(&[("f1", Instruction::ReadDb)], &["f1"], &["f1"], true);
        assert_eq!(
            list,
            ExecutionList::from_iter([
                FolderEntry::new("f1", Instruction::ReadDb).last_update(Some(1))
            ])
        );
    }

    #[test]
    fn update_outside_requested_scope_is_dropped() {
        let list = build(
            &[("f1", Instruction::Update), ("f2", Instruction::ReadDb)],
            &["f1", "f2"],
            &["f2"],
            true,
        );
        assert_eq!(list.len(), 1);
        assert_eq!(list.instruction("f1"), None);
        assert_eq!(list.instruction("f2"), Some(Instruction::ReadDb));
    }

    #[test]
    fn update_inside_requested_scope_is_kept() {
        let list = build(&[("f1", Instruction::Update)], &["f1"], &["f1"], true);
        assert_eq!(list.instruction("f1"), Some(Instruction::Update));
    }

    #[test]
    fn other_instructions_ignore_requested_scope() {
        let list = build(
            &[("f1", Instruction::InitialInsert), ("gone", Instruction::Update)],
            &["f1", "f3"],
            &[],
            true,
        );
        assert_eq!(list.instruction("f1"), Some(Instruction::InitialInsert));
        assert_eq!(list.instruction("f3"), Some(Instruction::InitialInsert));
        assert_eq!(list.instruction("gone"), Some(Instruction::Delete));
    }

    #[test]
    fn vanished_folders_are_deleted() {
        let list = build(
            &[("f1", Instruction::ReadDb), ("f2", Instruction::Update)],
            &[],
            &["f1", "f2"],
            false,
        );
        assert_eq!(list.len(), 2);
        assert_eq!(list.count(Instruction::Delete), 2);
        // diagnostics are preserved
        assert_eq!(list["f2"].last_update, Some(1));
        assert_eq!(list["f2"].refresh_interval, 0);
    }
}
