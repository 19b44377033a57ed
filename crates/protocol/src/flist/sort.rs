use super::entry::FileEntry;

/// Orders entries by name bytes and drops later duplicates of a name.
///
/// The receiver sorts and cleans the list it receives the same way, so the
/// indices it later requests refer to positions in the returned vector.
/// Only flat lists of files are produced by this server, which reduces
/// upstream's `f_name_cmp()` to a byte comparison.
#[must_use]
pub fn sort_and_dedup(mut entries: Vec<FileEntry>) -> Vec<FileEntry> {
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    entries.dedup_by(|later, earlier| later.name == earlier.name);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_by_bytes_and_keeps_first_duplicate() {
        let entries = vec![
            FileEntry::new("b.log", 1, 0, 0o100_644),
            FileEntry::new("B.log", 2, 0, 0o100_644),
            FileEntry::new("a", 3, 0, 0o100_644),
            FileEntry::new("b.log", 4, 0, 0o100_644),
        ];
        let sorted = sort_and_dedup(entries);
        let names: Vec<_> = sorted.iter().map(|e| e.name.as_slice()).collect();
        assert_eq!(names, vec![&b"B.log"[..], b"a", b"b.log"]);
        assert_eq!(sorted[2].size, 1);
    }
}
