//! Page selector layout for a paginated list.

/// Numbered entries shown around the current page.
const WINDOW: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEntry {
    Prev { enabled: bool },
    /// Jump to page 1, shown when the window does not start there.
    First,
    Ellipsis,
    Page { number: u32, current: bool },
    /// Jump to the final page, shown when the window does not reach it.
    Last(u32),
    Next { enabled: bool },
}

/// Lay out the page selector for `page` out of `total_pages`.
///
/// Returns nothing when there is at most one page.
pub fn page_window(page: u32, total_pages: u32) -> Vec<PageEntry> {
    if total_pages <= 1 {
        return Vec::new();
    }
    let page = page.clamp(1, total_pages);

    let mut start = page.saturating_sub(WINDOW / 2).max(1);
    let end = start.saturating_add(WINDOW - 1).min(total_pages);
    // Clamped at the tail: widen towards the head.
    if end - start + 1 < WINDOW {
        start = end.saturating_sub(WINDOW - 1).max(1);
    }

    let mut entries = vec![PageEntry::Prev { enabled: page > 1 }];

    if start > 1 {
        entries.push(PageEntry::First);
        if start > 2 {
            entries.push(PageEntry::Ellipsis);
        }
    }

    entries.extend((start..=end).map(|number| PageEntry::Page {
        number,
        current: number == page,
    }));

    if end < total_pages {
        if end < total_pages - 1 {
            entries.push(PageEntry::Ellipsis);
        }
        entries.push(PageEntry::Last(total_pages));
    }

    entries.push(PageEntry::Next {
        enabled: page < total_pages,
    });
    entries
}

/// Compact textual rendering, e.g. `‹ 1 … 4 5 [6] 7 8 … 20 ›`.
pub fn render_window(entries: &[PageEntry]) -> String {
    entries
        .iter()
        .map(|entry| match entry {
            PageEntry::Prev { enabled: true } => "‹".to_string(),
            PageEntry::Prev { enabled: false } => " ".to_string(),
            PageEntry::First => "1".to_string(),
            PageEntry::Ellipsis => "…".to_string(),
            PageEntry::Page { number, current: true } => format!("[{}]", number),
            PageEntry::Page { number, current: false } => number.to_string(),
            PageEntry::Last(total) => total.to_string(),
            PageEntry::Next { enabled: true } => "›".to_string(),
            PageEntry::Next { enabled: false } => " ".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::PageEntry::*;
    use super::*;

    fn numbers(entries: &[PageEntry]) -> Vec<u32> {
        entries
            .iter()
            .filter_map(|e| match e {
                Page { number, .. } => Some(*number),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn single_page_renders_nothing() {
        assert!(page_window(1, 1).is_empty());
        assert!(page_window(1, 0).is_empty());
    }

    #[test]
    fn window_at_head() {
        let entries = page_window(3, 10);
        assert_eq!(
            entries,
            vec![
                Prev { enabled: true },
                Page { number: 1, current: false },
                Page { number: 2, current: false },
                Page { number: 3, current: true },
                Page { number: 4, current: false },
                Page { number: 5, current: false },
                Ellipsis,
                Last(10),
                Next { enabled: true },
            ]
        );
    }

    #[test]
    fn window_in_middle_has_both_ellipses() {
        let entries = page_window(6, 20);
        assert_eq!(entries[1], First);
        assert_eq!(entries[2], Ellipsis);
        assert_eq!(numbers(&entries), vec![4, 5, 6, 7, 8]);
        assert_eq!(entries[entries.len() - 3], Ellipsis);
        assert_eq!(entries[entries.len() - 2], Last(20));
    }

    #[test]
    fn huge_page_counts_do_not_overflow() {
        let entries = page_window(u32::MAX, u32::MAX);
        assert_eq!(
            numbers(&entries),
            vec![u32::MAX - 4, u32::MAX - 3, u32::MAX - 2, u32::MAX - 1, u32::MAX]
        );
        assert_eq!(entries.last(), Some(&Next { enabled: false }));

        let entries = page_window(u32::MAX - 1, u32::MAX);
        assert_eq!(numbers(&entries).len(), 5);
        assert_eq!(entries[entries.len() - 2], Page { number: u32::MAX, current: false });
    }

    #[test]
    fn window_widens_when_clamped_at_tail() {
        let entries = page_window(10, 10);
        assert_eq!(numbers(&entries), vec![6, 7, 8, 9, 10]);
        assert_eq!(entries.first(), Some(&Prev { enabled: true }));
        assert_eq!(entries.last(), Some(&Next { enabled: false }));
        assert!(entries.contains(&First));
        assert!(!entries.contains(&Last(10)));
    }

    #[test]
    fn no_ellipsis_when_adjacent_to_first_page() {
        let entries = page_window(4, 10);
        assert_eq!(numbers(&entries), vec![2, 3, 4, 5, 6]);
        assert_eq!(entries[1], First);
        assert_eq!(entries[2], Page { number: 2, current: false });
    }

    #[test]
    fn no_ellipsis_when_adjacent_to_last_page() {
        let entries = page_window(6, 9);
        assert_eq!(numbers(&entries), vec![4, 5, 6, 7, 8]);
        assert_eq!(entries[entries.len() - 2], Last(9));
        assert_ne!(entries[entries.len() - 3], Ellipsis);
    }

    #[test]
    fn fewer_pages_than_window() {
        let entries = page_window(1, 3);
        assert_eq!(numbers(&entries), vec![1, 2, 3]);
        assert_eq!(entries.first(), Some(&Prev { enabled: false }));
        assert_eq!(entries.last(), Some(&Next { enabled: true }));
    }

    #[test]
    fn renders_compact_text() {
        assert_eq!(render_window(&page_window(6, 20)), "‹ 1 … 4 5 [6] 7 8 … 20 ›");
    }
}
