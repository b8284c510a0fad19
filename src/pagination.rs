use serde::Serialize;

pub const DEFAULT_ITEMS_PER_PAGE: usize = 25;

fn get_pages(
    total_pages: usize,
    current_page: usize,
    left_edge: usize,
    left_current: usize,
    right_current: usize,
    right_edge: usize,
) -> Vec<Option<usize>> {
    let last_page = total_pages;

    if last_page == 0 {
        return vec![];
    }

    let mut pages = Vec::new();

    let left_end = (1 + left_edge).min(last_page + 1);
    pages.extend((1..left_end).map(Some));

    let mid_start = left_end.max(current_page.saturating_sub(left_current));
    let mid_end = (current_page + right_current + 1).min(last_page + 1);

    if mid_start > left_end {
        pages.push(None);
    }
    pages.extend((mid_start..mid_end).map(Some));

    let right_start = mid_end.max(last_page.saturating_sub(right_edge) + 1);

    if right_start > mid_end {
        pages.push(None);
    }
    pages.extend((right_start..=last_page).map(Some));

    pages
}

/// One page of an API listing plus the numbers a client needs to navigate it.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
    /// Page links to render; `None` marks a gap.
    pub pages: Vec<Option<usize>>,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, current_page: usize, per_page: usize, total: usize) -> Self {
        let current_page = current_page.max(1);
        let total_pages = total.div_ceil(per_page.max(1));

        Self {
            items,
            page: current_page,
            per_page,
            total,
            total_pages,
            pages: get_pages(total_pages, current_page, 2, 2, 4, 2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_listing_has_no_pages() {
        let page: Paginated<i32> = Paginated::new(vec![], 1, 25, 0);
        assert_eq!(page.total_pages, 0);
        assert!(page.pages.is_empty());
    }

    #[test]
    fn gaps_are_marked_in_long_listings() {
        let page: Paginated<i32> = Paginated::new(vec![], 10, 10, 200);
        assert_eq!(page.total_pages, 20);
        assert_eq!(
            page.pages,
            vec![
                Some(1),
                Some(2),
                None,
                Some(8),
                Some(9),
                Some(10),
                Some(11),
                Some(12),
                Some(13),
                Some(14),
                None,
                Some(19),
                Some(20),
            ]
        );
    }

    #[test]
    fn page_zero_is_treated_as_first() {
        let page = Paginated::new(vec![1, 2], 0, 25, 2);
        assert_eq!(page.page, 1);
        assert_eq!(page.pages, vec![Some(1)]);
    }
}
