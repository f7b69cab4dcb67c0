use serde::Serialize;

pub const PRODUCTS_PAGE_SIZE: usize = 4;
pub const CUSTOMERS_PAGE_SIZE: usize = 4;
pub const ORDERS_PAGE_SIZE: usize = 10;

/// Case-insensitive substring match against any of `fields`. A blank term
/// matches everything.
pub fn matches_search(fields: &[&str], term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }

    fields
        .iter()
        .any(|field| field.to_lowercase().contains(&term))
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}

/// Slices `items` into the 1-based `page`. Pages below 1 clamp to 1; pages
/// past the end come back empty.
pub fn paginate<T>(items: Vec<T>, page: Option<i64>, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let page = page.unwrap_or(1).max(1) as usize;
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size);

    let start = (page - 1).saturating_mul(page_size);
    let items = items.into_iter().skip(start).take(page_size).collect();

    Page {
        items,
        page,
        page_size,
        total_items,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_is_case_insensitive_substring() {
        assert!(matches_search(&["Galaxy S24 Case"], "s24"));
        assert!(matches_search(&["Galaxy S24 Case"], "  GALAXY "));
        assert!(!matches_search(&["Galaxy S24 Case"], "pixel"));
    }

    #[test]
    fn search_checks_every_field() {
        let fields = ["a@example.com", "555-0101", "Main St"];
        assert!(matches_search(&fields, "main"));
        assert!(matches_search(&fields, "0101"));
        assert!(!matches_search(&fields, "elm"));
    }

    #[test]
    fn blank_search_matches_all() {
        assert!(matches_search(&["anything"], ""));
        assert!(matches_search(&[], "   "));
    }

    #[test]
    fn pages_partition_without_loss_or_duplication() {
        let items: Vec<u32> = (0..23).collect();
        let first = paginate(items.clone(), Some(1), 10);
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.total_items, 23);

        let mut seen = Vec::new();
        for page in 1..=first.total_pages {
            let chunk = paginate(items.clone(), Some(page as i64), 10);
            assert!(chunk.items.len() <= 10);
            seen.extend(chunk.items);
        }

        assert_eq!(seen, items);
    }

    #[test]
    fn last_page_holds_remainder() {
        let page = paginate((0..9).collect::<Vec<_>>(), Some(3), 4);
        assert_eq!(page.items, vec![8]);
    }

    #[test]
    fn out_of_range_pages() {
        let below = paginate(vec![1, 2, 3], Some(0), 2);
        assert_eq!(below.page, 1);
        assert_eq!(below.items, vec![1, 2]);

        let past = paginate(vec![1, 2, 3], Some(5), 2);
        assert!(past.items.is_empty());
        assert_eq!(past.total_pages, 2);
    }

    #[test]
    fn empty_list_has_no_pages() {
        let page = paginate(Vec::<u8>::new(), None, 4);
        assert_eq!(page.total_pages, 0);
        assert!(page.items.is_empty());
    }
}
