use serde::Serialize;

/// Which slice of a report to return. `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl PageRequest {
    pub fn new(page: Option<i64>, per_page: i64) -> Self {
        Self {
            page: page.filter(|p| *p >= 1).unwrap_or(1),
            per_page: per_page.max(1),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

/// Keeps a requested page size inside `[1, max]`, falling back to `default`.
pub fn clamp_per_page(requested: Option<i64>, default: i64, max: i64) -> i64 {
    match requested {
        Some(n) if (1..=max).contains(&n) => n,
        _ => default,
    }
}

/// One page of report rows plus the paging metadata the UI needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub per_page: i64,
    pub current_page: i64,
    pub last_page: i64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: i64, request: PageRequest) -> Self {
        let last_page = if total <= 0 {
            1
        } else {
            (total + request.per_page - 1) / request.per_page
        };
        Self {
            data,
            total,
            per_page: request.per_page,
            current_page: request.page,
            last_page,
        }
    }

    /// Pages an already-materialised collection.
    pub fn from_vec(rows: Vec<T>, request: PageRequest) -> Self {
        let total = rows.len() as i64;
        let data = rows
            .into_iter()
            .skip(request.offset().max(0) as usize)
            .take(request.per_page as usize)
            .collect();
        Self::new(data, total, request)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            per_page: self.per_page,
            current_page: self.current_page,
            last_page: self.last_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_page_is_clamped_to_default() {
        assert_eq!(clamp_per_page(None, 25, 1000), 25);
        assert_eq!(clamp_per_page(Some(0), 25, 1000), 25);
        assert_eq!(clamp_per_page(Some(-4), 25, 1000), 25);
        assert_eq!(clamp_per_page(Some(1001), 25, 1000), 25);
        assert_eq!(clamp_per_page(Some(1000), 25, 1000), 1000);
        assert_eq!(clamp_per_page(Some(50), 25, 1000), 50);
    }

    #[test]
    fn invalid_page_numbers_start_at_one() {
        assert_eq!(PageRequest::new(Some(0), 25).page, 1);
        assert_eq!(PageRequest::new(None, 25).offset(), 0);
        assert_eq!(PageRequest::new(Some(3), 25).offset(), 50);
    }

    #[test]
    fn last_page_rounds_up_and_never_drops_below_one() {
        let request = PageRequest::new(Some(1), 25);
        assert_eq!(Page::<u8>::new(vec![], 0, request).last_page, 1);
        assert_eq!(Page::<u8>::new(vec![], 25, request).last_page, 1);
        assert_eq!(Page::<u8>::new(vec![], 26, request).last_page, 2);
    }

    #[test]
    fn from_vec_slices_the_requested_page() {
        let page = Page::from_vec((1..=7).collect::<Vec<_>>(), PageRequest::new(Some(2), 3));
        assert_eq!(page.data, vec![4, 5, 6]);
        assert_eq!(page.total, 7);
        assert_eq!(page.last_page, 3);

        let past_end = Page::from_vec((1..=7).collect::<Vec<_>>(), PageRequest::new(Some(9), 3));
        assert!(past_end.data.is_empty());
        assert_eq!(past_end.map(|n: i32| n * 2).current_page, 9);
    }
}
