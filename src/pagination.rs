//! Page-number window and the link list the grid pages render.

pub const MAX_VISIBLE: u32 = 5;

/// Pages to show around `current`, at most `max_visible` of them.
pub fn visible_pages(current: u32, total: u32, max_visible: u32) -> Vec<u32> {
    if total == 0 || max_visible == 0 {
        return Vec::new();
    }
    let current = clamp_page(current, total);
    let half = max_visible / 2;
    let mut start = current.saturating_sub(half).max(1);
    let end = total.min(start.saturating_add(max_visible - 1));
    if end - start + 1 < max_visible {
        start = end.saturating_sub(max_visible - 1).max(1);
    }
    (start..=end).collect()
}

/// Keep a requested page inside `1..=total`.
pub fn clamp_page(requested: u32, total: u32) -> u32 {
    requested.max(1).min(total.max(1))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    pub label: String,
    pub href: String,
    pub is_current: bool,
    pub is_ellipsis: bool,
}

impl PageLink {
    fn page(number: u32, current: u32, href: &impl Fn(u32) -> String) -> Self {
        Self {
            label: number.to_string(),
            href: href(number),
            is_current: number == current,
            is_ellipsis: false,
        }
    }

    fn ellipsis() -> Self {
        Self {
            label: "...".to_string(),
            href: String::new(),
            is_current: false,
            is_ellipsis: true,
        }
    }
}

/// Everything a template needs to draw the pager.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pager {
    pub show: bool,
    pub has_prev: bool,
    pub prev_href: String,
    pub has_next: bool,
    pub next_href: String,
    pub links: Vec<PageLink>,
}

impl Pager {
    pub fn new(current: u32, total: u32, href: impl Fn(u32) -> String) -> Self {
        if total <= 1 {
            return Pager::default();
        }
        let current = clamp_page(current, total);
        let window = visible_pages(current, total, MAX_VISIBLE);
        let (Some(&first), Some(&last)) = (window.first(), window.last()) else {
            return Pager::default();
        };

        let mut links = Vec::with_capacity(window.len() + 4);
        if first > 1 {
            links.push(PageLink::page(1, current, &href));
            if first > 2 {
                links.push(PageLink::ellipsis());
            }
        }
        links.extend(window.iter().map(|&n| PageLink::page(n, current, &href)));
        if last < total {
            if last < total - 1 {
                links.push(PageLink::ellipsis());
            }
            links.push(PageLink::page(total, current, &href));
        }

        Pager {
            show: true,
            has_prev: current > 1,
            prev_href: if current > 1 { href(current - 1) } else { String::new() },
            has_next: current < total,
            next_href: if current < total { href(current + 1) } else { String::new() },
            links,
        }
    }
}
