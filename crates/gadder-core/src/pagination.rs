use gadder_db::Window;

use crate::{CoreError, Result};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PER: u32 = 20;

/// Normalized 1-based page request. `per` has no upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub per: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per: DEFAULT_PER,
        }
    }
}

impl Page {
    pub fn window(&self) -> Window {
        let per = u64::from(self.per);
        Window {
            offset: u64::from(self.page.saturating_sub(1)) * per,
            limit: per,
        }
    }
}

/// One page of a listing together with the page request that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub page: Page,
}

/// Parses raw `page`/`per` query values. Absent or empty values fall back to
/// the defaults; anything that is not a positive integer is rejected.
pub fn paginate(raw_page: Option<&str>, raw_per: Option<&str>) -> Result<Page> {
    Ok(Page {
        page: read_param("page", raw_page, DEFAULT_PAGE)?,
        per: read_param("per", raw_per, DEFAULT_PER)?,
    })
}

fn read_param(name: &str, raw: Option<&str>, default: u32) -> Result<u32> {
    match raw {
        None | Some("") => Ok(default),
        Some(value) => match value.parse::<u32>() {
            Ok(0) | Err(_) => Err(CoreError::InvalidParam(format!(
                "{} must be a positive integer, got {:?}",
                name, value
            ))),
            Ok(n) => Ok(n),
        },
    }
}
