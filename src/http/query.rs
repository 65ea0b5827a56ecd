use crate::application::AppError;
use crate::domain::{DEFAULT_PAGE_SIZE, PageRequest, Sort};

/// Build a page request from `page`, `size` and repeated `sort` query parameters.
///
/// Unknown parameters are ignored. A negative or unreadable `page` falls back
/// to 0 and a `size` below 1 or unreadable falls back to the default; the
/// service caps oversized pages. Only an unknown sort is an error.
pub fn page_request_from_params(params: &[(String, String)]) -> Result<PageRequest, AppError> {
    let mut page = PageRequest::new(0, DEFAULT_PAGE_SIZE);

    for (key, value) in params {
        match key.as_str() {
            "page" => {
                page.page = lenient_number(value)
                    .filter(|&n| n >= 0)
                    .map_or(0, |n| u32::try_from(n).unwrap_or(u32::MAX));
            }
            "size" => {
                page.size = lenient_number(value)
                    .filter(|&n| n >= 1)
                    .map_or(DEFAULT_PAGE_SIZE, |n| u32::try_from(n).unwrap_or(u32::MAX));
            }
            "sort" => {
                let sort = Sort::parse(value)
                    .ok_or_else(|| AppError::InvalidPage(format!("invalid sort '{value}'")))?;
                page.sort.push(sort);
            }
            _ => {}
        }
    }

    Ok(page)
}

fn lenient_number(value: &str) -> Option<i64> {
    value.trim().parse().ok()
}
