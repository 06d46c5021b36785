use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Number of records on a single page of any listing.
pub const PAGE_SIZE: i64 = 10;

/// The `?page=` parameter of a listing.
///
/// The value is taken leniently: a missing or non-numeric page is the first
/// page, anything below 1 is the first page, and anything past the end is
/// the last page.
#[derive(Debug, Default, Deserialize, Validate, JsonSchema)]
pub struct PageInput {
	/// The page number to return (1-indexed).
	pub page: Option<String>,
}

impl PageInput {
	/// The requested page number, normalized to be at least 1.
	pub fn number(&self) -> i64 {
		let Some(page) = self.page.as_deref().map(str::trim) else {
			return 1;
		};

		match page.parse::<i64>() {
			Ok(page) => page.max(1),
			// Too many digits for an i64 still names a page past the end
			Err(_) if is_unsigned_digits(page) => i64::MAX,
			Err(_) => 1,
		}
	}
}

fn is_unsigned_digits(page: &str) -> bool {
	let digits = page.strip_prefix('+').unwrap_or(page);

	!digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// The position of a single page within a listing of `count` records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginate {
	pub number: i64,
	pub num_pages: i64,
	pub count: i64,
}

impl Paginate {
	/// Places the requested page within a listing of `count` records, clamping
	/// it to the last page. An empty listing still has one (empty) page.
	pub fn new(count: i64, requested: i64) -> Self {
		let count = count.max(0);
		let num_pages = ((count + PAGE_SIZE - 1) / PAGE_SIZE).max(1);

		Self {
			number: requested.clamp(1, num_pages),
			num_pages,
			count,
		}
	}

	pub fn offset(&self) -> i64 {
		(self.number - 1) * PAGE_SIZE
	}

	pub fn limit(&self) -> i64 {
		PAGE_SIZE
	}

	pub fn has_next(&self) -> bool {
		self.number < self.num_pages
	}

	pub fn has_previous(&self) -> bool {
		self.number > 1
	}

	/// Attaches the records fetched for this page.
	pub fn page<T>(self, items: Vec<T>) -> Page<T> {
		Page {
			items,
			number: self.number,
			num_pages: self.num_pages,
			count: self.count,
			page_size: PAGE_SIZE,
			has_next: self.has_next(),
			has_previous: self.has_previous(),
		}
	}
}

/// A single page of a listing, newest records first.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Page<T> {
	/// The records on this page.
	pub items: Vec<T>,
	/// The number of this page (1-indexed).
	pub number: i64,
	/// The total number of pages, at least 1.
	pub num_pages: i64,
	/// The total number of records across all pages.
	pub count: i64,
	pub page_size: i64,
	pub has_next: bool,
	pub has_previous: bool,
}
