use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::Record;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchScope {
    #[default]
    All,
    Field(String),
}

/// Search, filter and page state for one list screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    search_text: String,
    search_scope: SearchScope,
    exact_filters: BTreeMap<String, String>,
    page: usize,
    page_size: usize,
}

impl ListQuery {
    pub fn new(page_size: usize) -> Self {
        Self {
            search_text: String::new(),
            search_scope: SearchScope::All,
            exact_filters: BTreeMap::new(),
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn search_scope(&self) -> &SearchScope {
        &self.search_scope
    }

    pub fn exact_filters(&self) -> &BTreeMap<String, String> {
        &self.exact_filters
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
        self.page = 1;
    }

    pub fn set_search_scope(&mut self, scope: SearchScope) {
        self.search_scope = scope;
        self.page = 1;
    }

    /// An empty `value` removes the constraint on `field`.
    pub fn set_filter(&mut self, field: impl Into<String>, value: impl Into<String>) {
        let field = field.into();
        let value = value.into();
        if value.is_empty() {
            self.exact_filters.remove(&field);
        } else {
            self.exact_filters.insert(field, value);
        }
        self.page = 1;
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    /// Drops search text, scope and every filter, keeping the page size.
    pub fn clear(&mut self) {
        *self = Self::new(self.page_size);
    }

    pub fn with_search(mut self, text: impl Into<String>, scope: SearchScope) -> Self {
        self.set_search_text(text);
        self.set_search_scope(scope);
        self
    }

    pub fn with_filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_filter(field, value);
        self
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.set_page(page);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageView<'a, T> {
    pub items: Vec<&'a T>,
    pub total_filtered: usize,
    pub total_pages: usize,
    pub page: usize,
}

fn matches_search<T: Record>(record: &T, scope: &SearchScope, needle: &str) -> bool {
    let contains = |name: &str| {
        record
            .field(name)
            .is_some_and(|value| value.to_lowercase().contains(needle))
    };

    match scope {
        SearchScope::All => T::SEARCH_FIELDS.iter().any(|name| contains(*name)),
        SearchScope::Field(name) => contains(name.as_str()),
    }
}

fn matches_filters<T: Record>(record: &T, filters: &BTreeMap<String, String>) -> bool {
    filters
        .iter()
        .filter(|(_, expected)| !expected.is_empty())
        .all(|(name, expected)| record.field(name).is_some_and(|value| value == expected.as_str()))
}

/// Every record that passes the search and the exact filters, in source order.
pub fn matching<'a, T: Record>(collection: &'a [T], query: &ListQuery) -> Vec<&'a T> {
    let searching = !query.search_text.trim().is_empty();
    let needle = query.search_text.to_lowercase();

    collection
        .iter()
        .filter(|record| !searching || matches_search(*record, &query.search_scope, &needle))
        .filter(|record| matches_filters(*record, &query.exact_filters))
        .collect()
}

/// The requested page of [`matching`], with the page number clamped into range.
pub fn filter<'a, T: Record>(collection: &'a [T], query: &ListQuery) -> PageView<'a, T> {
    let filtered = matching(collection, query);
    let page_size = query.page_size.max(1);

    let total_filtered = filtered.len();
    let total_pages = total_filtered.div_ceil(page_size).max(1);
    let page = query.page.clamp(1, total_pages);
    let start = (page - 1) * page_size;

    PageView {
        items: filtered.into_iter().skip(start).take(page_size).collect(),
        total_filtered,
        total_pages,
        page,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AlumniRecord;

    fn alumnus(n: usize, name: &str, email: &str, department: &str, year: i32) -> AlumniRecord {
        AlumniRecord {
            id: n.to_string(),
            digital_id: format!("ALU{n:03}"),
            full_name: name.to_string(),
            email: email.to_string(),
            graduation_year: year,
            department: department.to_string(),
            current_company: if n % 2 == 0 { "Infosys" } else { "Wipro" }.to_string(),
            current_role: "Engineer".to_string(),
            location: String::new(),
            phone: String::new(),
            linkedin: String::new(),
            status: "Active".to_string(),
        }
    }

    fn directory() -> Vec<AlumniRecord> {
        vec![
            alumnus(1, "Priya Sharma", "ps@iitb.ac.in", "Computer Science", 2019),
            alumnus(2, "Rahul Verma", "rahul@x.com", "Electrical", 2020),
            alumnus(3, "Anita Rao", "priya.rao@y.com", "Computer Science", 2020),
            alumnus(4, "Arjun Reddy", "arjun@z.com", "Mechanical", 2019),
        ]
    }

    fn names<T: Record>(view: &PageView<'_, T>) -> Vec<String> {
        view.items
            .iter()
            .map(|r| r.field("full_name").unwrap().into_owned())
            .collect()
    }

    fn numbered(count: usize) -> Vec<AlumniRecord> {
        (1..=count)
            .map(|n| alumnus(n, &format!("Person {n}"), &format!("p{n}@x.com"), "CS", 2020))
            .collect()
    }

    #[test]
    fn empty_query_returns_first_page_in_source_order() {
        let records = directory();
        let view = filter(&records, &ListQuery::new(10));
        assert_eq!(view.total_filtered, 4);
        assert_eq!(view.total_pages, 1);
        assert_eq!(names(&view), ["Priya Sharma", "Rahul Verma", "Anita Rao", "Arjun Reddy"]);
    }

    #[test]
    fn email_scope_ignores_name_matches() {
        let records = directory();
        let query = ListQuery::new(10).with_search("priya", SearchScope::Field("email".into()));
        let view = filter(&records, &query);
        assert_eq!(names(&view), ["Anita Rao"]);
    }

    #[test]
    fn all_scope_searches_name_email_id_company_and_role() {
        let records = directory();
        let by_name = ListQuery::new(10).with_search("PRIYA", SearchScope::All);
        assert_eq!(names(&filter(&records, &by_name)), ["Priya Sharma", "Anita Rao"]);

        let by_company = ListQuery::new(10).with_search("infosys", SearchScope::All);
        assert_eq!(names(&filter(&records, &by_company)), ["Rahul Verma", "Arjun Reddy"]);

        let by_id = ListQuery::new(10).with_search("alu003", SearchScope::All);
        assert_eq!(names(&filter(&records, &by_id)), ["Anita Rao"]);

        let by_department = ListQuery::new(10).with_search("mechanical", SearchScope::All);
        assert_eq!(filter(&records, &by_department).total_filtered, 0);
    }

    #[test]
    fn whitespace_only_search_is_no_search() {
        let records = directory();
        let query = ListQuery::new(10).with_search("   ", SearchScope::All);
        assert_eq!(filter(&records, &query).total_filtered, 4);
    }

    #[test]
    fn search_text_is_matched_untrimmed() {
        let records = directory();
        let padded = ListQuery::new(10).with_search("rahul ", SearchScope::Field("email".into()));
        assert_eq!(filter(&records, &padded).total_filtered, 0);

        let spaced = ListQuery::new(10).with_search("priya ", SearchScope::All);
        assert_eq!(names(&filter(&records, &spaced)), ["Priya Sharma"]);
    }

    #[test]
    fn exact_filters_combine_with_search() {
        let records = directory();
        let query = ListQuery::new(10)
            .with_filter("department", "Computer Science")
            .with_filter("graduation_year", "2020");
        assert_eq!(names(&filter(&records, &query)), ["Anita Rao"]);

        let query = query.with_search("priya", SearchScope::Field("name".into()));
        assert_eq!(filter(&records, &query).total_filtered, 0);
    }

    #[test]
    fn exact_filters_do_not_match_substrings() {
        let records = directory();
        let query = ListQuery::new(10).with_filter("department", "Computer");
        assert_eq!(filter(&records, &query).total_filtered, 0);
    }

    #[test]
    fn unknown_field_matches_nothing() {
        let records = directory();
        let query = ListQuery::new(10).with_filter("hostel", "H4");
        assert_eq!(filter(&records, &query).total_filtered, 0);
    }

    #[test]
    fn total_pages_is_ceiling_with_minimum_one() {
        for (count, size, pages) in [(0, 10, 1), (1, 10, 1), (10, 10, 1), (11, 10, 2), (25, 10, 3), (7, 3, 3)] {
            let records = numbered(count);
            let view = filter(&records, &ListQuery::new(size));
            assert_eq!(view.total_pages, pages, "{count} records / {size} per page");
            assert_eq!(view.total_filtered, count);
        }
    }

    #[test]
    fn pages_slice_the_filtered_sequence() {
        let records = numbered(25);
        let view = filter(&records, &ListQuery::new(10).with_page(3));
        assert_eq!(view.page, 3);
        assert_eq!(names(&view), ["Person 21", "Person 22", "Person 23", "Person 24", "Person 25"]);
    }

    #[test]
    fn out_of_range_page_is_clamped_to_last() {
        let records = numbered(25);
        let last = filter(&records, &ListQuery::new(10).with_page(3));
        let beyond = filter(&records, &ListQuery::new(10).with_page(3 + 5));
        assert_eq!(beyond.page, 3);
        assert_eq!(beyond.items, last.items);

        let empty: Vec<AlumniRecord> = Vec::new();
        let view = filter(&empty, &ListQuery::new(10).with_page(4));
        assert_eq!(view.page, 1);
        assert!(view.items.is_empty());
    }

    #[test]
    fn changing_search_or_filters_resets_page() {
        let mut query = ListQuery::new(10).with_page(4);
        query.set_search_text("rao");
        assert_eq!(query.page(), 1);

        query.set_page(3);
        query.set_search_scope(SearchScope::Field("email".into()));
        assert_eq!(query.page(), 1);

        query.set_page(2);
        query.set_filter("department", "Civil");
        assert_eq!(query.page(), 1);

        query.set_filter("department", "");
        assert!(query.exact_filters().is_empty());
    }

    #[test]
    fn clear_restores_defaults_but_keeps_page_size() {
        let mut query = ListQuery::new(6)
            .with_search("rao", SearchScope::Field("email".into()))
            .with_filter("status", "Past")
            .with_page(2);
        query.clear();
        assert_eq!(query, ListQuery::new(6));
    }

    #[test]
    fn zero_page_size_is_raised_to_one() {
        assert_eq!(ListQuery::new(0).page_size(), 1);
    }

    #[test]
    fn matching_ignores_pagination() {
        let records = numbered(25);
        let query = ListQuery::new(10).with_page(2);
        assert_eq!(matching(&records, &query).len(), 25);
    }

    #[test]
    fn query_serializes() {
        let query = ListQuery::new(10)
            .with_search("priya", SearchScope::Field("email".into()))
            .with_filter("department", "Electrical");
        let json = serde_json::to_string(&query).unwrap();
        let back: ListQuery = serde_json::from_str(&json).unwrap();
        assert_eq!(back, query);
        assert!(json.contains("\"field\":\"email\""));
    }
}
