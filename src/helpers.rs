use chrono::{DateTime, Utc};

/// Splits `(a,b),(c,d)` into `["a,b", "c,d"]`.
pub fn parse_tuple_string(data: &str) -> Vec<String> {
    let data = data.trim();

    if data.is_empty() {
        return Vec::new();
    }

    let str = data.strip_prefix('(').unwrap_or(data);
    let splited = str.split(",(");
    let mut items: Vec<String> = Vec::new();

    for c in splited {
        if let Some(index) = c.find(')') {
            let tuple_data = &c[0..index];
            items.push(tuple_data.to_owned());
        }
    }

    items
}

pub fn parse_list(data: &str) -> Vec<String> {
    data.split(',')
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(|item| item.to_owned())
        .collect()
}

/// Sortable timestamp used in report file names, `2024-01-31T10:15:00`.
pub fn sortable_timestamp(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%dT%H:%M:%S").to_string()
}
