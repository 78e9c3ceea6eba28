use std::collections::HashMap;

/// One `(owner, name)` pair from a join table, e.g. a book's author or a
/// file's tag. Rows arrive in link insertion order.
#[derive(sqlx::FromRow)]
pub(crate) struct LinkRow {
    pub(crate) owner_id: i64,
    pub(crate) name: String,
}

/// Group names by owner, keeping the order the rows arrived in.
pub(crate) fn group_names(rows: Vec<LinkRow>) -> HashMap<i64, Vec<String>> {
    let mut map: HashMap<i64, Vec<String>> = HashMap::new();
    for LinkRow { owner_id, name } in rows {
        map.entry(owner_id).or_default().push(name);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_names_keeps_row_order() {
        let rows = vec![
            LinkRow { owner_id: 2, name: "Zelazny".to_string() },
            LinkRow { owner_id: 1, name: "Pratchett".to_string() },
            LinkRow { owner_id: 2, name: "Ashley".to_string() },
        ];
        let map = group_names(rows);
        assert_eq!(map[&1], vec!["Pratchett"]);
        assert_eq!(map[&2], vec!["Zelazny", "Ashley"]);
    }
}
