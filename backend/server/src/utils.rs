/// Hash holding the `name` and `upvotes` fields of one article.
pub fn article_key(db_name: &str, name: &str) -> String {
    format!("{db_name}:articles:{name}")
}

/// List of JSON encoded comments for one article, oldest first.
pub fn comments_key(db_name: &str, name: &str) -> String {
    format!("{db_name}:comments:{name}")
}

/// Set of every seeded article name.
pub fn index_key(db_name: &str) -> String {
    format!("{db_name}:articles")
}
