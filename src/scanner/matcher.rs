use crate::catalog::ServiceCatalog;

/// CNAME 以任一服务后缀结尾即视为命中（区分大小写，按原样比较）
pub fn matches(cname: &str, catalog: &ServiceCatalog) -> bool {
    catalog.iter().any(|suffix| cname.ends_with(suffix))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ServiceCatalog {
        ["github.io", "herokuapp.com", "s3.amazonaws.com"].into_iter().collect()
    }

    #[test]
    fn suffix_hit() {
        assert!(matches("bar.github.io", &catalog()));
        assert!(matches("app.herokuapp.com", &catalog()));
    }

    #[test]
    fn no_hit() {
        assert!(!matches("cdn.internal.example.com", &catalog()));
        assert!(!matches("github.io.evil.net", &catalog()));
    }

    #[test]
    fn comparison_is_case_sensitive() {
        assert!(!matches("bar.GITHUB.IO", &catalog()));
    }

    #[test]
    fn empty_catalog_never_matches() {
        assert!(!matches("bar.github.io", &ServiceCatalog::default()));
    }
}
