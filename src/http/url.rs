//! Request URL assembly from a base URL, an endpoint template and the
//! parameters of a single test case.

use std::collections::{BTreeMap, HashMap};

use reqwest::Url;

use crate::error::{Error, Result};

/// Resolve `base` + `template` into an absolute request URL.
///
/// `{name}` placeholders in the template are replaced with the escaped value
/// of `path_params[name]`; placeholders without a value are kept. Query
/// entries replace same-named pairs already on the base URL and the final
/// query string is sorted by key.
pub fn build_url(
    base: &str,
    template: &str,
    path_params: &HashMap<String, String>,
    query: &HashMap<String, String>,
) -> Result<String> {
    let malformed = |reason: String| Error::MalformedBaseUrl {
        url: base.to_string(),
        reason,
    };

    let mut url = Url::parse(base.trim().trim_end_matches('/')).map_err(|e| malformed(e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(malformed("URL cannot carry a path".to_string()));
    }

    let mut path = template.trim().trim_end_matches('/').to_string();
    for (name, value) in path_params {
        path = path.replace(&format!("{{{name}}}"), &urlencoding::encode(value));
    }
    if !path.is_empty() && !path.starts_with('/') {
        path.insert(0, '/');
    }

    let full_path = format!("{}{}", url.path().trim_end_matches('/'), path);
    url.set_path(&full_path);

    if !query.is_empty() || url.query().is_some() {
        let mut pairs: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (key, value) in url.query_pairs() {
            pairs
                .entry(key.into_owned())
                .or_default()
                .push(value.into_owned());
        }
        for (key, value) in query {
            pairs.insert(key.clone(), vec![value.clone()]);
        }

        if pairs.is_empty() {
            url.set_query(None);
        } else {
            let mut serializer = url.query_pairs_mut();
            serializer.clear();
            for (key, values) in &pairs {
                for value in values {
                    serializer.append_pair(key, value);
                }
            }
        }
    }

    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn joins_base_and_template_without_double_slashes() {
        let url = build_url("http://localhost:8000/api/v1//", "/users/", &map(&[]), &map(&[])).unwrap();
        assert_eq!(url, "http://localhost:8000/api/v1/users");
    }

    #[test]
    fn substitutes_and_escapes_path_params() {
        let url = build_url(
            "http://localhost:8000",
            "/widgets/{id}/parts/{part}",
            &map(&[("id", "a b/c"), ("part", "7")]),
            &map(&[]),
        )
        .unwrap();
        assert_eq!(url, "http://localhost:8000/widgets/a%20b%2Fc/parts/7");
    }

    #[test]
    fn leaves_unmatched_placeholders_in_place() {
        let url = build_url("http://localhost", "/widgets/{id}", &map(&[]), &map(&[])).unwrap();
        assert_eq!(url, "http://localhost/widgets/%7Bid%7D");
    }

    #[test]
    fn inserts_missing_leading_slash() {
        let url = build_url("http://localhost/api", "health", &map(&[]), &map(&[])).unwrap();
        assert_eq!(url, "http://localhost/api/health");
    }

    #[test]
    fn sorts_and_encodes_query() {
        let url = build_url(
            "http://localhost",
            "/search",
            &map(&[]),
            &map(&[("q", "red shoes"), ("page", "2")]),
        )
        .unwrap();
        assert_eq!(url, "http://localhost/search?page=2&q=red+shoes");
    }

    #[test]
    fn merges_with_query_already_on_base() {
        let url = build_url(
            "http://localhost/?tenant=a&page=1",
            "/items",
            &map(&[]),
            &map(&[("page", "3")]),
        )
        .unwrap();
        assert_eq!(url, "http://localhost/items?page=3&tenant=a");
    }

    #[test]
    fn rejects_unparsable_base() {
        let err = build_url("not a url", "/x", &map(&[]), &map(&[])).unwrap_err();
        assert!(matches!(err, Error::MalformedBaseUrl { .. }));

        let err = build_url("", "/x", &map(&[]), &map(&[])).unwrap_err();
        assert!(matches!(err, Error::MalformedBaseUrl { .. }));
    }
}
