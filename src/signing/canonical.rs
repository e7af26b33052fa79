use serde_json::{Map, Value};

use crate::signing::percent_encode;

/// Flatten JSON-valued parameters: arrays become `key.1, key.2, ...`, objects
/// become `key.subkey`. `null` values are dropped.
pub fn flatten_params(params: &Map<String, Value>) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for (key, value) in params {
        flatten_into(key.clone(), value, &mut out);
    }
    out
}

fn flatten_into(prefix: String, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {}
        Value::String(text) => out.push((prefix, text.clone())),
        Value::Array(items) => {
            for (idx, item) in items.iter().enumerate() {
                flatten_into(format!("{prefix}.{}", idx + 1), item, out);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                flatten_into(format!("{prefix}.{key}"), item, out);
            }
        }
        other => out.push((prefix, other.to_string())),
    }
}

/// Sorted, percent-encoded `k=v&...` string. Input order does not matter.
pub fn canonical_query(pairs: &[(String, String)]) -> String {
    let mut encoded = pairs
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>();
    encoded.sort();
    encoded
        .into_iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalHeaders {
    /// `name:value\n` lines, lowercase names, sorted.
    pub block: String,
    /// `;`-joined sorted names.
    pub signed: String,
}

/// Canonicalize the headers selected by `include` (which sees lowercase names).
pub fn canonical_headers(
    headers: &[(String, String)],
    include: impl Fn(&str) -> bool,
) -> CanonicalHeaders {
    let mut selected = headers
        .iter()
        .map(|(name, value)| (name.to_ascii_lowercase(), value.trim().to_owned()))
        .filter(|(name, _)| include(name))
        .collect::<Vec<_>>();
    selected.sort();

    let block = selected
        .iter()
        .map(|(name, value)| format!("{name}:{value}\n"))
        .collect::<String>();
    let signed = selected
        .iter()
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>()
        .join(";");
    CanonicalHeaders { block, signed }
}

/// `METHOD\nPATH\nQUERY\nHEADERS\nSIGNED\nHASH`, where `HEADERS` already ends
/// with a newline.
pub fn canonical_request(
    method: &str,
    path: &str,
    query: &str,
    headers: &CanonicalHeaders,
    payload_hash: &str,
) -> String {
    format!(
        "{method}\n{path}\n{query}\n{}\n{}\n{payload_hash}",
        headers.block, headers.signed
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn flatten_arrays_and_maps() {
        let params = json!({
            "PhoneNumberJson": ["1", "2"],
            "Tag": {"a": "x", "b": 3},
            "Skip": null,
            "Plain": "v"
        });
        let flat = flatten_params(params.as_object().unwrap());
        assert_eq!(
            flat,
            pairs(&[
                ("PhoneNumberJson.1", "1"),
                ("PhoneNumberJson.2", "2"),
                ("Plain", "v"),
                ("Tag.a", "x"),
                ("Tag.b", "3"),
            ])
        );
    }

    #[test]
    fn canonical_query_is_permutation_invariant() {
        let a = pairs(&[("b", "2"), ("a", "x y"), ("c*", "~")]);
        let b = pairs(&[("c*", "~"), ("b", "2"), ("a", "x y")]);
        assert_eq!(canonical_query(&a), canonical_query(&b));
        assert_eq!(canonical_query(&a), "a=x%20y&b=2&c%2A=~");
        assert_eq!(canonical_query(&[]), "");
    }

    #[test]
    fn canonical_headers_filter_lowercase_and_sort() {
        let headers = pairs(&[
            ("X-Acs-Version", "2017-05-25"),
            ("Authorization", "ignored"),
            ("host", " dysmsapi.aliyuncs.com "),
            ("x-acs-action", "SendSms"),
        ]);
        let canonical =
            canonical_headers(&headers, |name| name == "host" || name.starts_with("x-acs-"));
        assert_eq!(
            canonical.block,
            "host:dysmsapi.aliyuncs.com\nx-acs-action:SendSms\nx-acs-version:2017-05-25\n"
        );
        assert_eq!(canonical.signed, "host;x-acs-action;x-acs-version");
    }

    #[test]
    fn canonical_request_layout() {
        let headers = CanonicalHeaders {
            block: "host:h\n".to_owned(),
            signed: "host".to_owned(),
        };
        assert_eq!(
            canonical_request("POST", "/", "a=1", &headers, "abc"),
            "POST\n/\na=1\nhost:h\n\nhost\nabc"
        );
    }
}
