use indexmap::IndexMap;

/// How an editor's current state is serialized into a form body.
///
/// Save endpoints accept `application/x-www-form-urlencoded` only; list
/// shapes that the backend expects as JSON are stringified into a single
/// form field rather than sent as a JSON document.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// `value=<text>`
    Single(String),
    /// `value[0]=a&value[1]=b`
    Indexed(Vec<String>),
    /// One form field per named input, in field order.
    Named(IndexMap<String, String>),
    /// `value=<json array>` for role additions.
    JsonList(Vec<String>),
    /// `selectedValues=<json array>` for multi-selects.
    SelectedValues(Vec<String>),
}

impl Payload {
    pub fn named(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        Self::Named(pairs.into_iter().collect())
    }

    pub fn encode(&self) -> String {
        match self {
            Self::Single(value) => encode_pair("value", value),
            Self::Indexed(values) => values
                .iter()
                .enumerate()
                .map(|(i, value)| encode_pair(&format!("value[{i}]"), value))
                .collect::<Vec<_>>()
                .join("&"),
            Self::Named(fields) => fields
                .iter()
                .map(|(name, value)| encode_pair(name, value))
                .collect::<Vec<_>>()
                .join("&"),
            Self::JsonList(items) => encode_pair("value", &json_array(items)),
            Self::SelectedValues(items) => encode_pair("selectedValues", &json_array(items)),
        }
    }
}

fn encode_pair(name: &str, value: &str) -> String {
    format!(
        "{}={}",
        urlencoding::encode(name),
        urlencoding::encode(value)
    )
}

fn json_array(items: &[String]) -> String {
    serde_json::Value::from(items.to_vec()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_value_is_a_plain_form_field() {
        assert_eq!(Payload::Single("WHOLE_GENOME".into()).encode(), "value=WHOLE_GENOME");
    }

    #[test]
    fn single_value_is_percent_encoded() {
        assert_eq!(
            Payload::Single("a&b =c".into()).encode(),
            "value=a%26b%20%3Dc"
        );
    }

    #[test]
    fn indexed_values_number_from_zero() {
        let encoded = Payload::Indexed(vec!["ACTG".into(), "TTGA".into()]).encode();
        assert_eq!(encoded, "value%5B0%5D=ACTG&value%5B1%5D=TTGA");
    }

    #[test]
    fn named_fields_keep_declaration_order() {
        let encoded = Payload::named([
            ("name".to_string(), "panel A".to_string()),
            ("priority".to_string(), "3".to_string()),
        ])
        .encode();
        assert_eq!(encoded, "name=panel%20A&priority=3");
    }

    #[test]
    fn role_lists_are_json_stringified_into_one_field() {
        let encoded = Payload::JsonList(vec!["PI".into(), "BIOINFORMATICIAN".into()]).encode();
        assert_eq!(
            encoded,
            format!("value={}", urlencoding::encode(r#"["PI","BIOINFORMATICIAN"]"#))
        );
    }

    #[test]
    fn multi_select_uses_the_selected_values_field() {
        let encoded = Payload::SelectedValues(vec!["a".into()]).encode();
        assert_eq!(encoded, format!("selectedValues={}", urlencoding::encode(r#"["a"]"#)));
    }

    #[test]
    fn empty_list_still_posts_an_empty_json_array() {
        assert_eq!(
            Payload::JsonList(Vec::new()).encode(),
            format!("value={}", urlencoding::encode("[]"))
        );
    }
}
