//! Plain-text rendering of resource groups and resources.

use crate::{GenericResource, ResourceGroup};
use serde_json::Value;
use std::collections::BTreeMap;

/// Fields shared by everything `format_item` can render.
pub trait ResourceSummary {
    fn summary_name(&self) -> Option<&str>;
    fn summary_id(&self) -> Option<&str>;
    fn summary_location(&self) -> &str;
    fn summary_tags(&self) -> &BTreeMap<String, String>;
    fn summary_properties(&self) -> Option<&Value>;
}

impl ResourceSummary for ResourceGroup {
    fn summary_name(&self) -> Option<&str> {
        self.name().as_deref()
    }

    fn summary_id(&self) -> Option<&str> {
        self.id().as_deref()
    }

    fn summary_location(&self) -> &str {
        self.location()
    }

    fn summary_tags(&self) -> &BTreeMap<String, String> {
        self.tags()
    }

    fn summary_properties(&self) -> Option<&Value> {
        self.properties().as_ref()
    }
}

impl ResourceSummary for GenericResource {
    fn summary_name(&self) -> Option<&str> {
        self.name().as_deref()
    }

    fn summary_id(&self) -> Option<&str> {
        self.id().as_deref()
    }

    fn summary_location(&self) -> &str {
        self.location()
    }

    fn summary_tags(&self) -> &BTreeMap<String, String> {
        self.tags()
    }

    fn summary_properties(&self) -> Option<&Value> {
        Some(self.properties())
    }
}

/// Renders name, id, location, tags and properties, one field per line.
///
/// # Example
///
/// ```
/// use azure_sdk_resources::{format_item, ResourceGroup};
/// let text = format_item(&ResourceGroup::new("westus"));
/// assert!(text.contains("\tLocation: westus\n"));
/// ```
pub fn format_item<T: ResourceSummary + ?Sized>(item: &T) -> String {
    let mut out = String::new();
    out.push_str(&format!("\tName: {}\n", item.summary_name().unwrap_or_default()));
    out.push_str(&format!("\tId: {}\n", item.summary_id().unwrap_or_default()));
    out.push_str(&format!("\tLocation: {}\n", item.summary_location()));
    out.push_str(&format!("\tTags: {}\n", format_tags(item.summary_tags())));
    out.push_str(&format_properties(item.summary_properties().unwrap_or(&Value::Null)));
    out
}

/// One line per top-level property, sorted by key, followed by a blank separator.
pub fn format_properties(properties: &Value) -> String {
    let mut out = String::from("\tProperties:\n");
    if let Value::Object(map) = properties {
        let mut keys: Vec<&String> = map.keys().collect();
        keys.sort();
        for key in keys {
            out.push_str(&format!("\t\t{}: {}\n", key, format_value(&map[key])));
        }
    }
    out.push_str("\n\n");
    out
}

pub(crate) fn format_tags(tags: &BTreeMap<String, String>) -> String {
    let pairs: Vec<String> = tags.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    format!("{{{}}}", pairs.join(", "))
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn formats_a_resource_group() {
        let group: ResourceGroup = serde_json::from_value(json!({
            "id": "/subscriptions/sub/resourceGroups/rg",
            "name": "rg",
            "location": "shanghai",
            "tags": {"hello": "world", "a": "b"},
            "properties": {"provisioningState": "Succeeded"}
        }))
        .unwrap();

        assert_eq!(
            format_item(&group),
            "\tName: rg\n\
             \tId: /subscriptions/sub/resourceGroups/rg\n\
             \tLocation: shanghai\n\
             \tTags: {a=b, hello=world}\n\
             \tProperties:\n\
             \t\tprovisioningState: Succeeded\n\n\n"
        );
    }

    #[test]
    fn missing_fields_print_empty() {
        let resource = GenericResource::new("westus");
        assert_eq!(
            format_item(&resource),
            "\tName: \n\tId: \n\tLocation: westus\n\tTags: {}\n\tProperties:\n\n\n"
        );
    }

    #[test]
    fn properties_are_sorted_and_strings_unquoted() {
        let props = json!({"zeta": 1, "alpha": "x", "nested": {"k": true}, "gone": null});
        assert_eq!(
            format_properties(&props),
            "\tProperties:\n\t\talpha: x\n\t\tgone: \n\t\tnested: {\"k\":true}\n\t\tzeta: 1\n\n\n"
        );
    }
}
