use serde::Serialize;

const MIME_JSON: &str = "application/json";

#[derive(Debug, Clone, Serialize)]
pub struct ResourceDef {
    pub uri: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "mimeType")]
    pub mime_type: &'static str,
}

const RESOURCES: &[ResourceDef] = &[
    ResourceDef {
        uri: "oura://summary/today",
        name: "Today's summary",
        description: "Readiness, sleep and activity for today in one object.",
        mime_type: MIME_JSON,
    },
    ResourceDef {
        uri: "oura://summary/yesterday",
        name: "Yesterday's summary",
        description: "Readiness, sleep and activity for yesterday in one object.",
        mime_type: MIME_JSON,
    },
    ResourceDef {
        uri: "oura://personal/info",
        name: "Personal info",
        description: "Personal information together with the ring configuration.",
        mime_type: MIME_JSON,
    },
    ResourceDef {
        uri: "oura://recent/sleep",
        name: "Recent sleep",
        description: "Daily sleep summaries for the last 7 days.",
        mime_type: MIME_JSON,
    },
    ResourceDef {
        uri: "oura://recent/activity",
        name: "Recent activity",
        description: "Daily activity summaries for the last 7 days.",
        mime_type: MIME_JSON,
    },
];

pub fn list_resources() -> &'static [ResourceDef] {
    RESOURCES
}

pub fn resource_by_uri(uri: &str) -> Option<&'static ResourceDef> {
    RESOURCES.iter().find(|resource| resource.uri == uri)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::managers::summaries::SUMMARY_RESOURCES;

    #[test]
    fn every_summary_has_a_listing() {
        assert_eq!(list_resources().len(), SUMMARY_RESOURCES.len());
        for (uri, _) in SUMMARY_RESOURCES {
            assert!(resource_by_uri(uri).is_some(), "{}", uri);
        }
        assert!(resource_by_uri("oura://nope").is_none());
    }
}
