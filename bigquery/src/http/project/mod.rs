pub mod list;

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProjectReference {
    /// ID of the project. Can be either the numeric ID or the assigned ID of the project.
    pub project_id: String,
}

/// A project the caller can list datasets and run jobs in.
#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// An opaque ID of this project.
    pub id: String,
    /// The numeric ID of this project.
    #[serde(deserialize_with = "crate::http::from_str")]
    pub numeric_id: u64,
    /// A descriptive name for this project.
    #[serde(default)]
    pub friendly_name: Option<String>,
    /// A unique reference to this project.
    #[serde(default)]
    pub project_reference: ProjectReference,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::http::project::Project;

    #[test]
    fn test_from_resource() {
        let project: Project = serde_json::from_value(json!({
            "kind": "bigquery#project",
            "id": "project-one",
            "numericId": "1234",
            "friendlyName": "One",
            "projectReference": {"projectId": "project-one"}
        }))
        .unwrap();
        assert_eq!(project.id, "project-one");
        assert_eq!(project.numeric_id, 1234);
        assert_eq!(project.friendly_name.as_deref(), Some("One"));
        assert_eq!(project.project_reference.project_id, "project-one");
    }
}
