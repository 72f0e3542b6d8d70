//! List filters parsed from query parameters

use crate::contract::{CatalogError, Project};

/// Tag list filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagFilter {
    /// Only tags attached to at least one project
    pub assigned_only: bool,
}

impl TagFilter {
    /// Parse the `assigned_only` integer flag; absent or empty means off
    pub fn from_param(assigned_only: Option<&str>) -> Result<Self, CatalogError> {
        let assigned_only = match assigned_only.map(str::trim) {
            None | Some("") => false,
            Some(raw) => {
                raw.parse::<i64>().map_err(|_| {
                    CatalogError::validation(
                        "assigned_only",
                        format!("'{}' is not a valid integer flag", raw),
                    )
                })? != 0
            }
        };
        Ok(Self { assigned_only })
    }
}

/// Project list filter; always applied on top of the owner scope
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFilter {
    /// Keep projects carrying any of these tags
    pub tag_ids: Option<Vec<i32>>,
    /// Keep projects built for any of these applications
    pub application_ids: Option<Vec<i32>>,
}

impl ProjectFilter {
    pub fn from_params(
        tags: Option<&str>,
        applications: Option<&str>,
    ) -> Result<Self, CatalogError> {
        Ok(Self {
            tag_ids: parse_id_list("tags", tags)?,
            application_ids: parse_id_list("applications", applications)?,
        })
    }

    /// In-memory form of the filter, same semantics as the SQL query
    pub fn matches(&self, project: &Project) -> bool {
        let tags_ok = self
            .tag_ids
            .as_ref()
            .is_none_or(|ids| project.tag_ids.iter().any(|t| ids.contains(t)));
        let apps_ok = self
            .application_ids
            .as_ref()
            .is_none_or(|ids| ids.contains(&project.application_id));
        tags_ok && apps_ok
    }
}

/// Parse a comma-separated id list such as `1,2,3`
///
/// `None` or an empty value means "no filter". Any non-numeric element is a
/// validation error rather than an empty result.
pub fn parse_id_list(field: &str, raw: Option<&str>) -> Result<Option<Vec<i32>>, CatalogError> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(raw) => raw,
    };

    raw.split(',')
        .map(|part| {
            let part = part.trim();
            part.parse::<i32>().map_err(|_| {
                CatalogError::validation(field, format!("'{}' is not a valid id", part))
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn project(application_id: i32, tag_ids: Vec<i32>) -> Project {
        let now = Utc::now();
        Project {
            id: 1,
            owner_id: Some(1),
            title: "p".to_string(),
            application_id,
            tool_id: None,
            data: String::new(),
            thumbnail: String::new(),
            description: None,
            created_at: now,
            modified_at: now,
            tag_ids,
            modified_date_history: vec![],
            modified_data_history: vec![],
            modified_thumbnail_history: vec![],
        }
    }

    #[test]
    fn parses_id_lists() {
        assert_eq!(parse_id_list("tags", None), Ok(None));
        assert_eq!(parse_id_list("tags", Some("")), Ok(None));
        assert_eq!(parse_id_list("tags", Some("1, 2,3")), Ok(Some(vec![1, 2, 3])));
    }

    #[test]
    fn rejects_malformed_id_lists() {
        let err = parse_id_list("applications", Some("1,abc")).unwrap_err();
        assert!(matches!(err, CatalogError::Validation { ref field, .. } if field == "applications"));
        assert!(parse_id_list("tags", Some("1,,2")).is_err());
    }

    #[test]
    fn assigned_only_flag() {
        assert!(!TagFilter::from_param(None).unwrap().assigned_only);
        assert!(!TagFilter::from_param(Some("0")).unwrap().assigned_only);
        assert!(TagFilter::from_param(Some("1")).unwrap().assigned_only);
        assert!(TagFilter::from_param(Some("yes")).is_err());
    }

    #[test]
    fn combined_filters_intersect() {
        let filter = ProjectFilter::from_params(Some("10,11"), Some("2")).unwrap();
        assert!(filter.matches(&project(2, vec![11])));
        assert!(!filter.matches(&project(3, vec![11])));
        assert!(!filter.matches(&project(2, vec![12])));
        assert!(!filter.matches(&project(2, vec![])));
        assert!(ProjectFilter::default().matches(&project(9, vec![])));
    }
}
