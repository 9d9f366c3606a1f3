use chrono::{DateTime, FixedOffset, Utc};

use super::identifiable::Identity;

/// Exchange metadata from `THE-HEADER` / `REQ-IF-HEADER`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReqIfHeader {
    /// The `IDENTIFIER` attribute of the header element.
    pub identifier: String,
    /// `COMMENT`
    pub comment: Option<String>,
    /// `CREATION-TIME`
    pub creation_time: Option<DateTime<FixedOffset>>,
    /// `REPOSITORY-ID`
    pub repository_id: Option<String>,
    /// `REQ-IF-TOOL-ID`
    pub req_if_tool_id: Option<String>,
    /// `REQ-IF-VERSION`
    pub req_if_version: Option<String>,
    /// `SOURCE-TOOL-ID`
    pub source_tool_id: Option<String>,
    /// `TITLE`
    pub title: Option<String>,
}

impl ReqIfHeader {
    /// The ReqIF schema version written by default.
    pub const VERSION: &'static str = "1.0";

    /// A header stamped with the current time and a generated identifier.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            identifier: Identity::new().identifier().to_string(),
            comment: None,
            creation_time: Some(Utc::now().fixed_offset()),
            repository_id: None,
            req_if_tool_id: Some(concat!("reqif-codec ", env!("CARGO_PKG_VERSION")).to_string()),
            req_if_version: Some(Self::VERSION.to_string()),
            source_tool_id: None,
            title: Some(title.into()),
        }
    }
}
