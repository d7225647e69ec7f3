//! The verbs the backend understands and their default notification policy.

use std::fmt;

use crate::http::HttpMethod;

/// Whether a classified response should surface a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationPolicy {
    pub notify_on_success: bool,
    pub notify_on_failed: bool,
}

impl NotificationPolicy {
    pub const ALWAYS: Self = Self {
        notify_on_success: true,
        notify_on_failed: true,
    };
    pub const FAILURES_ONLY: Self = Self {
        notify_on_success: false,
        notify_on_failed: true,
    };
    pub const SILENT: Self = Self {
        notify_on_success: false,
        notify_on_failed: false,
    };
}

impl Default for NotificationPolicy {
    fn default() -> Self {
        Self::FAILURES_ONLY
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Create,
    CreateAndUpload,
    Read,
    Update,
    UpdateAndUpload,
    Delete,
    Filter,
    Search,
    List,
    ListAll,
    Summary,
    Post,
    Get,
    Patch,
    Upload,
    Mail,
    Convert,
}

impl Verb {
    pub fn name(self) -> &'static str {
        match self {
            Verb::Create => "create",
            Verb::CreateAndUpload => "createAndUpload",
            Verb::Read => "read",
            Verb::Update => "update",
            Verb::UpdateAndUpload => "updateAndUpload",
            Verb::Delete => "delete",
            Verb::Filter => "filter",
            Verb::Search => "search",
            Verb::List => "list",
            Verb::ListAll => "listAll",
            Verb::Summary => "summary",
            Verb::Post => "post",
            Verb::Get => "get",
            Verb::Patch => "patch",
            Verb::Upload => "upload",
            Verb::Mail => "mail",
            Verb::Convert => "convert",
        }
    }

    pub fn method(self) -> HttpMethod {
        match self {
            Verb::Create | Verb::CreateAndUpload | Verb::Post | Verb::Mail => HttpMethod::Post,
            Verb::Update | Verb::UpdateAndUpload | Verb::Patch | Verb::Upload => HttpMethod::Patch,
            Verb::Delete => HttpMethod::Delete,
            Verb::Read
            | Verb::Filter
            | Verb::Search
            | Verb::List
            | Verb::ListAll
            | Verb::Summary
            | Verb::Get
            | Verb::Convert => HttpMethod::Get,
        }
    }

    /// Path suffix appended to the entity, before any id or query.
    /// Generic verbs append nothing.
    pub fn suffix(self) -> &'static str {
        match self {
            Verb::Create | Verb::CreateAndUpload => "/create",
            Verb::Read => "/read/",
            Verb::Update | Verb::UpdateAndUpload => "/update/",
            Verb::Delete => "/delete/",
            Verb::Filter => "/filter",
            Verb::Search => "/search",
            Verb::List => "/list",
            Verb::ListAll => "/listAll",
            Verb::Summary => "/summary",
            Verb::Upload => "/upload/",
            Verb::Mail => "/mail/",
            Verb::Convert => "/convert/",
            Verb::Post | Verb::Get | Verb::Patch => "",
        }
    }

    /// `None` means the response is returned without classification.
    pub fn default_policy(self) -> Option<NotificationPolicy> {
        match self {
            Verb::Post | Verb::Get => None,
            Verb::Read => Some(NotificationPolicy::FAILURES_ONLY),
            Verb::Filter | Verb::Search | Verb::List | Verb::ListAll | Verb::Summary => {
                Some(NotificationPolicy::SILENT)
            }
            Verb::Create
            | Verb::CreateAndUpload
            | Verb::Update
            | Verb::UpdateAndUpload
            | Verb::Delete
            | Verb::Patch
            | Verb::Upload
            | Verb::Mail
            | Verb::Convert => Some(NotificationPolicy::ALWAYS),
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_get_and_post_are_unclassified_but_patch_is() {
        assert_eq!(Verb::Get.default_policy(), None);
        assert_eq!(Verb::Post.default_policy(), None);
        assert_eq!(Verb::Patch.default_policy(), Some(NotificationPolicy::ALWAYS));
    }

    #[test]
    fn read_only_notifies_failures() {
        assert_eq!(
            Verb::Read.default_policy(),
            Some(NotificationPolicy::FAILURES_ONLY)
        );
    }

    #[test]
    fn updates_and_uploads_use_patch() {
        for verb in [Verb::Update, Verb::UpdateAndUpload, Verb::Upload, Verb::Patch] {
            assert_eq!(verb.method(), HttpMethod::Patch, "{verb}");
        }
        assert_eq!(Verb::Convert.method(), HttpMethod::Get);
        assert_eq!(Verb::Mail.method(), HttpMethod::Post);
    }
}
