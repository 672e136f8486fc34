//! リクエスト遮断ポリシー

use chromiumoxide::cdp::browser_protocol::network::ResourceType;

/// リクエストのリソース種別（CDP の ResourceType を必要な分だけ写したもの）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Document,
    Stylesheet,
    Image,
    Media,
    Font,
    Script,
    Xhr,
    Other,
}

impl From<&ResourceType> for ResourceKind {
    fn from(value: &ResourceType) -> Self {
        match value {
            ResourceType::Document => ResourceKind::Document,
            ResourceType::Stylesheet => ResourceKind::Stylesheet,
            ResourceType::Image => ResourceKind::Image,
            ResourceType::Media => ResourceKind::Media,
            ResourceType::Font => ResourceKind::Font,
            ResourceType::Script => ResourceKind::Script,
            ResourceType::Xhr | ResourceType::Fetch => ResourceKind::Xhr,
            _ => ResourceKind::Other,
        }
    }
}

/// どのリクエストを中断するかの判定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPolicy {
    blocked_kinds: Vec<ResourceKind>,
    /// URLに含まれていたら遮断する文字列（広告・解析系）
    deny_list: Vec<String>,
}

impl Default for RequestPolicy {
    fn default() -> Self {
        Self {
            blocked_kinds: vec![
                ResourceKind::Image,
                ResourceKind::Stylesheet,
                ResourceKind::Font,
                ResourceKind::Media,
            ],
            deny_list: ["google", "analytics", "doubleclick", "ads"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl RequestPolicy {
    pub fn new(blocked_kinds: Vec<ResourceKind>, deny_list: Vec<String>) -> Self {
        Self {
            blocked_kinds,
            deny_list,
        }
    }

    /// 何も遮断しない
    pub fn allow_all() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    pub fn should_block(&self, kind: ResourceKind, url: &str) -> bool {
        self.blocked_kinds.contains(&kind)
            || self.deny_list.iter().any(|needle| url.contains(needle.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_heavy_resources() {
        let policy = RequestPolicy::default();
        let url = "https://www.reed.co.uk/static/app.css";
        assert!(policy.should_block(ResourceKind::Stylesheet, url));
        assert!(policy.should_block(ResourceKind::Image, "https://www.reed.co.uk/logo.png"));
        assert!(policy.should_block(ResourceKind::Font, "https://www.reed.co.uk/f.woff2"));
        assert!(policy.should_block(ResourceKind::Media, "https://www.reed.co.uk/intro.mp4"));
    }

    #[test]
    fn test_blocks_tracking_domains() {
        let policy = RequestPolicy::default();
        assert!(policy.should_block(
            ResourceKind::Script,
            "https://www.googletagmanager.com/gtm.js"
        ));
        assert!(policy.should_block(
            ResourceKind::Xhr,
            "https://stats.g.doubleclick.net/collect"
        ));
    }

    #[test]
    fn test_allows_documents_and_scripts() {
        let policy = RequestPolicy::default();
        assert!(!policy.should_block(
            ResourceKind::Document,
            "https://www.reed.co.uk/jobs/rust-jobs-in-london"
        ));
        assert!(!policy.should_block(ResourceKind::Script, "https://www.reed.co.uk/app.js"));
    }

    #[test]
    fn test_allow_all_never_blocks() {
        let policy = RequestPolicy::allow_all();
        assert!(!policy.should_block(ResourceKind::Image, "https://ads.example.com/x.png"));
    }

    #[test]
    fn test_cdp_resource_type_mapping() {
        assert_eq!(ResourceKind::from(&ResourceType::Image), ResourceKind::Image);
        assert_eq!(ResourceKind::from(&ResourceType::Fetch), ResourceKind::Xhr);
        assert_eq!(ResourceKind::from(&ResourceType::Other), ResourceKind::Other);
    }
}
