//! HTTP access to the student portal
//!
//! All three calls of the workflow go through [`Portal`], which reproduces a
//! fixed WeChat embedded-browser identity on every request. The portal
//! differentiates by client fingerprint, so the header set must be identical
//! across stages and the Referer must name the page a real browser would
//! have last loaded.
//!
//! [`StudentPortal`] is the seam the pipeline is written against; tests swap
//! in an in-memory implementation serving fixture HTML.

pub mod extract;

pub use extract::ClassRecord;

use crate::error::{PunchError, Result, Stage};
use crate::util::sanitize_for_header;
use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, COOKIE, ORIGIN, REFERER, USER_AGENT,
};
use std::time::Duration;

/// Origin the workflow targets.
pub const BASE_URL: &str = "http://k8n.cn";

// The portal only serves its mobile pages to WeChat's embedded browser, so
// every request carries that browser's exact fingerprint.
const WECHAT_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 9; AKT-AK47 Build/USER-AK47; wv) \
    AppleWebKit/537.36 (KHTML, like Gecko) Version/4.0 Chrome/116.0.0.0 Mobile Safari/537.36 \
    XWEB/1160065 MMWEBSDK/20231202 MMWEBID/1136 MicroMessenger/8.0.47.2560(0x28002F35) \
    WeChat/arm64 Weixin NetType/4G Language/zh_CN ABI/arm64";
const ACCEPT_VALUE: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,\
    image/wxpic,image/tpg,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7";
const ACCEPT_LANGUAGE_VALUE: &str = "zh-CN,zh-SG;q=0.9,zh;q=0.8,en-SG;q=0.7,en-US;q=0.6,en;q=0.5";
const REQUESTED_WITH: &str = "com.tencent.mm";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// One check-in submission, expressed as the portal's exact form field set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub class_id: String,
    pub task_id: String,
    pub lat: String,
    pub lng: String,
}

impl Submission {
    /// Form fields in submission order. `res` (free-text result) and
    /// `gps_addr` (resolved address) are optional on the origin site and
    /// intentionally left blank.
    pub fn form_fields(&self) -> [(&'static str, &str); 6] {
        [
            ("id", self.task_id.as_str()),
            ("lat", self.lat.as_str()),
            ("lng", self.lng.as_str()),
            ("acc", "10"),
            ("res", ""),
            ("gps_addr", ""),
        ]
    }
}

/// The three portal operations the check-in pipeline needs. Each returns the
/// decompressed response body text.
#[async_trait]
pub trait StudentPortal: Send + Sync {
    /// GET the student dashboard page.
    async fn dashboard(&self) -> Result<String>;
    /// GET a class's check-in task list page.
    async fn task_list(&self, class_id: &str) -> Result<String>;
    /// POST one check-in submission and return the raw response body.
    async fn submit(&self, submission: &Submission) -> Result<String>;
}

/// Live portal client backed by a shared reqwest client.
pub struct Portal {
    http: reqwest::Client,
    base_url: String,
}

impl Portal {
    /// Build a client around an operator-supplied session cookie.
    pub fn new(cookie: &str) -> anyhow::Result<Self> {
        Self::with_base_url(BASE_URL, cookie)
    }

    /// Same as [`Portal::new`] against a different origin. The extraction
    /// and request logic is origin-independent; only the host changes.
    pub fn with_base_url(base_url: &str, cookie: &str) -> anyhow::Result<Self> {
        let cookie = sanitize_for_header(cookie, "cookie")?;

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(WECHAT_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE));
        headers.insert("X-Requested-With", HeaderValue::from_static(REQUESTED_WITH));
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&cookie).context("cookie is not a valid header value")?,
        );

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .gzip(true)
            .default_headers(headers)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn read_body(response: reqwest::Response, stage: Stage) -> Result<String> {
        let status = response.status();
        if !status.is_success() {
            return Err(PunchError::UnexpectedStatus {
                stage,
                status: status.as_u16(),
            });
        }
        response
            .text()
            .await
            .map_err(|source| PunchError::Transport { stage, source })
    }
}

#[async_trait]
impl StudentPortal for Portal {
    async fn dashboard(&self) -> Result<String> {
        let url = format!("{}/student", self.base_url);
        log::debug!("GET {url}");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| PunchError::Transport {
                stage: Stage::Dashboard,
                source,
            })?;
        Self::read_body(response, Stage::Dashboard).await
    }

    async fn task_list(&self, class_id: &str) -> Result<String> {
        let url = format!("{}/student/course/{}/punchs", self.base_url, class_id);
        let referer = format!("{}/student/course/{}", self.base_url, class_id);
        log::debug!("GET {url}");
        let response = self
            .http
            .get(&url)
            .header(REFERER, referer)
            .send()
            .await
            .map_err(|source| PunchError::Transport {
                stage: Stage::TaskList,
                source,
            })?;
        Self::read_body(response, Stage::TaskList).await
    }

    async fn submit(&self, submission: &Submission) -> Result<String> {
        let url = format!(
            "{}/student/punchs/course/{}/{}",
            self.base_url, submission.class_id, submission.task_id
        );
        let referer = format!(
            "{}/student/course/{}/punchs",
            self.base_url, submission.class_id
        );
        log::debug!("POST {url}");
        let response = self
            .http
            .post(&url)
            .header(ORIGIN, self.base_url.clone())
            .header(REFERER, referer)
            .form(&submission.form_fields())
            .send()
            .await
            .map_err(|source| PunchError::Transport {
                stage: Stage::Submission,
                source,
            })?;
        Self::read_body(response, Stage::Submission).await
    }
}
