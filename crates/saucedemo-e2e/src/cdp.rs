//! Chromium driver over the DevTools protocol.
//!
//! Every element operation is one `Runtime.evaluate` of [`ELEMENT_SCRIPT`]
//! with a JSON request spliced in. The script re-resolves the element path
//! in the page, checks the snapshot token and replies with a status the
//! driver maps onto [`E2eError`]. No remote object handles are kept, so
//! nothing leaks across navigations.
//!
//! The snapshot token is a per-window random stamp, a mutation epoch and
//! `location.href`. A full page load replaces the window and therefore the
//! stamp, and client-side routing changes the URL half. The epoch counts
//! child-list mutations of `.inventory_list`, so re-sorting the catalog in
//! place retires every handle into it.

use crate::config::BrowserSettings;
use crate::driver::{Driver, ElementRef, ElementState};
use crate::locator::{Locator, Query};
use crate::result::{E2eError, E2eResult};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// In-page half of the driver; `{REQ}` is replaced by the request JSON
const ELEMENT_SCRIPT: &str = r#"(() => {
  const req = {REQ};
  if (!window.__e2eStamp) {
    window.__e2eStamp = Date.now().toString(36) + Math.random().toString(36).slice(2);
  }
  const list = document.querySelector('.inventory_list');
  if (list && window.__e2eList !== list) {
    window.__e2eList = list;
    new MutationObserver(() => { window.__e2eEpoch = (window.__e2eEpoch || 0) + 1; })
      .observe(list, { childList: true });
  }
  const token = window.__e2eStamp + '.' + (window.__e2eEpoch || 0) + '|' + location.href;
  const reply = (status, value) => ({ status, token, value: value === undefined ? null : value });
  const find = (scope, query) => {
    if (query.xpath) {
      const found = document.evaluate(query.expr, scope, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
      const out = [];
      for (let i = 0; i < found.snapshotLength; i++) out.push(found.snapshotItem(i));
      return out;
    }
    return Array.from(scope.querySelectorAll(query.expr));
  };
  const isDisplayed = (el) => {
    const style = getComputedStyle(el);
    const rect = el.getBoundingClientRect();
    return style.display !== 'none' && style.visibility !== 'hidden' && rect.width > 0 && rect.height > 0;
  };
  const setValue = (el, proto, value) => {
    Object.getOwnPropertyDescriptor(proto, 'value').set.call(el, value);
    el.dispatchEvent(new Event('input', { bubbles: true }));
    el.dispatchEvent(new Event('change', { bubbles: true }));
  };

  if (req.op === 'token') return reply('ok', token);
  if (req.op === 'url') return reply('ok', location.href);
  if (req.op === 'back') { history.back(); return reply('ok'); }
  if (req.token !== null && req.token !== token) return reply('stale');

  let el = document;
  for (const step of req.path) {
    el = find(el, step.query)[step.index];
    if (!el) return reply('missing');
  }

  switch (req.op) {
    case 'find_all': return reply('ok', find(el, req.query).length);
    case 'state': return reply('ok', { displayed: isDisplayed(el), enabled: !el.disabled });
    case 'text': return reply('ok', (el.innerText || el.textContent || '').trim());
    case 'attribute': return reply('ok', el.getAttribute(req.name));
    case 'value': return reply('ok', el.value === undefined ? '' : String(el.value));
    case 'click':
      if (!isDisplayed(el)) return reply('not_interactable');
      el.scrollIntoView({ block: 'center' });
      el.click();
      return reply('ok');
    case 'fill':
      setValue(el, el instanceof HTMLTextAreaElement ? HTMLTextAreaElement.prototype : HTMLInputElement.prototype, req.text);
      return reply('ok');
    case 'select':
      setValue(el, HTMLSelectElement.prototype, req.text);
      return reply('ok');
    default: return reply('error', 'unknown op ' + req.op);
  }
})()"#;

#[derive(Debug, Serialize)]
struct Step {
    query: Query,
    index: usize,
}

#[derive(Debug, Serialize)]
struct Request<'a> {
    op: &'a str,
    token: Option<&'a str>,
    path: Vec<Step>,
    query: Option<Query>,
    name: Option<&'a str>,
    text: Option<&'a str>,
}

impl<'a> Request<'a> {
    fn new(op: &'a str) -> Self {
        Self {
            op,
            token: None,
            path: Vec::new(),
            query: None,
            name: None,
            text: None,
        }
    }

    fn on(op: &'a str, element: &'a ElementRef) -> Self {
        Self {
            token: Some(element.token.as_str()),
            path: element
                .path
                .iter()
                .map(|step| Step {
                    query: step.locator.to_query(),
                    index: step.index,
                })
                .collect(),
            ..Self::new(op)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Status {
    Ok,
    Stale,
    Missing,
    NotInteractable,
    Error,
}

#[derive(Debug, Deserialize)]
struct Reply {
    status: Status,
    token: String,
    #[serde(default)]
    value: serde_json::Value,
}

/// [`Driver`] backed by a real Chromium
#[derive(Debug)]
pub struct CdpDriver {
    browser: Mutex<Option<Browser>>,
    page: Page,
    handler: JoinHandle<()>,
}

impl CdpDriver {
    /// Launch Chromium and open a blank page
    ///
    /// # Errors
    ///
    /// Returns `E2eError::BrowserLaunch` if the browser cannot be started.
    pub async fn launch(settings: &BrowserSettings) -> E2eResult<Self> {
        let mut builder = BrowserConfig::builder()
            .window_size(settings.window_width, settings.window_height)
            .viewport(None);
        if !settings.headless {
            builder = builder.with_head();
        }
        if !settings.sandbox {
            builder = builder.no_sandbox();
        }
        if settings.maximize_window {
            builder = builder.arg("--start-maximized");
        }
        if let Some(path) = &settings.chromium_path {
            builder = builder.chrome_executable(path);
        }
        let config = builder
            .build()
            .map_err(|message| E2eError::BrowserLaunch { message })?;

        let (browser, mut handler) =
            Browser::launch(config)
                .await
                .map_err(|e| E2eError::BrowserLaunch {
                    message: e.to_string(),
                })?;
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| E2eError::BrowserLaunch {
                message: e.to_string(),
            })?;
        tracing::info!(headless = settings.headless, "chromium launched");

        Ok(Self {
            browser: Mutex::new(Some(browser)),
            page,
            handler,
        })
    }

    async fn exec(&self, request: &Request<'_>) -> E2eResult<Reply> {
        let script = ELEMENT_SCRIPT.replace("{REQ}", &serde_json::to_string(request)?);
        let reply: Reply = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| E2eError::script(e.to_string()))?
            .into_value()?;
        Ok(reply)
    }

    /// Run an element operation and decode its value
    async fn element_op<T: DeserializeOwned>(&self, request: Request<'_>, element: &ElementRef) -> E2eResult<T> {
        let reply = self.exec(&request).await?;
        match reply.status {
            Status::Ok => Ok(serde_json::from_value(reply.value)?),
            Status::Stale => Err(E2eError::StaleElement {
                locator: element.describe(),
            }),
            Status::Missing => Err(E2eError::ElementMissing {
                locator: element.describe(),
            }),
            Status::NotInteractable => Err(E2eError::driver(format!(
                "element not interactable: {}",
                element.describe()
            ))),
            Status::Error => Err(E2eError::script(reply.value.to_string())),
        }
    }

    async fn page_value(&self, op: &str) -> E2eResult<String> {
        let reply = self.exec(&Request::new(op)).await?;
        match reply.status {
            Status::Ok => Ok(serde_json::from_value(reply.value)?),
            status => Err(E2eError::script(format!("'{op}' replied {status:?}"))),
        }
    }

    async fn page_action(&self, op: &str) -> E2eResult<()> {
        let reply = self.exec(&Request::new(op)).await?;
        match reply.status {
            Status::Ok => Ok(()),
            status => Err(E2eError::script(format!("'{op}' replied {status:?}"))),
        }
    }
}

#[async_trait]
impl Driver for CdpDriver {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        tracing::debug!(url, "goto");
        self.page
            .goto(url)
            .await
            .map_err(|e| E2eError::driver(format!("navigation to {url} failed: {e}")))?;
        Ok(())
    }

    async fn current_url(&self) -> E2eResult<String> {
        self.page_value("url").await
    }

    async fn snapshot_token(&self) -> E2eResult<String> {
        self.page_value("token").await
    }

    async fn find_all(
        &self,
        scope: Option<&ElementRef>,
        locator: Locator,
    ) -> E2eResult<Vec<ElementRef>> {
        let mut request = scope.map_or_else(|| Request::new("find_all"), |s| Request::on("find_all", s));
        request.query = Some(locator.to_query());
        let reply = self.exec(&request).await?;
        let describe = || scope.map_or_else(|| locator.to_string(), ElementRef::describe);
        match reply.status {
            Status::Ok => {
                let count: usize = serde_json::from_value(reply.value)?;
                Ok((0..count)
                    .map(|index| match scope {
                        Some(scope) => scope.child(locator, index),
                        None => ElementRef::root(reply.token.clone(), locator, index),
                    })
                    .collect())
            }
            Status::Stale => Err(E2eError::StaleElement { locator: describe() }),
            Status::Missing => Err(E2eError::ElementMissing { locator: describe() }),
            Status::NotInteractable | Status::Error => {
                Err(E2eError::script(format!("find_all {locator}: {}", reply.value)))
            }
        }
    }

    async fn state(&self, element: &ElementRef) -> E2eResult<ElementState> {
        #[derive(Deserialize)]
        struct Raw {
            displayed: bool,
            enabled: bool,
        }
        let raw: Raw = self.element_op(Request::on("state", element), element).await?;
        Ok(ElementState {
            displayed: raw.displayed,
            enabled: raw.enabled,
        })
    }

    async fn text(&self, element: &ElementRef) -> E2eResult<String> {
        self.element_op(Request::on("text", element), element).await
    }

    async fn attribute(&self, element: &ElementRef, name: &str) -> E2eResult<Option<String>> {
        let mut request = Request::on("attribute", element);
        request.name = Some(name);
        self.element_op(request, element).await
    }

    async fn click(&self, element: &ElementRef) -> E2eResult<()> {
        tracing::debug!(element = %element.describe(), "click");
        self.element_op::<Option<()>>(Request::on("click", element), element)
            .await
            .map(|_| ())
    }

    async fn fill(&self, element: &ElementRef, text: &str) -> E2eResult<()> {
        let mut request = Request::on("fill", element);
        request.text = Some(text);
        self.element_op::<Option<()>>(request, element).await.map(|_| ())
    }

    async fn select_option(&self, element: &ElementRef, value: &str) -> E2eResult<()> {
        let mut request = Request::on("select", element);
        request.text = Some(value);
        self.element_op::<Option<()>>(request, element).await.map(|_| ())
    }

    async fn input_value(&self, element: &ElementRef) -> E2eResult<String> {
        self.element_op(Request::on("value", element), element).await
    }

    async fn go_back(&self) -> E2eResult<()> {
        self.page_action("back").await
    }

    async fn close(&self) -> E2eResult<()> {
        let Some(mut browser) = self.browser.lock().await.take() else {
            return Ok(());
        };
        let closed = browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| E2eError::driver(format!("browser close failed: {e}")));
        if let Err(e) = browser.wait().await {
            tracing::debug!(error = %e, "browser process wait failed");
        }
        self.handler.abort();
        tracing::info!("chromium closed");
        closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod protocol_tests {
        use super::*;

        #[test]
        fn test_request_carries_path_and_token() {
            let row = ElementRef::root("s|https://x/inventory.html", Locator::class("inventory_item"), 2);
            let name = row.child(Locator::class("inventory_item_name"), 0);
            let json = serde_json::to_value(Request::on("text", &name)).unwrap();
            assert_eq!(json["op"], "text");
            assert_eq!(json["token"], "s|https://x/inventory.html");
            assert_eq!(json["path"][0]["index"], 2);
            assert_eq!(json["path"][1]["query"]["expr"], ".inventory_item_name");
            assert!(json["query"].is_null());
        }

        #[test]
        fn test_page_request_has_no_token() {
            let json = serde_json::to_value(Request::new("url")).unwrap();
            assert!(json["token"].is_null());
            assert_eq!(json["path"].as_array().unwrap().len(), 0);
        }

        #[test]
        fn test_reply_statuses_decode() {
            let reply: Reply =
                serde_json::from_str(r#"{"status":"not_interactable","token":"t","value":null}"#).unwrap();
            assert_eq!(reply.status, Status::NotInteractable);
            let reply: Reply = serde_json::from_str(r#"{"status":"ok","token":"t","value":3}"#).unwrap();
            assert_eq!(reply.status, Status::Ok);
            assert_eq!(reply.value, 3);
        }

        #[test]
        fn test_script_has_single_placeholder() {
            assert_eq!(ELEMENT_SCRIPT.matches("{REQ}").count(), 1);
        }

        #[test]
        fn test_token_tracks_catalog_reorders() {
            assert!(ELEMENT_SCRIPT.contains("querySelector('.inventory_list')"));
            assert!(ELEMENT_SCRIPT.contains("observe(list, { childList: true })"));
            assert!(ELEMENT_SCRIPT.contains("window.__e2eStamp + '.' + (window.__e2eEpoch || 0)"));
        }
    }
}
